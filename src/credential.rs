// This file is part of Saltkeep.
//
// Copyright (c) 2025  The Saltkeep developers
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Salted PBKDF2-HMAC-SHA256 credential records.
//!
//! A record is stored as `hex(salt):hex(derived_key)`. The iteration count is
//! not part of the record, so the same [`Pbkdf2Config`] must be used to hash
//! and to verify.

use constant_time_eq::constant_time_eq;
use pbkdf2::pbkdf2_hmac;
use rand_core::{OsRng, RngCore};
use sha2::Sha256;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

pub const SALT_LEN: usize = 16;
pub const KEY_LEN: usize = 32;

const SEPARATOR: char = ':';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pbkdf2Config {
    pub iterations: u32,
}

impl Pbkdf2Config {
    pub const STANDARD: Self = Self {
        iterations: 100_000,
    };

    pub const fn new(iterations: u32) -> Self {
        Self { iterations }
    }
}

impl Default for Pbkdf2Config {
    fn default() -> Self {
        Self::STANDARD
    }
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record is missing the ':' separator")]
    MissingSeparator,
    #[error("invalid salt: {0}")]
    Salt(#[source] hex::FromHexError),
    #[error("invalid derived key: {0}")]
    DerivedKey(#[source] hex::FromHexError),
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("secure random source unavailable: {0}")]
    Entropy(#[from] rand_core::Error),
}

/// One account's stored secret: a random salt and the key derived from it.
///
/// Records are never mutated. Changing a password means generating a new
/// record, which also draws a new salt.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct CredentialRecord {
    salt: [u8; SALT_LEN],
    derived_key: [u8; KEY_LEN],
}

impl CredentialRecord {
    /// Hashes `password` under a fresh salt from the operating system's CSPRNG.
    pub fn generate(password: &str, config: Pbkdf2Config) -> Result<Self, CredentialError> {
        let mut salt = [0u8; SALT_LEN];
        OsRng.try_fill_bytes(&mut salt)?;
        Ok(Self::derive(password, salt, config))
    }

    /// Hashes `password` under a caller-supplied salt.
    pub fn derive(password: &str, salt: [u8; SALT_LEN], config: Pbkdf2Config) -> Self {
        let mut derived_key = [0u8; KEY_LEN];
        derive_key(password.as_bytes(), &salt, config, &mut derived_key);
        Self { salt, derived_key }
    }

    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }

    pub fn derived_key(&self) -> &[u8; KEY_LEN] {
        &self.derived_key
    }

    pub fn verify(&self, candidate: &str, config: Pbkdf2Config) -> bool {
        let mut candidate_key = Zeroizing::new([0u8; KEY_LEN]);
        derive_key(candidate.as_bytes(), &self.salt, config, &mut candidate_key);
        constant_time_eq(&candidate_key[..], &self.derived_key[..])
    }
}

impl fmt::Display for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            hex::encode(self.salt),
            SEPARATOR,
            hex::encode(self.derived_key)
        )
    }
}

// Keeps key material out of logs and panic messages.
impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("salt", &hex::encode(self.salt))
            .field("derived_key", &"[REDACTED]")
            .finish()
    }
}

impl FromStr for CredentialRecord {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (salt_hex, key_hex) = s
            .split_once(SEPARATOR)
            .ok_or(RecordError::MissingSeparator)?;

        let mut salt = [0u8; SALT_LEN];
        hex::decode_to_slice(salt_hex, &mut salt).map_err(RecordError::Salt)?;

        let mut derived_key = [0u8; KEY_LEN];
        hex::decode_to_slice(key_hex, &mut derived_key).map_err(RecordError::DerivedKey)?;

        Ok(Self { salt, derived_key })
    }
}

pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    hash_password_with(password, Pbkdf2Config::STANDARD)
}

pub fn hash_password_with(password: &str, config: Pbkdf2Config) -> Result<String, CredentialError> {
    Ok(CredentialRecord::generate(password, config)?.to_string())
}

/// Checks `candidate` against a serialized record.
///
/// A record that does not parse is a failed verification, never an error.
pub fn verify_password(stored: &str, candidate: &str) -> bool {
    verify_password_with(stored, candidate, Pbkdf2Config::STANDARD)
}

pub fn verify_password_with(stored: &str, candidate: &str, config: Pbkdf2Config) -> bool {
    match stored.parse::<CredentialRecord>() {
        Ok(record) => record.verify(candidate, config),
        Err(e) => {
            tracing::debug!(error = %e, "rejecting malformed credential record");
            false
        }
    }
}

fn derive_key(password: &[u8], salt: &[u8], config: Pbkdf2Config, output: &mut [u8; KEY_LEN]) {
    pbkdf2_hmac::<Sha256>(password, salt, config.iterations, output);
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAST: Pbkdf2Config = Pbkdf2Config::new(1_000);

    fn fixed_salt() -> [u8; SALT_LEN] {
        let mut salt = [0u8; SALT_LEN];
        for (i, b) in salt.iter_mut().enumerate() {
            *b = i as u8;
        }
        salt
    }

    #[test]
    fn test_default_is_standard() {
        assert_eq!(Pbkdf2Config::default(), Pbkdf2Config::STANDARD);
        assert_eq!(Pbkdf2Config::STANDARD.iterations, 100_000);
    }

    #[test]
    fn test_known_answer_single_iteration() {
        let mut output = [0u8; KEY_LEN];
        derive_key(b"passwd", b"salt", Pbkdf2Config::new(1), &mut output);

        assert_eq!(
            hex::encode(output),
            "55ac046e56e3089fec1691c22544b605f94185216dde0465e68b9d57c20dacbc"
        );
    }

    #[test]
    fn test_regression_standard_record() {
        let record = CredentialRecord::derive("Tr0ub4dor&3", fixed_salt(), Pbkdf2Config::STANDARD);

        assert_eq!(
            record.to_string(),
            "000102030405060708090a0b0c0d0e0f:\
             0da34b3ee6dcbcf27843da35de04806560e6f55781f7ec4b012aaf3e6741745d"
        );
    }

    #[test]
    fn test_regression_empty_password() {
        let record = CredentialRecord::derive("", fixed_salt(), Pbkdf2Config::STANDARD);

        assert_eq!(
            hex::encode(record.derived_key()),
            "286ed0e0ec47cc953dc709da86b074849e1c1202cca4acd663df1860514934ae"
        );
        assert!(verify_password(&record.to_string(), ""));
        assert!(!verify_password(&record.to_string(), " "));
    }

    #[test]
    fn test_hash_and_verify() {
        let stored = hash_password("Tr0ub4dor&3").unwrap();

        let (salt_hex, key_hex) = stored.split_once(':').unwrap();
        assert_eq!(salt_hex.len(), 32);
        assert_eq!(key_hex.len(), 64);

        assert!(verify_password(&stored, "Tr0ub4dor&3"));
        assert!(!verify_password(&stored, "tr0ub4dor&3"));
    }

    #[test]
    fn test_wrong_password_rejected() {
        let stored = hash_password_with("correct horse", FAST).unwrap();

        assert!(!verify_password_with(&stored, "correct horsE", FAST));
        assert!(!verify_password_with(&stored, "correct horse ", FAST));
        assert!(!verify_password_with(&stored, "", FAST));
    }

    #[test]
    fn test_salts_differ() {
        let first = hash_password_with("same password", FAST).unwrap();
        let second = hash_password_with("same password", FAST).unwrap();

        assert_ne!(first, second);
        assert_ne!(first.split_once(':').unwrap().0, second.split_once(':').unwrap().0);
        assert!(verify_password_with(&first, "same password", FAST));
        assert!(verify_password_with(&second, "same password", FAST));
    }

    #[test]
    fn test_config_mismatch_fails() {
        let stored = hash_password_with("password", FAST).unwrap();
        assert!(!verify_password_with(&stored, "password", Pbkdf2Config::new(1_001)));
    }

    #[test]
    fn test_round_trip() {
        let stored = hash_password_with("round trip", FAST).unwrap();
        let record: CredentialRecord = stored.parse().unwrap();

        assert_eq!(record.salt().len(), SALT_LEN);
        assert_eq!(record.derived_key().len(), KEY_LEN);
        assert_eq!(record.to_string(), stored);
    }

    #[test]
    fn test_uppercase_hex_accepted() {
        let stored = hash_password_with("Upper", FAST).unwrap();
        let upper = stored.to_uppercase();

        assert!(verify_password_with(&upper, "Upper", FAST));
        let record: CredentialRecord = upper.parse().unwrap();
        assert_eq!(record.to_string(), stored);
    }

    #[test]
    fn test_malformed_records_rejected() {
        let valid = hash_password_with("pw", FAST).unwrap();
        let (salt_hex, key_hex) = valid.split_once(':').unwrap();

        let cases = vec![
            String::new(),
            "not-a-valid-record".to_string(),
            ":".to_string(),
            format!("{}{}", salt_hex, key_hex),
            format!("{}:{}", &salt_hex[1..], key_hex),
            format!("{}:{}", salt_hex, &key_hex[1..]),
            format!("{}:{}", &salt_hex[2..], key_hex),
            format!("{}:{}00", salt_hex, key_hex),
            format!("{}:{}:{}", salt_hex, key_hex, key_hex),
            format!("zz{}:{}", &salt_hex[2..], key_hex),
            format!("{}:{}g", salt_hex, &key_hex[1..]),
            format!("{}:{}", key_hex, salt_hex),
        ];

        for case in cases {
            assert!(
                !verify_password_with(&case, "pw", FAST),
                "Malformed record was accepted: \"{}\"",
                case
            );
            assert!(case.parse::<CredentialRecord>().is_err());
        }
    }

    #[test]
    fn test_parse_error_kinds() {
        assert!(matches!(
            "abcdef".parse::<CredentialRecord>(),
            Err(RecordError::MissingSeparator)
        ));
        assert!(matches!(
            "abc:00".parse::<CredentialRecord>(),
            Err(RecordError::Salt(_))
        ));
        assert!(matches!(
            format!("{}:xyz", "00".repeat(SALT_LEN)).parse::<CredentialRecord>(),
            Err(RecordError::DerivedKey(_))
        ));
    }

    #[test]
    fn test_unicode_passwords() {
        let passwords = vec!["жизнь", "生活", "생활", "🔐🔑", "café"];

        for password in &passwords {
            let stored = hash_password_with(password, FAST).unwrap();
            assert!(verify_password_with(&stored, password, FAST));
        }

        let nfc = hash_password_with("café", FAST).unwrap();
        assert!(!verify_password_with(&nfc, "cafe\u{0301}", FAST));
    }

    #[test]
    fn test_debug_redacts_key() {
        let record = CredentialRecord::derive("secret", fixed_salt(), FAST);
        let debug = format!("{:?}", record);

        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains(&hex::encode(record.derived_key())));
    }

    #[test]
    fn test_concurrent_hashing() {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                std::thread::spawn(move || {
                    let password = format!("thread-{}", i);
                    let stored = hash_password_with(&password, FAST).unwrap();
                    (password, stored)
                })
            })
            .collect();

        for handle in handles {
            let (password, stored) = handle.join().unwrap();
            assert!(verify_password_with(&stored, &password, FAST));
        }
    }
}
