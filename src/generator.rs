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

use anyhow::{Context, Result};
use chacha20::ChaCha20;
use chacha20::cipher::{KeyIvInit, StreamCipher};
use rand_core::{OsRng, RngCore};
use zeroize::Zeroizing;

pub const ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()_+-=[]{}|;:,.<>?/~";

pub const MAX_PASSWORD_LENGTH: usize = 1024;

/// Generates a random password of `length` characters drawn uniformly from
/// [`ALPHABET`].
pub fn generate_password(length: usize) -> Result<Zeroizing<String>> {
    if length > MAX_PASSWORD_LENGTH {
        anyhow::bail!(
            "Password length {} exceeds maximum of {}",
            length,
            MAX_PASSWORD_LENGTH
        );
    }

    let mut key = Zeroizing::new([0u8; 32]);
    OsRng
        .try_fill_bytes(&mut key[..])
        .context("Failed to read from the system random source")?;

    generate_from_key(&key, length)
}

// The key is single-use, so the all-zero nonce is never repeated under it.
fn generate_from_key(key: &[u8; 32], length: usize) -> Result<Zeroizing<String>> {
    let mut cipher = ChaCha20::new(key.into(), &[0u8; 12].into());

    let mut password_bytes = Zeroizing::new(Vec::with_capacity(length));

    let alphabet_size = ALPHABET.len();
    let rejection_threshold = 256 - (256 % alphabet_size);

    let mut buffer = Zeroizing::new(vec![0u8; 256]);
    cipher.apply_keystream(&mut buffer);
    let mut pos = 0;

    while password_bytes.len() < length {
        if pos >= buffer.len() {
            buffer.fill(0);
            cipher.apply_keystream(&mut buffer);
            pos = 0;
        }

        let random_byte = buffer[pos];
        pos += 1;

        if (random_byte as usize) < rejection_threshold {
            password_bytes.push(ALPHABET[random_byte as usize % alphabet_size]);
        }
    }

    let password = String::from_utf8(password_bytes.to_vec())?;

    Ok(Zeroizing::new(password))
}
