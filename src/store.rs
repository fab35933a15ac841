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

//! Username to credential-record registry.
//!
//! The on-disk form is one `username:salt:key` line per account, where
//! `salt:key` is the serialized [`CredentialRecord`].

use crate::credential::{CredentialError, CredentialRecord, Pbkdf2Config, SALT_LEN};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const FIELD_SEPARATOR: char = ':';

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Username cannot be empty")]
    EmptyUsername,
    #[error("Username cannot contain ':' or line breaks")]
    InvalidUsername,
    #[error("Password cannot be empty")]
    EmptyPassword,
    #[error("User \"{0}\" already exists")]
    AlreadyExists(String),
    #[error("Unknown user \"{0}\"")]
    UnknownUser(String),
    #[error("Incorrect password")]
    IncorrectPassword,
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error("Failed to access account file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug)]
pub struct AccountStore {
    accounts: BTreeMap<String, CredentialRecord>,
    config: Pbkdf2Config,
}

impl AccountStore {
    pub fn new(config: Pbkdf2Config) -> Self {
        Self {
            accounts: BTreeMap::new(),
            config,
        }
    }

    /// Reads accounts from `path`. A missing file is an empty store.
    ///
    /// Lines that do not parse are skipped with a warning, as are repeated
    /// usernames after their first occurrence.
    pub fn load(path: &Path, config: Pbkdf2Config) -> Result<Self, StoreError> {
        let mut store = Self::new(config);

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "account file not found, starting empty");
                return Ok(store);
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        for (i, line) in contents.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }

            let Some((username, record)) = line.split_once(FIELD_SEPARATOR) else {
                tracing::warn!(line = i + 1, "skipping account line without separator");
                continue;
            };

            if validate_username(username).is_err() {
                tracing::warn!(line = i + 1, "skipping account line with invalid username");
                continue;
            }

            let record = match record.parse::<CredentialRecord>() {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(line = i + 1, error = %e, "skipping malformed account line");
                    continue;
                }
            };

            if store.accounts.contains_key(username) {
                tracing::warn!(line = i + 1, username, "skipping duplicate account");
                continue;
            }

            store.accounts.insert(username.to_string(), record);
        }

        tracing::debug!(path = %path.display(), accounts = store.len(), "loaded account file");
        Ok(store)
    }

    /// Writes every account to `path`, replacing it via a sibling temp file.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let mut contents = String::new();
        for (username, record) in &self.accounts {
            contents.push_str(username);
            contents.push(FIELD_SEPARATOR);
            contents.push_str(&record.to_string());
            contents.push('\n');
        }

        let mut tmp_path = path.as_os_str().to_owned();
        tmp_path.push(".tmp");
        let tmp_path = PathBuf::from(tmp_path);

        fs::write(&tmp_path, contents).map_err(io_err)?;
        fs::rename(&tmp_path, path).map_err(io_err)?;

        tracing::debug!(path = %path.display(), accounts = self.len(), "saved account file");
        Ok(())
    }

    pub fn config(&self) -> Pbkdf2Config {
        self.config
    }

    pub fn register(&mut self, username: &str, password: &str) -> Result<(), StoreError> {
        validate_username(username)?;
        if password.is_empty() {
            return Err(StoreError::EmptyPassword);
        }
        if self.accounts.contains_key(username) {
            return Err(StoreError::AlreadyExists(username.to_string()));
        }

        let record = CredentialRecord::generate(password, self.config)?;
        self.accounts.insert(username.to_string(), record);

        tracing::info!(username, "registered account");
        Ok(())
    }

    /// Returns whether `password` is correct for `username`.
    ///
    /// Unknown users still pay for one key derivation so the two failure
    /// cases take comparable time.
    pub fn login(&self, username: &str, password: &str) -> bool {
        let accepted = match self.accounts.get(username) {
            Some(record) => record.verify(password, self.config),
            None => {
                let _ = CredentialRecord::derive(password, [0u8; SALT_LEN], self.config);
                false
            }
        };

        if accepted {
            tracing::info!(username, "login succeeded");
        } else {
            tracing::info!(username, "login failed");
        }
        accepted
    }

    /// Replaces the record for `username` with one for `new_password`.
    ///
    /// `current_password` must verify first. The new record has a new salt.
    pub fn change_password(
        &mut self,
        username: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), StoreError> {
        if new_password.is_empty() {
            return Err(StoreError::EmptyPassword);
        }

        let record = self
            .accounts
            .get(username)
            .ok_or_else(|| StoreError::UnknownUser(username.to_string()))?;

        if !record.verify(current_password, self.config) {
            return Err(StoreError::IncorrectPassword);
        }

        let replacement = CredentialRecord::generate(new_password, self.config)?;
        self.accounts.insert(username.to_string(), replacement);

        tracing::info!(username, "changed password");
        Ok(())
    }

    pub fn remove(&mut self, username: &str) -> bool {
        let removed = self.accounts.remove(username).is_some();
        if removed {
            tracing::info!(username, "removed account");
        }
        removed
    }

    pub fn get(&self, username: &str) -> Option<&CredentialRecord> {
        self.accounts.get(username)
    }

    pub fn contains(&self, username: &str) -> bool {
        self.accounts.contains_key(username)
    }

    pub fn usernames(&self) -> impl Iterator<Item = &str> {
        self.accounts.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

fn validate_username(username: &str) -> Result<(), StoreError> {
    if username.trim().is_empty() {
        return Err(StoreError::EmptyUsername);
    }
    if username.contains([FIELD_SEPARATOR, '\n', '\r']) {
        return Err(StoreError::InvalidUsername);
    }
    Ok(())
}
