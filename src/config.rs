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

use crate::credential::Pbkdf2Config;
use anyhow::{Context, Result};
use std::path::PathBuf;

pub const STORE_VAR: &str = "SALTKEEP_STORE";
pub const ITERATIONS_VAR: &str = "SALTKEEP_ITERATIONS";
pub const LOG_VAR: &str = "SALTKEEP_LOG";

pub const DEFAULT_STORE_PATH: &str = "accounts.txt";
pub const DEFAULT_LOG_FILTER: &str = "warn";

pub const MIN_ITERATIONS: u32 = 1_000;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Account file read at startup and rewritten after every change
    pub store_path: PathBuf,

    pub kdf: Pbkdf2Config,

    /// `tracing_subscriber::EnvFilter` directive
    pub log_filter: String,
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store_path = lookup(STORE_VAR)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_STORE_PATH.to_string())
            .into();

        let kdf = match lookup(ITERATIONS_VAR) {
            Some(raw) => {
                let iterations: u32 = raw
                    .trim()
                    .replace('_', "")
                    .parse()
                    .with_context(|| {
                        format!(
                            "{} must be a positive integer, got \"{}\"",
                            ITERATIONS_VAR, raw
                        )
                    })?;
                if iterations < MIN_ITERATIONS {
                    anyhow::bail!(
                        "{} too low ({}, minimum is {})",
                        ITERATIONS_VAR,
                        iterations,
                        MIN_ITERATIONS
                    );
                }
                Pbkdf2Config::new(iterations)
            }
            None => Pbkdf2Config::STANDARD,
        };

        let log_filter = lookup(LOG_VAR).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(Self {
            store_path,
            kdf,
            log_filter,
        })
    }
}
