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

pub mod config;
pub mod credential;
pub mod encoding;
pub mod generator;
pub mod store;
pub mod strength;

pub use credential::{
    CredentialError, CredentialRecord, Pbkdf2Config, RecordError, hash_password,
    hash_password_with, verify_password, verify_password_with,
};
pub use encoding::{decode_base64, encode_base64};
pub use generator::generate_password;
pub use store::{AccountStore, StoreError};
pub use strength::{Strength, assess};
