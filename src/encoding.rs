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

//! Base64 transport encoding for text. This is not encryption.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid Base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("decoded data is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub fn encode_base64(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

pub fn decode_base64(encoded: &str) -> Result<String, DecodeError> {
    let bytes = STANDARD.decode(encoded.trim())?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_known_values() {
        assert_eq!(encode_base64(""), "");
        assert_eq!(encode_base64("f"), "Zg==");
        assert_eq!(encode_base64("foobar"), "Zm9vYmFy");
        assert_eq!(encode_base64("café"), "Y2Fmw6k=");
    }

    #[test]
    fn test_decode_known_values() {
        assert_eq!(decode_base64("Zm9vYmFy").unwrap(), "foobar");
        assert_eq!(decode_base64("  Zg==\n").unwrap(), "f");
        assert_eq!(decode_base64("Y2Fmw6k=").unwrap(), "café");
    }

    #[test]
    fn test_decode_sensitive_sentence() {
        let data = "Datos sensibles que necesitan ser codificados";
        let encoded = encode_base64(data);

        assert_ne!(encoded, data);
        assert_eq!(decode_base64(&encoded).unwrap(), data);
    }

    #[test]
    fn test_decode_invalid_base64() {
        for input in ["not base64!", "Zg=", "Z", "@@@@"] {
            assert!(
                matches!(decode_base64(input), Err(DecodeError::Base64(_))),
                "Expected Base64 error for \"{}\"",
                input
            );
        }
    }

    #[test]
    fn test_decode_invalid_utf8() {
        // 0xff 0xfe
        assert!(matches!(decode_base64("//4="), Err(DecodeError::Utf8(_))));
    }
}
