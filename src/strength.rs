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

use std::fmt;

pub const MEDIUM_MIN_CHARS: usize = 8;
pub const STRONG_MIN_CHARS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Strength {
    Weak,
    Medium,
    Strong,
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Strength::Weak => "Weak",
            Strength::Medium => "Medium",
            Strength::Strong => "Strong",
        };
        f.write_str(label)
    }
}

/// Rates a password by length and character classes.
///
/// Strong: 12+ characters with an ASCII digit and a symbol (underscore, or
/// anything that is not alphanumeric). Medium: 8+ characters with both ASCII
/// cases. Everything else is Weak.
pub fn assess(password: &str) -> Strength {
    let length = password.chars().count();

    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| c == '_' || !c.is_alphanumeric());

    if length >= STRONG_MIN_CHARS && has_digit && has_symbol {
        Strength::Strong
    } else if length >= MEDIUM_MIN_CHARS && has_lower && has_upper {
        Strength::Medium
    } else {
        Strength::Weak
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weak() {
        for password in ["", "short", "alllowercase", "ALLUPPERCASE1", "Ab1!", "1234567890!"] {
            assert_eq!(assess(password), Strength::Weak, "{}", password);
        }
    }

    #[test]
    fn test_medium() {
        for password in ["Password", "Tr0ub4dor&3", "LongerPassword", "LongerPassword1"] {
            assert_eq!(assess(password), Strength::Medium, "{}", password);
        }
    }

    #[test]
    fn test_strong() {
        for password in [
            "Tr0ub4dor&33",
            "correct_Horse9",
            "Pass word 1234",
            "alllowercase1!",
        ] {
            assert_eq!(assess(password), Strength::Strong, "{}", password);
        }
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        // 11 chars, 13 bytes
        let password = "Pässwörd1!x";
        assert_eq!(password.chars().count(), 11);
        assert_eq!(assess(password), Strength::Medium);
    }

    #[test]
    fn test_unicode_letters_are_not_symbols() {
        assert_eq!(assess("Passwordé1234"), Strength::Medium);
        assert_eq!(assess("Password§1234"), Strength::Strong);
    }

    #[test]
    fn test_ordering() {
        assert!(Strength::Weak < Strength::Medium);
        assert!(Strength::Medium < Strength::Strong);
    }

    #[test]
    fn test_display() {
        assert_eq!(Strength::Weak.to_string(), "Weak");
        assert_eq!(Strength::Strong.to_string(), "Strong");
    }
}
