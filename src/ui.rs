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

use crate::credential::{KEY_LEN, Pbkdf2Config, SALT_LEN};
use crate::strength::Strength;
use anyhow::{Context, Result};
use console::{Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use rpassword::read_password;
use std::io::{self, Write};
use std::time::{Duration, Instant};
use unicode_normalization::UnicodeNormalization;
use zeroize::Zeroizing;

pub const MAX_INPUT_BYTES: usize = 1024 * 1024;

pub const MIN_SAFE_ITERATIONS: u32 = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Register,
    Login,
    ChangePassword,
    Remove,
    List,
    Encode,
    Decode,
    Strength,
    Generate,
    Quit,
}

impl Action {
    pub const MENU: [(&'static str, Action, &'static str); 10] = [
        ("1", Action::Register, "Register account"),
        ("2", Action::Login, "Log in"),
        ("3", Action::ChangePassword, "Change password"),
        ("4", Action::Remove, "Remove account"),
        ("5", Action::List, "List accounts"),
        ("6", Action::Encode, "Base64 encode"),
        ("7", Action::Decode, "Base64 decode"),
        ("8", Action::Strength, "Check password strength"),
        ("9", Action::Generate, "Generate password"),
        ("0", Action::Quit, "Quit"),
    ];

    pub fn from_choice(input: &str) -> Option<Self> {
        let choice = input.trim().to_lowercase();
        if choice == "q" || choice == "quit" || choice == "exit" {
            return Some(Action::Quit);
        }

        Self::MENU
            .iter()
            .find(|(key, _, _)| *key == choice)
            .map(|(_, action, _)| *action)
    }
}

/// Terminal capabilities, detected once at startup and passed to every
/// rendering function.
#[derive(Debug, Clone, Copy)]
pub struct DisplayOptions {
    pub unicode_support: bool,
    pub color_support: bool,
}

impl DisplayOptions {
    pub fn detect() -> Self {
        Self {
            unicode_support: detect_unicode_support(),
            color_support: detect_color_support(),
        }
    }
}

pub fn detect_unicode_support() -> bool {
    supports_unicode::on(supports_unicode::Stream::Stdout)
}

pub fn detect_color_support() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

pub fn get_status_symbols(unicode_support: bool) -> (&'static str, &'static str) {
    if unicode_support {
        ("✓", "!")
    } else {
        ("+", "!")
    }
}

fn get_tree_symbols(unicode_support: bool) -> (&'static str, &'static str) {
    if unicode_support {
        ("├─", "└─")
    } else {
        ("|-", "`-")
    }
}

fn status_style(options: &DisplayOptions, secure: bool) -> Style {
    if !options.color_support {
        Style::new()
    } else if secure {
        Style::new().green()
    } else {
        Style::new().yellow()
    }
}

fn validate_control_characters(s: &str, input_name: &str) -> Result<()> {
    let positions: Vec<String> = s
        .chars()
        .enumerate()
        .filter(|(_, c)| c.is_control())
        .map(|(pos, _)| pos.to_string())
        .collect();

    if positions.is_empty() {
        return Ok(());
    }

    let term = Term::stderr();

    term.write_line(&format!(
        "WARNING: {} contains {} control character(s) at position(s): {}",
        input_name,
        positions.len(),
        positions.join(", ")
    ))?;
    term.write_str("Continue anyway? [y/N]: ")?;
    term.flush()?;

    let mut response = String::new();
    io::stdin().read_line(&mut response)?;
    let response = response.trim().to_lowercase();

    term.clear_last_lines(2)?;

    if response != "y" && response != "yes" {
        anyhow::bail!("Aborted");
    }

    Ok(())
}

// Passwords keep their whitespace; only the Unicode form is canonicalized so
// composed and decomposed input hash the same.
fn normalize_password(s: &str) -> Zeroizing<String> {
    Zeroizing::new(s.nfc().collect())
}

fn normalize_text(s: &str) -> String {
    s.trim().nfc().collect()
}

fn read_line() -> Result<Option<String>> {
    let mut input = String::new();
    let read = io::stdin()
        .read_line(&mut input)
        .context("Failed to read from stdin")?;

    if read == 0 {
        return Ok(None);
    }

    if input.len() > MAX_INPUT_BYTES {
        anyhow::bail!(
            "Input too long ({} bytes, maximum is {})",
            input.len(),
            MAX_INPUT_BYTES
        );
    }

    Ok(Some(input))
}

pub fn prompt_action() -> Result<Action> {
    loop {
        print!("\nIn [menu]: ");
        io::stdout().flush()?;

        let Some(input) = read_line()? else {
            return Ok(Action::Quit);
        };

        match Action::from_choice(&input) {
            Some(action) => return Ok(action),
            None => eprintln!("Unknown option \"{}\"", input.trim()),
        }
    }
}

pub fn prompt_text(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;

    let input = read_line()?.context("Input closed")?;
    let normalized = normalize_text(&input);
    validate_control_characters(&normalized, label)?;

    Ok(normalized)
}

pub fn prompt_password(label: &str) -> Result<Zeroizing<String>> {
    print!("{}: ", label);
    io::stdout().flush()?;

    let raw = Zeroizing::new(read_password().context("Failed to read password")?);

    if raw.len() > MAX_INPUT_BYTES {
        anyhow::bail!(
            "{} too long ({} bytes, maximum is {})",
            label,
            raw.len(),
            MAX_INPUT_BYTES
        );
    }

    let normalized = normalize_password(&raw);
    validate_control_characters(&normalized, label)?;

    Ok(normalized)
}

/// Asks for a new password twice and returns it only if both entries match.
pub fn prompt_new_password(label: &str) -> Result<Zeroizing<String>> {
    let first = prompt_password(label)?;
    let second = prompt_password(&format!("{} (again)", label))?;

    if *first != *second {
        anyhow::bail!("Passwords do not match");
    }

    Ok(first)
}

pub fn prompt_length(label: &str, default: usize) -> Result<usize> {
    let input = prompt_text(&format!("{} [{}]", label, default))?;
    if input.is_empty() {
        return Ok(default);
    }

    input
        .parse()
        .with_context(|| format!("\"{}\" is not a valid length", input))
}

pub fn show_progress<F, T>(options: &DisplayOptions, message: &str, f: F) -> Result<(T, Duration)>
where
    F: FnOnce() -> Result<T>,
{
    let term = Term::stdout();
    term.hide_cursor().ok();

    let pb = ProgressBar::new_spinner();

    if options.unicode_support {
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠋"]),
        );
    } else {
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("-\\|/-"),
        );
    }

    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));

    let start = Instant::now();
    let result = f();
    let elapsed = start.elapsed();

    pb.finish_and_clear();
    term.show_cursor().ok();

    result.map(|r| (r, elapsed))
}

pub fn display_menu(options: &DisplayOptions, store_path: &std::path::Path, accounts: usize) {
    let (branch, last) = get_tree_symbols(options.unicode_support);

    println!("\nAccounts: {} ({})", accounts, store_path.display());
    println!("Menu:");
    for (i, (key, _, label)) in Action::MENU.iter().enumerate() {
        let prefix = if i == Action::MENU.len() - 1 { last } else { branch };
        println!("  {} [{}] {}", prefix, key, label);
    }
}

pub fn display_success(message: &str, options: &DisplayOptions) {
    let (check_ok, _) = get_status_symbols(options.unicode_support);
    let style = status_style(options, true);
    println!("{} {}", style.apply_to(format!("[{}]", check_ok)), message);
}

pub fn display_failure(message: &str, options: &DisplayOptions) {
    let (_, check_warn) = get_status_symbols(options.unicode_support);
    let style = if options.color_support {
        Style::new().red()
    } else {
        Style::new()
    };
    println!("{} {}", style.apply_to(format!("[{}]", check_warn)), message);
}

pub fn display_error(error: &anyhow::Error, options: &DisplayOptions) {
    let style = if options.color_support {
        Style::new().red()
    } else {
        Style::new()
    };
    eprintln!("{} {:#}", style.apply_to("Error:"), error);
}

pub fn display_output(output: &str) {
    println!("Out[0]:\n{}", output);
}

pub fn display_registration(
    username: &str,
    record: &str,
    kdf_config: &Pbkdf2Config,
    elapsed: Duration,
    options: &DisplayOptions,
) {
    let (check_ok, check_warn) = get_status_symbols(options.unicode_support);
    let (branch, last) = get_tree_symbols(options.unicode_support);

    let kdf_secure = kdf_config.iterations >= MIN_SAFE_ITERATIONS;
    let kdf_style = status_style(options, kdf_secure);
    let kdf_status = if kdf_secure { check_ok } else { check_warn };

    display_success(&format!("Registered \"{}\"", username), options);
    println!("Out[0]:\n{}\n", record);

    println!("Settings:");
    println!(
        "  {} KDF        {} PBKDF2-HMAC-SHA256 (i={})",
        branch,
        kdf_style.apply_to(format!("[{}]", kdf_status)),
        kdf_style.apply_to(kdf_config.iterations)
    );
    println!("  {} Salt       {} bytes (OS CSPRNG)", branch, SALT_LEN);
    println!("  {} Key        {} bytes", branch, KEY_LEN);
    println!("  {} Time       {:.1}s", last, elapsed.as_secs_f64());
}

pub fn display_strength(strength: Strength, length: usize, options: &DisplayOptions) {
    let (check_ok, check_warn) = get_status_symbols(options.unicode_support);
    let (branch, last) = get_tree_symbols(options.unicode_support);

    let style = if !options.color_support {
        Style::new()
    } else {
        match strength {
            Strength::Strong => Style::new().green(),
            Strength::Medium => Style::new().yellow(),
            Strength::Weak => Style::new().red(),
        }
    };
    let symbol = if strength == Strength::Strong {
        check_ok
    } else {
        check_warn
    };

    println!("Stats:");
    println!(
        "  {} Length     {} {}",
        branch,
        length,
        if length == 1 { "char" } else { "chars" }
    );
    println!(
        "  {} Strength   {} {}",
        last,
        style.apply_to(format!("[{}]", symbol)),
        style.apply_to(strength)
    );
}

pub fn display_accounts<'a, I>(usernames: I, options: &DisplayOptions)
where
    I: IntoIterator<Item = &'a str>,
{
    let (branch, last) = get_tree_symbols(options.unicode_support);
    let usernames: Vec<&str> = usernames.into_iter().collect();

    if usernames.is_empty() {
        println!("No accounts registered.");
        return;
    }

    println!("Accounts:");
    for (i, username) in usernames.iter().enumerate() {
        let prefix = if i == usernames.len() - 1 { last } else { branch };
        println!("  {} {}", prefix, username);
    }
}
