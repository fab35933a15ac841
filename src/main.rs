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

mod config;
mod credential;
mod encoding;
mod generator;
mod store;
mod strength;
mod ui;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use ui::{Action, DisplayOptions};

const DEFAULT_GENERATED_LENGTH: usize = 20;

fn main() -> Result<()> {
    let settings = config::Settings::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&settings.log_filter)
                .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let options = DisplayOptions::detect();

    let mut store = store::AccountStore::load(&settings.store_path, settings.kdf)
        .context("Failed to load account store")?;

    tracing::debug!(
        path = %settings.store_path.display(),
        iterations = settings.kdf.iterations,
        "starting"
    );

    loop {
        ui::display_menu(&options, &settings.store_path, store.len());

        let action = ui::prompt_action()?;
        if action == Action::Quit {
            break;
        }

        if let Err(e) = run_action(action, &mut store, &settings, &options) {
            // Without a working random source no credential can be created.
            if is_fatal(&e) {
                return Err(e.context("Secure random source failed"));
            }
            ui::display_error(&e, &options);
        }
    }

    Ok(())
}

fn run_action(
    action: Action,
    store: &mut store::AccountStore,
    settings: &config::Settings,
    options: &DisplayOptions,
) -> Result<()> {
    match action {
        Action::Register => {
            let username = ui::prompt_text("Username")?;
            let password = ui::prompt_new_password("Password")?;

            let ((), elapsed) = ui::show_progress(options, "Deriving key...", || {
                Ok(store.register(&username, &password)?)
            })?;
            store.save(&settings.store_path)?;

            let record = store
                .get(&username)
                .context("Registered account is missing")?
                .to_string();
            ui::display_registration(&username, &record, &settings.kdf, elapsed, options);
        }
        Action::Login => {
            let username = ui::prompt_text("Username")?;
            let password = ui::prompt_password("Password")?;

            let (accepted, _) = ui::show_progress(options, "Verifying...", || {
                Ok(store.login(&username, &password))
            })?;

            if accepted {
                ui::display_success(&format!("Welcome, {}!", username), options);
            } else {
                ui::display_failure("Incorrect username or password.", options);
            }
        }
        Action::ChangePassword => {
            let username = ui::prompt_text("Username")?;
            let current = ui::prompt_password("Current password")?;
            let new = ui::prompt_new_password("New password")?;

            ui::show_progress(options, "Deriving key...", || {
                Ok(store.change_password(&username, &current, &new)?)
            })?;
            store.save(&settings.store_path)?;

            ui::display_success(&format!("Password changed for \"{}\"", username), options);
        }
        Action::Remove => {
            let username = ui::prompt_text("Username")?;
            let password = ui::prompt_password("Password")?;

            let (accepted, _) = ui::show_progress(options, "Verifying...", || {
                Ok(store.login(&username, &password))
            })?;
            if !accepted {
                ui::display_failure("Incorrect username or password.", options);
                return Ok(());
            }

            store.remove(&username);
            store.save(&settings.store_path)?;
            ui::display_success(&format!("Removed \"{}\"", username), options);
        }
        Action::List => {
            ui::display_accounts(store.usernames(), options);
        }
        Action::Encode => {
            let text = ui::prompt_text("Text")?;
            ui::display_output(&encoding::encode_base64(&text));
        }
        Action::Decode => {
            let text = ui::prompt_text("Base64")?;
            let decoded = encoding::decode_base64(&text)?;
            ui::display_output(&decoded);
        }
        Action::Strength => {
            let password = ui::prompt_password("Password")?;
            let rating = strength::assess(&password);
            ui::display_strength(rating, password.chars().count(), options);
        }
        Action::Generate => {
            let length = ui::prompt_length("Length", DEFAULT_GENERATED_LENGTH)?;
            let password = generator::generate_password(length)?;
            ui::display_output(&password);
            ui::display_strength(strength::assess(&password), length, options);
        }
        Action::Quit => {}
    }

    Ok(())
}

fn is_fatal(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| cause.is::<rand_core::Error>())
}
