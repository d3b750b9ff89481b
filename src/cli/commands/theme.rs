//! Theme command - show, set or toggle light/dark
//!
//! `background` reports a terminal background change, for terminals that
//! signal it out of band (e.g. a shell hook on an OS appearance switch).

use crate::cli::output::colors;
use crate::cli::OutputFormat;
use crate::core::services::Playground;
use crate::core::theme::Theme;
use clap::{Args, Subcommand};
use serde::Serialize;

/// Arguments for the theme command
#[derive(Args, Debug)]
pub struct ThemeArgs {
    #[command(subcommand)]
    pub action: Option<ThemeAction>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ThemeAction {
    /// Show the active theme and where it comes from (default)
    Show,
    /// Save a theme preference
    Set {
        /// light or dark
        theme: Theme,
    },
    /// Switch between light and dark and save it
    Toggle,
    /// Report the terminal background; applies while nothing is saved
    Background {
        /// light or dark
        theme: Theme,
    },
}

#[derive(Debug, Serialize)]
pub struct ThemeOutput {
    pub theme: Theme,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persisted: Option<Theme>,
    pub preferences_file: String,
}

/// Execute the theme command
pub async fn execute(
    args: ThemeArgs,
    playground: &Playground,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = &playground.theme;
    let changed = match args.action.unwrap_or(ThemeAction::Show) {
        ThemeAction::Show => false,
        ThemeAction::Set { theme } => {
            store.set_theme(theme)?;
            true
        }
        ThemeAction::Toggle => {
            store.toggle_theme()?;
            true
        }
        ThemeAction::Background { theme } => {
            let before = store.theme();
            store.os_preference_changed(theme) != before
        }
    };

    let output = ThemeOutput {
        theme: store.theme(),
        persisted: store.persisted(),
        preferences_file: store.preferences_path().display().to_string(),
    };

    match format {
        OutputFormat::Human => {
            let theme = output.theme;
            if changed {
                println!("Theme set to {}", colors::accent(theme.as_str(), theme));
            } else {
                println!("Theme: {}", colors::accent(theme.as_str(), theme));
            }
            match output.persisted {
                Some(saved) => println!("  saved: {saved}"),
                None => println!("  saved: {}", colors::dim("none")),
            }
            println!("  file: {}", colors::dim(&output.preferences_file));
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
