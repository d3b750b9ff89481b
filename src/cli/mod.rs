//! CLI adapter for geoplay
//!
//! Exposes the engine through one-shot subcommands and an interactive
//! `shell`. Depends on `core/` only.
//!
//! # Architecture
//!
//! ```text
//!              +------------------+
//!              |     core/        |
//!              |  (playground,    |
//!              |   session, ...)  |
//!              +--------+---------+
//!                       |
//!                       v
//!              +------------------+
//!              |      cli/        |
//!              | (clap adapter,   |
//!              |  shell)          |
//!              +------------------+
//! ```

pub mod commands;
pub mod header;
pub mod output;

use crate::core::config::{LogFormat, LoggingConfig};
use crate::core::language::Language;
use crate::core::theme::Theme;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// geoplay - geocoding engine playground
///
/// Forward and reverse geocoding, postcode and building number lookups,
/// administrative hierarchy and country detection over a local dataset.
#[derive(Parser, Debug)]
#[command(name = "geoplay")]
#[command(version)]
#[command(about = "Geocoding engine playground", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,

    /// Display language (en, ar)
    #[arg(long, global = true)]
    pub lang: Option<Language>,

    /// Force the theme for this run (light, dark)
    #[arg(long, global = true, env = "GEOPLAY_THEME")]
    pub theme: Option<Theme>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for scripting
    Json,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the engine and show the session status
    Status(commands::StatusArgs),

    /// Forward geocode free text
    Geocode(commands::GeocodeArgs),

    /// Type-ahead suggestions for a partial query
    Suggest(commands::SuggestArgs),

    /// Addresses near a point, nearest first
    Reverse(commands::ReverseArgs),

    /// Addresses with a postcode
    Postcode(commands::PostcodeArgs),

    /// Addresses with a building number
    Number(commands::NumberArgs),

    /// District, governorate and region at a point
    Admin(commands::PointArgs),

    /// Country containing a point
    Country(commands::PointArgs),

    /// List postcodes known to the dataset
    Postcodes(commands::PostcodesArgs),

    /// List dataset tiles
    Tiles(commands::TilesArgs),

    /// Show, set or toggle the light/dark theme
    Theme(commands::ThemeArgs),

    /// Show current configuration
    #[command(name = "show-config")]
    ShowConfig(commands::ConfigArgs),

    /// Show version and directory information
    Info(commands::InfoArgs),

    /// Interactive playground reading commands from stdin
    Shell(commands::ShellArgs),

    /// Generate shell completion scripts
    ///
    /// Output completion script to stdout. To install:
    ///
    ///   bash:  geoplay completions bash > ~/.local/share/bash-completion/completions/geoplay
    ///   zsh:   geoplay completions zsh > ~/.zfunc/_geoplay
    ///   fish:  geoplay completions fish > ~/.config/fish/completions/geoplay.fish
    Completions(commands::CompletionsArgs),
}

/// Log to stderr; stdout carries command output
///
/// `RUST_LOG` wins over the configured level.
pub fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_ansi(false);

    // A subscriber may already be installed (tests, embedding)
    let _ = match logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

/// Run the CLI with the provided arguments
pub async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    use crate::core::config::Config;
    use crate::core::services::Playground;
    use crate::core::xdg::XdgDirs;

    // Handle completions command early (doesn't need the playground)
    if let Commands::Completions(args) = cli.command {
        return commands::completions::execute(args);
    }

    // Initialize XDG directories
    let xdg = XdgDirs::new();
    xdg.ensure_dirs_exist()?;

    // Load configuration
    let config = Config::load_with_xdg(&xdg)?;
    init_logging(&config.logging);
    xdg.log_paths();
    config.log_config();

    let playground = Playground::new(config, cli.theme);
    if let Some(language) = cli.lang {
        playground.language.set_language(language);
    }

    let format = cli.format;
    match cli.command {
        Commands::Status(args) => commands::status::execute(args, &playground, format).await,
        Commands::Geocode(args) => commands::geocode::execute(args, &playground, format).await,
        Commands::Suggest(args) => commands::suggest::execute(args, &playground, format).await,
        Commands::Reverse(args) => commands::reverse::execute(args, &playground, format).await,
        Commands::Postcode(args) => {
            commands::lookup::execute_postcode(args, &playground, format).await
        }
        Commands::Number(args) => {
            commands::lookup::execute_number(args, &playground, format).await
        }
        Commands::Admin(args) => {
            commands::location::execute_admin(args, &playground, format).await
        }
        Commands::Country(args) => {
            commands::location::execute_country(args, &playground, format).await
        }
        Commands::Postcodes(args) => {
            commands::dataset::execute_postcodes(args, &playground, format).await
        }
        Commands::Tiles(args) => {
            commands::dataset::execute_tiles(args, &playground, format).await
        }
        Commands::Theme(args) => commands::theme::execute(args, &playground, format).await,
        Commands::ShowConfig(args) => commands::config::execute(args, &playground, format).await,
        Commands::Info(args) => commands::info::execute(args, &playground, &xdg, format).await,
        Commands::Shell(args) => commands::shell::execute(args, &playground, format).await,
        Commands::Completions(_) => unreachable!(), // Handled above
    }
}
