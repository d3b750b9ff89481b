//! Info command - show version and directory information

use crate::cli::output::print_warning;
use crate::cli::OutputFormat;
use crate::core::services::Playground;
use crate::core::xdg::XdgDirs;
use clap::Args;
use serde::Serialize;

/// Arguments for the info command
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Also initialize the engine and report its search mode
    #[arg(long, short = 'd')]
    pub detailed: bool,
}

/// Playground information response
#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub name: String,
    pub version: String,
    pub config_file: String,
    pub dataset_dir: String,
    pub preferences_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_mode: Option<String>,
}

/// Execute the info command
pub async fn execute(
    args: InfoArgs,
    playground: &Playground,
    xdg: &XdgDirs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let search_mode = if args.detailed {
        let state = playground.session.acquire().await;
        Some(
            state
                .search_mode
                .map(|m| m.to_string())
                .unwrap_or_else(|| state.status.to_string()),
        )
    } else {
        None
    };

    let info = InfoResponse {
        name: "geoplay".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        config_file: xdg.config_file().display().to_string(),
        dataset_dir: playground.config.engine.dataset_dir.display().to_string(),
        preferences_file: xdg.preferences_file().display().to_string(),
        search_mode,
    };

    match format {
        OutputFormat::Human => {
            println!("geoplay {}", info.version);
            println!("Config: {}", info.config_file);
            println!("Dataset: {}", info.dataset_dir);
            println!("Preferences: {}", info.preferences_file);
            if let Some(mode) = &info.search_mode {
                println!("Search mode: {mode}");
            }
            if !playground.config.engine.dataset_dir.exists() {
                print_warning("dataset directory does not exist");
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
    }

    Ok(())
}
