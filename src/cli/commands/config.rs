//! Config command - show current configuration

use crate::cli::OutputFormat;
use crate::core::services::Playground;
use clap::Args;

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Print as TOML, ready to save as config.toml
    #[arg(long)]
    pub toml: bool,
}

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    playground: &Playground,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = playground.config.as_ref();

    if args.toml {
        print!("{}", toml::to_string_pretty(config)?);
        return Ok(());
    }

    match format {
        OutputFormat::Human => {
            println!("Configuration:");
            println!("  engine:");
            println!("    dataset_dir: {}", config.engine.dataset_dir.display());
            println!("    debug: {}", config.engine.debug);
            println!("    log_level: {}", config.engine.log_level);
            println!("    full_text: {}", config.engine.full_text);
            println!("  search:");
            println!("    default_limit: {}", config.search.default_limit);
            println!("    max_limit: {}", config.search.max_limit);
            println!("    default_radius_m: {}", config.search.default_radius_m);
            println!("  ui:");
            println!("    language: {}", config.ui.language);
            println!("  logging:");
            println!("    level: {}", config.logging.level);
            println!("    format: {:?}", config.logging.format);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
    }

    Ok(())
}
