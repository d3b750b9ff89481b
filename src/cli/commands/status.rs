//! Status command - initialize the engine and show the session

use crate::cli::header::{self, HeaderView};
use crate::cli::output::colors;
use crate::cli::OutputFormat;
use crate::core::services::Playground;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Report the current state without starting initialization
    #[arg(long)]
    pub no_acquire: bool,
}

/// Execute the status command
pub async fn execute(
    args: StatusArgs,
    playground: &Playground,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = if args.no_acquire {
        playground.session.current_state()
    } else {
        playground.session.acquire().await
    };

    match format {
        OutputFormat::Human => {
            println!("{}", header::render(playground));
            println!(
                "  dataset: {}",
                colors::dim(&playground.session.options().dataset_dir.display().to_string())
            );
            if let Some(hint) = header::failure_hint(&state) {
                println!("\n{}: {}", colors::error("Error"), hint);
            }
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&HeaderView::capture(playground))?
            );
        }
    }

    Ok(())
}
