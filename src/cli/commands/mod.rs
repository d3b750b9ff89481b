//! CLI command implementations
//!
//! Each command module handles argument parsing and execution for a
//! specific CLI command. Engine commands acquire the shared session
//! first and stop with the failure hint when it is in `error`.

pub mod completions;
pub mod config;
pub mod dataset;
pub mod geocode;
pub mod info;
pub mod location;
pub mod lookup;
pub mod reverse;
pub mod shell;
pub mod status;
pub mod suggest;
pub mod theme;

// Re-export argument types for use in mod.rs
pub use completions::CompletionsArgs;
pub use config::ConfigArgs;
pub use dataset::{PostcodesArgs, TilesArgs};
pub use geocode::GeocodeArgs;
pub use info::InfoArgs;
pub use location::PointArgs;
pub use lookup::{NumberArgs, PostcodeArgs};
pub use reverse::ReverseArgs;
pub use shell::ShellArgs;
pub use status::StatusArgs;
pub use suggest::SuggestArgs;
pub use theme::ThemeArgs;

use crate::cli::header;
use crate::cli::output::{colors, format_duration, print_results};
use crate::cli::OutputFormat;
use crate::core::engine::GeoEngine;
use crate::core::services::Playground;
use crate::core::types::GeocodingResult;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Acquire the shared engine, printing the header in human mode
pub async fn acquire_engine(
    playground: &Playground,
    format: OutputFormat,
) -> Result<Arc<dyn GeoEngine>, Box<dyn std::error::Error>> {
    let state = playground.session.acquire().await;
    if format == OutputFormat::Human {
        println!("{}\n", header::render(playground));
    }

    if let Some(hint) = header::failure_hint(&state) {
        return Err(hint.into());
    }
    Ok(playground.session.engine()?)
}

/// Result list response
#[derive(Debug, Serialize)]
pub struct ResultsOutput {
    pub query: String,
    pub language: String,
    pub count: usize,
    pub took_ms: u64,
    pub results: Vec<GeocodingResult>,
}

/// Print a result list in the requested format
pub fn print_result_list(
    playground: &Playground,
    query: String,
    results: Vec<GeocodingResult>,
    started: Instant,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let elapsed = started.elapsed();
    let language = playground.language.language();

    match format {
        OutputFormat::Human => {
            if results.is_empty() {
                println!("No results for {}", colors::label(&query));
            } else {
                println!(
                    "{} result(s) for {} {}\n",
                    colors::number(&results.len().to_string()),
                    colors::label(&query),
                    colors::dim(&format!("in {}", format_duration(elapsed.as_secs_f64())))
                );
                print_results(&results, language);
            }
        }
        OutputFormat::Json => {
            let output = ResultsOutput {
                query,
                language: language.to_string(),
                count: results.len(),
                took_ms: elapsed.as_millis() as u64,
                results,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
