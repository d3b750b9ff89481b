//! Suggest command - type-ahead completions for a partial query

use crate::cli::commands::acquire_engine;
use crate::cli::output::{colors, format_duration};
use crate::cli::OutputFormat;
use crate::core::services::Playground;
use crate::core::types::{AutocompleteOptions, BBox, SuggestionKind};
use clap::Args;
use serde::Serialize;
use std::time::Instant;

/// Arguments for the suggest command
#[derive(Args, Debug)]
pub struct SuggestArgs {
    /// Partial query: digits complete postcodes, words complete districts
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,

    /// Maximum number of suggestions
    #[arg(long, short = 'k')]
    pub limit: Option<usize>,

    /// Only suggestions inside min_lon,min_lat,max_lon,max_lat
    #[arg(long, allow_hyphen_values = true)]
    pub bbox: Option<BBox>,

    /// Only suggestions in this region (repeatable)
    #[arg(long = "region", short = 'r')]
    pub regions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SuggestOutput {
    pub query: String,
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub took_ms: u64,
    pub suggestions: Vec<String>,
}

/// Execute the suggest command
pub async fn execute(
    args: SuggestArgs,
    playground: &Playground,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = acquire_engine(playground, format).await?;

    let query = args.query.join(" ");
    let options = AutocompleteOptions {
        limit: Some(playground.config.clamp_limit(args.limit)),
        bbox: args.bbox,
        regions: args.regions,
    };

    let started = Instant::now();
    let result = engine.autocomplete(&query, &options).await?;
    let elapsed = started.elapsed();

    match format {
        OutputFormat::Human => {
            if result.suggestions.is_empty() {
                println!("No suggestions for {}", colors::label(&query));
                return Ok(());
            }
            println!(
                "{} {} suggestion(s) for {} {}\n",
                colors::number(&result.suggestions.len().to_string()),
                result.kind,
                colors::label(&query),
                colors::dim(&format!("in {}", format_duration(elapsed.as_secs_f64())))
            );
            for suggestion in &result.suggestions {
                println!("  {suggestion}");
            }
        }
        OutputFormat::Json => {
            let output = SuggestOutput {
                query,
                kind: result.kind,
                took_ms: elapsed.as_millis() as u64,
                suggestions: result.suggestions,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
