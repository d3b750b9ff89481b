//! Geocode command - forward geocoding of free text

use crate::cli::commands::{acquire_engine, print_result_list};
use crate::cli::OutputFormat;
use crate::core::services::Playground;
use crate::core::types::{BBox, GeocodeOptions};
use clap::Args;
use std::time::Instant;

/// Arguments for the geocode command
#[derive(Args, Debug)]
pub struct GeocodeArgs {
    /// Address text, English or Arabic
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,

    /// Maximum number of results
    #[arg(long, short = 'k')]
    pub limit: Option<usize>,

    /// Only results inside min_lon,min_lat,max_lon,max_lat
    #[arg(long, allow_hyphen_values = true)]
    pub bbox: Option<BBox>,

    /// Only results in this region (repeatable)
    #[arg(long = "region", short = 'r')]
    pub regions: Vec<String>,
}

/// Execute the geocode command
pub async fn execute(
    args: GeocodeArgs,
    playground: &Playground,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = acquire_engine(playground, format).await?;

    let query = args.query.join(" ");
    let options = GeocodeOptions {
        limit: Some(playground.config.clamp_limit(args.limit)),
        bbox: args.bbox,
        regions: args.regions,
    };

    let started = Instant::now();
    let results = engine.geocode(&query, &options).await?;
    print_result_list(playground, query, results, started, format)
}
