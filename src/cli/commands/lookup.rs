//! Postcode and building number lookups

use crate::cli::commands::{acquire_engine, print_result_list};
use crate::cli::OutputFormat;
use crate::core::services::Playground;
use crate::core::types::{BBox, NumberSearchOptions, PostcodeSearchOptions};
use clap::Args;
use std::time::Instant;

/// Arguments for the postcode command
#[derive(Args, Debug)]
pub struct PostcodeArgs {
    /// Postcode to look up
    pub postcode: String,

    /// Narrow to a building number
    #[arg(long, short = 'n')]
    pub number: Option<String>,

    /// Maximum number of results
    #[arg(long, short = 'k')]
    pub limit: Option<usize>,
}

/// Arguments for the number command
#[derive(Args, Debug)]
pub struct NumberArgs {
    /// Building number to look up
    pub number: String,

    /// Only addresses in this region
    #[arg(long, short = 'r')]
    pub region: Option<String>,

    /// Only addresses inside min_lon,min_lat,max_lon,max_lat
    #[arg(long, allow_hyphen_values = true)]
    pub bbox: Option<BBox>,

    /// Maximum number of results
    #[arg(long, short = 'k')]
    pub limit: Option<usize>,
}

/// Execute the postcode command
pub async fn execute_postcode(
    args: PostcodeArgs,
    playground: &Playground,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = acquire_engine(playground, format).await?;

    let options = PostcodeSearchOptions {
        limit: Some(playground.config.clamp_limit(args.limit)),
        number: args.number.clone(),
    };

    let started = Instant::now();
    let results = engine.search_by_postcode(&args.postcode, &options).await?;
    let query = match &args.number {
        Some(number) => format!("{} #{}", args.postcode, number),
        None => args.postcode,
    };
    print_result_list(playground, query, results, started, format)
}

/// Execute the number command
pub async fn execute_number(
    args: NumberArgs,
    playground: &Playground,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = acquire_engine(playground, format).await?;

    let options = NumberSearchOptions {
        limit: Some(playground.config.clamp_limit(args.limit)),
        region: args.region,
        bbox: args.bbox,
    };

    let started = Instant::now();
    let results = engine.search_by_number(&args.number, &options).await?;
    print_result_list(playground, args.number, results, started, format)
}
