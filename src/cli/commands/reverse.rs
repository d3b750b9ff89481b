//! Reverse command - addresses near a point

use crate::cli::commands::{acquire_engine, print_result_list};
use crate::cli::OutputFormat;
use crate::core::services::Playground;
use crate::core::types::{DetailLevel, ReverseGeocodeOptions};
use clap::Args;
use std::time::Instant;

/// Arguments for the reverse command
#[derive(Args, Debug)]
pub struct ReverseArgs {
    /// Latitude in degrees
    #[arg(allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude in degrees
    #[arg(allow_hyphen_values = true)]
    pub lon: f64,

    /// Maximum number of results
    #[arg(long, short = 'k')]
    pub limit: Option<usize>,

    /// Search radius in meters (default from config)
    #[arg(long)]
    pub radius: Option<f64>,

    /// Fields to keep: minimal, postcode, region, full
    #[arg(long, default_value = "full")]
    pub detail: DetailLevel,

    /// Also search tiles touching the radius
    #[arg(long)]
    pub neighbors: bool,
}

/// Execute the reverse command
pub async fn execute(
    args: ReverseArgs,
    playground: &Playground,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = acquire_engine(playground, format).await?;

    let options = ReverseGeocodeOptions {
        limit: Some(playground.config.clamp_limit(args.limit)),
        radius_meters: Some(
            args.radius
                .unwrap_or(playground.config.search.default_radius_m),
        ),
        detail_level: args.detail,
        include_neighbors: args.neighbors,
    };

    let started = Instant::now();
    let results = engine
        .reverse_geocode(args.lat, args.lon, &options)
        .await?;
    let query = format!("{}, {}", args.lat, args.lon);
    print_result_list(playground, query, results, started, format)
}
