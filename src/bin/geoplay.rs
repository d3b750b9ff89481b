//! geoplay - terminal playground for a geocoding engine
//!
//! # Examples
//!
//! ```bash
//! # Initialize the engine and show its status
//! geoplay status
//!
//! # Forward geocoding, Arabic display
//! geoplay --lang ar geocode king fahd road --limit 5
//!
//! # Reverse geocoding within 250 m
//! geoplay reverse 24.7136 46.6753 --radius 250
//!
//! # Interactive session
//! geoplay shell
//! ```

use clap::Parser;
use geoplay::cli::{run, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
