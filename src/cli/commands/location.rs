//! Admin and country commands - what contains a point

use crate::cli::commands::acquire_engine;
use crate::cli::output::colors;
use crate::cli::OutputFormat;
use crate::core::language::Language;
use crate::core::services::Playground;
use crate::core::types::{AdminHierarchy, AdminUnit, CountryDetection};
use clap::Args;
use serde::Serialize;

/// A point on the map
#[derive(Args, Debug)]
pub struct PointArgs {
    /// Latitude in degrees
    #[arg(allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude in degrees
    #[arg(allow_hyphen_values = true)]
    pub lon: f64,
}

#[derive(Debug, Serialize)]
pub struct AdminOutput {
    pub lat: f64,
    pub lon: f64,
    pub hierarchy: AdminHierarchy,
}

#[derive(Debug, Serialize)]
pub struct CountryOutput {
    pub lat: f64,
    pub lon: f64,
    pub in_country: bool,
    pub country: Option<CountryDetection>,
}

fn unit_name(unit: &AdminUnit, language: Language) -> &str {
    match language {
        Language::En => &unit.name_en,
        Language::Ar => &unit.name_ar,
    }
}

/// Execute the admin command
pub async fn execute_admin(
    args: PointArgs,
    playground: &Playground,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = acquire_engine(playground, format).await?;
    let hierarchy = engine.admin_hierarchy(args.lat, args.lon).await?;

    match format {
        OutputFormat::Human => {
            if hierarchy.is_empty() {
                println!("No administrative units near {}, {}", args.lat, args.lon);
                return Ok(());
            }
            let language = playground.language.language();
            let levels = [
                ("District", &hierarchy.district),
                ("Governorate", &hierarchy.governorate),
                ("Region", &hierarchy.region),
            ];
            for (label, unit) in levels {
                if let Some(unit) = unit {
                    println!("{:<12} {}", colors::label(label), unit_name(unit, language));
                }
            }
        }
        OutputFormat::Json => {
            let output = AdminOutput {
                lat: args.lat,
                lon: args.lon,
                hierarchy,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Execute the country command
pub async fn execute_country(
    args: PointArgs,
    playground: &Playground,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = acquire_engine(playground, format).await?;
    let country = engine.detect_country(args.lat, args.lon).await?;

    match format {
        OutputFormat::Human => match &country {
            Some(country) => {
                let name = match playground.language.language() {
                    Language::En => &country.name_en,
                    Language::Ar => &country.name_ar,
                };
                println!(
                    "{} ({} / {}), {}",
                    colors::label(name),
                    country.iso_a2,
                    country.iso_a3,
                    colors::dim(&country.continent)
                );
            }
            None => println!("No country found at {}, {}", args.lat, args.lon),
        },
        OutputFormat::Json => {
            let output = CountryOutput {
                lat: args.lat,
                lon: args.lon,
                in_country: country.is_some(),
                country,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
