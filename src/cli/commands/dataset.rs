//! Postcodes and tiles commands - browse the dataset manifest

use crate::cli::commands::acquire_engine;
use crate::cli::output::colors;
use crate::cli::OutputFormat;
use crate::core::services::Playground;
use crate::core::types::{BBox, PostcodeInfo, TileInfo};
use clap::Args;
use serde::Serialize;

/// Arguments for the postcodes command
#[derive(Args, Debug)]
pub struct PostcodesArgs {
    /// Only postcodes starting with this prefix
    pub prefix: Option<String>,

    /// Maximum number of postcodes to print
    #[arg(long, short = 'k', default_value = "50")]
    pub limit: usize,
}

/// Arguments for the tiles command
#[derive(Args, Debug)]
pub struct TilesArgs {
    /// Only tiles intersecting min_lon,min_lat,max_lon,max_lat
    #[arg(long, allow_hyphen_values = true)]
    pub bbox: Option<BBox>,

    /// Only tiles in this region, English or Arabic name
    #[arg(long, short = 'r')]
    pub region: Option<String>,

    /// Only tiles currently held in memory
    #[arg(long)]
    pub loaded: bool,
}

#[derive(Debug, Serialize)]
pub struct PostcodesOutput {
    pub total: usize,
    pub postcodes: Vec<PostcodeInfo>,
}

#[derive(Debug, Serialize)]
pub struct TileItem {
    #[serde(flatten)]
    pub tile: TileInfo,
    pub loaded: bool,
}

#[derive(Debug, Serialize)]
pub struct TilesOutput {
    pub count: usize,
    pub tiles: Vec<TileItem>,
}

/// Execute the postcodes command
pub async fn execute_postcodes(
    args: PostcodesArgs,
    playground: &Playground,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = acquire_engine(playground, format).await?;
    let mut postcodes = engine.postcodes(args.prefix.as_deref());
    let total = postcodes.len();
    postcodes.truncate(args.limit);

    match format {
        OutputFormat::Human => {
            if postcodes.is_empty() {
                println!("No postcodes found");
                return Ok(());
            }
            let language = playground.language.language();
            for info in &postcodes {
                let region = language
                    .pick(info.region_en.as_deref(), info.region_ar.as_deref())
                    .unwrap_or("");
                println!(
                    "{:<8} {:>7} addresses  {}",
                    colors::label(&info.postcode),
                    colors::number(&info.addr_count.to_string()),
                    colors::dim(region)
                );
            }
            if total > postcodes.len() {
                println!("... {} more", total - postcodes.len());
            }
        }
        OutputFormat::Json => {
            let output = PostcodesOutput { total, postcodes };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Execute the tiles command
pub async fn execute_tiles(
    args: TilesArgs,
    playground: &Playground,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = acquire_engine(playground, format).await?;

    let loaded = engine.loaded_tiles();
    let wanted = args.bbox.map(|bbox| engine.tiles_for_bbox(&bbox));
    let candidates = match &args.region {
        Some(region) => engine.tiles_by_region(region),
        None => engine.tiles(),
    };
    let tiles: Vec<TileItem> = candidates
        .into_iter()
        .filter(|tile| wanted.as_ref().map_or(true, |ids| ids.contains(&tile.tile_id)))
        .map(|tile| TileItem {
            loaded: loaded.contains(&tile.tile_id),
            tile,
        })
        .filter(|item| !args.loaded || item.loaded)
        .collect();

    match format {
        OutputFormat::Human => {
            if tiles.is_empty() {
                println!("No tiles found");
                return Ok(());
            }
            for item in &tiles {
                let t = &item.tile;
                println!(
                    "{} {:>7} addresses {:>6} KB  [{:.3},{:.3} .. {:.3},{:.3}]{}",
                    colors::label(&t.tile_id),
                    colors::number(&t.addr_count.to_string()),
                    t.file_size_kb,
                    t.min_lat,
                    t.min_lon,
                    t.max_lat,
                    t.max_lon,
                    if item.loaded {
                        format!(" {}", colors::success("loaded"))
                    } else {
                        String::new()
                    }
                );
            }
        }
        OutputFormat::Json => {
            let output = TilesOutput {
                count: tiles.len(),
                tiles,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
