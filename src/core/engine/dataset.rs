//! On-disk dataset layout for the local engine.
//!
//! ```text
//! {dataset_dir}/
//! ├── manifest.json          # country, tile and postcode summaries
//! └── tiles/
//!     ├── {tile_id}.json     # array of address records
//!     └── ...
//! ```

use crate::core::error::{GeoError, Result};
use crate::core::types::{BBox, CountryDetection, GeocodingResult, PostcodeInfo, TileInfo};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

pub const MANIFEST_FILE: &str = "manifest.json";
pub const TILES_DIR: &str = "tiles";

/// Country covered by the dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryRecord {
    pub iso_a3: String,
    pub iso_a2: String,
    pub name_en: String,
    pub name_ar: String,
    pub continent: String,
    pub bbox: BBox,
}

impl CountryRecord {
    pub fn detection(&self) -> CountryDetection {
        CountryDetection {
            iso_a3: self.iso_a3.clone(),
            iso_a2: self.iso_a2.clone(),
            name_en: self.name_en.clone(),
            name_ar: self.name_ar.clone(),
            continent: self.continent.clone(),
        }
    }
}

/// Dataset manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub country: Option<CountryRecord>,
    pub tiles: Vec<TileInfo>,
    #[serde(default)]
    pub postcodes: Vec<PostcodeInfo>,
}

impl Manifest {
    /// Parse and check a manifest document
    pub fn from_json(json: &str) -> Result<Self> {
        let manifest: Manifest = serde_json::from_str(json)
            .map_err(|e| GeoError::DatasetError(format!("Invalid manifest: {e}")))?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for tile in &self.tiles {
            if tile.tile_id.is_empty()
                || tile.tile_id.contains(['/', '\\'])
                || tile.tile_id.starts_with('.')
            {
                return Err(GeoError::DatasetError(format!(
                    "Invalid tile id '{}'",
                    tile.tile_id
                )));
            }
            if !seen.insert(tile.tile_id.as_str()) {
                return Err(GeoError::DatasetError(format!(
                    "Duplicate tile id '{}'",
                    tile.tile_id
                )));
            }
            if tile.min_lat > tile.max_lat || tile.min_lon > tile.max_lon {
                return Err(GeoError::DatasetError(format!(
                    "Tile '{}' has an inverted bounding box",
                    tile.tile_id
                )));
            }
        }

        for postcode in &self.postcodes {
            if let Some(missing) = postcode.tiles.iter().find(|t| !seen.contains(t.as_str())) {
                return Err(GeoError::DatasetError(format!(
                    "Postcode '{}' references unknown tile '{}'",
                    postcode.postcode, missing
                )));
            }
        }

        Ok(())
    }

    pub fn total_addresses(&self) -> usize {
        self.tiles.iter().map(|t| t.addr_count).sum()
    }

    pub fn total_size_kb(&self) -> u64 {
        self.tiles.iter().map(|t| t.file_size_kb).sum()
    }
}

/// One address row inside a tile file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddressRecord {
    #[serde(default)]
    pub addr_id: Option<u64>,
    pub longitude: f64,
    pub latitude: f64,
    #[serde(default)]
    pub full_address_ar: Option<String>,
    #[serde(default)]
    pub full_address_en: Option<String>,
    #[serde(default)]
    pub postcode: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub district_ar: Option<String>,
    #[serde(default)]
    pub district_en: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub gov_ar: Option<String>,
    #[serde(default)]
    pub gov_en: Option<String>,
    #[serde(default)]
    pub region_ar: Option<String>,
    #[serde(default)]
    pub region_en: Option<String>,
}

impl AddressRecord {
    /// Text the search index sees for this address
    pub fn search_text(&self) -> String {
        [
            &self.full_address_en,
            &self.full_address_ar,
            &self.street,
            &self.district_en,
            &self.district_ar,
            &self.city,
            &self.postcode,
            &self.number,
        ]
        .iter()
        .filter_map(|f| f.as_deref())
        .collect::<Vec<_>>()
        .join(" ")
    }

    pub fn to_result(&self) -> GeocodingResult {
        GeocodingResult {
            addr_id: self.addr_id,
            longitude: self.longitude,
            latitude: self.latitude,
            full_address_ar: self.full_address_ar.clone(),
            full_address_en: self.full_address_en.clone(),
            postcode: self.postcode.clone(),
            number: self.number.clone(),
            street: self.street.clone(),
            district_ar: self.district_ar.clone(),
            district_en: self.district_en.clone(),
            city: self.city.clone(),
            gov_ar: self.gov_ar.clone(),
            gov_en: self.gov_en.clone(),
            region_ar: self.region_ar.clone(),
            region_en: self.region_en.clone(),
            distance_m: None,
            similarity: None,
        }
    }
}

pub async fn read_manifest(dataset_dir: &Path) -> Result<Manifest> {
    let path = dataset_dir.join(MANIFEST_FILE);
    let json = tokio::fs::read_to_string(&path).await.map_err(|e| {
        GeoError::DatasetError(format!("Failed to read {}: {e}", path.display()))
    })?;
    Manifest::from_json(&json)
}

pub async fn read_tile(dataset_dir: &Path, tile_id: &str) -> Result<Vec<AddressRecord>> {
    let path = dataset_dir.join(TILES_DIR).join(format!("{tile_id}.json"));
    let json = match tokio::fs::read_to_string(&path).await {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(GeoError::TileNotFound(tile_id.to_string()))
        }
        Err(e) => return Err(e.into()),
    };
    serde_json::from_str(&json)
        .map_err(|e| GeoError::DatasetError(format!("Invalid tile '{tile_id}': {e}")))
}
