//! Core data types for the geocoding engine contract.
//!
//! These are the values exchanged between the playground and a
//! `GeoEngine`: engine options, stats, query options and results.
//! Field names follow the engine's wire names so datasets and JSON
//! output share one vocabulary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Engine log verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    None,
}

impl LogLevel {
    /// Whether a message at `level` passes this threshold
    pub fn allows(self, level: LogLevel) -> bool {
        self != LogLevel::None && level != LogLevel::None && level >= self
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::None => "none",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "none" | "off" => Ok(LogLevel::None),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

/// Options handed to `EngineFactory::construct`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineOptions {
    pub debug: bool,
    pub log_level: LogLevel,
    pub dataset_dir: PathBuf,
    /// Prefer BM25 full-text search when the engine supports it
    pub full_text: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            debug: true,
            log_level: LogLevel::Debug,
            dataset_dir: PathBuf::from("./dataset"),
            full_text: true,
        }
    }
}

/// Search capability reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchMode {
    #[serde(rename = "fts-bm25")]
    FtsBm25,
    #[serde(rename = "jaccard")]
    Jaccard,
}

impl SearchMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchMode::FtsBm25 => "fts-bm25",
            SearchMode::Jaccard => "jaccard",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine-reported summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    pub total_tiles: usize,
    pub total_addresses: usize,
    pub total_size_kb: u64,
    pub tiles_loaded: usize,
}

/// Bounding box in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BBox {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }

    pub fn intersects(&self, other: &BBox) -> bool {
        self.min_lon <= other.max_lon
            && self.max_lon >= other.min_lon
            && self.min_lat <= other.max_lat
            && self.max_lat >= other.min_lat
    }
}

impl FromStr for BBox {
    type Err = String;

    /// Parses `min_lon,min_lat,max_lon,max_lat`
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parts: Vec<f64> = s
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| format!("invalid bbox '{s}': {e}"))?;

        if parts.len() != 4 {
            return Err(format!(
                "invalid bbox '{s}': expected min_lon,min_lat,max_lon,max_lat"
            ));
        }
        if parts[0] > parts[2] || parts[1] > parts[3] {
            return Err(format!("invalid bbox '{s}': min exceeds max"));
        }

        Ok(BBox::new(parts[0], parts[1], parts[2], parts[3]))
    }
}

/// A single geocoding hit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeocodingResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addr_id: Option<u64>,
    pub longitude: f64,
    pub latitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_address_ar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_address_en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district_ar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district_en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gov_ar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gov_en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_ar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
}

/// Forward geocoding options
#[derive(Debug, Clone, Default)]
pub struct GeocodeOptions {
    pub limit: Option<usize>,
    pub bbox: Option<BBox>,
    pub regions: Vec<String>,
}

/// How much of each reverse geocoding hit to keep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    Minimal,
    Postcode,
    Region,
    #[default]
    Full,
}

impl FromStr for DetailLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "minimal" => Ok(DetailLevel::Minimal),
            "postcode" => Ok(DetailLevel::Postcode),
            "region" => Ok(DetailLevel::Region),
            "full" => Ok(DetailLevel::Full),
            other => Err(format!("unknown detail level '{other}'")),
        }
    }
}

/// Reverse geocoding options
#[derive(Debug, Clone, Default)]
pub struct ReverseGeocodeOptions {
    pub limit: Option<usize>,
    pub radius_meters: Option<f64>,
    pub detail_level: DetailLevel,
    pub include_neighbors: bool,
}

/// Postcode lookup options
#[derive(Debug, Clone, Default)]
pub struct PostcodeSearchOptions {
    pub limit: Option<usize>,
    pub number: Option<String>,
}

/// Building number lookup options
#[derive(Debug, Clone, Default)]
pub struct NumberSearchOptions {
    pub limit: Option<usize>,
    pub region: Option<String>,
    pub bbox: Option<BBox>,
}

/// Autocomplete options; filters match `GeocodeOptions`
#[derive(Debug, Clone, Default)]
pub struct AutocompleteOptions {
    pub limit: Option<usize>,
    pub bbox: Option<BBox>,
    pub regions: Vec<String>,
}

/// What an autocomplete query was taken to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    District,
    Postcode,
    General,
}

impl SuggestionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SuggestionKind::District => "district",
            SuggestionKind::Postcode => "postcode",
            SuggestionKind::General => "general",
        }
    }
}

impl fmt::Display for SuggestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutocompleteSuggestions {
    pub suggestions: Vec<String>,
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
}

/// A bilingual administrative unit name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUnit {
    pub name_ar: String,
    pub name_en: String,
}

/// District / governorate / region containing a point
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminHierarchy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<AdminUnit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub governorate: Option<AdminUnit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<AdminUnit>,
}

impl AdminHierarchy {
    pub fn is_empty(&self) -> bool {
        self.district.is_none() && self.governorate.is_none() && self.region.is_none()
    }
}

/// Country containing a point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryDetection {
    pub iso_a3: String,
    pub iso_a2: String,
    pub name_en: String,
    pub name_ar: String,
    pub continent: String,
}

/// Postcode summary from the tile manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostcodeInfo {
    pub postcode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_ar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_en: Option<String>,
    pub addr_count: usize,
    pub tiles: Vec<String>,
}

/// Tile summary from the tile manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileInfo {
    pub tile_id: String,
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
    pub addr_count: usize,
    pub file_size_kb: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_ar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_en: Option<String>,
}

impl TileInfo {
    pub fn bbox(&self) -> BBox {
        BBox::new(self.min_lon, self.min_lat, self.max_lon, self.max_lat)
    }

    /// Case-insensitive match against either region name
    pub fn in_region(&self, region: &str) -> bool {
        let wanted = region.trim().to_lowercase();
        [&self.region_en, &self.region_ar]
            .iter()
            .filter_map(|r| r.as_deref())
            .any(|r| r.to_lowercase() == wanted)
    }
}
