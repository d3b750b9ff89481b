//! Geocoding engine contract.
//!
//! The playground treats the engine as an opaque, fallible,
//! asynchronous dependency. `EngineFactory` builds an instance from
//! `EngineOptions`; the lifecycle manager then calls `initialize`,
//! `stats` and `search_mode` before handing the shared instance to
//! consumers, who only use the `&self` query methods.
//!
//! # Implementations
//!
//! - **LocalEngine**: dataset directory with a tile manifest and
//!   lazily-loaded tiles, BM25 (tantivy) or token Jaccard search

mod dataset;
mod geo;
mod local;
mod text;

pub use dataset::{AddressRecord, CountryRecord, Manifest, MANIFEST_FILE, TILES_DIR};
pub use geo::{haversine_m, radius_bbox, valid_coordinates};
pub use local::{LocalEngine, LocalEngineFactory};
pub use text::{jaccard, tokenize};

use crate::core::error::Result;
use crate::core::types::{
    AdminHierarchy, AutocompleteOptions, AutocompleteSuggestions, BBox, CountryDetection,
    EngineOptions, EngineStats, GeocodeOptions, GeocodingResult, LogLevel, NumberSearchOptions,
    PostcodeInfo, PostcodeSearchOptions, ReverseGeocodeOptions, SearchMode, TileInfo,
};
use async_trait::async_trait;
use std::sync::Arc;

/// A geocoding engine instance
#[async_trait]
pub trait GeoEngine: Send + Sync {
    /// Prepare the engine for queries
    async fn initialize(&self) -> Result<()>;

    /// Release resources; queries fail afterwards
    async fn close(&self) -> Result<()>;

    async fn stats(&self) -> Result<EngineStats>;

    fn search_mode(&self) -> SearchMode;

    fn is_full_text_available(&self) -> bool {
        self.search_mode() == SearchMode::FtsBm25
    }

    /// Turn engine debug output on or off; `None` keeps the level
    fn set_debug(&self, enabled: bool, level: Option<LogLevel>);

    /// Drop every loaded tile; they load again on next use
    fn clear_cache(&self);

    /// Forward geocoding of free text
    async fn geocode(&self, query: &str, options: &GeocodeOptions)
        -> Result<Vec<GeocodingResult>>;

    /// Completions for a partial query, classified by what it looks like
    async fn autocomplete(
        &self,
        query: &str,
        options: &AutocompleteOptions,
    ) -> Result<AutocompleteSuggestions>;

    /// Addresses near a point, nearest first
    async fn reverse_geocode(
        &self,
        lat: f64,
        lon: f64,
        options: &ReverseGeocodeOptions,
    ) -> Result<Vec<GeocodingResult>>;

    async fn search_by_postcode(
        &self,
        postcode: &str,
        options: &PostcodeSearchOptions,
    ) -> Result<Vec<GeocodingResult>>;

    async fn search_by_number(
        &self,
        number: &str,
        options: &NumberSearchOptions,
    ) -> Result<Vec<GeocodingResult>>;

    async fn admin_hierarchy(&self, lat: f64, lon: f64) -> Result<AdminHierarchy>;

    async fn detect_country(&self, lat: f64, lon: f64) -> Result<Option<CountryDetection>>;

    /// Whether the point lies in the dataset's country
    async fn is_in_country(&self, lat: f64, lon: f64) -> Result<bool> {
        Ok(self.detect_country(lat, lon).await?.is_some())
    }

    /// Postcodes starting with `prefix` (all when `None`)
    fn postcodes(&self, prefix: Option<&str>) -> Vec<PostcodeInfo>;

    fn tiles(&self) -> Vec<TileInfo>;

    /// Tiles whose region name (either language) matches
    fn tiles_by_region(&self, region: &str) -> Vec<TileInfo>;

    /// Ids of tiles currently held in memory
    fn loaded_tiles(&self) -> Vec<String>;

    fn tiles_for_bbox(&self, bbox: &BBox) -> Vec<String>;
}

/// Builds engine instances
#[async_trait]
pub trait EngineFactory: Send + Sync {
    async fn construct(&self, options: &EngineOptions) -> Result<Arc<dyn GeoEngine>>;
}
