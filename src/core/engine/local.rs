//! Dataset-backed geocoding engine.
//!
//! `initialize` reads only the manifest. Tiles are read on first use
//! and stay cached until `clear_cache` or `close`; in full-text mode a
//! tile is added to the BM25 index before any query can see it. Every
//! address is addressed by a key of `(tile ordinal << 32) | row`.

use super::dataset::{read_manifest, read_tile, AddressRecord, Manifest};
use super::geo::{haversine_m, radius_bbox, valid_coordinates};
use super::text::{jaccard, tokenize, FullTextIndex};
use super::{EngineFactory, GeoEngine};
use crate::core::error::{GeoError, Result};
use crate::core::types::{
    AdminHierarchy, AdminUnit, AutocompleteOptions, AutocompleteSuggestions, BBox,
    CountryDetection, DetailLevel, EngineOptions, EngineStats, GeocodeOptions, GeocodingResult,
    LogLevel, NumberSearchOptions, PostcodeInfo, PostcodeSearchOptions, ReverseGeocodeOptions,
    SearchMode, SuggestionKind, TileInfo,
};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, RwLock};
use tokio::sync::OnceCell;

const DEFAULT_LIMIT: usize = 10;
const DEFAULT_SUGGESTIONS: usize = 5;
const DEFAULT_RADIUS_M: f64 = 500.0;
/// Nearest address used for the admin hierarchy must be this close
const ADMIN_RADIUS_M: f64 = 2_000.0;

type TileRows = Arc<Vec<AddressRecord>>;
/// Set once the tile is read and indexed; concurrent loaders wait on it
type TileSlot = Arc<OnceCell<TileRows>>;

#[derive(Debug, Clone, Copy)]
struct DebugSettings {
    enabled: bool,
    level: LogLevel,
}

/// Builds `LocalEngine`s
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalEngineFactory;

#[async_trait]
impl EngineFactory for LocalEngineFactory {
    async fn construct(&self, options: &EngineOptions) -> Result<Arc<dyn GeoEngine>> {
        Ok(Arc::new(LocalEngine::new(options.clone())?))
    }
}

pub struct LocalEngine {
    options: EngineOptions,
    debug: RwLock<DebugSettings>,
    manifest: OnceLock<Manifest>,
    tiles: RwLock<HashMap<String, TileSlot>>,
    full_text: Option<FullTextIndex>,
    closed: AtomicBool,
}

impl LocalEngine {
    pub fn new(options: EngineOptions) -> Result<Self> {
        let full_text = if options.full_text {
            Some(FullTextIndex::new()?)
        } else {
            None
        };

        let debug = DebugSettings {
            enabled: options.debug,
            level: options.log_level,
        };

        Ok(Self {
            options,
            debug: RwLock::new(debug),
            manifest: OnceLock::new(),
            tiles: RwLock::new(HashMap::new()),
            full_text,
            closed: AtomicBool::new(false),
        })
    }

    fn log(&self, level: LogLevel, message: &str) {
        let settings = *self.debug.read().unwrap_or_else(|e| e.into_inner());
        if !settings.enabled || !settings.level.allows(level) {
            return;
        }
        match level {
            LogLevel::Debug => tracing::debug!(target: "geoplay::engine", "{}", message),
            LogLevel::Info => tracing::info!(target: "geoplay::engine", "{}", message),
            LogLevel::Warn => tracing::warn!(target: "geoplay::engine", "{}", message),
            LogLevel::Error => tracing::error!(target: "geoplay::engine", "{}", message),
            LogLevel::None => {}
        }
    }

    fn ready(&self) -> Result<&Manifest> {
        if self.closed.load(Ordering::Acquire) {
            return Err(GeoError::EngineNotReady("closed".to_string()));
        }
        self.manifest
            .get()
            .ok_or_else(|| GeoError::EngineNotReady("not initialized".to_string()))
    }

    fn slot(&self, tile_id: &str) -> TileSlot {
        if let Some(slot) = self.tiles.read().unwrap_or_else(|e| e.into_inner()).get(tile_id) {
            return Arc::clone(slot);
        }
        let mut tiles = self.tiles.write().unwrap_or_else(|e| e.into_inner());
        Arc::clone(tiles.entry(tile_id.to_string()).or_default())
    }

    /// Load (or reuse) the given tiles, returning `(ordinal, rows)` pairs
    async fn load_tiles(
        &self,
        manifest: &Manifest,
        ordinals: &[usize],
    ) -> Result<Vec<(usize, TileRows)>> {
        let mut loaded = Vec::with_capacity(ordinals.len());

        for &ordinal in ordinals {
            let tile_id = &manifest.tiles[ordinal].tile_id;
            let slot = self.slot(tile_id);
            // A failed load leaves the slot empty for the next caller
            let rows = slot
                .get_or_try_init(|| self.read_and_index(ordinal, tile_id))
                .await?;
            loaded.push((ordinal, Arc::clone(rows)));
        }

        Ok(loaded)
    }

    async fn read_and_index(&self, ordinal: usize, tile_id: &str) -> Result<TileRows> {
        let rows = Arc::new(read_tile(&self.options.dataset_dir, tile_id).await?);
        if let Some(index) = &self.full_text {
            let docs = rows
                .iter()
                .enumerate()
                .map(|(row, record)| (encode_key(ordinal, row), record.search_text()));
            index.add(docs)?;
        }
        self.log(
            LogLevel::Debug,
            &format!("Loaded tile {} ({} addresses)", tile_id, rows.len()),
        );
        Ok(rows)
    }

    fn loaded_count(&self) -> usize {
        self.tiles
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }

    /// Tiles passing the geocode-style bbox and region filters
    fn query_ordinals(manifest: &Manifest, bbox: Option<&BBox>, regions: &[String]) -> Vec<usize> {
        Self::tile_ordinals(manifest, |tile| {
            bbox.map_or(true, |b| b.intersects(&tile.bbox()))
                && (regions.is_empty() || regions.iter().any(|r| tile.in_region(r)))
        })
    }

    fn tile_ordinals<F>(manifest: &Manifest, keep: F) -> Vec<usize>
    where
        F: Fn(&TileInfo) -> bool,
    {
        manifest
            .tiles
            .iter()
            .enumerate()
            .filter(|(_, tile)| keep(tile))
            .map(|(ordinal, _)| ordinal)
            .collect()
    }

    fn rank_full_text(
        &self,
        index: &FullTextIndex,
        query: &str,
        loaded: &[(usize, TileRows)],
        bbox: Option<&BBox>,
        limit: usize,
    ) -> Result<Vec<GeocodingResult>> {
        let rows_by_ordinal: HashMap<usize, &TileRows> =
            loaded.iter().map(|(ordinal, rows)| (*ordinal, rows)).collect();

        // Filters apply after ranking, so ask for every document
        let pool = (index.num_docs() as usize).max(limit);
        let hits = index.search(query, pool)?;
        let top_score = hits.first().map(|(_, s)| *s).unwrap_or(1.0).max(f32::EPSILON);

        let mut results = Vec::new();
        let mut seen = HashSet::new();
        for (key, score) in hits {
            // Tiles reloaded after `clear_cache` can leave a second copy
            if !seen.insert(key) {
                continue;
            }
            let (ordinal, row) = decode_key(key);
            let Some(record) = rows_by_ordinal.get(&ordinal).and_then(|rows| rows.get(row)) else {
                continue;
            };
            if bbox.is_some_and(|b| !b.contains(record.latitude, record.longitude)) {
                continue;
            }

            let mut result = record.to_result();
            result.similarity = Some(f64::from(score / top_score));
            results.push(result);
            if results.len() == limit {
                break;
            }
        }

        Ok(results)
    }

    fn rank_jaccard(
        query: &str,
        loaded: &[(usize, TileRows)],
        bbox: Option<&BBox>,
        limit: usize,
    ) -> Vec<GeocodingResult> {
        let query_tokens = tokenize(query);

        let mut scored: Vec<(f64, &AddressRecord)> = loaded
            .iter()
            .flat_map(|(_, rows)| rows.iter())
            .filter(|r| bbox.map_or(true, |b| b.contains(r.latitude, r.longitude)))
            .filter_map(|record| {
                let score = jaccard(&query_tokens, &tokenize(&record.search_text()));
                (score > 0.0).then_some((score, record))
            })
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        scored
            .into_iter()
            .take(limit)
            .map(|(score, record)| {
                let mut result = record.to_result();
                result.similarity = Some(score);
                result
            })
            .collect()
    }
}

#[async_trait]
impl GeoEngine for LocalEngine {
    async fn initialize(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(GeoError::EngineNotReady("closed".to_string()));
        }
        if self.manifest.get().is_some() {
            return Ok(());
        }

        self.log(
            LogLevel::Info,
            &format!("Reading dataset from {}", self.options.dataset_dir.display()),
        );
        let manifest = read_manifest(&self.options.dataset_dir).await?;
        self.log(
            LogLevel::Info,
            &format!(
                "Dataset ready: {} tiles, {} addresses, {} KB",
                manifest.tiles.len(),
                manifest.total_addresses(),
                manifest.total_size_kb()
            ),
        );
        // A concurrent initialize may have won; both read the same file
        let _ = self.manifest.set(manifest);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        self.tiles.write().unwrap_or_else(|e| e.into_inner()).clear();
        self.log(LogLevel::Debug, "Engine closed");
        Ok(())
    }

    async fn stats(&self) -> Result<EngineStats> {
        let manifest = self.ready()?;
        Ok(EngineStats {
            total_tiles: manifest.tiles.len(),
            total_addresses: manifest.total_addresses(),
            total_size_kb: manifest.total_size_kb(),
            tiles_loaded: self.loaded_count(),
        })
    }

    fn search_mode(&self) -> SearchMode {
        if self.full_text.is_some() {
            SearchMode::FtsBm25
        } else {
            SearchMode::Jaccard
        }
    }

    fn set_debug(&self, enabled: bool, level: Option<LogLevel>) {
        let mut settings = self.debug.write().unwrap_or_else(|e| e.into_inner());
        settings.enabled = enabled;
        if let Some(level) = level {
            settings.level = level;
        }
    }

    fn clear_cache(&self) {
        let dropped = {
            let mut tiles = self.tiles.write().unwrap_or_else(|e| e.into_inner());
            let count = tiles.values().filter(|slot| slot.initialized()).count();
            tiles.clear();
            count
        };
        if let Some(index) = &self.full_text {
            if let Err(e) = index.clear() {
                tracing::warn!("Failed to clear full-text index: {}", e);
            }
        }
        self.log(LogLevel::Debug, &format!("Cache cleared ({dropped} tiles)"));
    }

    async fn geocode(
        &self,
        query: &str,
        options: &GeocodeOptions,
    ) -> Result<Vec<GeocodingResult>> {
        let manifest = self.ready()?;
        let query = query.trim();
        if query.is_empty() {
            return Err(GeoError::InvalidQuery("Query cannot be empty".to_string()));
        }
        let limit = options.limit.unwrap_or(DEFAULT_LIMIT).max(1);

        let ordinals = Self::query_ordinals(manifest, options.bbox.as_ref(), &options.regions);
        let loaded = self.load_tiles(manifest, &ordinals).await?;

        let results = match &self.full_text {
            Some(index) => {
                self.rank_full_text(index, query, &loaded, options.bbox.as_ref(), limit)?
            }
            None => Self::rank_jaccard(query, &loaded, options.bbox.as_ref(), limit),
        };

        self.log(
            LogLevel::Debug,
            &format!(
                "geocode '{}' searched {} tiles, {} results",
                query,
                loaded.len(),
                results.len()
            ),
        );
        Ok(results)
    }

    async fn autocomplete(
        &self,
        query: &str,
        options: &AutocompleteOptions,
    ) -> Result<AutocompleteSuggestions> {
        let manifest = self.ready()?;
        let query = query.trim();
        if query.is_empty() {
            return Err(GeoError::InvalidQuery("Query cannot be empty".to_string()));
        }
        let limit = options.limit.unwrap_or(DEFAULT_SUGGESTIONS).max(1);

        if query.chars().all(|c| c.is_ascii_digit()) {
            let suggestions = manifest
                .postcodes
                .iter()
                .filter(|p| p.postcode.starts_with(query))
                .filter(|p| {
                    options.regions.is_empty()
                        || options.regions.iter().any(|r| postcode_in_region(p, r))
                })
                .filter(|p| {
                    options.bbox.map_or(true, |b| {
                        manifest
                            .tiles
                            .iter()
                            .any(|t| p.tiles.contains(&t.tile_id) && t.bbox().intersects(&b))
                    })
                })
                .take(limit)
                .map(|p| p.postcode.clone())
                .collect();
            return Ok(AutocompleteSuggestions {
                suggestions,
                kind: SuggestionKind::Postcode,
            });
        }

        let arabic = is_arabic(query);
        let needle = query.to_lowercase();
        let ordinals = Self::query_ordinals(manifest, options.bbox.as_ref(), &options.regions);
        let loaded = self.load_tiles(manifest, &ordinals).await?;

        let districts: BTreeSet<&str> = loaded
            .iter()
            .flat_map(|(_, rows)| rows.iter())
            .filter(|r| {
                options
                    .bbox
                    .map_or(true, |b| b.contains(r.latitude, r.longitude))
            })
            .filter_map(|r| {
                if arabic {
                    r.district_ar.as_deref()
                } else {
                    r.district_en.as_deref()
                }
            })
            .filter(|name| name_matches(name, &needle))
            .collect();
        if !districts.is_empty() {
            return Ok(AutocompleteSuggestions {
                suggestions: districts.into_iter().take(limit).map(String::from).collect(),
                kind: SuggestionKind::District,
            });
        }

        let geocode_options = GeocodeOptions {
            limit: Some(limit),
            bbox: options.bbox,
            regions: options.regions.clone(),
        };
        let mut seen = HashSet::new();
        let suggestions = self
            .geocode(query, &geocode_options)
            .await?
            .into_iter()
            .filter_map(|r| {
                if arabic {
                    r.full_address_ar.or(r.full_address_en)
                } else {
                    r.full_address_en.or(r.full_address_ar)
                }
            })
            .filter(|text| seen.insert(text.clone()))
            .collect();

        Ok(AutocompleteSuggestions {
            suggestions,
            kind: SuggestionKind::General,
        })
    }

    async fn reverse_geocode(
        &self,
        lat: f64,
        lon: f64,
        options: &ReverseGeocodeOptions,
    ) -> Result<Vec<GeocodingResult>> {
        let manifest = self.ready()?;
        if !valid_coordinates(lat, lon) {
            return Err(GeoError::InvalidCoordinates { lat, lon });
        }
        let radius = options.radius_meters.unwrap_or(DEFAULT_RADIUS_M);
        if !(radius.is_finite() && radius > 0.0) {
            return Err(GeoError::InvalidQuery(format!(
                "Radius must be positive, got {radius}"
            )));
        }
        let limit = options.limit.unwrap_or(DEFAULT_LIMIT).max(1);

        let search_box = radius_bbox(lat, lon, radius);
        let ordinals = Self::tile_ordinals(manifest, |tile| {
            if options.include_neighbors {
                tile.bbox().intersects(&search_box)
            } else {
                tile.bbox().contains(lat, lon)
            }
        });
        let loaded = self.load_tiles(manifest, &ordinals).await?;

        let mut nearby: Vec<(f64, &AddressRecord)> = loaded
            .iter()
            .flat_map(|(_, rows)| rows.iter())
            .map(|r| (haversine_m(lat, lon, r.latitude, r.longitude), r))
            .filter(|(d, _)| *d <= radius)
            .collect();
        nearby.sort_by(|a, b| a.0.total_cmp(&b.0));

        Ok(nearby
            .into_iter()
            .take(limit)
            .map(|(distance, record)| {
                let mut result = trim_detail(record.to_result(), options.detail_level);
                result.distance_m = Some(distance);
                result
            })
            .collect())
    }

    async fn search_by_postcode(
        &self,
        postcode: &str,
        options: &PostcodeSearchOptions,
    ) -> Result<Vec<GeocodingResult>> {
        let manifest = self.ready()?;
        let postcode = postcode.trim();
        if postcode.is_empty() {
            return Err(GeoError::InvalidQuery("Postcode cannot be empty".to_string()));
        }
        let limit = options.limit.unwrap_or(DEFAULT_LIMIT).max(1);

        let Some(info) = manifest.postcodes.iter().find(|p| p.postcode == postcode) else {
            return Ok(Vec::new());
        };
        let wanted: HashSet<&str> = info.tiles.iter().map(String::as_str).collect();
        let ordinals = Self::tile_ordinals(manifest, |tile| wanted.contains(tile.tile_id.as_str()));
        let loaded = self.load_tiles(manifest, &ordinals).await?;

        let number = options.number.as_deref().map(str::trim);
        Ok(loaded
            .iter()
            .flat_map(|(_, rows)| rows.iter())
            .filter(|r| r.postcode.as_deref() == Some(postcode))
            .filter(|r| number.map_or(true, |n| same_number(r.number.as_deref(), n)))
            .take(limit)
            .map(AddressRecord::to_result)
            .collect())
    }

    async fn search_by_number(
        &self,
        number: &str,
        options: &NumberSearchOptions,
    ) -> Result<Vec<GeocodingResult>> {
        let manifest = self.ready()?;
        let number = number.trim();
        if number.is_empty() {
            return Err(GeoError::InvalidQuery(
                "Building number cannot be empty".to_string(),
            ));
        }
        let limit = options.limit.unwrap_or(DEFAULT_LIMIT).max(1);

        let ordinals = Self::tile_ordinals(manifest, |tile| {
            options.bbox.map_or(true, |b| b.intersects(&tile.bbox()))
                && options.region.as_deref().map_or(true, |r| tile.in_region(r))
        });
        let loaded = self.load_tiles(manifest, &ordinals).await?;

        Ok(loaded
            .iter()
            .flat_map(|(_, rows)| rows.iter())
            .filter(|r| same_number(r.number.as_deref(), number))
            .filter(|r| {
                options
                    .bbox
                    .map_or(true, |b| b.contains(r.latitude, r.longitude))
            })
            .take(limit)
            .map(AddressRecord::to_result)
            .collect())
    }

    async fn admin_hierarchy(&self, lat: f64, lon: f64) -> Result<AdminHierarchy> {
        let manifest = self.ready()?;
        if !valid_coordinates(lat, lon) {
            return Err(GeoError::InvalidCoordinates { lat, lon });
        }

        let search_box = radius_bbox(lat, lon, ADMIN_RADIUS_M);
        let ordinals = Self::tile_ordinals(manifest, |tile| tile.bbox().intersects(&search_box));
        let loaded = self.load_tiles(manifest, &ordinals).await?;

        let nearest = loaded
            .iter()
            .flat_map(|(_, rows)| rows.iter())
            .map(|r| (haversine_m(lat, lon, r.latitude, r.longitude), r))
            .filter(|(d, _)| *d <= ADMIN_RADIUS_M)
            .min_by(|a, b| a.0.total_cmp(&b.0));

        Ok(match nearest {
            Some((_, record)) => AdminHierarchy {
                district: admin_unit(&record.district_en, &record.district_ar),
                governorate: admin_unit(&record.gov_en, &record.gov_ar),
                region: admin_unit(&record.region_en, &record.region_ar),
            },
            None => AdminHierarchy::default(),
        })
    }

    async fn detect_country(&self, lat: f64, lon: f64) -> Result<Option<CountryDetection>> {
        let manifest = self.ready()?;
        if !valid_coordinates(lat, lon) {
            return Err(GeoError::InvalidCoordinates { lat, lon });
        }

        Ok(manifest
            .country
            .as_ref()
            .filter(|c| c.bbox.contains(lat, lon))
            .map(|c| c.detection()))
    }

    fn postcodes(&self, prefix: Option<&str>) -> Vec<PostcodeInfo> {
        let Ok(manifest) = self.ready() else {
            return Vec::new();
        };
        let prefix = prefix.map(str::trim).unwrap_or("");
        manifest
            .postcodes
            .iter()
            .filter(|p| p.postcode.starts_with(prefix))
            .cloned()
            .collect()
    }

    fn tiles(&self) -> Vec<TileInfo> {
        self.ready()
            .map(|manifest| manifest.tiles.clone())
            .unwrap_or_default()
    }

    fn tiles_by_region(&self, region: &str) -> Vec<TileInfo> {
        let Ok(manifest) = self.ready() else {
            return Vec::new();
        };
        manifest
            .tiles
            .iter()
            .filter(|tile| tile.in_region(region))
            .cloned()
            .collect()
    }

    fn loaded_tiles(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .tiles
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|(_, slot)| slot.initialized())
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    fn tiles_for_bbox(&self, bbox: &BBox) -> Vec<String> {
        let Ok(manifest) = self.ready() else {
            return Vec::new();
        };
        manifest
            .tiles
            .iter()
            .filter(|tile| tile.bbox().intersects(bbox))
            .map(|tile| tile.tile_id.clone())
            .collect()
    }
}

fn encode_key(ordinal: usize, row: usize) -> u64 {
    ((ordinal as u64) << 32) | (row as u64 & 0xFFFF_FFFF)
}

fn decode_key(key: u64) -> (usize, usize) {
    ((key >> 32) as usize, (key & 0xFFFF_FFFF) as usize)
}

fn same_number(candidate: Option<&str>, wanted: &str) -> bool {
    candidate.is_some_and(|n| n.trim().eq_ignore_ascii_case(wanted))
}

fn postcode_in_region(info: &PostcodeInfo, region: &str) -> bool {
    let wanted = region.trim().to_lowercase();
    [&info.region_en, &info.region_ar]
        .iter()
        .filter_map(|r| r.as_deref())
        .any(|r| r.to_lowercase() == wanted)
}

fn is_arabic(text: &str) -> bool {
    text.chars().any(|c| ('\u{0600}'..='\u{06FF}').contains(&c))
}

/// `needle` (lowercased) prefixes the name or one of its words
fn name_matches(name: &str, needle: &str) -> bool {
    let name = name.to_lowercase();
    name.starts_with(needle) || name.split_whitespace().any(|word| word.starts_with(needle))
}

fn admin_unit(en: &Option<String>, ar: &Option<String>) -> Option<AdminUnit> {
    match (en, ar) {
        (None, None) => None,
        (en, ar) => Some(AdminUnit {
            name_en: en.clone().or_else(|| ar.clone()).unwrap_or_default(),
            name_ar: ar.clone().or_else(|| en.clone()).unwrap_or_default(),
        }),
    }
}

/// Drop fields below the requested detail level
fn trim_detail(mut result: GeocodingResult, level: DetailLevel) -> GeocodingResult {
    if level == DetailLevel::Full {
        return result;
    }

    result.street = None;
    result.district_ar = None;
    result.district_en = None;
    result.city = None;

    match level {
        DetailLevel::Minimal => {
            result.postcode = None;
            result.number = None;
            result.gov_ar = None;
            result.gov_en = None;
            result.region_ar = None;
            result.region_en = None;
        }
        DetailLevel::Postcode => {
            result.gov_ar = None;
            result.gov_en = None;
            result.region_ar = None;
            result.region_en = None;
        }
        DetailLevel::Region => {
            result.number = None;
        }
        DetailLevel::Full => {}
    }
    result
}
