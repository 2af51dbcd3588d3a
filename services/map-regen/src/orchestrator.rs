//! One end-to-end regeneration run.
//!
//! A run loads the gazetteer, fetches story locations, resolves and projects
//! each distinct postal prefix, composites the density markers and publishes
//! the PNG. A failure in any step aborts the run and leaves the previously
//! published map as it was; per-point problems (an unknown prefix, a point
//! projecting off the canvas) are counted and logged instead.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use gazetteer::{Gazetteer, GazetteerLoader};
use map_common::{MapError, MapResult, PixelPoint, PostalPrefix};
use projection::GreatCircleFlattening;
use renderer::{Basemap, DensityRenderer};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use crate::config::RegenConfig;
use crate::gazetteer_cache::{load_blocking, CacheStats, GazetteerCache};
use crate::metrics;
use crate::publish::publish_atomically;
use crate::store::LocationSource;

/// Unresolved prefixes listed in a single log line.
const MAX_LOGGED_PREFIXES: usize = 25;

/// What a successful run did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegenerationSummary {
    pub records_fetched: usize,
    pub distinct_prefixes: usize,
    pub resolved: usize,
    pub unresolved: usize,
    pub unresolved_prefixes: Vec<String>,
    /// Points that projected off the canvas and were clamped to its edge.
    pub out_of_range: usize,
    pub markers_drawn: usize,
    /// Markers whose radius clamped to zero at the canvas edge.
    pub degenerate_markers: usize,
    pub bytes_written: u64,
    pub duration_ms: u64,
    pub completed_at: DateTime<Utc>,
}

/// Pixels for one run, plus what fell by the wayside getting there.
#[derive(Debug, Default)]
struct PlacedPoints {
    pixels: Vec<PixelPoint>,
    unresolved: Vec<PostalPrefix>,
    out_of_range: usize,
}

/// Runs regenerations against one configuration and record source.
pub struct Regenerator {
    config: Arc<RegenConfig>,
    source: Arc<dyn LocationSource>,
    loader: GazetteerLoader,
    cache: Option<GazetteerCache>,
    projection: GreatCircleFlattening,
    renderer: DensityRenderer,
    run_lock: Mutex<()>,
}

impl Regenerator {
    /// Validate `config` and prepare a regenerator.
    ///
    /// The gazetteer cache is enabled when the configuration asks for it.
    pub fn new(config: RegenConfig, source: Arc<dyn LocationSource>) -> MapResult<Self> {
        config.validate()?;
        let projection = config.projection()?;
        let renderer = DensityRenderer::new(&config.markers.style)?;
        let loader = GazetteerLoader::new(config.gazetteer.malformed_rows);
        let cache = config
            .gazetteer
            .cache
            .then(|| GazetteerCache::new(loader.clone()));

        Ok(Self {
            config: Arc::new(config),
            source,
            loader,
            cache,
            projection,
            renderer,
            run_lock: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &RegenConfig {
        &self.config
    }

    /// Cache counters, when caching is enabled.
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(GazetteerCache::stats)
    }

    /// Run one regeneration.
    ///
    /// Concurrent callers are serialized; each gets its own run.
    #[instrument(skip(self), fields(output = %self.config.paths.output.display()))]
    pub async fn regenerate(&self) -> MapResult<RegenerationSummary> {
        let _running = self.run_lock.lock().await;
        let started = Instant::now();

        match self.run(started).await {
            Ok(summary) => {
                metrics::record_run_success(&summary);
                info!(
                    records = summary.records_fetched,
                    prefixes = summary.distinct_prefixes,
                    markers = summary.markers_drawn,
                    unresolved = summary.unresolved,
                    out_of_range = summary.out_of_range,
                    bytes = summary.bytes_written,
                    duration_ms = summary.duration_ms,
                    "Density map regenerated"
                );
                Ok(summary)
            }
            Err(e) => {
                metrics::record_run_failure(e.kind());
                error!(kind = e.kind(), error = %e, "Regeneration failed, previous map kept");
                Err(e)
            }
        }
    }

    async fn run(&self, started: Instant) -> MapResult<RegenerationSummary> {
        let gazetteer = self.gazetteer().await?;

        let refs = self.source.fetch_all_location_refs().await?;
        let prefixes: BTreeSet<PostalPrefix> =
            refs.iter().map(|r| r.postal_prefix.clone()).collect();
        debug!(records = refs.len(), prefixes = prefixes.len(), "Fetched story locations");

        let placed = self.place(&gazetteer, &prefixes);
        if !placed.unresolved.is_empty() {
            let listed: Vec<&str> = placed
                .unresolved
                .iter()
                .take(MAX_LOGGED_PREFIXES)
                .map(PostalPrefix::as_str)
                .collect();
            warn!(
                count = placed.unresolved.len(),
                prefixes = ?listed,
                "Skipped postal prefixes missing from the gazetteer"
            );
        }

        let config = self.config.clone();
        let renderer = self.renderer.clone();
        let pixels = placed.pixels;
        let (render, bytes_written) = tokio::task::spawn_blocking(move || -> MapResult<_> {
            let region = &config.region;
            let basemap = Basemap::load(&config.paths.basemap, region.canvas, region.basemap_fit)?;
            let mut radii = config.radius_source()?;
            let render = renderer.render(&basemap, pixels, &mut radii);
            let map = render.encode()?;
            let bytes = publish_atomically(&config.paths.output, &map.png)?;
            Ok((render, bytes))
        })
        .await
        .map_err(|e| MapError::Task(format!("render and publish: {}", e)))??;

        Ok(RegenerationSummary {
            records_fetched: refs.len(),
            distinct_prefixes: prefixes.len(),
            resolved: prefixes.len() - placed.unresolved.len(),
            unresolved: placed.unresolved.len(),
            unresolved_prefixes: placed.unresolved.iter().map(|p| p.to_string()).collect(),
            out_of_range: placed.out_of_range,
            markers_drawn: render.markers_drawn,
            degenerate_markers: render.degenerate_markers,
            bytes_written,
            duration_ms: started.elapsed().as_millis() as u64,
            completed_at: Utc::now(),
        })
    }

    async fn gazetteer(&self) -> MapResult<Arc<Gazetteer>> {
        let path = &self.config.paths.dataset;
        match &self.cache {
            Some(cache) => cache.get_or_load(path).await,
            None => Ok(Arc::new(load_blocking(self.loader.clone(), path.clone()).await?)),
        }
    }

    /// Resolve and project each prefix.
    fn place(&self, gazetteer: &Gazetteer, prefixes: &BTreeSet<PostalPrefix>) -> PlacedPoints {
        let mut placed = PlacedPoints::default();
        for prefix in prefixes {
            let Some(coord) = gazetteer.resolve(prefix) else {
                placed.unresolved.push(prefix.clone());
                continue;
            };

            let projected = self.projection.project(coord);
            let pixel = match projected.check() {
                Ok(pixel) => pixel,
                Err(miss) => {
                    debug!(prefix = %prefix, lon = coord.lon, lat = coord.lat, error = %miss, "Clamping off-canvas point");
                    placed.out_of_range += 1;
                    projected.clamped()
                }
            };
            placed.pixels.push(pixel);
        }
        placed
    }
}

impl std::fmt::Debug for Regenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Regenerator")
            .field("config", &self.config)
            .field("cache", &self.cache.is_some())
            .finish()
    }
}
