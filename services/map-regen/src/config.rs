//! Service configuration.
//!
//! Loaded from a YAML file whose sections all have defaults, so an empty
//! file (or no file) describes the reference Canada map. Command-line
//! arguments override individual values afterwards.

use std::path::{Path, PathBuf};
use std::time::Duration;

use gazetteer::MalformedRowPolicy;
use map_common::{CanvasSize, GeographicBoundingBox, MapError, MapResult};
use projection::{
    GreatCircleFlattening, Normalization, REFERENCE_CROP_OFFSET_Y, REFERENCE_SOURCE_HEIGHT,
};
use renderer::marker::{DEFAULT_MAX_RADIUS, DEFAULT_MIN_RADIUS};
use renderer::{BasemapFit, DensityRenderer, DensityStyle, JitteredRadius};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegenConfig {
    pub paths: PathsConfig,
    pub region: RegionConfig,
    pub markers: MarkerConfig,
    pub gazetteer: GazetteerConfig,
    pub store: StoreConfig,
}

/// Input and output files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Postal-code CSV
    pub dataset: PathBuf,
    /// Background raster
    pub basemap: PathBuf,
    /// Published PNG
    pub output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            dataset: PathBuf::from("canadamap/CanadianPostalCodes202201.csv"),
            basemap: PathBuf::from("canadamap/flat_canada_black_cropped_no_boundary.jpg"),
            output: PathBuf::from("public/canadamap_mainpage.png"),
        }
    }
}

/// Mapped region and canvas geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    pub bbox: GeographicBoundingBox,
    pub canvas: CanvasSize,
    /// Height of the uncropped source image; `None` means the canvas height.
    pub source_height: Option<u32>,
    pub crop_offset_y: u32,
    pub normalization: Normalization,
    pub basemap_fit: BasemapFit,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            bbox: GeographicBoundingBox::canada(),
            canvas: CanvasSize::REFERENCE,
            source_height: Some(REFERENCE_SOURCE_HEIGHT),
            crop_offset_y: REFERENCE_CROP_OFFSET_Y,
            normalization: Normalization::MirrorIntoBox,
            basemap_fit: BasemapFit::Resize,
        }
    }
}

/// Marker size and appearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    pub min_radius: u32,
    pub max_radius: u32,
    /// Fixed seed for reproducible maps; random per run when unset.
    pub seed: Option<u64>,
    #[serde(flatten)]
    pub style: DensityStyle,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            min_radius: DEFAULT_MIN_RADIUS,
            max_radius: DEFAULT_MAX_RADIUS,
            seed: None,
            style: DensityStyle::default(),
        }
    }
}

/// Gazetteer loading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GazetteerConfig {
    pub malformed_rows: MalformedRowPolicy,
    /// Keep the parsed dataset between runs until the file changes.
    pub cache: bool,
}

/// Record source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON export of story records
    pub records: PathBuf,
    /// Seconds between checks for new records in watch mode
    pub poll_interval_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            records: PathBuf::from("data/stories.json"),
            poll_interval_secs: 30,
        }
    }
}

impl StoreConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

impl RegenConfig {
    /// Load a YAML configuration file.
    pub fn load(path: &Path) -> MapResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            MapError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::from_yaml(&contents)
            .map_err(|e| MapError::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parse YAML; empty input yields the defaults.
    pub fn from_yaml(yaml: &str) -> MapResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| MapError::InvalidConfig(e.to_string()))
    }

    /// Check every section by building what it describes.
    pub fn validate(&self) -> MapResult<()> {
        self.projection()?;
        self.radius_source()?;
        DensityRenderer::new(&self.markers.style)?;
        self.gazetteer.malformed_rows.validate()?;
        Ok(())
    }

    pub fn projection(&self) -> MapResult<GreatCircleFlattening> {
        let region = &self.region;
        let source_height = region.source_height.unwrap_or(region.canvas.height);
        let projection = GreatCircleFlattening::new(
            region.bbox,
            region.canvas,
            source_height,
            region.crop_offset_y,
        )?;
        Ok(projection.with_normalization(region.normalization))
    }

    /// A fresh radius source for one run.
    pub fn radius_source(&self) -> MapResult<JitteredRadius> {
        let markers = &self.markers;
        Ok(JitteredRadius::new(
            markers.min_radius,
            markers.max_radius,
            markers.seed,
        )?)
    }
}
