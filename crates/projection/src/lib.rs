//! Geographic-to-pixel projection for the density map.
//!
//! Implements the great-circle flattening used to place postal prefixes on
//! the basemap, without external geodesy dependencies.

pub mod flattening;
pub mod haversine;
pub mod normalize;

pub use flattening::{
    project_to_pixel, GreatCircleFlattening, ProjectedPixel, ProjectionError,
    REFERENCE_CROP_OFFSET_Y, REFERENCE_SOURCE_HEIGHT,
};
pub use haversine::{haversine_km, EARTH_RADIUS_KM};
pub use normalize::{normalize_to_bbox, Normalization, NormalizedCoord};
