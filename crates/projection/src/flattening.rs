//! Great-circle flattening of a bounding region onto a pixel canvas.
//!
//! This is an equirectangular-style projection whose scale comes from true
//! great-circle distances rather than a flat degree-to-pixel ratio:
//!
//! - X is the distance east of the western meridian, measured at the point's
//!   own latitude, divided by the full east-west width of the region at that
//!   latitude. This partially compensates for meridians converging northward.
//! - Y is the distance south of the northern parallel, divided by the full
//!   north-south height of the region.
//!
//! It is neither conformal nor equal-area; it is an approximation tuned so
//! that one basemap lines up with one region. The canvas may be a vertical
//! crop of a taller source image: rows are first scaled to the source height
//! and then shifted up by the crop offset.

use map_common::{CanvasSize, GeoCoord, GeographicBoundingBox, MapError, PixelPoint};

use crate::haversine::{distance_along_meridian_km, distance_along_parallel_km};
use crate::normalize::{normalize_to_bbox, Normalization};

/// Height in pixels of the uncropped reference basemap.
pub const REFERENCE_SOURCE_HEIGHT: u32 = 4208;

/// Rows removed from the top of the reference basemap when it was cropped.
pub const REFERENCE_CROP_OFFSET_Y: u32 = 2800;

/// Errors raised while configuring a projection.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProjectionError {
    #[error("Canvas must be non-empty, got {width}x{height}")]
    EmptyCanvas { width: u32, height: u32 },

    #[error(
        "Source height {source_height} cannot hold a {canvas_height}px canvas at crop offset {crop_offset_y}"
    )]
    CropOutsideSource {
        source_height: u32,
        canvas_height: u32,
        crop_offset_y: u32,
    },
}

impl From<ProjectionError> for MapError {
    fn from(err: ProjectionError) -> Self {
        MapError::InvalidConfig(err.to_string())
    }
}

/// Configured great-circle flattening for one region and canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GreatCircleFlattening {
    bbox: GeographicBoundingBox,
    canvas: CanvasSize,
    source_height: u32,
    crop_offset_y: u32,
    normalization: Normalization,
}

/// Result of projecting one coordinate.
///
/// Raw coordinates are signed and may fall off the canvas for points outside
/// the bounding box (or outside the cropped band of a cropped canvas).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectedPixel {
    pub raw_x: i64,
    pub raw_y: i64,
    pub canvas: CanvasSize,
    /// Whether sign normalization mirrored either axis.
    pub mirrored: bool,
}

impl ProjectedPixel {
    pub fn in_range(&self) -> bool {
        self.canvas.contains(self.raw_x, self.raw_y)
    }

    pub fn out_of_range(&self) -> bool {
        !self.in_range()
    }

    /// The on-canvas pixel, or `None` when the projection fell off the canvas.
    pub fn pixel(&self) -> Option<PixelPoint> {
        self.in_range()
            .then(|| PixelPoint::new(self.raw_x as u32, self.raw_y as u32))
    }

    /// The pixel clamped to the canvas edge.
    pub fn clamped(&self) -> PixelPoint {
        self.canvas.clamp(self.raw_x, self.raw_y)
    }

    /// The pixel, or a `ProjectionOutOfRange` error describing the miss.
    pub fn check(&self) -> Result<PixelPoint, MapError> {
        self.pixel().ok_or(MapError::ProjectionOutOfRange {
            x: self.raw_x,
            y: self.raw_y,
            width: self.canvas.width,
            height: self.canvas.height,
        })
    }
}

impl GreatCircleFlattening {
    /// Create a projection onto `canvas`, where the canvas shows rows
    /// `[crop_offset_y, crop_offset_y + canvas.height)` of a source image that
    /// is `source_height` rows tall.
    pub fn new(
        bbox: GeographicBoundingBox,
        canvas: CanvasSize,
        source_height: u32,
        crop_offset_y: u32,
    ) -> Result<Self, ProjectionError> {
        if canvas.width == 0 || canvas.height == 0 {
            return Err(ProjectionError::EmptyCanvas {
                width: canvas.width,
                height: canvas.height,
            });
        }
        if (source_height as u64) < canvas.height as u64 + crop_offset_y as u64 {
            return Err(ProjectionError::CropOutsideSource {
                source_height,
                canvas_height: canvas.height,
                crop_offset_y,
            });
        }

        Ok(Self {
            bbox,
            canvas,
            source_height,
            crop_offset_y,
            normalization: Normalization::default(),
        })
    }

    /// Projection onto an uncropped canvas: source height equals canvas height.
    pub fn uncropped(
        bbox: GeographicBoundingBox,
        canvas: CanvasSize,
    ) -> Result<Self, ProjectionError> {
        Self::new(bbox, canvas, canvas.height, 0)
    }

    /// The reference setup: Canada onto the cropped 3244x1408 basemap.
    pub fn canada_cropped() -> Self {
        Self {
            bbox: GeographicBoundingBox::canada(),
            canvas: CanvasSize::REFERENCE,
            source_height: REFERENCE_SOURCE_HEIGHT,
            crop_offset_y: REFERENCE_CROP_OFFSET_Y,
            normalization: Normalization::MirrorIntoBox,
        }
    }

    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    pub fn bbox(&self) -> &GeographicBoundingBox {
        &self.bbox
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn source_height(&self) -> u32 {
        self.source_height
    }

    pub fn crop_offset_y(&self) -> u32 {
        self.crop_offset_y
    }

    pub fn normalization(&self) -> Normalization {
        self.normalization
    }

    /// Signed east-west and north-south distances (km) from the origin,
    /// and the full extents of the region at the point.
    fn distances(&self, lon: f64, lat: f64) -> (f64, f64, f64, f64) {
        let west = self.bbox.west_rad();
        let east = self.bbox.east_rad();
        let north = self.bbox.north_rad();
        let south = self.bbox.south_rad();

        // Signed so points west/north of the origin land at negative pixels
        let east_sign = if lon < west { -1.0 } else { 1.0 };
        let south_sign = if lat > north { -1.0 } else { 1.0 };

        let dist_x = east_sign * distance_along_parallel_km(west, lon, lat);
        let dist_y = south_sign * distance_along_meridian_km(north, lat, lon);
        let max_x = distance_along_parallel_km(west, east, lat);
        let max_y = distance_along_meridian_km(north, south, lon);

        (dist_x, dist_y, max_x, max_y)
    }

    /// Project a coordinate in degrees onto the canvas.
    pub fn project(&self, coord: GeoCoord) -> ProjectedPixel {
        let normalized = normalize_to_bbox(coord, &self.bbox, self.normalization);
        let lon = normalized.coord.lon.to_radians();
        let lat = normalized.coord.lat.to_radians();

        let (dist_x, dist_y, max_x, max_y) = self.distances(lon, lat);

        // The region collapses to a point at the poles
        let x_ratio = if max_x > f64::EPSILON { dist_x / max_x } else { 0.0 };
        let y_ratio = dist_y / max_y;

        let source_x = x_ratio * self.canvas.width as f64;
        let source_y = y_ratio * self.source_height as f64;

        ProjectedPixel {
            raw_x: floor_to_pixel(source_x),
            raw_y: floor_to_pixel(source_y).saturating_sub(self.crop_offset_y as i64),
            canvas: self.canvas,
            mirrored: normalized.was_mirrored(),
        }
    }
}

/// Floor a source-space coordinate; non-finite values map far off-canvas.
fn floor_to_pixel(value: f64) -> i64 {
    if value.is_finite() {
        value.floor() as i64
    } else {
        i64::MIN
    }
}

/// Project a coordinate onto an uncropped canvas covering `bbox`.
///
/// Coordinates strictly inside the box land inside the canvas; anything else
/// is reported through [`ProjectedPixel::out_of_range`] and may be clamped by
/// the caller.
pub fn project_to_pixel(
    coord: GeoCoord,
    bbox: &GeographicBoundingBox,
    canvas: CanvasSize,
) -> ProjectedPixel {
    GreatCircleFlattening {
        bbox: *bbox,
        canvas,
        source_height: canvas.height,
        crop_offset_y: 0,
        normalization: Normalization::MirrorIntoBox,
    }
    .project(coord)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toronto_on_reference_canvas() {
        let projection = GreatCircleFlattening::canada_cropped();
        let p = projection.project(GeoCoord::new(-79.4, 43.6));

        // Lands in the southern band kept by the crop
        assert!(p.in_range(), "{:?}", p);
        assert!((2300..2360).contains(&p.raw_x), "x = {}", p.raw_x);
        assert!((1180..1240).contains(&p.raw_y), "y = {}", p.raw_y);
    }

    #[test]
    fn test_unsigned_dataset_matches_signed() {
        let projection = GreatCircleFlattening::canada_cropped();
        let signed = projection.project(GeoCoord::new(-79.4, 43.6));
        let unsigned = projection.project(GeoCoord::new(79.4, 43.6));
        assert_eq!((signed.raw_x, signed.raw_y), (unsigned.raw_x, unsigned.raw_y));
        assert!(unsigned.mirrored);
        assert!(!signed.mirrored);
    }

    #[test]
    fn test_far_north_is_above_cropped_band() {
        // Iqaluit is inside Canada but north of the visible crop
        let projection = GreatCircleFlattening::canada_cropped();
        let p = projection.project(GeoCoord::new(-68.5, 63.75));
        assert!(p.raw_y < 0);
        assert!(p.out_of_range());
        assert_eq!(p.clamped().y, 0);
    }

    #[test]
    fn test_rejects_crop_beyond_source() {
        let result = GreatCircleFlattening::new(
            GeographicBoundingBox::canada(),
            CanvasSize::new(100, 100),
            150,
            60,
        );
        assert!(matches!(result, Err(ProjectionError::CropOutsideSource { .. })));
    }

    #[test]
    fn test_rejects_empty_canvas() {
        let result =
            GreatCircleFlattening::uncropped(GeographicBoundingBox::canada(), CanvasSize::new(0, 10));
        assert!(matches!(result, Err(ProjectionError::EmptyCanvas { .. })));
    }

    #[test]
    fn test_check_reports_out_of_range() {
        let bbox = GeographicBoundingBox::new(50.0, 40.0, -60.0, -80.0).unwrap();
        let p = project_to_pixel(GeoCoord::new(-90.0, 45.0), &bbox, CanvasSize::new(100, 100));
        assert!(p.raw_x < 0);
        assert!(matches!(p.check(), Err(MapError::ProjectionOutOfRange { .. })));
    }
}
