//! Hemisphere sign normalization against the modeled region.
//!
//! Some postal datasets store unsigned magnitudes (e.g. 79.4 instead of
//! -79.4 for a western longitude). Rather than taking absolute values
//! unconditionally, which only works for a region confined to one hemisphere
//! pair, each axis is mirrored only when that moves it into the bounding box.

use map_common::{GeoCoord, GeographicBoundingBox};
use serde::{Deserialize, Serialize};

/// How coordinates are reconciled with the bounding box's hemispheres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Mirror an axis across the equator/prime meridian when only its
    /// negation lies inside the box.
    #[default]
    MirrorIntoBox,
    /// Use coordinates exactly as given.
    Disabled,
}

/// A coordinate after normalization, with a record of which axes flipped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedCoord {
    pub coord: GeoCoord,
    pub lon_mirrored: bool,
    pub lat_mirrored: bool,
}

impl NormalizedCoord {
    pub fn was_mirrored(&self) -> bool {
        self.lon_mirrored || self.lat_mirrored
    }
}

/// Normalize a coordinate's signs against the bounding box.
///
/// An axis already inside the box is kept. An axis outside the box whose
/// negation is inside is mirrored. Anything else is kept unchanged and will
/// project outside the canvas, where it gets flagged.
pub fn normalize_to_bbox(
    coord: GeoCoord,
    bbox: &GeographicBoundingBox,
    mode: Normalization,
) -> NormalizedCoord {
    if mode == Normalization::Disabled {
        return NormalizedCoord {
            coord,
            lon_mirrored: false,
            lat_mirrored: false,
        };
    }

    let lon_mirrored = !bbox.contains_lon(coord.lon) && bbox.contains_lon(-coord.lon);
    let lat_mirrored = !bbox.contains_lat(coord.lat) && bbox.contains_lat(-coord.lat);

    NormalizedCoord {
        coord: GeoCoord {
            lon: if lon_mirrored { -coord.lon } else { coord.lon },
            lat: if lat_mirrored { -coord.lat } else { coord.lat },
        },
        lon_mirrored,
        lat_mirrored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_coordinate_is_untouched() {
        let canada = GeographicBoundingBox::canada();
        let n = normalize_to_bbox(GeoCoord::new(-79.4, 43.6), &canada, Normalization::MirrorIntoBox);
        assert_eq!(n.coord, GeoCoord::new(-79.4, 43.6));
        assert!(!n.was_mirrored());
    }

    #[test]
    fn test_unsigned_longitude_is_mirrored() {
        let canada = GeographicBoundingBox::canada();
        let n = normalize_to_bbox(GeoCoord::new(79.4, 43.6), &canada, Normalization::MirrorIntoBox);
        assert_eq!(n.coord, GeoCoord::new(-79.4, 43.6));
        assert!(n.lon_mirrored);
        assert!(!n.lat_mirrored);
    }

    #[test]
    fn test_out_of_region_point_is_not_forced_in() {
        // Sydney: neither sign of its longitude falls within Canada
        let canada = GeographicBoundingBox::canada();
        let sydney = GeoCoord::new(151.2, -33.9);
        let n = normalize_to_bbox(sydney, &canada, Normalization::MirrorIntoBox);
        assert_eq!(n.coord.lon, 151.2);
        assert!(!canada.contains(n.coord.lon, n.coord.lat));
    }

    #[test]
    fn test_disabled_keeps_unsigned_values() {
        let canada = GeographicBoundingBox::canada();
        let n = normalize_to_bbox(GeoCoord::new(79.4, 43.6), &canada, Normalization::Disabled);
        assert_eq!(n.coord.lon, 79.4);
        assert!(!n.was_mirrored());
    }
}
