//! Geographic bounding box of the modeled region.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The four extreme angles (N/S/E/W) of the region a map covers.
///
/// Angles are stored as signed degrees (north and east positive) and exposed
/// in radians for the projection math. Boxes crossing the antimeridian are not
/// supported: `west` must be strictly less than `east`.
///
/// Fields are private so every box goes through [`GeographicBoundingBox::new`]
/// (or validated deserialization) and can never span zero height or width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BboxFields")]
pub struct GeographicBoundingBox {
    north: f64,
    south: f64,
    east: f64,
    west: f64,
}

/// Unvalidated field set used when deserializing a box.
#[derive(Debug, Deserialize)]
struct BboxFields {
    north: f64,
    south: f64,
    east: f64,
    west: f64,
}

impl TryFrom<BboxFields> for GeographicBoundingBox {
    type Error = BboxParseError;

    fn try_from(fields: BboxFields) -> Result<Self, Self::Error> {
        GeographicBoundingBox::new(fields.north, fields.south, fields.east, fields.west)
    }
}

/// Fixed anchor of the projection: the north-west corner of the box, in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceOrigin {
    pub lon0: f64,
    pub lat0: f64,
}

/// Convert degrees/minutes/seconds to decimal degrees.
pub fn dms(degrees: f64, minutes: f64, seconds: f64) -> f64 {
    degrees + minutes / 60.0 + seconds / 3600.0
}

impl GeographicBoundingBox {
    /// Create a validated bounding box from its four extremes in degrees.
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Result<Self, BboxParseError> {
        for value in [north, south, east, west] {
            if !value.is_finite() {
                return Err(BboxParseError::NotFinite);
            }
        }
        if !(-90.0..=90.0).contains(&north) || !(-90.0..=90.0).contains(&south) {
            return Err(BboxParseError::LatitudeOutOfRange { north, south });
        }
        if !(-180.0..=180.0).contains(&east) || !(-180.0..=180.0).contains(&west) {
            return Err(BboxParseError::LongitudeOutOfRange { east, west });
        }
        if north <= south {
            return Err(BboxParseError::Inverted(format!(
                "north ({}) must be greater than south ({})",
                north, south
            )));
        }
        if west >= east {
            return Err(BboxParseError::Inverted(format!(
                "west ({}) must be less than east ({})",
                west, east
            )));
        }

        Ok(Self {
            north,
            south,
            east,
            west,
        })
    }

    /// Extent of Canada, the region the reference basemap was drawn for.
    pub fn canada() -> Self {
        Self {
            north: dms(83.0, 6.0, 41.0),
            south: dms(41.0, 40.0, 53.0),
            east: -dms(52.0, 37.0, 10.0),
            west: -dms(141.0, 0.0, 7.0),
        }
    }

    /// Parse a "north,south,east,west" string (degrees).
    pub fn from_csv_string(s: &str) -> Result<Self, BboxParseError> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(BboxParseError::InvalidFormat(s.to_string()));
        }

        let parse = |part: &str| -> Result<f64, BboxParseError> {
            part.parse()
                .map_err(|_| BboxParseError::InvalidNumber(part.to_string()))
        };

        Self::new(
            parse(parts[0])?,
            parse(parts[1])?,
            parse(parts[2])?,
            parse(parts[3])?,
        )
    }

    pub fn north(&self) -> f64 {
        self.north
    }

    pub fn south(&self) -> f64 {
        self.south
    }

    pub fn east(&self) -> f64 {
        self.east
    }

    pub fn west(&self) -> f64 {
        self.west
    }

    pub fn north_rad(&self) -> f64 {
        self.north.to_radians()
    }

    pub fn south_rad(&self) -> f64 {
        self.south.to_radians()
    }

    pub fn east_rad(&self) -> f64 {
        self.east.to_radians()
    }

    pub fn west_rad(&self) -> f64 {
        self.west.to_radians()
    }

    /// The projection anchor (lon0 = west, lat0 = north).
    pub fn origin(&self) -> ReferenceOrigin {
        ReferenceOrigin {
            lon0: self.west_rad(),
            lat0: self.north_rad(),
        }
    }

    pub fn contains_lon(&self, lon: f64) -> bool {
        lon >= self.west && lon <= self.east
    }

    pub fn contains_lat(&self, lat: f64) -> bool {
        lat >= self.south && lat <= self.north
    }

    /// Check if a point (degrees) lies within this box, edges included.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.contains_lon(lon) && self.contains_lat(lat)
    }
}

impl FromStr for GeographicBoundingBox {
    type Err = BboxParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_csv_string(s)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BboxParseError {
    #[error("Invalid bounding box format: {0}. Expected 'north,south,east,west'")]
    InvalidFormat(String),

    #[error("Invalid number in bounding box: {0}")]
    InvalidNumber(String),

    #[error("Bounding box values must be finite")]
    NotFinite,

    #[error("Latitude out of range: north={north}, south={south}")]
    LatitudeOutOfRange { north: f64, south: f64 },

    #[error("Longitude out of range: east={east}, west={west}")]
    LongitudeOutOfRange { east: f64, west: f64 },

    #[error("Inverted bounding box: {0}")]
    Inverted(String),
}
