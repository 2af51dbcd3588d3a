//! Raw dataset rows and their validation.

use map_common::{GeoCoord, PostalPrefix};
use serde::Deserialize;
use thiserror::Error;

use crate::index::PostalRecord;

/// One row of the postal dataset as it appears on disk.
///
/// Every field is optional so a short or partially blank row still
/// deserializes; [`PostalRow::validate`] decides whether it is usable.
/// Columns beyond these four are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostalRow {
    #[serde(rename = "POSTAL_CODE", default)]
    pub postal_code: Option<String>,

    #[serde(rename = "CITY", default)]
    pub city: Option<String>,

    #[serde(rename = "LONGITUDE", default, deserialize_with = "csv::invalid_option")]
    pub longitude: Option<f64>,

    #[serde(rename = "LATITUDE", default, deserialize_with = "csv::invalid_option")]
    pub latitude: Option<f64>,
}

/// Why a row was skipped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowDefect {
    #[error("missing or unparsable {0}")]
    MissingField(&'static str),

    #[error("postal code '{0}' has no valid prefix")]
    InvalidPrefix(String),

    #[error("coordinate ({lon}, {lat}) is outside geographic range")]
    CoordinateOutOfRange { lon: f64, lat: f64 },

    #[error("unreadable record: {0}")]
    Unreadable(String),
}

impl PostalRow {
    /// Check the row and turn it into a gazetteer record.
    pub fn validate(self) -> Result<PostalRecord, RowDefect> {
        let code = non_blank(self.postal_code).ok_or(RowDefect::MissingField("POSTAL_CODE"))?;
        let city = non_blank(self.city).ok_or(RowDefect::MissingField("CITY"))?;
        let lon = self.longitude.ok_or(RowDefect::MissingField("LONGITUDE"))?;
        let lat = self.latitude.ok_or(RowDefect::MissingField("LATITUDE"))?;

        if !lon.is_finite() || !lat.is_finite() || lon.abs() > 180.0 || lat.abs() > 90.0 {
            return Err(RowDefect::CoordinateOutOfRange { lon, lat });
        }

        let prefix = PostalPrefix::from_postal_code(&code).ok_or(RowDefect::InvalidPrefix(code))?;

        Ok(PostalRecord {
            prefix,
            city,
            coord: GeoCoord::new(lon, lat),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
