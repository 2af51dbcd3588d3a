//! Postal prefixes, coordinates and the record references that carry them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of leading postal-code characters that form the map's spatial unit.
pub const PREFIX_LEN: usize = 3;

/// First three characters of a postal code (e.g. "M5V" for "M5V 3L9").
///
/// Always upper-case ASCII alphanumeric; one marker is drawn per prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostalPrefix(String);

impl PostalPrefix {
    /// Derive the prefix of a raw postal code.
    ///
    /// Whitespace is ignored and letters are upper-cased, so "m5v 3l9",
    /// "M5V3L9" and "M5V" all yield "M5V". Returns `None` when fewer than
    /// three alphanumeric characters lead the code.
    pub fn from_postal_code(code: &str) -> Option<Self> {
        let prefix: String = code
            .chars()
            .filter(|c| !c.is_whitespace())
            .take(PREFIX_LEN)
            .map(|c| c.to_ascii_uppercase())
            .collect();

        if prefix.chars().count() == PREFIX_LEN && prefix.chars().all(|c| c.is_ascii_alphanumeric())
        {
            Some(Self(prefix))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostalPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PostalPrefix {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PostalPrefix::from_postal_code(&value)
            .ok_or_else(|| format!("'{}' does not start with a valid postal prefix", value))
    }
}

impl From<PostalPrefix> for String {
    fn from(prefix: PostalPrefix) -> Self {
        prefix.0
    }
}

/// A geographic coordinate in signed decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoord {
    pub lon: f64,
    pub lat: f64,
}

impl GeoCoord {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Minimal projection of a published story: its id and where it is from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoryLocationRef {
    pub id: String,
    pub postal_prefix: PostalPrefix,
}

impl StoryLocationRef {
    pub fn new(id: impl Into<String>, postal_prefix: PostalPrefix) -> Self {
        Self {
            id: id.into(),
            postal_prefix,
        }
    }
}
