//! Common test fixtures for story-density-map tests.
//!
//! Pre-defined postal rows, regions and canvases that show up across the
//! test suite.

/// Bounding boxes as (north, south, east, west) in signed degrees.
pub mod bbox {
    /// The reference region, rounded outward to whole arc-seconds.
    pub const CANADA: (f64, f64, f64, f64) = (
        83.0 + 6.0 / 60.0 + 41.0 / 3600.0,
        41.0 + 40.0 / 60.0 + 53.0 / 3600.0,
        -(52.0 + 37.0 / 60.0 + 10.0 / 3600.0),
        -(141.0 + 7.0 / 3600.0),
    );

    /// Southern Ontario, small enough for quick grid sweeps.
    pub const SOUTHERN_ONTARIO: (f64, f64, f64, f64) = (46.0, 42.0, -74.0, -83.0);

    /// As a `north,south,east,west` configuration string.
    pub const SOUTHERN_ONTARIO_STR: &str = "46,42,-74,-83";

    /// Inverted (south above north)
    pub const INVERTED_STR: &str = "42,46,-74,-83";
}

/// Canvas sizes as (width, height).
pub mod canvas {
    /// Cropped reference basemap.
    pub const REFERENCE: (u32, u32) = (3244, 1408);

    /// Small canvas for end-to-end tests; keeps PNGs tiny.
    pub const SMALL: (u32, u32) = (400, 300);
}

/// Rows of the postal gazetteer.
pub mod postal {
    /// The header every gazetteer CSV must carry (order is free).
    pub const HEADER: [&str; 4] = ["POSTAL_CODE", "CITY", "LONGITUDE", "LATITUDE"];

    /// A gazetteer row: (postal code, city, longitude, latitude).
    pub type Row = (&'static str, &'static str, f64, f64);

    pub const TORONTO_M5V: Row = ("M5V 3L9", "TORONTO", -79.4, 43.6);
    pub const TORONTO_M5V_DUPLICATE: Row = ("M5V 2T6", "TORONTO", -79.39, 43.64);
    pub const TORONTO_M4C: Row = ("M4C 1B5", "TORONTO", -79.31, 43.69);
    pub const OTTAWA_K1A: Row = ("K1A 0B1", "OTTAWA", -75.7, 45.42);
    pub const MONTREAL_H2X: Row = ("H2X 1Y4", "MONTREAL", -73.57, 45.51);
    pub const VANCOUVER_V6B: Row = ("V6B 1A1", "VANCOUVER", -123.11, 49.28);
    pub const HALIFAX_B3H: Row = ("B3H 1A1", "HALIFAX", -63.58, 44.64);
    pub const IQALUIT_X0A: Row = ("X0A 0H0", "IQALUIT", -68.5, 63.75);

    /// A handful of major cities with distinct prefixes.
    pub const MAJOR_CITIES: [Row; 6] = [
        TORONTO_M5V,
        TORONTO_M4C,
        OTTAWA_K1A,
        MONTREAL_H2X,
        VANCOUVER_V6B,
        HALIFAX_B3H,
    ];

    /// A prefix that no fixture row carries.
    pub const UNKNOWN_PREFIX: &str = "Z9Z";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canada_is_ordered() {
        let (north, south, east, west) = bbox::CANADA;
        assert!(north > south);
        assert!(west < east);
    }

    #[test]
    fn test_major_cities_have_distinct_prefixes() {
        let mut prefixes: Vec<&str> = postal::MAJOR_CITIES.iter().map(|r| &r.0[..3]).collect();
        prefixes.sort();
        prefixes.dedup();
        assert_eq!(prefixes.len(), postal::MAJOR_CITIES.len());
    }
}
