//! Test data generators for gazetteer CSVs and basemaps.
//!
//! These generators create predictable, verifiable inputs that can be
//! used across the test suite.

use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};

use crate::fixtures::postal::{Row, HEADER};

/// Renders gazetteer rows as CSV text, header first.
///
/// # Example
///
/// ```
/// use test_utils::{gazetteer_csv, postal};
///
/// let csv = gazetteer_csv(&[postal::TORONTO_M5V]);
/// assert!(csv.starts_with("POSTAL_CODE,CITY,LONGITUDE,LATITUDE\n"));
/// assert!(csv.contains("M5V 3L9,TORONTO,-79.4,43.6"));
/// ```
pub fn gazetteer_csv(rows: &[Row]) -> String {
    let mut out = HEADER.join(",");
    out.push('\n');
    for (code, city, lon, lat) in rows {
        out.push_str(&format!("{},{},{},{}\n", code, city, lon, lat));
    }
    out
}

/// Appends raw, unvalidated lines to a gazetteer CSV.
///
/// Used to inject malformed rows next to good ones.
pub fn gazetteer_csv_with_raw(rows: &[Row], raw_lines: &[&str]) -> String {
    let mut out = gazetteer_csv(rows);
    for line in raw_lines {
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Creates `count` distinct, well-formed rows spread across Canada.
///
/// Prefixes walk `A0A`, `A0B`, ... so every row has its own prefix.
/// Coordinates sweep a lattice inside the reference region.
pub fn synthetic_rows(count: usize) -> Vec<(String, String, f64, f64)> {
    (0..count)
        .map(|i| {
            let first = (b'A' + ((i / 260) % 26) as u8) as char;
            let digit = (b'0' + ((i / 26) % 10) as u8) as char;
            let last = (b'A' + (i % 26) as u8) as char;
            let code = format!("{}{}{} 1A1", first, digit, last);
            let city = format!("CITY{}", i % 50);
            let lon = -130.0 + (i % 60) as f64;
            let lat = 43.0 + ((i / 60) % 20) as f64;
            (code, city, lon, lat)
        })
        .collect()
}

/// Renders owned rows (e.g. from [`synthetic_rows`]) as CSV text.
pub fn owned_rows_csv(rows: &[(String, String, f64, f64)]) -> String {
    let mut out = HEADER.join(",");
    out.push('\n');
    for (code, city, lon, lat) in rows {
        out.push_str(&format!("{},{},{},{}\n", code, city, lon, lat));
    }
    out
}

/// Writes a gazetteer CSV into `dir` and returns its path.
pub fn write_gazetteer_csv(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("Failed to write gazetteer CSV");
    path
}

/// Creates a solid-colour basemap image.
pub fn solid_basemap(width: u32, height: u32, color: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(color))
}

/// Writes a solid-colour basemap PNG into `dir` and returns its path.
pub fn write_solid_basemap(dir: &Path, name: &str, width: u32, height: u32, color: [u8; 3]) -> PathBuf {
    let path = dir.join(name);
    solid_basemap(width, height, color)
        .save(&path)
        .expect("Failed to write basemap image");
    path
}

/// Creates a basemap whose rows encode their own index in the red channel.
///
/// Makes row cropping verifiable: after a crop at `offset`, row 0 must
/// carry `offset % 256`.
pub fn row_indexed_basemap(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |_, y| Rgb([(y % 256) as u8, 0, 0]))
}
