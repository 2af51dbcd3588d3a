//! Tests for GeographicBoundingBox construction, parsing and containment.

use map_common::bbox::{BboxParseError, GeographicBoundingBox};

// ============================================================================
// Constructor tests
// ============================================================================

#[test]
fn test_bbox_new() {
    let bbox = GeographicBoundingBox::new(60.0, 45.0, -70.0, -120.0).unwrap();
    assert_eq!(bbox.north(), 60.0);
    assert_eq!(bbox.south(), 45.0);
    assert_eq!(bbox.east(), -70.0);
    assert_eq!(bbox.west(), -120.0);
}

#[test]
fn test_bbox_rejects_non_finite() {
    let result = GeographicBoundingBox::new(f64::NAN, 45.0, -70.0, -120.0);
    assert!(matches!(result, Err(BboxParseError::NotFinite)));
}

#[test]
fn test_bbox_rejects_latitude_beyond_pole() {
    let result = GeographicBoundingBox::new(91.0, 45.0, -70.0, -120.0);
    assert!(matches!(
        result,
        Err(BboxParseError::LatitudeOutOfRange { .. })
    ));
}

#[test]
fn test_bbox_rejects_antimeridian_crossing() {
    // west > east would mean wrapping through 180 degrees
    let result = GeographicBoundingBox::new(60.0, 45.0, -170.0, 170.0);
    assert!(matches!(result, Err(BboxParseError::Inverted(_))));
}

// ============================================================================
// Parsing tests
// ============================================================================

#[test]
fn test_parse_invalid_format_too_few() {
    let result = GeographicBoundingBox::from_csv_string("60,45,-70");
    assert!(matches!(result, Err(BboxParseError::InvalidFormat(_))));
}

#[test]
fn test_parse_invalid_number() {
    let result = GeographicBoundingBox::from_csv_string("60,45,east,-120");
    assert!(matches!(result, Err(BboxParseError::InvalidNumber(n)) if n == "east"));
}

#[test]
fn test_deserialize_validates() {
    let ok: GeographicBoundingBox =
        serde_json::from_str(r#"{"north": 60, "south": 45, "east": -70, "west": -120}"#).unwrap();
    assert_eq!(ok.south(), 45.0);

    let inverted = serde_json::from_str::<GeographicBoundingBox>(
        r#"{"north": 45, "south": 60, "east": -70, "west": -120}"#,
    );
    assert!(inverted.is_err());

    let flat = serde_json::from_str::<GeographicBoundingBox>(
        r#"{"north": 50, "south": 50, "east": -70, "west": -120}"#,
    );
    assert!(flat.is_err());
}

// ============================================================================
// Containment tests
// ============================================================================

#[test]
fn test_canada_contains_major_cities() {
    let canada = GeographicBoundingBox::canada();
    assert!(canada.contains(-79.38, 43.65)); // Toronto
    assert!(canada.contains(-123.12, 49.28)); // Vancouver
    assert!(canada.contains(-63.57, 44.65)); // Halifax
    assert!(!canada.contains(79.38, 43.65)); // unsigned longitude
    assert!(!canada.contains(-0.13, 51.51)); // London
}

#[test]
fn test_contains_includes_edges() {
    let bbox = GeographicBoundingBox::new(10.0, 0.0, 10.0, 0.0).unwrap();
    assert!(bbox.contains(0.0, 0.0));
    assert!(bbox.contains(10.0, 10.0));
    assert!(!bbox.contains(10.0001, 5.0));
}
