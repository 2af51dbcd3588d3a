//! Tests for density compositing, basemap loading and PNG output.

use image::Rgba;
use map_common::{CanvasSize, MapError, PixelPoint};
use renderer::{
    Basemap, BasemapFit, DensityRenderer, DensityStyle, FixedRadius, JitteredRadius, RenderError,
};
use test_utils::{temp_test_dir, write_solid_basemap};

// ============================================================================
// Helper functions
// ============================================================================

fn black(width: u32, height: u32) -> Basemap {
    Basemap::blank(CanvasSize::new(width, height), [0, 0, 0])
}

fn renderer() -> DensityRenderer {
    DensityRenderer::new(&DensityStyle::default()).unwrap()
}

fn scattered_points() -> Vec<PixelPoint> {
    vec![
        PixelPoint::new(30, 30),
        PixelPoint::new(120, 40),
        PixelPoint::new(60, 90),
        PixelPoint::new(170, 110),
    ]
}

// ============================================================================
// Marker counting
// ============================================================================

#[test]
fn test_one_marker_per_unique_point() {
    let mut points = scattered_points();
    points.extend(scattered_points());
    let render = renderer().render(&black(200, 150), points, &mut FixedRadius(10));

    assert_eq!(render.unique_points, 4);
    assert_eq!(render.markers_drawn, 4);
    assert_eq!(render.degenerate_markers, 0);
    assert_eq!(render.encode().unwrap().markers, 4);
}

#[test]
fn test_edge_points_are_degenerate_but_counted() {
    let points = vec![PixelPoint::new(0, 0), PixelPoint::new(0, 50), PixelPoint::new(100, 75)];
    let render = renderer().render(&black(200, 150), points, &mut FixedRadius(20));
    assert_eq!(render.degenerate_markers, 2);
    assert_eq!(render.markers_drawn, 1);
    assert_eq!(render.encode().unwrap().markers, 3);
}

#[test]
fn test_no_points_leaves_basemap_untouched() {
    let basemap = black(40, 30);
    let render = renderer().render(&basemap, Vec::new(), &mut JitteredRadius::seeded(1));
    assert_eq!(render.image, *basemap.image());
}

// ============================================================================
// Compositing
// ============================================================================

#[test]
fn test_overlapping_markers_accumulate() {
    let points = vec![PixelPoint::new(50, 50), PixelPoint::new(60, 50)];
    let render = renderer().render(&black(120, 100), points, &mut FixedRadius(15));

    let single = render.image.get_pixel(38, 50)[0];
    let double = render.image.get_pixel(55, 50)[0];
    assert!(single > 0);
    assert!(double > single, "overlap {} should exceed single {}", double, single);
}

#[test]
fn test_marker_respects_radius() {
    let render = renderer().render(
        &black(100, 100),
        vec![PixelPoint::new(50, 50)],
        &mut FixedRadius(10),
    );
    assert_ne!(*render.image.get_pixel(50, 41), Rgba([0, 0, 0, 255]));
    assert_eq!(*render.image.get_pixel(50, 38), Rgba([0, 0, 0, 255]));
    assert_eq!(*render.image.get_pixel(63, 50), Rgba([0, 0, 0, 255]));
}

#[test]
fn test_custom_colour() {
    let style = DensityStyle {
        color: "#FF0000".to_string(),
        alpha: 1.0,
    };
    let render = DensityRenderer::new(&style).unwrap().render(
        &black(20, 20),
        vec![PixelPoint::new(10, 10)],
        &mut FixedRadius(3),
    );
    assert_eq!(*render.image.get_pixel(10, 10), Rgba([255, 0, 0, 255]));
}

// ============================================================================
// Reproducibility
// ============================================================================

#[test]
fn test_seeded_renders_are_identical() {
    let basemap = black(200, 150);
    let a = renderer()
        .render(&basemap, scattered_points(), &mut JitteredRadius::seeded(99))
        .encode()
        .unwrap();
    let mut reversed = scattered_points();
    reversed.reverse();
    let b = renderer()
        .render(&basemap, reversed, &mut JitteredRadius::seeded(99))
        .encode()
        .unwrap();
    assert_eq!(a.png, b.png);
}

// ============================================================================
// PNG output
// ============================================================================

#[test]
fn test_encoded_png_decodes_to_render() {
    let render = renderer().render(&black(64, 48), vec![PixelPoint::new(32, 24)], &mut FixedRadius(8));
    let map = render.encode().unwrap();
    assert_eq!((map.width, map.height), (64, 48));

    let decoded = image::load_from_memory(&map.png).unwrap().to_rgba8();
    assert_eq!(decoded, render.image);
}

// ============================================================================
// Basemap loading
// ============================================================================

#[test]
fn test_load_and_resize_basemap() {
    let dir = temp_test_dir();
    let path = write_solid_basemap(dir.path(), "base.png", 80, 60, [5, 10, 15]);
    let basemap = Basemap::load(&path, CanvasSize::new(40, 30), BasemapFit::Resize).unwrap();
    assert_eq!(basemap.canvas(), CanvasSize::new(40, 30));
    assert_eq!(*basemap.image().get_pixel(20, 15), Rgba([5, 10, 15, 255]));
}

#[test]
fn test_load_and_crop_basemap() {
    let dir = temp_test_dir();
    let path = dir.path().join("tall.png");
    test_utils::row_indexed_basemap(40, 200).save(&path).unwrap();

    let basemap =
        Basemap::load(&path, CanvasSize::new(40, 50), BasemapFit::CropRows { offset: 120 }).unwrap();
    assert_eq!(basemap.image().get_pixel(0, 0)[0], 120);
    assert_eq!(basemap.image().get_pixel(0, 49)[0], 169);
}

#[test]
fn test_missing_basemap_is_io_error() {
    let dir = temp_test_dir();
    let err = Basemap::load(&dir.path().join("absent.jpg"), CanvasSize::new(10, 10), BasemapFit::Resize)
        .unwrap_err();
    assert!(matches!(err, RenderError::Basemap { .. }));
    assert!(matches!(MapError::from(err), MapError::Io(_)));
}

#[test]
fn test_corrupt_basemap_is_io_error() {
    let dir = temp_test_dir();
    let path = dir.path().join("corrupt.png");
    std::fs::write(&path, b"not an image").unwrap();
    let err = Basemap::load(&path, CanvasSize::new(10, 10), BasemapFit::Resize).unwrap_err();
    assert!(matches!(MapError::from(err), MapError::Io(_)));
}
