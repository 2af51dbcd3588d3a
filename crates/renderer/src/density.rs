//! Density map compositing.
//!
//! Each unique pixel gets one filled circle in the marker colour, blended
//! source-over onto the basemap, so dense areas darken as markers overlap.

use std::collections::BTreeSet;

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, Canvas};
use map_common::PixelPoint;
use tracing::debug;

use crate::basemap::Basemap;
use crate::error::RenderError;
use crate::marker::{clamp_radius, RadiusSource};
use crate::png;
use crate::style::DensityStyle;

/// Draws density markers with a fixed colour and opacity.
#[derive(Debug, Clone)]
pub struct DensityRenderer {
    fill: Rgba<u8>,
}

/// A composited map before encoding.
#[derive(Debug, Clone)]
pub struct DensityRender {
    pub image: RgbaImage,
    /// Distinct points after deduplication.
    pub unique_points: usize,
    /// Markers painted with a positive radius.
    pub markers_drawn: usize,
    /// Markers whose clamped radius was zero; counted, not painted.
    pub degenerate_markers: usize,
    /// Points outside the canvas; never drawn.
    pub skipped_off_canvas: usize,
}

/// An encoded map ready to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMap {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Markers represented in the image, degenerate ones included.
    pub markers: usize,
}

impl DensityRenderer {
    pub fn new(style: &DensityStyle) -> Result<Self, RenderError> {
        Ok(Self { fill: style.fill()? })
    }

    pub fn fill(&self) -> Rgba<u8> {
        self.fill
    }

    /// Composite one marker per unique point onto a copy of `basemap`.
    ///
    /// Points are visited in row-major order, drawing one radius from
    /// `radii` per on-canvas point, so a seeded source gives identical
    /// output for identical input regardless of input order.
    pub fn render(
        &self,
        basemap: &Basemap,
        points: impl IntoIterator<Item = PixelPoint>,
        radii: &mut dyn RadiusSource,
    ) -> DensityRender {
        let canvas_size = basemap.canvas();
        let unique: BTreeSet<PixelPoint> = points.into_iter().collect();

        let mut canvas = SourceOver(basemap.image().clone());
        let mut markers_drawn = 0;
        let mut degenerate_markers = 0;
        let mut skipped_off_canvas = 0;

        for point in &unique {
            if !canvas_size.contains(point.x as i64, point.y as i64) {
                skipped_off_canvas += 1;
                continue;
            }

            let radius = clamp_radius(radii.next_radius(), *point, canvas_size);
            if radius == 0 {
                degenerate_markers += 1;
                continue;
            }

            draw_filled_circle_mut(
                &mut canvas,
                (point.x as i32, point.y as i32),
                radius as i32,
                self.fill,
            );
            markers_drawn += 1;
        }

        debug!(
            unique = unique.len(),
            drawn = markers_drawn,
            degenerate = degenerate_markers,
            off_canvas = skipped_off_canvas,
            "Composited density markers"
        );

        DensityRender {
            image: canvas.0,
            unique_points: unique.len(),
            markers_drawn,
            degenerate_markers,
            skipped_off_canvas,
        }
    }
}

/// Canvas that composites every drawn pixel source-over in integer math.
///
/// An opaque destination stays exactly opaque for any marker alpha.
struct SourceOver(RgbaImage);

impl Canvas for SourceOver {
    type Pixel = Rgba<u8>;

    fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }

    fn get_pixel(&self, x: u32, y: u32) -> Self::Pixel {
        *self.0.get_pixel(x, y)
    }

    fn draw_pixel(&mut self, x: u32, y: u32, color: Self::Pixel) {
        let dst = self.0.get_pixel_mut(x, y);
        *dst = source_over(color, *dst);
    }
}

/// Porter-Duff "over" for straight-alpha 8-bit pixels.
fn source_over(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    let sa = src[3] as u32;
    let da = (dst[3] as u32 * (255 - sa) + 127) / 255;
    let out_a = sa + da;
    if out_a == 0 {
        return Rgba([0, 0, 0, 0]);
    }
    let channel = |i: usize| ((src[i] as u32 * sa + dst[i] as u32 * da + out_a / 2) / out_a) as u8;
    Rgba([channel(0), channel(1), channel(2), out_a as u8])
}

impl DensityRender {
    /// Encode the composited image as PNG.
    pub fn encode(&self) -> Result<RenderedMap, RenderError> {
        Ok(RenderedMap {
            png: png::encode_image(&self.image)?,
            width: self.image.width(),
            height: self.image.height(),
            markers: self.markers_drawn + self.degenerate_markers,
        })
    }
}
