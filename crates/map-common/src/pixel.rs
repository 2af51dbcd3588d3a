//! Pixel-space types for the rendered canvas.

use serde::{Deserialize, Serialize};

/// Dimensions of the raster a map is drawn onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    /// Canvas of the reference basemap (a vertical crop of a 3244x4208 source).
    pub const REFERENCE: CanvasSize = CanvasSize {
        width: 3244,
        height: 1408,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Check whether a signed pixel coordinate lies on the canvas.
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64
    }

    /// Clamp a signed pixel coordinate to the nearest on-canvas pixel.
    ///
    /// A zero-sized canvas has no pixels; the result is then (0, 0).
    pub fn clamp(&self, x: i64, y: i64) -> PixelPoint {
        let max_x = (self.width as i64 - 1).max(0);
        let max_y = (self.height as i64 - 1).max(0);
        PixelPoint {
            x: x.clamp(0, max_x) as u32,
            y: y.clamp(0, max_y) as u32,
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// A column/row position on the canvas.
///
/// Ordered row-major so that point sets iterate top-to-bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PixelPoint {
    pub y: u32,
    pub x: u32,
}

impl PixelPoint {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}
