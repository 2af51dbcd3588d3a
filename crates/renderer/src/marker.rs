//! Marker radii.
//!
//! Radii come from an injected [`RadiusSource`] so renders can be made
//! reproducible. Every radius is then clamped so the marker never extends
//! past a canvas edge.

use map_common::{CanvasSize, PixelPoint};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::RenderError;

/// Smallest jittered radius, in pixels.
pub const DEFAULT_MIN_RADIUS: u32 = 40;

/// Largest jittered radius, in pixels (inclusive).
pub const DEFAULT_MAX_RADIUS: u32 = 99;

/// Supplies one radius per marker, in drawing order.
pub trait RadiusSource: Send {
    fn next_radius(&mut self) -> u32;
}

/// Uniformly random radii in `[min, max]`.
#[derive(Debug, Clone)]
pub struct JitteredRadius {
    rng: StdRng,
    min: u32,
    max: u32,
}

impl JitteredRadius {
    /// Create a jittered source; `seed` of `None` seeds from OS entropy.
    pub fn new(min: u32, max: u32, seed: Option<u64>) -> Result<Self, RenderError> {
        if min > max {
            return Err(RenderError::InvalidStyle(format!(
                "radius range is empty: {}..={}",
                min, max
            )));
        }
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self { rng, min, max })
    }

    /// Default range with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            min: DEFAULT_MIN_RADIUS,
            max: DEFAULT_MAX_RADIUS,
        }
    }

    /// Default range seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            min: DEFAULT_MIN_RADIUS,
            max: DEFAULT_MAX_RADIUS,
        }
    }

    pub fn range(&self) -> (u32, u32) {
        (self.min, self.max)
    }
}

impl RadiusSource for JitteredRadius {
    fn next_radius(&mut self) -> u32 {
        self.rng.gen_range(self.min..=self.max)
    }
}

/// The same radius for every marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedRadius(pub u32);

impl RadiusSource for FixedRadius {
    fn next_radius(&mut self) -> u32 {
        self.0
    }
}

/// Shrink `radius` so a marker at `point` stays inside the canvas.
///
/// `min(radius, H - y, W - x, x, y)`; a point on the top or left edge
/// always yields 0.
pub fn clamp_radius(radius: u32, point: PixelPoint, canvas: CanvasSize) -> u32 {
    let to_right = canvas.width.saturating_sub(point.x);
    let to_bottom = canvas.height.saturating_sub(point.y);
    radius
        .min(to_bottom)
        .min(to_right)
        .min(point.x)
        .min(point.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jitter_stays_in_range() {
        let mut source = JitteredRadius::seeded(7);
        for _ in 0..1000 {
            let r = source.next_radius();
            assert!((DEFAULT_MIN_RADIUS..=DEFAULT_MAX_RADIUS).contains(&r), "r = {}", r);
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = JitteredRadius::seeded(42);
        let mut b = JitteredRadius::seeded(42);
        let seq_a: Vec<u32> = (0..20).map(|_| a.next_radius()).collect();
        let seq_b: Vec<u32> = (0..20).map(|_| b.next_radius()).collect();
        assert_eq!(seq_a, seq_b);
    }

    #[test]
    fn test_rejects_empty_range() {
        assert!(JitteredRadius::new(10, 5, Some(1)).is_err());
        let mut single = JitteredRadius::new(5, 5, Some(1)).unwrap();
        assert_eq!(single.next_radius(), 5);
    }

    #[test]
    fn test_clamp_at_origin_is_zero() {
        let canvas = CanvasSize::new(100, 100);
        assert_eq!(clamp_radius(50, PixelPoint::new(0, 0), canvas), 0);
    }

    #[test]
    fn test_clamp_near_edges() {
        let canvas = CanvasSize::new(100, 80);
        assert_eq!(clamp_radius(50, PixelPoint::new(50, 40), canvas), 40);
        assert_eq!(clamp_radius(50, PixelPoint::new(95, 40), canvas), 5);
        assert_eq!(clamp_radius(50, PixelPoint::new(50, 78), canvas), 2);
        assert_eq!(clamp_radius(10, PixelPoint::new(50, 40), canvas), 10);
    }
}
