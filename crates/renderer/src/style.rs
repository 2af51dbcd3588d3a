//! Marker appearance.

use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::error::RenderError;

/// Colour and opacity of density markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DensityStyle {
    /// Hex colour, e.g. "#800080"
    pub color: String,
    /// Opacity in [0, 1]
    pub alpha: f32,
}

impl Default for DensityStyle {
    fn default() -> Self {
        Self {
            color: "#800080".to_string(),
            alpha: 0.3,
        }
    }
}

impl DensityStyle {
    /// The marker fill as a straight-alpha RGBA pixel.
    pub fn fill(&self) -> Result<Rgba<u8>, RenderError> {
        let (r, g, b) = hex_to_rgb(&self.color)
            .ok_or_else(|| RenderError::InvalidStyle(format!("bad colour '{}'", self.color)))?;
        if !self.alpha.is_finite() || !(0.0..=1.0).contains(&self.alpha) {
            return Err(RenderError::InvalidStyle(format!(
                "alpha must be within [0, 1], got {}",
                self.alpha
            )));
        }
        let a = (self.alpha * 255.0).round() as u8;
        Ok(Rgba([r, g, b, a]))
    }
}

/// Parse hex color string to RGB
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}
