//! Density map rendering.
//!
//! Composites translucent circular markers onto a basemap and encodes the
//! result as PNG:
//! - Basemap loading and fitting to the canvas
//! - Marker radius sources (jittered or fixed) and edge clamping
//! - Source-over compositing so overlapping markers accumulate
//! - PNG encoding (RGB or RGBA)

pub mod basemap;
pub mod density;
pub mod error;
pub mod marker;
pub mod png;
pub mod style;

pub use basemap::{Basemap, BasemapFit};
pub use density::{DensityRender, DensityRenderer, RenderedMap};
pub use error::RenderError;
pub use marker::{clamp_radius, FixedRadius, JitteredRadius, RadiusSource};
pub use style::DensityStyle;
