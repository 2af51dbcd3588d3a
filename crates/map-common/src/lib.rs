//! Common types and utilities shared across the density-map crates.

pub mod bbox;
pub mod error;
pub mod location;
pub mod pixel;

pub use bbox::{BboxParseError, GeographicBoundingBox, ReferenceOrigin};
pub use error::{MapError, MapResult};
pub use location::{GeoCoord, PostalPrefix, StoryLocationRef};
pub use pixel::{CanvasSize, PixelPoint};
