//! Error types for rendering operations.

use std::io;
use std::path::PathBuf;

use map_common::MapError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    /// Basemap file could not be read or decoded
    #[error("Failed to load basemap {path}: {source}")]
    Basemap {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Basemap does not cover the requested crop
    #[error("Basemap is {width}x{height}, cannot crop {needed_width}x{needed_height} at row {offset}")]
    BasemapTooSmall {
        width: u32,
        height: u32,
        needed_width: u32,
        needed_height: u32,
        offset: u32,
    },

    /// Invalid marker or colour settings
    #[error("Invalid style: {0}")]
    InvalidStyle(String),

    /// PNG encoding failed
    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

impl From<RenderError> for MapError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Basemap { path, source } => match source {
                image::ImageError::IoError(e) => MapError::Io(io::Error::new(
                    e.kind(),
                    format!("basemap {}: {}", path.display(), e),
                )),
                other => MapError::Io(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("basemap {}: {}", path.display(), other),
                )),
            },
            RenderError::InvalidStyle(msg) => MapError::InvalidConfig(msg),
            other => MapError::Render(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_basemap_is_io() {
        let err = RenderError::Basemap {
            path: PathBuf::from("missing.jpg"),
            source: image::ImageError::IoError(io::Error::new(io::ErrorKind::NotFound, "gone")),
        };
        match MapError::from(err) {
            MapError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
            other => panic!("expected Io, got {:?}", other),
        }
    }

    #[test]
    fn test_encode_failure_is_render() {
        let err: MapError = RenderError::Encode("boom".into()).into();
        assert_eq!(err.kind(), "render");
    }
}
