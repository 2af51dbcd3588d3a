//! Error types for density-map regeneration.

use thiserror::Error;

/// Result type alias using MapError.
pub type MapResult<T> = Result<T, MapError>;

/// Primary error type for the regeneration pipeline.
///
/// Per-point variants (`UnresolvedLocation`, `ProjectionOutOfRange`) are
/// recovered where they occur and only reported; every other variant aborts
/// the run that produced it and leaves the published map untouched.
#[derive(Debug, Error)]
pub enum MapError {
    // === Per-run errors ===
    #[error("Reference dataset integrity error: {0}")]
    DataIntegrity(String),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("Record store error: {0}")]
    Store(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Background task failed: {0}")]
    Task(String),

    // === Per-point errors ===
    #[error("No gazetteer entry for postal prefix {0}")]
    UnresolvedLocation(String),

    #[error("Projected pixel ({x}, {y}) falls outside the {width}x{height} canvas")]
    ProjectionOutOfRange {
        x: i64,
        y: i64,
        width: u32,
        height: u32,
    },
}

impl MapError {
    /// Whether this error concerns a single point rather than the whole run.
    pub fn is_per_point(&self) -> bool {
        matches!(
            self,
            MapError::UnresolvedLocation(_) | MapError::ProjectionOutOfRange { .. }
        )
    }

    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            MapError::DataIntegrity(_) => "data_integrity",
            MapError::Io(_) => "io",
            MapError::Render(_) => "render",
            MapError::Store(_) => "store",
            MapError::InvalidConfig(_) => "invalid_config",
            MapError::Task(_) => "task",
            MapError::UnresolvedLocation(_) => "unresolved_location",
            MapError::ProjectionOutOfRange { .. } => "projection_out_of_range",
        }
    }
}

impl From<serde_json::Error> for MapError {
    fn from(err: serde_json::Error) -> Self {
        MapError::Store(format!("JSON error: {}", err))
    }
}

impl From<crate::bbox::BboxParseError> for MapError {
    fn from(err: crate::bbox::BboxParseError) -> Self {
        MapError::InvalidConfig(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_point_classification() {
        assert!(MapError::UnresolvedLocation("Z9Z".into()).is_per_point());
        assert!(MapError::ProjectionOutOfRange {
            x: -1,
            y: 5,
            width: 10,
            height: 10
        }
        .is_per_point());
        assert!(!MapError::DataIntegrity("missing CITY".into()).is_per_point());
        assert!(!MapError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full")).is_per_point());
    }

    #[test]
    fn test_io_conversion_keeps_kind() {
        let err: MapError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.kind(), "io");
    }
}
