//! Error types for import/export operations.

use thiserror::Error;

use crate::model::GeometryError;

/// Errors that can occur while importing or exporting layers.
#[derive(Error, Debug)]
pub enum FormatError {
    /// The text is not valid JSON, or does not match the expected structure
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Valid JSON, but not a usable GeoJSON document
    #[error("Invalid format: {message}")]
    InvalidFormat {
        /// Description of the format error
        message: String,
    },

    /// A geometry violates its structural invariants
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(#[from] GeometryError),

    /// Geometry type the editor cannot represent
    #[error("Unsupported geometry type '{kind}'")]
    UnsupportedGeometry {
        /// The GeoJSON type name that was encountered
        kind: String,
    },

    /// Coordinate reference system the editor cannot reproject from
    #[error("Unsupported coordinate reference system '{name}'")]
    UnsupportedCrs {
        /// The declared CRS name
        name: String,
    },

    /// File rejected by the extension filter
    #[error("Unsupported file '{name}': expected a .{extension} file")]
    UnsupportedFile {
        /// The rejected file name
        name: String,
        /// The accepted extension
        extension: &'static str,
    },

    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FormatError {
    /// Create an invalid format error with a message.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Create an unsupported geometry error.
    pub fn unsupported_geometry(kind: impl Into<String>) -> Self {
        Self::UnsupportedGeometry { kind: kind.into() }
    }

    /// Whether this error means the input text itself was malformed.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::Parse(_) | Self::InvalidFormat { .. } | Self::InvalidGeometry(_)
        )
    }
}
