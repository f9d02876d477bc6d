//! Top-level error type for editor session operations.

use thiserror::Error;

use crate::format::FormatError;
use crate::model::{GeometryError, LayerId};
use crate::styling::StyleError;

/// Errors returned by [`EditorSession`](crate::EditorSession).
#[derive(Error, Debug)]
pub enum EditorError {
    /// Import or export failed
    #[error(transparent)]
    Format(#[from] FormatError),

    /// A style change was rejected
    #[error(transparent)]
    Style(#[from] StyleError),

    /// A drawn shape is not a valid geometry
    #[error("Rejected drawn shape: {0}")]
    Geometry(#[from] GeometryError),

    /// The layer handle does not refer to a registered layer
    #[error("Unknown layer: {0}")]
    UnknownLayer(LayerId),
}

pub type Result<T> = std::result::Result<T, EditorError>;
