//! Layer import/export.
//!
//! Formats implement the [`LayerFormat`] trait and convert between text
//! documents and feature collections in the working projection. GeoJSON is
//! the only built-in format.
//!
//! ## Usage
//!
//! ```rust
//! use mapedit::format::{GeoJsonFormat, LayerFormat};
//!
//! let text = r#"{"type":"Point","coordinates":[12.5,41.9]}"#;
//! let imported = GeoJsonFormat.import_text(text).unwrap();
//! let exported = GeoJsonFormat.export_text(&imported.features).unwrap();
//! assert!(exported.contains("FeatureCollection"));
//! ```

mod error;
pub mod formats;
pub mod projection;
mod traits;

pub use error::FormatError;
pub use formats::{EXPORT_PROJECTION, GeoJsonFormat, WORKING_PROJECTION};
pub use projection::Projection;
pub use traits::{FormatWarning, ImportResult, LayerFormat};
