//! Trait definitions for layer interchange formats.

use crate::format::error::FormatError;
use crate::format::projection::Projection;
use crate::model::FeatureCollection;

/// Trait for interchange format import/export implementations.
///
/// Implementations convert between text documents and feature collections in
/// the working projection, reprojecting coordinates on the way in and out.
pub trait LayerFormat {
    /// Unique identifier for this format (e.g. "geojson").
    fn id(&self) -> &'static str;

    /// Human-readable name for UI display.
    fn display_name(&self) -> &'static str;

    /// File extensions accepted by the file picker, without the leading dot.
    fn extensions(&self) -> &[&'static str];

    /// MIME type of exported documents.
    fn mime_type(&self) -> &'static str;

    /// Parse a document into features in the working projection.
    fn import_text(&self, text: &str) -> Result<ImportResult, FormatError>;

    /// Serialize features (in the working projection) into a document.
    fn export_text(&self, features: &FeatureCollection) -> Result<String, FormatError>;

    /// Whether a file name passes this format's extension filter.
    fn accepts_file_name(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.extensions()
            .iter()
            .any(|ext| lower.ends_with(&format!(".{}", ext)))
    }
}

/// Result of an import operation.
#[derive(Debug, Default)]
pub struct ImportResult {
    /// Imported features in the working projection.
    pub features: FeatureCollection,

    /// Coordinate reference system the document declared (or implied).
    pub source_projection: Option<Projection>,

    /// Non-fatal issues found while reading the document.
    pub warnings: Vec<FormatWarning>,
}

impl ImportResult {
    /// Add a warning to the result.
    pub fn add_warning(&mut self, warning: FormatWarning) {
        self.warnings.push(warning);
    }

    /// Check if there were any warnings.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Warning generated during format conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatWarning {
    /// Position of the feature this warning relates to (if applicable).
    pub feature: Option<usize>,

    /// Human-readable warning message.
    pub message: String,
}

impl FormatWarning {
    /// Create a new warning.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            feature: None,
            message: message.into(),
        }
    }

    /// Set the feature this warning relates to.
    pub fn with_feature(mut self, index: usize) -> Self {
        self.feature = Some(index);
        self
    }
}
