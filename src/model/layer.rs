//! Vector layers.

use std::fmt;

use super::feature::FeatureCollection;
use super::geometry::Extent;
use super::style::Style;

/// Opaque handle identifying a layer for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub(crate) u32);

impl LayerId {
    /// The freehand drawing layer. Always present.
    pub const FREEHAND: LayerId = LayerId(0);

    pub fn is_freehand(&self) -> bool {
        *self == Self::FREEHAND
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer#{}", self.0)
    }
}

/// Where a layer's features came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerSource {
    /// The shared layer that draw/modify/translate operate on.
    Freehand,
    /// A layer created from an imported document.
    Imported { file_name: Option<String> },
}

/// A named, independently visible and styled collection of features.
#[derive(Debug, Clone)]
pub struct Layer {
    id: LayerId,
    pub name: String,
    pub source: LayerSource,
    pub features: FeatureCollection,
    pub visible: bool,
    /// Explicit style. `None` renders with [`Style::default`].
    pub style: Option<Style>,
}

impl Layer {
    pub(crate) fn freehand() -> Self {
        Self {
            id: LayerId::FREEHAND,
            name: "Drawing".to_string(),
            source: LayerSource::Freehand,
            features: FeatureCollection::new(),
            visible: true,
            style: None,
        }
    }

    pub(crate) fn imported(
        id: LayerId,
        name: impl Into<String>,
        file_name: Option<String>,
        features: FeatureCollection,
        visible: bool,
        style: Style,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            source: LayerSource::Imported { file_name },
            features,
            visible,
            style: Some(style),
        }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn is_freehand(&self) -> bool {
        matches!(self.source, LayerSource::Freehand)
    }

    /// The style used for rendering: the explicit one, or the default.
    pub fn effective_style(&self) -> Style {
        self.style.unwrap_or_default()
    }

    /// Bounding extent of the layer's features.
    pub fn extent(&self) -> Option<Extent> {
        self.features.extent()
    }
}
