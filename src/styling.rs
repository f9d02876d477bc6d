//! Per-layer style mutation.
//!
//! Each setter changes exactly one field of the layer's style, leaving the
//! others untouched, and marks only that layer for re-rendering. Values are
//! validated before anything is written.

use thiserror::Error;

use crate::model::{Color, ColorParseError, LayerId, Style};
use crate::registry::LayerRegistry;

/// Errors raised by style mutations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StyleError {
    /// A numeric style parameter is out of range.
    #[error("invalid value {value} for {field}")]
    InvalidValue { field: &'static str, value: f32 },

    /// A color string could not be parsed.
    #[error(transparent)]
    InvalidColor(#[from] ColorParseError),

    /// The layer does not exist.
    #[error("unknown layer: {0}")]
    UnknownLayer(LayerId),
}

/// Check a stroke width: positive and finite.
pub fn validate_stroke_width(width: f32) -> Result<(), StyleError> {
    if width.is_finite() && width > 0.0 {
        Ok(())
    } else {
        Err(StyleError::InvalidValue {
            field: "stroke width",
            value: width,
        })
    }
}

/// Check an opacity: within `0.0..=1.0`.
pub fn validate_opacity(opacity: f32) -> Result<(), StyleError> {
    if (0.0..=1.0).contains(&opacity) {
        Ok(())
    } else {
        Err(StyleError::InvalidValue {
            field: "fill opacity",
            value: opacity,
        })
    }
}

/// Applies style changes to layers held by a [`LayerRegistry`].
pub struct StyleManager<'a> {
    registry: &'a mut LayerRegistry,
}

impl<'a> StyleManager<'a> {
    pub fn new(registry: &'a mut LayerRegistry) -> Self {
        Self { registry }
    }

    pub fn set_stroke_color(&mut self, layer: LayerId, color: Color) -> Result<Style, StyleError> {
        log::debug!("Stroke color of {} -> {}", layer, color.to_hex());
        self.apply(layer, |style| style.stroke_color = color)
    }

    pub fn set_stroke_width(&mut self, layer: LayerId, width: f32) -> Result<Style, StyleError> {
        validate_stroke_width(width)?;
        log::debug!("Stroke width of {} -> {}", layer, width);
        self.apply(layer, |style| style.stroke_width = width)
    }

    pub fn set_fill_opacity(&mut self, layer: LayerId, opacity: f32) -> Result<Style, StyleError> {
        validate_opacity(opacity)?;
        log::debug!("Fill opacity of {} -> {}", layer, opacity);
        self.apply(layer, |style| style.fill_color.a = opacity)
    }

    /// Change the fill color, keeping the current fill opacity.
    pub fn set_fill_color(&mut self, layer: LayerId, color: Color) -> Result<Style, StyleError> {
        log::debug!("Fill color of {} -> {}", layer, color.to_hex());
        self.apply(layer, |style| {
            style.fill_color = color.with_alpha(style.fill_color.a);
        })
    }

    /// Parse a hex color and apply it as the stroke color.
    pub fn set_stroke_color_hex(&mut self, layer: LayerId, hex: &str) -> Result<Style, StyleError> {
        let color = Color::from_hex(hex)?;
        self.set_stroke_color(layer, color)
    }

    /// Read-modify-write of a layer's style. Missing styles start from the default.
    fn apply(&mut self, layer: LayerId, edit: impl FnOnce(&mut Style)) -> Result<Style, StyleError> {
        self.registry
            .update(layer, |l| {
                let mut style = l.effective_style();
                edit(&mut style);
                l.style = Some(style);
                style
            })
            .ok_or(StyleError::UnknownLayer(layer))
    }
}
