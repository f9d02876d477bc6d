//! Layer style model.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Default stroke color for new layers (`#3399cc`).
pub const DEFAULT_STROKE_COLOR: Color = Color::rgb(0x33, 0x99, 0xcc);

/// Default stroke width in screen pixels.
pub const DEFAULT_STROKE_WIDTH: f32 = 1.0;

/// Default fill opacity for new layers.
pub const DEFAULT_FILL_OPACITY: f32 = 0.6;

/// Error parsing a color string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid color '{input}': expected #rgb, #rrggbb or #rrggbbaa")]
pub struct ColorParseError {
    pub input: String,
}

/// An RGB color with a separate alpha channel in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    /// Opaque color from RGB components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with a different alpha.
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Parse a CSS hex color (`#rgb`, `#rrggbb` or `#rrggbbaa`).
    pub fn from_hex(input: &str) -> Result<Self, ColorParseError> {
        let err = || ColorParseError {
            input: input.to_string(),
        };
        let hex = input.trim().strip_prefix('#').ok_or_else(err)?;
        // from_str_radix alone would also take a sign
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }
        let byte = |s: &str| u8::from_str_radix(s, 16).map_err(|_| err());

        match hex.len() {
            3 => {
                let mut channels = [0u8; 3];
                for (i, c) in hex.chars().enumerate() {
                    let v = c.to_digit(16).ok_or_else(err)? as u8;
                    channels[i] = v * 17;
                }
                Ok(Color::rgb(channels[0], channels[1], channels[2]))
            }
            6 => Ok(Color::rgb(byte(&hex[0..2])?, byte(&hex[2..4])?, byte(&hex[4..6])?)),
            8 => Ok(Color::rgba(
                byte(&hex[0..2])?,
                byte(&hex[2..4])?,
                byte(&hex[4..6])?,
                f32::from(byte(&hex[6..8])?) / 255.0,
            )),
            _ => Err(err()),
        }
    }

    /// `#rrggbb` representation, ignoring alpha.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// CSS `rgba(...)` representation.
    pub fn to_css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::from_hex(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

/// Visual configuration applied uniformly to every feature of a layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub stroke_color: Color,
    pub stroke_width: f32,
    pub fill_color: Color,
}

impl Style {
    /// Opacity of the fill color.
    pub fn fill_opacity(&self) -> f32 {
        self.fill_color.a
    }
}

impl Default for Style {
    fn default() -> Self {
        Self {
            stroke_color: DEFAULT_STROKE_COLOR,
            stroke_width: DEFAULT_STROKE_WIDTH,
            fill_color: DEFAULT_STROKE_COLOR.with_alpha(DEFAULT_FILL_OPACITY),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_colors() {
        assert_eq!(Color::from_hex("#ff0000").unwrap(), Color::rgb(255, 0, 0));
        assert_eq!(Color::from_hex("#0f0").unwrap(), Color::rgb(0, 255, 0));
        assert_eq!("#3399CC".parse::<Color>().unwrap(), DEFAULT_STROKE_COLOR);

        assert!(Color::from_hex("#+f+f+f").is_err());
        assert!(Color::from_hex("#+ff+ff+f").is_err());
        assert!(Color::from_hex("#-1ffff").is_err());
        let translucent = Color::from_hex("#00000080").unwrap();
        assert!((translucent.a - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Color::from_hex("ff0000").is_err());
        assert!(Color::from_hex("#ff00").is_err());
        assert!(Color::from_hex("#gg0000").is_err());
        assert!(Color::from_hex("#ééé").is_err());
    }

    #[test]
    fn test_format_colors() {
        let color = Color::rgba(51, 153, 204, 0.6);
        assert_eq!(color.to_hex(), "#3399cc");
        assert_eq!(color.to_css(), "rgba(51, 153, 204, 0.6)");
    }

    #[test]
    fn test_default_style() {
        let style = Style::default();
        assert_eq!(style.stroke_width, 1.0);
        assert_eq!(style.fill_opacity(), 0.6);
        assert_eq!(style.stroke_color, DEFAULT_STROKE_COLOR);
    }
}
