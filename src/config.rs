//! Configuration file support for the map editor.
//!
//! Settings are stored as JSON. Missing fields fall back to defaults so that
//! older files keep loading after new settings are added.

use serde::{Deserialize, Serialize};

use crate::model::{Color, Style};
use crate::styling::{StyleError, validate_opacity, validate_stroke_width};

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Get the display name for this log level.
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Install the `env_logger` backend at the given level.
///
/// `RUST_LOG` still overrides the level per module. Calling this more than
/// once is harmless; only the first call installs a logger.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging(level: LogLevel) {
    let result = env_logger::Builder::new()
        .filter_level(level.to_level_filter())
        .parse_default_env()
        .try_init();
    if result.is_ok() {
        log::debug!("Logging initialized at level {}", level.name());
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Editor configuration that can be exported and imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Style given to newly imported layers
    #[serde(default)]
    pub default_style: StyleConfig,

    /// Initial state of the "show all layers" switch
    #[serde(default = "default_show_all")]
    pub show_all: bool,

    /// Pointer hit tolerance for modify/translate, in map units
    #[serde(default = "default_hit_tolerance")]
    pub hit_tolerance: f64,
}

fn default_show_all() -> bool {
    true
}

fn default_hit_tolerance() -> f64 {
    crate::constants::DEFAULT_HIT_TOLERANCE
}

/// Style section of the config, with colors as hex strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleConfig {
    /// Stroke color as `#rrggbb`
    #[serde(default = "default_color_hex")]
    pub stroke_color: String,

    /// Stroke width in pixels
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f32,

    /// Fill color as `#rrggbb`
    #[serde(default = "default_color_hex")]
    pub fill_color: String,

    /// Fill opacity in `0.0..=1.0`
    #[serde(default = "default_fill_opacity")]
    pub fill_opacity: f32,
}

fn default_color_hex() -> String {
    crate::model::DEFAULT_STROKE_COLOR.to_hex()
}

fn default_stroke_width() -> f32 {
    crate::model::DEFAULT_STROKE_WIDTH
}

fn default_fill_opacity() -> f32 {
    crate::model::DEFAULT_FILL_OPACITY
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            stroke_color: default_color_hex(),
            stroke_width: default_stroke_width(),
            fill_color: default_color_hex(),
            fill_opacity: default_fill_opacity(),
        }
    }
}

impl StyleConfig {
    /// Validate and convert to a [`Style`].
    pub fn to_style(&self) -> Result<Style, StyleError> {
        validate_stroke_width(self.stroke_width)?;
        validate_opacity(self.fill_opacity)?;
        Ok(Style {
            stroke_color: Color::from_hex(&self.stroke_color)?,
            stroke_width: self.stroke_width,
            fill_color: Color::from_hex(&self.fill_color)?.with_alpha(self.fill_opacity),
        })
    }
}

impl From<&Style> for StyleConfig {
    fn from(style: &Style) -> Self {
        Self {
            stroke_color: style.stroke_color.to_hex(),
            stroke_width: style.stroke_width,
            fill_color: style.fill_color.to_hex(),
            fill_opacity: style.fill_color.a,
        }
    }
}

impl EditorConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            log_level: LogLevel::default(),
            default_style: StyleConfig::default(),
            show_all: default_show_all(),
            hit_tolerance: default_hit_tolerance(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }
        if !(config.hit_tolerance.is_finite() && config.hit_tolerance >= 0.0) {
            return Err(ConfigError::InvalidValue(format!(
                "hit tolerance must be a non-negative number, got {}",
                config.hit_tolerance
            )));
        }
        config.default_style.to_style()?;

        Ok(config)
    }

    /// Get the default filename for config export.
    pub fn default_filename() -> &'static str {
        "mapedit-config.json"
    }

    /// Get the default config file path for auto-load/save.
    /// Returns None on WASM (no filesystem access).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("mapedit").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("mapedit")
                    .join(Self::default_filename())
            })
        }
    }

    /// Load configuration from a file.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match Self::load(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to a file, creating parent directories if needed.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// A setting is out of range
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// The default style cannot be used
    #[error("Invalid default style: {0}")]
    InvalidStyle(#[from] StyleError),

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
