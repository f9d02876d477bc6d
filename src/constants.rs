//! Global constants for the map editor.

/// Default pointer hit tolerance in working-projection units (metres).
pub const DEFAULT_HIT_TOLERANCE: f64 = 10.0;

/// Extension accepted by the import file picker.
pub const GEOJSON_EXTENSION: &str = "geojson";

/// File name offered for exported layers.
pub const EXPORT_FILE_NAME: &str = "layer.geojson";

/// MIME type of exported layers.
pub const EXPORT_MIME_TYPE: &str = "application/json";

/// Display name of layers imported under a blank name.
pub const UNNAMED_LAYER: &str = "Imported layer";
