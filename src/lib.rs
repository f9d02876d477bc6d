//! mapedit - Vector layer editing engine
//!
//! Draw, modify and translate shapes on a freehand layer, import GeoJSON
//! documents as styled layers, and export any layer back to GeoJSON. The
//! rendering engine stays outside the crate: an [`EditorSession`] records what
//! changed and hands it to a [`ViewBridge`] implementation on flush.
//!
//! ```rust
//! use mapedit::{EditorSession, GeometryKind, LayerId};
//!
//! let mut session = EditorSession::new();
//! let roads = session
//!     .import_text("roads", r#"{"type":"LineString","coordinates":[[0,0],[1,1]]}"#)
//!     .unwrap();
//! session.styles().set_stroke_width(roads, 3.0).unwrap();
//!
//! session.start_draw(GeometryKind::Point);
//! session.add_vertex(mapedit::Coordinate::new(10.0, 10.0)).unwrap();
//! assert_eq!(session.registry().freehand().features.len(), 1);
//!
//! let download = session.export_layer(LayerId::FREEHAND).unwrap();
//! assert_eq!(download.file_name, "layer.geojson");
//! ```

pub mod config;
pub mod constants;
mod error;
pub mod file;
pub mod format;
pub mod interaction;
pub mod model;
mod registry;
mod session;
mod styling;
pub mod view;

pub use config::{ConfigError, EditorConfig, LogLevel};
pub use error::{EditorError, Result};
pub use file::{DirectorySink, DownloadSink, FileDownload, ImportTicket};
pub use interaction::{
    DrawOutcome, InteractionController, InteractionKind, InteractionMode, ShapeCompleted,
};
pub use model::{
    Color, Coordinate, Extent, Feature, FeatureCollection, Geometry, GeometryError, GeometryKind,
    Layer, LayerId, Style,
};
pub use registry::LayerRegistry;
pub use session::EditorSession;
pub use styling::{StyleError, StyleManager, validate_opacity, validate_stroke_width};
pub use view::{Dirty, ViewBridge, ViewCommand};
