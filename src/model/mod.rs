//! Data models for the map editor.

mod feature;
mod geometry;
mod layer;
mod style;

pub use feature::{Feature, FeatureCollection, Properties};
pub use geometry::{
    Coordinate, Extent, Geometry, GeometryError, GeometryKind, MIN_LINE_COORDS, MIN_RING_COORDS,
    Ring, VertexRef, close_ring,
};
pub use layer::{Layer, LayerId, LayerSource};
pub use style::{
    Color, ColorParseError, DEFAULT_FILL_OPACITY, DEFAULT_STROKE_COLOR, DEFAULT_STROKE_WIDTH,
    Style,
};
