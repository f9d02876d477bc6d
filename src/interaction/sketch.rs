//! In-progress drawing state for the Draw interaction.

use crate::model::{Coordinate, Geometry, GeometryKind, MIN_LINE_COORDS, close_ring};

/// Minimum number of distinct vertices for a polygon sketch.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Vertices collected while the user is drawing a shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Sketch {
    kind: GeometryKind,
    vertices: Vec<Coordinate>,
}

impl Sketch {
    pub fn new(kind: GeometryKind) -> Self {
        Self {
            kind,
            vertices: Vec::new(),
        }
    }

    pub fn kind(&self) -> GeometryKind {
        self.kind
    }

    pub fn vertices(&self) -> &[Coordinate] {
        &self.vertices
    }

    /// Add a clicked vertex. Repeated clicks on the same spot (the first half
    /// of a double-click) are collapsed.
    pub fn push(&mut self, vertex: Coordinate) {
        if self.vertices.last() != Some(&vertex) {
            self.vertices.push(vertex);
        }
    }

    /// Whether the sketch finishes on its own after the last vertex.
    /// Only points do; lines and polygons need an explicit finish.
    pub fn is_complete(&self) -> bool {
        self.kind == GeometryKind::Point && !self.vertices.is_empty()
    }

    /// Build the finished geometry, or None if too few vertices were collected.
    pub fn to_geometry(&self) -> Option<Geometry> {
        match self.kind {
            GeometryKind::Point => self.vertices.first().map(|c| Geometry::Point(*c)),
            GeometryKind::LineString => (self.vertices.len() >= MIN_LINE_COORDS)
                .then(|| Geometry::LineString(self.vertices.clone())),
            GeometryKind::Polygon => {
                let mut ring = self.vertices.clone();
                // A click on the first vertex closes the ring explicitly
                if ring.len() > 1 && ring.first() == ring.last() {
                    ring.pop();
                }
                if ring.len() < MIN_POLYGON_VERTICES {
                    return None;
                }
                Some(Geometry::Polygon(vec![close_ring(ring)]))
            }
        }
    }

    /// Geometry for rendering the sketch while it is still being drawn.
    /// Polygons preview as an open path.
    pub fn preview(&self) -> Option<Geometry> {
        match (self.kind, self.vertices.as_slice()) {
            (_, []) => None,
            (GeometryKind::Point, [first, ..]) => Some(Geometry::Point(*first)),
            (_, [only]) => Some(Geometry::Point(*only)),
            (_, vertices) => Some(Geometry::LineString(vertices.to_vec())),
        }
    }
}
