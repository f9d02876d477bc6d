//! Geometry types for vector features.
//!
//! All geometries are stored in the working projection (Web-Mercator metres).
//! Conversion to and from geographic coordinates happens in the format layer.

use thiserror::Error;

/// Minimum number of coordinates in a line string.
pub const MIN_LINE_COORDS: usize = 2;

/// Minimum number of coordinates in a closed polygon ring (first == last).
pub const MIN_RING_COORDS: usize = 4;

/// A coordinate pair in the working projection.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another coordinate.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Offset this coordinate by `(dx, dy)`.
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Whether both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Compare two coordinates within an absolute tolerance.
    pub fn approx_eq(&self, other: &Coordinate, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance && (self.y - other.y).abs() <= tolerance
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// An axis-aligned bounding extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    /// Extent covering a single coordinate.
    pub fn from_coordinate(c: Coordinate) -> Self {
        Self {
            min_x: c.x,
            min_y: c.y,
            max_x: c.x,
            max_y: c.y,
        }
    }

    /// Grow the extent to include `c`.
    pub fn extend(&mut self, c: Coordinate) {
        self.min_x = self.min_x.min(c.x);
        self.min_y = self.min_y.min(c.y);
        self.max_x = self.max_x.max(c.x);
        self.max_y = self.max_y.max(c.y);
    }

    /// Union of two extents.
    pub fn union(&self, other: &Extent) -> Extent {
        Extent {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Compute the extent of a coordinate sequence. Returns None when empty.
    pub fn of<'a>(coords: impl IntoIterator<Item = &'a Coordinate>) -> Option<Extent> {
        let mut iter = coords.into_iter();
        let mut extent = Extent::from_coordinate(*iter.next()?);
        for c in iter {
            extent.extend(*c);
        }
        Some(extent)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Check if a coordinate lies inside (or on the edge of) the extent.
    pub fn contains(&self, c: &Coordinate) -> bool {
        c.x >= self.min_x && c.x <= self.max_x && c.y >= self.min_y && c.y <= self.max_y
    }
}

/// The drawable geometry kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    LineString,
    Polygon,
}

impl GeometryKind {
    /// GeoJSON type name.
    pub fn name(&self) -> &'static str {
        match self {
            GeometryKind::Point => "Point",
            GeometryKind::LineString => "LineString",
            GeometryKind::Polygon => "Polygon",
        }
    }

    /// All drawable kinds.
    pub fn all() -> &'static [GeometryKind] {
        &[
            GeometryKind::Point,
            GeometryKind::LineString,
            GeometryKind::Polygon,
        ]
    }
}

/// Errors raised when a geometry violates its structural invariants.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("line string needs at least {MIN_LINE_COORDS} coordinates, got {found}")]
    TooFewLineCoordinates { found: usize },

    #[error("polygon needs at least one ring")]
    NoRings,

    #[error("polygon ring {ring} needs at least {MIN_RING_COORDS} coordinates, got {found}")]
    TooFewRingCoordinates { ring: usize, found: usize },

    #[error("polygon ring {ring} is not closed")]
    RingNotClosed { ring: usize },

    #[error("multi-geometry has no members")]
    EmptyMulti,

    #[error("coordinate ({x}, {y}) is not finite")]
    NonFinite { x: f64, y: f64 },
}

/// A linear ring: closed sequence of coordinates.
pub type Ring = Vec<Coordinate>;

/// Vector geometry in the working projection.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Coordinate),
    LineString(Vec<Coordinate>),
    Polygon(Vec<Ring>),
    MultiPoint(Vec<Coordinate>),
    MultiLineString(Vec<Vec<Coordinate>>),
    MultiPolygon(Vec<Vec<Ring>>),
}

impl Geometry {
    /// GeoJSON type name of this geometry.
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::LineString(_) => "LineString",
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPoint(_) => "MultiPoint",
            Geometry::MultiLineString(_) => "MultiLineString",
            Geometry::MultiPolygon(_) => "MultiPolygon",
        }
    }

    /// The drawable kind this geometry belongs to (multi variants map to their member kind).
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point(_) | Geometry::MultiPoint(_) => GeometryKind::Point,
            Geometry::LineString(_) | Geometry::MultiLineString(_) => GeometryKind::LineString,
            Geometry::Polygon(_) | Geometry::MultiPolygon(_) => GeometryKind::Polygon,
        }
    }

    /// Check the structural invariants for this geometry type.
    pub fn validate(&self) -> Result<(), GeometryError> {
        match self {
            Geometry::Point(c) => check_finite(c),
            Geometry::LineString(coords) => validate_line(coords),
            Geometry::Polygon(rings) => validate_polygon(rings),
            Geometry::MultiPoint(points) => {
                if points.is_empty() {
                    return Err(GeometryError::EmptyMulti);
                }
                points.iter().try_for_each(check_finite)
            }
            Geometry::MultiLineString(lines) => {
                if lines.is_empty() {
                    return Err(GeometryError::EmptyMulti);
                }
                lines.iter().try_for_each(|l| validate_line(l))
            }
            Geometry::MultiPolygon(polygons) => {
                if polygons.is_empty() {
                    return Err(GeometryError::EmptyMulti);
                }
                polygons.iter().try_for_each(|p| validate_polygon(p))
            }
        }
    }

    /// Iterate over every coordinate of the geometry.
    pub fn coords(&self) -> Box<dyn Iterator<Item = &Coordinate> + '_> {
        match self {
            Geometry::Point(c) => Box::new(std::iter::once(c)),
            Geometry::LineString(coords) | Geometry::MultiPoint(coords) => Box::new(coords.iter()),
            Geometry::Polygon(rings) | Geometry::MultiLineString(rings) => {
                Box::new(rings.iter().flatten())
            }
            Geometry::MultiPolygon(polygons) => Box::new(polygons.iter().flatten().flatten()),
        }
    }

    /// Apply `f` to every coordinate in place.
    pub fn map_coords_in_place(&mut self, mut f: impl FnMut(&mut Coordinate)) {
        match self {
            Geometry::Point(c) => f(c),
            Geometry::LineString(coords) | Geometry::MultiPoint(coords) => {
                coords.iter_mut().for_each(f)
            }
            Geometry::Polygon(rings) | Geometry::MultiLineString(rings) => {
                rings.iter_mut().flatten().for_each(f)
            }
            Geometry::MultiPolygon(polygons) => polygons.iter_mut().flatten().flatten().for_each(f),
        }
    }

    /// Return a copy with `f` applied to every coordinate.
    pub fn map_coords(&self, f: impl FnMut(&mut Coordinate)) -> Geometry {
        let mut copy = self.clone();
        copy.map_coords_in_place(f);
        copy
    }

    /// Move the whole geometry by `(dx, dy)`.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.map_coords_in_place(|c| *c = c.offset(dx, dy));
    }

    /// Bounding extent of the geometry.
    pub fn extent(&self) -> Option<Extent> {
        Extent::of(self.coords())
    }

    /// Find the vertex closest to `target` within `tolerance`.
    pub fn nearest_vertex(&self, target: &Coordinate, tolerance: f64) -> Option<VertexRef> {
        let mut best: Option<(VertexRef, f64)> = None;
        self.for_each_vertex(|vertex, c| {
            let d = c.distance_to(target);
            if d <= tolerance && best.is_none_or(|(_, best_d)| d < best_d) {
                best = Some((vertex, d));
            }
        });
        best.map(|(vertex, _)| vertex)
    }

    /// Move a single vertex. Moving the first or last vertex of a ring moves both,
    /// keeping the ring closed. Returns false if the vertex does not exist.
    pub fn move_vertex(&mut self, vertex: VertexRef, to: Coordinate) -> bool {
        let VertexRef { part, ring, index } = vertex;
        match self {
            Geometry::Point(c) => {
                if index != 0 {
                    return false;
                }
                *c = to;
                true
            }
            Geometry::LineString(coords) => set_coord(coords, index, to),
            Geometry::MultiPoint(coords) => set_coord(coords, part, to),
            Geometry::MultiLineString(lines) => lines
                .get_mut(part)
                .is_some_and(|line| set_coord(line, index, to)),
            Geometry::Polygon(rings) => rings
                .get_mut(ring)
                .is_some_and(|r| set_ring_coord(r, index, to)),
            Geometry::MultiPolygon(polygons) => polygons
                .get_mut(part)
                .and_then(|p| p.get_mut(ring))
                .is_some_and(|r| set_ring_coord(r, index, to)),
        }
    }

    /// Hit-test the geometry at `target`.
    ///
    /// Points and lines are hit within `tolerance`; polygons are hit inside
    /// their outer ring (and outside any holes) or within `tolerance` of an edge.
    pub fn hit_test(&self, target: &Coordinate, tolerance: f64) -> bool {
        match self {
            Geometry::Point(c) => c.distance_to(target) <= tolerance,
            Geometry::MultiPoint(points) => points.iter().any(|c| c.distance_to(target) <= tolerance),
            Geometry::LineString(coords) => near_path(coords, target, tolerance),
            Geometry::MultiLineString(lines) => {
                lines.iter().any(|l| near_path(l, target, tolerance))
            }
            Geometry::Polygon(rings) => polygon_hit(rings, target, tolerance),
            Geometry::MultiPolygon(polygons) => polygons
                .iter()
                .any(|p| polygon_hit(p, target, tolerance)),
        }
    }

    fn for_each_vertex(&self, mut f: impl FnMut(VertexRef, &Coordinate)) {
        match self {
            Geometry::Point(c) => f(VertexRef::at(0), c),
            Geometry::LineString(coords) => {
                for (i, c) in coords.iter().enumerate() {
                    f(VertexRef::at(i), c);
                }
            }
            Geometry::MultiPoint(coords) => {
                for (i, c) in coords.iter().enumerate() {
                    f(VertexRef::new(i, 0, 0), c);
                }
            }
            Geometry::MultiLineString(lines) => {
                for (p, line) in lines.iter().enumerate() {
                    for (i, c) in line.iter().enumerate() {
                        f(VertexRef::new(p, 0, i), c);
                    }
                }
            }
            Geometry::Polygon(rings) => {
                for (r, ring) in rings.iter().enumerate() {
                    // The closing coordinate duplicates the first one.
                    for (i, c) in ring.iter().enumerate().take(ring.len().saturating_sub(1)) {
                        f(VertexRef::new(0, r, i), c);
                    }
                }
            }
            Geometry::MultiPolygon(polygons) => {
                for (p, rings) in polygons.iter().enumerate() {
                    for (r, ring) in rings.iter().enumerate() {
                        for (i, c) in ring.iter().enumerate().take(ring.len().saturating_sub(1)) {
                            f(VertexRef::new(p, r, i), c);
                        }
                    }
                }
            }
        }
    }
}

/// Address of a single vertex inside a geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexRef {
    /// Member index for multi geometries, 0 otherwise.
    pub part: usize,
    /// Ring index for polygons, 0 otherwise.
    pub ring: usize,
    /// Coordinate index within the ring or line.
    pub index: usize,
}

impl VertexRef {
    pub fn new(part: usize, ring: usize, index: usize) -> Self {
        Self { part, ring, index }
    }

    /// Vertex of a single-part, single-ring geometry.
    pub fn at(index: usize) -> Self {
        Self::new(0, 0, index)
    }
}

/// Close a ring by appending its first coordinate if needed.
pub fn close_ring(mut ring: Ring) -> Ring {
    if let (Some(first), Some(last)) = (ring.first().copied(), ring.last().copied())
        && first != last
    {
        ring.push(first);
    }
    ring
}

fn check_finite(c: &Coordinate) -> Result<(), GeometryError> {
    if c.is_finite() {
        Ok(())
    } else {
        Err(GeometryError::NonFinite { x: c.x, y: c.y })
    }
}

fn validate_line(coords: &[Coordinate]) -> Result<(), GeometryError> {
    if coords.len() < MIN_LINE_COORDS {
        return Err(GeometryError::TooFewLineCoordinates {
            found: coords.len(),
        });
    }
    coords.iter().try_for_each(check_finite)
}

fn validate_polygon(rings: &[Ring]) -> Result<(), GeometryError> {
    if rings.is_empty() {
        return Err(GeometryError::NoRings);
    }
    for (i, ring) in rings.iter().enumerate() {
        if ring.len() < MIN_RING_COORDS {
            return Err(GeometryError::TooFewRingCoordinates {
                ring: i,
                found: ring.len(),
            });
        }
        if ring.first() != ring.last() {
            return Err(GeometryError::RingNotClosed { ring: i });
        }
        ring.iter().try_for_each(check_finite)?;
    }
    Ok(())
}

fn set_coord(coords: &mut [Coordinate], index: usize, to: Coordinate) -> bool {
    match coords.get_mut(index) {
        Some(c) => {
            *c = to;
            true
        }
        None => false,
    }
}

fn set_ring_coord(ring: &mut Ring, index: usize, to: Coordinate) -> bool {
    let last = ring.len().saturating_sub(1);
    if ring.is_empty() || index > last {
        return false;
    }
    ring[index] = to;
    if index == 0 {
        ring[last] = to;
    } else if index == last {
        ring[0] = to;
    }
    true
}

/// Distance from `p` to the segment `a`-`b`.
fn segment_distance(p: &Coordinate, a: &Coordinate, b: &Coordinate) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p.distance_to(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance_to(&Coordinate::new(a.x + t * dx, a.y + t * dy))
}

fn near_path(coords: &[Coordinate], target: &Coordinate, tolerance: f64) -> bool {
    match coords {
        [] => false,
        [only] => only.distance_to(target) <= tolerance,
        _ => coords
            .windows(2)
            .any(|w| segment_distance(target, &w[0], &w[1]) <= tolerance),
    }
}

/// Point-in-ring test using ray casting.
fn ring_contains(ring: &[Coordinate], p: &Coordinate) -> bool {
    if ring.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (xi, yi) = (ring[i].x, ring[i].y);
        let (xj, yj) = (ring[j].x, ring[j].y);
        if ((yi > p.y) != (yj > p.y)) && (p.x < (xj - xi) * (p.y - yi) / (yj - yi) + xi) {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn polygon_hit(rings: &[Ring], target: &Coordinate, tolerance: f64) -> bool {
    if rings.iter().any(|r| near_path(r, target, tolerance)) {
        return true;
    }
    let Some((outer, holes)) = rings.split_first() else {
        return false;
    };
    // Bounding-box reject before the ray cast
    if !Extent::of(outer).is_some_and(|e| e.contains(target)) {
        return false;
    }
    ring_contains(outer, target) && !holes.iter().any(|h| ring_contains(h, target))
}
