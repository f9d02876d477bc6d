//! GeoJSON format implementation.
//!
//! Documents are read as RFC 7946 GeoJSON with optional support for the
//! legacy `crs` member. Coordinates are reprojected from the document's
//! geographic reference system into the editor's Web-Mercator working
//! projection on import, and back again on export. Exported documents always
//! declare EPSG:4326.
//!
//! Accepted top-level objects are `FeatureCollection`, a single `Feature`, or
//! a bare geometry (wrapped into a feature with empty properties).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::format::error::FormatError;
use crate::format::projection::{MAX_LATITUDE, Projection};
use crate::format::traits::{FormatWarning, ImportResult, LayerFormat};
use crate::model::{Coordinate, Feature, FeatureCollection, Geometry, Properties, Ring};

/// Projection all in-memory geometries use.
pub const WORKING_PROJECTION: Projection = Projection::WebMercator;

/// Projection exported documents are written in.
pub const EXPORT_PROJECTION: Projection = Projection::Geographic;

/// GeoJSON format.
///
/// Supports:
/// - Point, LineString, Polygon and their Multi- variants
/// - Arbitrary feature properties, preserved verbatim and in order
/// - Foreign feature ids
///
/// Does not support:
/// - GeometryCollection
/// - Altitude (third coordinate components are dropped with a warning)
pub struct GeoJsonFormat;

impl LayerFormat for GeoJsonFormat {
    fn id(&self) -> &'static str {
        "geojson"
    }

    fn display_name(&self) -> &'static str {
        "GeoJSON"
    }

    fn extensions(&self) -> &[&'static str] {
        &["geojson"]
    }

    fn mime_type(&self) -> &'static str {
        "application/json"
    }

    fn import_text(&self, text: &str) -> Result<ImportResult, FormatError> {
        let document: RawDocument = serde_json::from_str(text)?;
        let source = match &document.crs {
            Some(crs) => crs.projection()?,
            None => Projection::Geographic,
        };

        let top_level = document.kind.clone();
        let raw_features = match top_level.as_str() {
            "FeatureCollection" => document
                .features
                .ok_or_else(|| FormatError::invalid_format("FeatureCollection without 'features'"))?,
            "Feature" => vec![RawFeature {
                kind: document.kind,
                geometry: document.geometry,
                properties: document.properties,
                id: document.id,
            }],
            _ => vec![RawFeature {
                kind: "Feature".to_string(),
                geometry: Some(RawGeometry {
                    kind: document.kind,
                    coordinates: document.coordinates,
                }),
                properties: None,
                id: None,
            }],
        };

        let mut reader = Reader::new(source);
        for (index, raw) in raw_features.into_iter().enumerate() {
            reader.feature(index, raw)?;
        }
        let result = reader.result;

        log::info!(
            "Imported {} GeoJSON features from {} ({} warnings)",
            result.features.len(),
            source.code(),
            result.warnings.len()
        );
        Ok(result)
    }

    fn export_text(&self, features: &FeatureCollection) -> Result<String, FormatError> {
        let document = OutCollection {
            kind: "FeatureCollection",
            crs: OutCrs {
                kind: "name",
                properties: OutCrsProperties {
                    name: EXPORT_PROJECTION.code(),
                },
            },
            features: features
                .iter()
                .map(|feature| OutFeature {
                    kind: "Feature",
                    id: feature.foreign_id.as_ref(),
                    geometry: OutGeometry::from(
                        &WORKING_PROJECTION.transform_geometry(EXPORT_PROJECTION, &feature.geometry),
                    ),
                    properties: &feature.properties,
                })
                .collect(),
        };

        let text = serde_json::to_string(&document)?;
        log::info!(
            "Exported {} GeoJSON features ({} bytes)",
            features.len(),
            text.len()
        );
        Ok(text)
    }
}

// ============================================================================
// Input structures
// ============================================================================

/// Any GeoJSON object; the members present depend on `type`.
#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    crs: Option<RawCrs>,
    #[serde(default)]
    features: Option<Vec<RawFeature>>,
    #[serde(default)]
    geometry: Option<RawGeometry>,
    #[serde(default)]
    properties: Option<Properties>,
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    coordinates: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    geometry: Option<RawGeometry>,
    #[serde(default)]
    properties: Option<Properties>,
    #[serde(default)]
    id: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Option<Value>,
}

/// Legacy (GeoJSON 2008) named CRS member.
#[derive(Debug, Deserialize)]
struct RawCrs {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    properties: Option<RawCrsProperties>,
}

#[derive(Debug, Deserialize)]
struct RawCrsProperties {
    #[serde(default)]
    name: Option<String>,
}

impl RawCrs {
    fn projection(&self) -> Result<Projection, FormatError> {
        let name = self.properties.as_ref().and_then(|p| p.name.as_deref());
        match (self.kind.as_str(), name) {
            ("name", Some(name)) => {
                Projection::from_name(name).ok_or_else(|| FormatError::UnsupportedCrs {
                    name: name.to_string(),
                })
            }
            (kind, _) => Err(FormatError::UnsupportedCrs {
                name: format!("{} crs", kind),
            }),
        }
    }
}

// ============================================================================
// Output structures
// ============================================================================

#[derive(Serialize)]
struct OutCollection<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    crs: OutCrs,
    features: Vec<OutFeature<'a>>,
}

#[derive(Serialize)]
struct OutCrs {
    #[serde(rename = "type")]
    kind: &'static str,
    properties: OutCrsProperties,
}

#[derive(Serialize)]
struct OutCrsProperties {
    name: &'static str,
}

#[derive(Serialize)]
struct OutFeature<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a Value>,
    geometry: OutGeometry,
    properties: &'a Properties,
}

type Position = [f64; 2];

#[derive(Serialize)]
#[serde(tag = "type", content = "coordinates")]
enum OutGeometry {
    Point(Position),
    LineString(Vec<Position>),
    Polygon(Vec<Vec<Position>>),
    MultiPoint(Vec<Position>),
    MultiLineString(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
}

fn position(c: &Coordinate) -> Position {
    [c.x, c.y]
}

fn positions(coords: &[Coordinate]) -> Vec<Position> {
    coords.iter().map(position).collect()
}

fn position_rings(rings: &[Ring]) -> Vec<Vec<Position>> {
    rings.iter().map(|r| positions(r)).collect()
}

impl From<&Geometry> for OutGeometry {
    fn from(geometry: &Geometry) -> Self {
        match geometry {
            Geometry::Point(c) => OutGeometry::Point(position(c)),
            Geometry::LineString(coords) => OutGeometry::LineString(positions(coords)),
            Geometry::Polygon(rings) => OutGeometry::Polygon(position_rings(rings)),
            Geometry::MultiPoint(coords) => OutGeometry::MultiPoint(positions(coords)),
            Geometry::MultiLineString(lines) => OutGeometry::MultiLineString(position_rings(lines)),
            Geometry::MultiPolygon(polygons) => {
                OutGeometry::MultiPolygon(polygons.iter().map(|p| position_rings(p)).collect())
            }
        }
    }
}

// ============================================================================
// Conversion
// ============================================================================

/// Converts raw features into validated, reprojected features.
struct Reader {
    source: Projection,
    result: ImportResult,
    /// Whether the current feature had a coordinate with altitude.
    dropped_altitude: bool,
    /// Whether the current feature had a latitude outside the Mercator range.
    clamped_latitude: bool,
}

impl Reader {
    fn new(source: Projection) -> Self {
        Self {
            source,
            result: ImportResult {
                source_projection: Some(source),
                ..ImportResult::default()
            },
            dropped_altitude: false,
            clamped_latitude: false,
        }
    }

    /// Convert one feature. Features without geometry are skipped with a warning.
    fn feature(&mut self, index: usize, raw: RawFeature) -> Result<(), FormatError> {
        if raw.kind != "Feature" {
            return Err(FormatError::invalid_format(format!(
                "expected a Feature at position {}, found '{}'",
                index, raw.kind
            )));
        }
        let Some(raw_geometry) = raw.geometry else {
            log::debug!("Skipping feature {} without geometry", index);
            self.result.add_warning(
                FormatWarning::new("feature has no geometry and was skipped").with_feature(index),
            );
            return Ok(());
        };

        self.dropped_altitude = false;
        self.clamped_latitude = false;
        let geometry = self.geometry(raw_geometry)?;
        geometry.validate().inspect_err(|e| {
            log::warn!("Rejecting feature {}: {}", index, e);
        })?;

        if self.dropped_altitude {
            self.result
                .add_warning(FormatWarning::new("altitude values were dropped").with_feature(index));
        }
        if self.clamped_latitude {
            self.result.add_warning(
                FormatWarning::new("latitudes beyond the Web-Mercator limit were clamped")
                    .with_feature(index),
            );
        }

        self.result.features.push(Feature {
            geometry: self.source.transform_geometry(WORKING_PROJECTION, &geometry),
            properties: raw.properties.unwrap_or_default(),
            foreign_id: raw.id,
        });
        Ok(())
    }

    fn geometry(&mut self, raw: RawGeometry) -> Result<Geometry, FormatError> {
        let kind = raw.kind.as_str();
        if !matches!(
            kind,
            "Point" | "LineString" | "Polygon" | "MultiPoint" | "MultiLineString" | "MultiPolygon"
        ) {
            return Err(FormatError::unsupported_geometry(kind));
        }
        let coords = raw.coordinates.as_ref().ok_or_else(|| {
            FormatError::invalid_format(format!("{} geometry has no coordinates", kind))
        })?;

        Ok(match kind {
            "Point" => Geometry::Point(self.position(coords)?),
            "LineString" => Geometry::LineString(self.positions(coords)?),
            "Polygon" => Geometry::Polygon(self.rings(coords)?),
            "MultiPoint" => Geometry::MultiPoint(self.positions(coords)?),
            "MultiLineString" => Geometry::MultiLineString(self.rings(coords)?),
            _ => Geometry::MultiPolygon(
                array(coords, "polygon list")?
                    .iter()
                    .map(|p| self.rings(p))
                    .collect::<Result<_, _>>()?,
            ),
        })
    }

    fn position(&mut self, value: &Value) -> Result<Coordinate, FormatError> {
        let items = array(value, "position")?;
        let mut numbers = items.iter().map(Value::as_f64);
        let (Some(Some(x)), Some(Some(y))) = (numbers.next(), numbers.next()) else {
            return Err(FormatError::invalid_format(format!(
                "position must start with two numbers, found {}",
                value
            )));
        };
        if items.len() > 2 {
            self.dropped_altitude = true;
        }
        if self.source == Projection::Geographic && y.abs() > MAX_LATITUDE {
            self.clamped_latitude = true;
        }
        Ok(Coordinate::new(x, y))
    }

    fn positions(&mut self, value: &Value) -> Result<Vec<Coordinate>, FormatError> {
        array(value, "position list")?
            .iter()
            .map(|v| self.position(v))
            .collect()
    }

    fn rings(&mut self, value: &Value) -> Result<Vec<Vec<Coordinate>>, FormatError> {
        array(value, "ring list")?
            .iter()
            .map(|v| self.positions(v))
            .collect()
    }
}

fn array<'v>(value: &'v Value, what: &str) -> Result<&'v Vec<Value>, FormatError> {
    value
        .as_array()
        .ok_or_else(|| FormatError::invalid_format(format!("expected {} array, found {}", what, value)))
}
