//! Coordinate reprojection between geographic and Web-Mercator coordinates.

use std::f64::consts::PI;

use crate::model::{Coordinate, Geometry};

/// Earth radius used by the spherical Web-Mercator projection, in metres.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude beyond which Web-Mercator is undefined; inputs are clamped to it.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Web-Mercator northing of [`MAX_LATITUDE`], in metres.
pub const MAX_MERCATOR_Y: f64 = EARTH_RADIUS * PI;

/// Coordinate reference systems the editor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// Longitude/latitude in degrees (EPSG:4326, CRS84).
    Geographic,
    /// Spherical Mercator in metres (EPSG:3857).
    WebMercator,
}

impl Projection {
    /// Canonical code written into exported documents.
    pub fn code(&self) -> &'static str {
        match self {
            Projection::Geographic => "EPSG:4326",
            Projection::WebMercator => "EPSG:3857",
        }
    }

    /// Resolve a CRS name as found in a GeoJSON `crs` member.
    ///
    /// Accepts `EPSG:xxxx` codes and the OGC URN forms
    /// (`urn:ogc:def:crs:EPSG::4326`, `urn:ogc:def:crs:OGC:1.3:CRS84`).
    pub fn from_name(name: &str) -> Option<Projection> {
        let normalized = name.trim().to_ascii_uppercase();
        let (authority, code) = if let Some(code) = normalized.strip_prefix("EPSG:") {
            ("EPSG", code)
        } else {
            // urn:ogc:def:crs:{authority}:{version}:{code}, version may be empty
            let rest = normalized.strip_prefix("URN:OGC:DEF:CRS:")?;
            let mut parts = rest.split(':');
            match (parts.next(), parts.next(), parts.next(), parts.next()) {
                (Some(authority), Some(_version), Some(code), None) => (authority, code),
                _ => return None,
            }
        };
        match (authority, code) {
            ("EPSG", "4326") | ("OGC", "CRS84") => Some(Projection::Geographic),
            ("EPSG", "3857" | "900913" | "102100") => Some(Projection::WebMercator),
            _ => None,
        }
    }

    /// Limit a coordinate to the area this projection can represent.
    pub fn clamp(&self, c: Coordinate) -> Coordinate {
        let limit = match self {
            Projection::Geographic => 90.0,
            Projection::WebMercator => MAX_MERCATOR_Y,
        };
        Coordinate::new(c.x, c.y.clamp(-limit, limit))
    }

    /// Clamp every coordinate of a geometry in place. Returns whether any moved.
    pub fn clamp_geometry(&self, geometry: &mut Geometry) -> bool {
        let mut clamped = false;
        geometry.map_coords_in_place(|c| {
            let limited = self.clamp(*c);
            clamped |= limited != *c;
            *c = limited;
        });
        clamped
    }

    /// Transform a single coordinate from `self` into `target`.
    pub fn transform(&self, target: Projection, c: Coordinate) -> Coordinate {
        match (self, target) {
            (Projection::Geographic, Projection::WebMercator) => to_web_mercator(c),
            (Projection::WebMercator, Projection::Geographic) => to_geographic(c),
            _ => c,
        }
    }

    /// Transform every coordinate of a geometry from `self` into `target`.
    pub fn transform_geometry(&self, target: Projection, geometry: &Geometry) -> Geometry {
        geometry.map_coords(|c| *c = self.transform(target, *c))
    }
}

/// Longitude/latitude degrees to Web-Mercator metres.
pub fn to_web_mercator(c: Coordinate) -> Coordinate {
    let lat = c.y.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let x = EARTH_RADIUS * c.x.to_radians();
    let y = EARTH_RADIUS * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln();
    Coordinate::new(x, y)
}

/// Web-Mercator metres to longitude/latitude degrees.
pub fn to_geographic(c: Coordinate) -> Coordinate {
    let lon = (c.x / EARTH_RADIUS).to_degrees();
    let lat = (2.0 * (c.y / EARTH_RADIUS).exp().atan() - PI / 2.0).to_degrees();
    Coordinate::new(lon, lat)
}
