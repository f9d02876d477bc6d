//! Interchange format implementations.

mod geojson;

#[cfg(test)]
mod tests;

pub use geojson::{EXPORT_PROJECTION, GeoJsonFormat, WORKING_PROJECTION};
