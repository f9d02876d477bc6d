//! Features and feature collections.

use serde_json::{Map, Value};

use super::geometry::{Coordinate, Extent, Geometry};

/// Property bag attached to a feature. Key order is preserved.
pub type Properties = Map<String, Value>;

/// A geometry plus its opaque properties.
///
/// Features carry no identity of their own; they are addressed by their
/// position inside a [`FeatureCollection`].
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub geometry: Geometry,
    pub properties: Properties,
    /// Foreign `id` member from an imported document, kept for export.
    pub foreign_id: Option<Value>,
}

impl Feature {
    /// Create a feature with empty properties.
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            properties: Properties::new(),
            foreign_id: None,
        }
    }

    /// Add a property to the feature.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }
}

/// An ordered collection of features.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a feature and return its position.
    pub fn push(&mut self, feature: Feature) -> usize {
        self.features.push(feature);
        self.features.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Feature> {
        self.features.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Feature> {
        self.features.get_mut(index)
    }

    /// Remove the feature at `index`, shifting later features down.
    pub fn remove(&mut self, index: usize) -> Option<Feature> {
        (index < self.features.len()).then(|| self.features.remove(index))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Feature> {
        self.features.iter()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn clear(&mut self) {
        self.features.clear();
    }

    /// Bounding extent of all features, or None for an empty collection.
    pub fn extent(&self) -> Option<Extent> {
        self.features
            .iter()
            .filter_map(|f| f.geometry.extent())
            .reduce(|a, b| a.union(&b))
    }

    /// Topmost (last drawn) feature hit at `target`, restricted to positions
    /// accepted by `eligible`.
    pub fn hit_test(
        &self,
        target: &Coordinate,
        tolerance: f64,
        eligible: impl Fn(usize) -> bool,
    ) -> Option<usize> {
        self.features
            .iter()
            .enumerate()
            .rev()
            .find(|(i, f)| eligible(*i) && f.geometry.hit_test(target, tolerance))
            .map(|(i, _)| i)
    }
}

impl From<Vec<Feature>> for FeatureCollection {
    fn from(features: Vec<Feature>) -> Self {
        Self { features }
    }
}

impl FromIterator<Feature> for FeatureCollection {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        Self {
            features: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a FeatureCollection {
    type Item = &'a Feature;
    type IntoIter = std::slice::Iter<'a, Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: f64, y: f64) -> Feature {
        Feature::new(Geometry::Point(Coordinate::new(x, y)))
    }

    #[test]
    fn test_push_and_remove() {
        let mut features = FeatureCollection::new();
        assert_eq!(features.push(point(0.0, 0.0)), 0);
        assert_eq!(features.push(point(1.0, 1.0)), 1);
        assert_eq!(features.len(), 2);

        assert!(features.remove(5).is_none());
        let removed = features.remove(0).unwrap();
        assert_eq!(removed.geometry, Geometry::Point(Coordinate::new(0.0, 0.0)));
        assert_eq!(features.len(), 1);
    }

    #[test]
    fn test_extent_spans_all_features() {
        let features: FeatureCollection = vec![point(-5.0, 2.0), point(10.0, -3.0)].into();
        let extent = features.extent().unwrap();
        assert_eq!(extent.min_x, -5.0);
        assert_eq!(extent.max_x, 10.0);
        assert_eq!(extent.min_y, -3.0);
        assert_eq!(extent.max_y, 2.0);

        assert!(FeatureCollection::new().extent().is_none());
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let features: FeatureCollection = vec![point(0.0, 0.0), point(0.5, 0.0)].into();
        assert_eq!(features.hit_test(&Coordinate::new(0.2, 0.0), 1.0, |_| true), Some(1));
        assert_eq!(features.hit_test(&Coordinate::new(0.2, 0.0), 1.0, |i| i == 0), Some(0));
        assert_eq!(features.hit_test(&Coordinate::new(50.0, 0.0), 1.0, |_| true), None);
    }

    #[test]
    fn test_properties_keep_insertion_order() {
        let feature = point(0.0, 0.0)
            .with_property("zeta", 1)
            .with_property("alpha", "two");
        let keys: Vec<&String> = feature.properties.keys().collect();
        assert_eq!(keys, ["zeta", "alpha"]);
    }
}
