//! Rows and queries exchanged with a store.

use serde::{Deserialize, Serialize};

use crate::spatiotemporal::SpatiotemporalWindow;

/// An axis-aligned latitude/longitude box, bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    /// Creates a box, ordering the bounds if given in reverse.
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south: south.min(north),
            west: west.min(east),
            north: south.max(north),
            east: west.max(east),
        }
    }

    /// The box spanned by a window's lower-left corner and extent.
    pub fn from_window(window: &SpatiotemporalWindow) -> Self {
        let ll = window.lower_left;
        let ur = window.upper_right();
        Self::new(ll.x, ll.y, ur.x, ur.y)
    }

    pub fn contains_point(&self, lat: f64, lon: f64) -> bool {
        (self.south..=self.north).contains(&lat) && (self.west..=self.east).contains(&lon)
    }

    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.south <= other.north
            && other.south <= self.north
            && self.west <= other.east
            && other.west <= self.east
    }
}

/// Geometry of a stored feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Geometry {
    Point { lat: f64, lon: f64 },
    Bounds(BoundingBox),
}

impl Geometry {
    pub fn intersects(&self, bbox: &BoundingBox) -> bool {
        match self {
            Geometry::Point { lat, lon } => bbox.contains_point(*lat, *lon),
            Geometry::Bounds(bounds) => bounds.intersects(bbox),
        }
    }
}

/// One row of a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Natural key, unique within a layer.
    pub name: String,
    pub geometry: Geometry,
    #[serde(default)]
    pub elevation_m: f64,
    /// Unknown population passes every threshold.
    #[serde(default)]
    pub population: Option<u64>,
}

impl Feature {
    pub fn point(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            geometry: Geometry::Point { lat, lon },
            elevation_m: 0.0,
            population: None,
        }
    }

    pub fn bounds(name: impl Into<String>, bounds: BoundingBox) -> Self {
        Self {
            name: name.into(),
            geometry: Geometry::Bounds(bounds),
            elevation_m: 0.0,
            population: None,
        }
    }

    pub fn with_elevation(mut self, elevation_m: f64) -> Self {
        self.elevation_m = elevation_m;
        self
    }

    pub fn with_population(mut self, population: u64) -> Self {
        self.population = Some(population);
        self
    }
}

/// A parameterized range query against one layer.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialQuery {
    pub layer: String,
    pub bbox: BoundingBox,
    pub min_population: Option<u64>,
}

impl SpatialQuery {
    pub fn new(layer: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            layer: layer.into(),
            bbox,
            min_population: None,
        }
    }

    pub fn with_min_population(mut self, min_population: u64) -> Self {
        self.min_population = Some(min_population);
        self
    }

    /// True when `feature` satisfies this query.
    pub fn matches(&self, feature: &Feature) -> bool {
        let populous = match (self.min_population, feature.population) {
            (Some(min), Some(population)) => population >= min,
            _ => true,
        };
        populous && feature.geometry.intersects(&self.bbox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_orders_bounds() {
        let bbox = BoundingBox::new(39.0, -76.0, 38.0, -77.0);
        assert_eq!(bbox.south, 38.0);
        assert_eq!(bbox.north, 39.0);
        assert_eq!(bbox.west, -77.0);
        assert_eq!(bbox.east, -76.0);
    }

    #[test]
    fn test_bbox_intersects_edge() {
        let a = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let b = BoundingBox::new(1.0, 1.0, 2.0, 2.0);
        let c = BoundingBox::new(1.5, 1.5, 2.0, 2.0);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_query_population_threshold() {
        let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let query = SpatialQuery::new("city", bbox).with_min_population(100);
        assert!(query.matches(&Feature::point("big", 0.5, 0.5).with_population(100)));
        assert!(!query.matches(&Feature::point("small", 0.5, 0.5).with_population(99)));
        assert!(query.matches(&Feature::point("unknown", 0.5, 0.5)));
        assert!(!query.matches(&Feature::point("outside", 2.0, 0.5)));
    }

    #[test]
    fn test_feature_json_shape() {
        let json = r#"{"name":"Quad","geometry":{"bounds":{"south":1.0,"west":2.0,"north":3.0,"east":4.0}}}"#;
        let feature: Feature = serde_json::from_str(json).unwrap();
        assert_eq!(
            feature.geometry,
            Geometry::Bounds(BoundingBox::new(1.0, 2.0, 3.0, 4.0))
        );
        assert_eq!(feature.population, None);
    }
}
