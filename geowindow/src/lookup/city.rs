//! City name lookup with an elevation-dependent population threshold.
//!
//! The higher the viewer, the more populous a city must be to be returned:
//!
//! ```text
//!   magnitude = round_half_even(log10(max(elevation, 1)))
//!   threshold = 10 ^ clamp(magnitude - 2, 0, 7)
//! ```

use tracing::trace;

use crate::spatiotemporal::{fields, FieldNames, ResultHandle, SpatiotemporalWindow};
use crate::store::{BoundingBox, Feature, Geometry, SpatialQuery};

use super::LookupSource;

/// Layer holding populated places.
pub const CITY_LAYER: &str = "city";

/// Subtracted from the elevation magnitude.
pub const POPULATION_MAGNITUDE_OFFSET: i64 = 2;

/// Upper clamp of the population magnitude.
pub const MAX_POPULATION_MAGNITUDE: i64 = 7;

/// Population magnitude for a viewer elevation in meters.
///
/// Elevations at or below zero are treated as one meter.
pub fn population_magnitude(elevation_m: f64) -> i64 {
    let elevation = if elevation_m > 0.0 { elevation_m } else { 1.0 };
    let magnitude = elevation.log10().round_ties_even() as i64;
    (magnitude - POPULATION_MAGNITUDE_OFFSET).clamp(0, MAX_POPULATION_MAGNITUDE)
}

/// Emits `mapname`, `north`, `east`, `minelev` and `pop`.
#[derive(Debug, Clone)]
pub struct CityLookup {
    layer: String,
}

impl CityLookup {
    pub fn new() -> Self {
        Self {
            layer: CITY_LAYER.to_string(),
        }
    }
}

impl Default for CityLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl LookupSource for CityLookup {
    fn layer(&self) -> &str {
        &self.layer
    }

    fn spatial_query(&self, window: &SpatiotemporalWindow) -> SpatialQuery {
        let magnitude = population_magnitude(window.lower_left.z);
        let threshold = 10u64.pow(magnitude as u32);
        trace!(elevation = window.lower_left.z, magnitude, threshold, "City threshold");
        SpatialQuery::new(self.layer(), BoundingBox::from_window(window))
            .with_min_population(threshold)
    }

    fn materialize(&self, feature: &Feature, requested: &FieldNames) -> ResultHandle {
        let mut handle = ResultHandle::keyed(&feature.name);
        if requested.contains(fields::MAPNAME) {
            handle = handle.with_field(fields::MAPNAME, feature.name.as_str());
        }
        let (lat, lon) = match feature.geometry {
            Geometry::Point { lat, lon } => (lat, lon),
            Geometry::Bounds(b) => ((b.north + b.south) / 2.0, (b.east + b.west) / 2.0),
        };
        if requested.contains(fields::NORTH) {
            handle = handle.with_field(fields::NORTH, lat);
        }
        if requested.contains(fields::EAST) {
            handle = handle.with_field(fields::EAST, lon);
        }
        if requested.contains(fields::MIN_ELEVATION) {
            handle = handle.with_field(fields::MIN_ELEVATION, feature.elevation_m.round() as i64);
        }
        if let (true, Some(population)) = (requested.contains(fields::POPULATION), feature.population)
        {
            handle = handle.with_field(fields::POPULATION, population as i64);
        }
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatiotemporal::{TimeInterval, Vector3d};
    use chrono::Utc;

    #[test]
    fn test_magnitude_at_1500m() {
        // log10(1500) = 3.176
        assert_eq!(population_magnitude(1500.0), 1);
    }

    #[test]
    fn test_magnitude_clamps() {
        assert_eq!(population_magnitude(0.0), 0);
        assert_eq!(population_magnitude(-50.0), 0);
        assert_eq!(population_magnitude(10.0), 0);
        assert_eq!(population_magnitude(1.0e12), 7);
    }

    #[test]
    fn test_magnitude_rounds_to_nearest() {
        // log10(5000) = 3.699
        assert_eq!(population_magnitude(5000.0), 2);
        // log10(2000) = 3.301
        assert_eq!(population_magnitude(2000.0), 1);
    }

    #[test]
    fn test_query_threshold_follows_elevation() {
        let window = SpatiotemporalWindow::new(
            Vector3d::new(38.0, -77.0, 100_000.0),
            Vector3d::new(1.0, 1.0, 0.0),
            TimeInterval::instant(Utc::now()),
        );
        let query = CityLookup::new().spatial_query(&window);
        assert_eq!(query.min_population, Some(1000));
        assert_eq!(query.layer, CITY_LAYER);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_magnitude_in_bounds(elevation in -1.0e6f64..1.0e15) {
                let m = population_magnitude(elevation);
                prop_assert!((0..=MAX_POPULATION_MAGNITUDE).contains(&m));
            }
        }
    }
}
