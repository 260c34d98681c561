//! 3D model lookup: model anchor points inside the window.

use crate::spatiotemporal::{fields, FieldNames, ResultHandle};
use crate::store::{Feature, Geometry};

use super::LookupSource;

/// Layer holding model anchors.
pub const MODEL_LAYER: &str = "model";

/// Emits `mapname`, `minelev`, `maxelev`, `north` and `east`.
///
/// Models are anchored at a single point, so both elevation bounds carry the
/// anchor elevation.
#[derive(Debug, Clone)]
pub struct ModelLookup {
    layer: String,
}

impl ModelLookup {
    pub fn new() -> Self {
        Self {
            layer: MODEL_LAYER.to_string(),
        }
    }
}

impl Default for ModelLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl LookupSource for ModelLookup {
    fn layer(&self) -> &str {
        &self.layer
    }

    fn materialize(&self, feature: &Feature, requested: &FieldNames) -> ResultHandle {
        let mut handle = ResultHandle::keyed(&feature.name);
        if requested.contains(fields::MAPNAME) {
            handle = handle.with_field(fields::MAPNAME, feature.name.as_str());
        }
        if requested.contains(fields::MIN_ELEVATION) {
            handle = handle.with_field(fields::MIN_ELEVATION, feature.elevation_m);
        }
        if requested.contains(fields::MAX_ELEVATION) {
            handle = handle.with_field(fields::MAX_ELEVATION, feature.elevation_m);
        }
        let (lat, lon) = match feature.geometry {
            Geometry::Point { lat, lon } => (lat, lon),
            Geometry::Bounds(b) => (b.north, b.east),
        };
        if requested.contains(fields::NORTH) {
            handle = handle.with_field(fields::NORTH, lat);
        }
        if requested.contains(fields::EAST) {
            handle = handle.with_field(fields::EAST, lon);
        }
        handle
    }
}
