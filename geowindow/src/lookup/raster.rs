//! Raster map lookup: map sheets whose bounds intersect the window.

use crate::spatiotemporal::{fields, FieldNames, ResultHandle};
use crate::store::{Feature, Geometry};

use super::LookupSource;

/// Layer holding raster map bounds.
pub const RASTER_LAYER: &str = "raster";

/// Emits `mapname`, `north`, `south`, `west` and `east`.
#[derive(Debug, Clone)]
pub struct RasterLookup {
    layer: String,
}

impl RasterLookup {
    pub fn new() -> Self {
        Self::with_layer(RASTER_LAYER)
    }

    pub fn with_layer(layer: impl Into<String>) -> Self {
        Self {
            layer: layer.into(),
        }
    }
}

impl Default for RasterLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl LookupSource for RasterLookup {
    fn layer(&self) -> &str {
        &self.layer
    }

    fn materialize(&self, feature: &Feature, requested: &FieldNames) -> ResultHandle {
        let mut handle = ResultHandle::keyed(&feature.name);
        if requested.contains(fields::MAPNAME) {
            handle = handle.with_field(fields::MAPNAME, feature.name.as_str());
        }
        let (south, west, north, east) = match feature.geometry {
            Geometry::Bounds(b) => (b.south, b.west, b.north, b.east),
            Geometry::Point { lat, lon } => (lat, lon, lat, lon),
        };
        for (name, value) in [
            (fields::NORTH, north),
            (fields::SOUTH, south),
            (fields::WEST, west),
            (fields::EAST, east),
        ] {
            if requested.contains(name) {
                handle = handle.with_field(name, value);
            }
        }
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatiotemporal::{field_names, FieldValue};
    use crate::store::BoundingBox;

    #[test]
    fn test_materialize_restricts_fields() {
        let feature = Feature::bounds("dc_west", BoundingBox::new(38.0, -77.5, 38.5, -77.0));
        let handle = RasterLookup::new().materialize(&feature, &field_names(["mapname", "north"]));
        assert_eq!(handle.fields().len(), 2);
        assert_eq!(handle.field("north"), Some(&FieldValue::Double(38.5)));
        assert_eq!(handle.field("south"), None);
        assert_eq!(handle, ResultHandle::keyed("dc_west"));
    }
}
