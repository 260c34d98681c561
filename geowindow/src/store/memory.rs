//! In-memory store loaded from a JSON catalog.
//!
//! Catalog layout:
//!
//! ```text
//! {
//!   "layers": {
//!     "city":   [ { "name": "...", "geometry": { "point": { "lat": 38.9, "lon": -77.0 } },
//!                   "elevation_m": 20.0, "population": 700000 } ],
//!     "raster": [ { "name": "...", "geometry": { "bounds": { "south": .., "west": .., "north": .., "east": .. } } } ]
//!   }
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use super::{Feature, SpatialQuery, SpatialStore, StoreError, StoreResult};

#[derive(Debug, Deserialize)]
struct Catalog {
    layers: HashMap<String, Vec<Feature>>,
}

/// A store holding every layer in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    label: String,
    layers: HashMap<String, Vec<Feature>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            layers: HashMap::new(),
        }
    }

    /// Adds or replaces a layer.
    pub fn with_layer(mut self, layer: impl Into<String>, features: Vec<Feature>) -> Self {
        self.layers.insert(layer.into(), features);
        self
    }

    /// Parses a catalog from JSON text.
    pub fn from_json(label: impl Into<String>, json: &str, origin: &Path) -> StoreResult<Self> {
        let catalog: Catalog = serde_json::from_str(json).map_err(|source| StoreError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        Ok(Self {
            label: label.into(),
            layers: catalog.layers,
        })
    }

    /// Loads a catalog file.
    pub fn load(path: &Path) -> StoreResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::from_json(path.display().to_string(), &json, path)?;
        info!(
            catalog = %path.display(),
            layers = store.layers.len(),
            features = store.feature_count(),
            "Loaded feature catalog"
        );
        Ok(store)
    }

    /// Total number of features across layers.
    pub fn feature_count(&self) -> usize {
        self.layers.values().map(Vec::len).sum()
    }
}

impl SpatialStore for MemoryStore {
    fn fetch(&self, query: &SpatialQuery) -> StoreResult<Vec<Feature>> {
        let features = self
            .layers
            .get(&query.layer)
            .ok_or_else(|| StoreError::UnknownLayer(query.layer.clone()))?;
        let rows: Vec<Feature> = features
            .iter()
            .filter(|f| query.matches(f))
            .cloned()
            .collect();
        debug!(store = %self.label, layer = %query.layer, rows = rows.len(), "fetch");
        Ok(rows)
    }

    fn describe(&self) -> String {
        format!("memory:{}", self.label)
    }
}
