//! Backing stores for spatial lookups.
//!
//! A [`SpatialStore`] answers bounding-box range queries over named layers.
//! How the data is stored is opaque to the rest of the crate; the lookup
//! queryables only see [`Feature`] rows.
//!
//! Stores are shared through an explicitly owned [`StorePool`] that is passed
//! to each data source, so there is no process-wide connection cache.
//!
//! # Example
//!
//! ```ignore
//! use geowindow::store::{StorePool, SpatialQuery, BoundingBox};
//!
//! let pool = StorePool::new();
//! let store = pool.open("catalogs/cities.json")?;
//! let rows = store.fetch(&SpatialQuery::new("city", bbox))?;
//! ```

mod error;
mod memory;
mod pool;
mod types;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use pool::StorePool;
pub use types::{BoundingBox, Feature, Geometry, SpatialQuery};

/// A backing store that answers spatial range queries.
///
/// Implementations are called synchronously from a query tick, so a slow
/// store delays that tick's publication.
pub trait SpatialStore: Send + Sync {
    /// Returns every feature of `query.layer` whose geometry intersects
    /// `query.bbox` and that passes the population threshold, if any.
    fn fetch(&self, query: &SpatialQuery) -> StoreResult<Vec<Feature>>;

    /// Short description used in logs.
    fn describe(&self) -> String;
}
