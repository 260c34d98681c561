//! Stateless set-diff data sources.
//!
//! Every tick runs one range query against a [`SpatialStore`], turns each
//! row into a [`ResultHandle`] keyed by the row's name and diffs the answer
//! against the client's previous results by identity. These sources keep no
//! per-client state and never report `changed`.
//!
//! ```text
//!   window ──► LookupSource::spatial_query ──► SpatialStore::fetch
//!                                                   │
//!                  ┌────────────────────────────────┘
//!                  ▼
//!   LookupSource::materialize (per row, restricted to requested fields)
//!                  │
//!                  ▼
//!   added = current − previous, removed = previous − current
//! ```
//!
//! [`SpatialStore`]: crate::store::SpatialStore
//! [`ResultHandle`]: crate::spatiotemporal::ResultHandle

mod city;
mod model;
mod raster;
mod set_diff;

pub use city::{
    population_magnitude, CityLookup, MAX_POPULATION_MAGNITUDE, POPULATION_MAGNITUDE_OFFSET,
};
pub use model::ModelLookup;
pub use raster::RasterLookup;
pub use set_diff::{LookupSource, SetDiffQueryable};
