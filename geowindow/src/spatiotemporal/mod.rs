//! Spatiotemporal query primitives.
//!
//! Everything exchanged between a data source and its subscribers is built
//! from the types in this module:
//!
//! - [`SpatiotemporalWindow`]: what a client is looking at (corner, extent, time)
//! - [`ResultHandle`]: one record, identified by a stable [`HandleId`]
//! - [`ResultDiff`]: the added/removed/changed partitions of one diff tick
//! - [`Queryable`]: the contract every data source implements
//!
//! # Diff Tick
//!
//! ```text
//!   window ───────┐
//!   previous ─────┼──► Queryable::query ──► QueryOutcome
//!   fields ───────┤         │                 ├── current
//!   &mut context ─┘         │                 └── diff
//!                           ▼                      ├── added   = current − previous
//!                    (private, per client)         ├── removed = previous − current
//!                                                  └── changed ⊆ current ∩ previous
//! ```
//!
//! Set membership is decided by identity only. A handle carrying new field
//! values for an existing identity is "changed", never "added and removed".
//!
//! # Example
//!
//! ```ignore
//! use geowindow::spatiotemporal::{FieldNames, Queryable, ResultSet, SpatiotemporalWindow};
//!
//! let mut context = Default::default();
//! let outcome = source.query(&window, &ResultSet::new(), &fields, &mut context);
//! for handle in &outcome.diff.added {
//!     println!("{:?}", handle.field("mapname"));
//! }
//! ```

mod diff;
pub mod fields;
mod handle;
mod queryable;
mod vector;
mod window;

pub use diff::{QueryOutcome, ResultDiff};
pub use handle::{FieldValue, HandleId, ResultHandle, ResultSet};
pub use queryable::{field_names, FieldNames, Queryable};
pub use vector::Vector3d;
pub use window::{SpatiotemporalWindow, TimeInterval};
