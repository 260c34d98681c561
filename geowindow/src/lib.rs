//! Geowindow - incremental spatiotemporal queries and service discovery
//!
//! Clients describe a region of space and time; data sources answer with the
//! complete result set and a diff against the client's previous answer, so
//! only what changed travels to subscribers. Sources find each other through
//! an advertisement directory with TTL-based expiry.
//!
//! # Modules
//!
//! - [`spatiotemporal`]: windows, result handles, diffs and the [`Queryable`] contract
//! - [`lookup`]: stateless set-diff sources over a feature store
//! - [`orbital`]: adaptively rescheduled propagation of moving objects
//! - [`trail`]: bounded per-client breadcrumb trail
//! - [`directory`]: batched advertisement directory and its service
//! - [`view`]: per-client query sessions and the polling query service
//! - [`app`]: composition root
//!
//! [`Queryable`]: spatiotemporal::Queryable

pub mod app;
pub mod clock;
pub mod config;
pub mod coord;
pub mod directory;
pub mod logging;
pub mod lookup;
pub mod orbital;
pub mod pubsub;
pub mod spatiotemporal;
pub mod store;
pub mod trail;
pub mod view;
