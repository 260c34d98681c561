//! Application bootstrap and lifecycle management.
//!
//! `GeowindowApp` is the composition root: it wires the directory service,
//! one query service and the query service's self-advertisement as
//! independent tasks under one [`CancellationToken`](tokio_util::sync::CancellationToken).
//!
//! ```text
//! ┌────────────────────────── GeowindowApp ──────────────────────────┐
//! │                                                                  │
//! │  1. DirectoryService ──► Directory field (StateField)            │
//! │         ▲                                                        │
//! │         │ AdvertiserHandle                                       │
//! │  3. SelfAdvertiser ◄── contact = address + service kind          │
//! │                                                                  │
//! │  2. QueryService<QueryBackend> ──► SessionUpdate broadcast       │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

mod backend;
mod bootstrap;
mod config;
mod error;

pub use backend::QueryBackend;
pub use bootstrap::GeowindowApp;
pub use config::{AdvertiseAppConfig, AppConfig, QueryAppConfig};
pub use error::AppError;
