//! Orbital propagation engine.
//!
//! Moving objects (satellites) are recomputed on a per-client schedule whose
//! spacing adapts to how fast each object appears to move from the viewer's
//! position, between [`MIN_RECALC_INTERVAL_SECS`] and
//! [`MAX_RECALC_INTERVAL_SECS`]. The schedule follows the client's temporal
//! direction, so playback may run backwards.
//!
//! # Example
//!
//! ```ignore
//! use geowindow::orbital::{load_catalog, satellite_objects, CalcDb};
//!
//! let satellites = load_catalog(Path::new("sats.json"))?;
//! let db = CalcDb::new("satellites", satellite_objects(satellites));
//! ```

mod calc;
mod catalog;
mod engine;
mod interval;
mod satellite;
mod schedule;

pub use calc::{CalcObject, CalcState};
pub use catalog::{load_catalog, parse_catalog, CatalogError};
pub use engine::{CalcDb, OrbitalContext};
pub use interval::{
    compute_recalculation_interval, interval_for_angular_velocity, CALCULATION_DELTA_SECS,
    MAX_RECALC_INTERVAL_SECS, MIN_ANGULAR_VELOCITY, MIN_RECALC_INTERVAL_SECS,
    VISUAL_ANGULAR_GRANULARITY,
};
pub use satellite::{solve_kepler, OrbitalElements, Satellite, MU_KM3_PER_S2};
pub use schedule::{Direction, RecalculationSchedule};

use std::sync::Arc;

/// Wraps satellites for a [`CalcDb`].
pub fn satellite_objects(satellites: Vec<Satellite>) -> Vec<Arc<dyn CalcObject>> {
    satellites
        .into_iter()
        .map(|s| Arc::new(s) as Arc<dyn CalcObject>)
        .collect()
}
