//! Objects whose position and velocity can be computed for any instant.

use chrono::{DateTime, Utc};

use crate::spatiotemporal::{HandleId, ResultHandle, Vector3d};

/// Computed state of an object at one instant.
#[derive(Debug, Clone)]
pub struct CalcState {
    /// Position in the common Cartesian frame, meters.
    pub position: Vector3d,
    /// Velocity in the common Cartesian frame, meters/second.
    pub velocity: Vector3d,
    /// Handle reported to subscribers for this state.
    pub handle: ResultHandle,
}

/// A simulated moving object.
///
/// Implementations are immutable and shared by every client; each client's
/// last computed states live in its own query context.
pub trait CalcObject: Send + Sync {
    /// Stable identity, equal to the id of every handle the object emits.
    fn id(&self) -> HandleId;

    /// Computes position, velocity and the result handle at `time`.
    fn compute(&self, time: DateTime<Utc>) -> CalcState;
}
