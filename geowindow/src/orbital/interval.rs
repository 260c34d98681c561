//! Adaptive recalculation intervals.
//!
//! Objects that appear to move quickly from the viewer's position are
//! recomputed often; objects that appear nearly still are recomputed rarely.

use crate::spatiotemporal::Vector3d;

/// Look-ahead used to estimate apparent motion, in seconds.
pub const CALCULATION_DELTA_SECS: f64 = 1.0;

/// Below this apparent angular velocity (degrees/second) an object is
/// treated as still.
pub const MIN_ANGULAR_VELOCITY: f64 = 0.001;

/// Shortest recalculation interval, in seconds.
pub const MIN_RECALC_INTERVAL_SECS: u32 = 1;

/// Longest recalculation interval, in seconds.
pub const MAX_RECALC_INTERVAL_SECS: u32 = 60;

/// Apparent motion, in degrees, tolerated between recalculations.
pub const VISUAL_ANGULAR_GRANULARITY: f64 = 1.0;

/// Maps an apparent angular velocity (degrees/second) to an interval in
/// seconds within `[MIN_RECALC_INTERVAL_SECS, MAX_RECALC_INTERVAL_SECS]`.
///
/// NaN maps to the minimum interval and anything below
/// [`MIN_ANGULAR_VELOCITY`] to the maximum.
pub fn interval_for_angular_velocity(degrees_per_sec: f64) -> u32 {
    if degrees_per_sec.is_nan() {
        return MIN_RECALC_INTERVAL_SECS;
    }
    if degrees_per_sec < MIN_ANGULAR_VELOCITY {
        return MAX_RECALC_INTERVAL_SECS;
    }
    let raw = 100.0 * VISUAL_ANGULAR_GRANULARITY / degrees_per_sec;
    raw.clamp(
        f64::from(MIN_RECALC_INTERVAL_SECS),
        f64::from(MAX_RECALC_INTERVAL_SECS),
    ) as u32
}

/// Computes the recalculation interval for an object.
///
/// `position` and `viewer` are points of the common Cartesian frame (meters)
/// and `velocity` is in meters/second in the same frame. The object is
/// extrapolated [`CALCULATION_DELTA_SECS`] ahead and the angle it sweeps as
/// seen from the viewer gives its apparent angular velocity.
pub fn compute_recalculation_interval(
    position: &Vector3d,
    velocity: &Vector3d,
    viewer: &Vector3d,
) -> u32 {
    let projected = position.scale_add(CALCULATION_DELTA_SECS, velocity);
    let sight_now = *position - *viewer;
    let sight_next = projected - *viewer;
    let degrees = sight_now.angle(&sight_next).to_degrees();
    interval_for_angular_velocity(degrees / CALCULATION_DELTA_SECS)
}
