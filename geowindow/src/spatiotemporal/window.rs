//! The region of interest a client is observing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Vector3d;

/// A closed time interval `[lower, upper]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    pub lower: DateTime<Utc>,
    pub upper: DateTime<Utc>,
}

impl TimeInterval {
    /// Creates an interval, swapping the bounds if given in reverse.
    pub fn new(lower: DateTime<Utc>, upper: DateTime<Utc>) -> Self {
        if upper < lower {
            Self {
                lower: upper,
                upper: lower,
            }
        } else {
            Self { lower, upper }
        }
    }

    /// An interval containing a single instant.
    pub fn instant(time: DateTime<Utc>) -> Self {
        Self {
            lower: time,
            upper: time,
        }
    }

    /// Returns true if `time` lies within the closed interval.
    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        self.lower <= time && time <= self.upper
    }
}

/// A spatiotemporal window: lower-left corner, extent and time bounds.
///
/// Positions are geographic (`x` latitude, `y` longitude, `z` elevation in
/// meters). The window is supplied afresh on every query and has no identity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpatiotemporalWindow {
    pub lower_left: Vector3d,
    pub extent: Vector3d,
    pub time: TimeInterval,
}

impl SpatiotemporalWindow {
    pub fn new(lower_left: Vector3d, extent: Vector3d, time: TimeInterval) -> Self {
        Self {
            lower_left,
            extent,
            time,
        }
    }

    /// Builds a window from its center, as clients report it.
    pub fn from_center(center: Vector3d, extent: Vector3d, time: TimeInterval) -> Self {
        Self::new(center - extent * 0.5, extent, time)
    }

    /// Corner opposite the lower-left one.
    pub fn upper_right(&self) -> Vector3d {
        self.lower_left + self.extent
    }

    /// Midpoint of the window.
    pub fn center(&self) -> Vector3d {
        self.lower_left.scale_add(0.5, &self.extent)
    }
}
