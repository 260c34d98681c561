//! Coordinate types, constants and errors.

use std::fmt;

use thiserror::Error;

use crate::spatiotemporal::Vector3d;

/// Minimum valid latitude in degrees.
pub const MIN_LAT: f64 = -90.0;

/// Maximum valid latitude in degrees.
pub const MAX_LAT: f64 = 90.0;

/// Minimum valid longitude in degrees.
pub const MIN_LON: f64 = -180.0;

/// Maximum valid longitude in degrees.
pub const MAX_LON: f64 = 180.0;

/// WGS-72 equatorial radius in kilometers.
pub const EQUATORIAL_RADIUS_KM: f64 = 6378.135;

/// WGS-72 equatorial radius in meters; radius of the common Cartesian frame.
pub const EARTH_RADIUS_M: f64 = EQUATORIAL_RADIUS_KM * 1000.0;

/// WGS-72 flattening.
pub const FLATTENING: f64 = 1.0 / 298.26;

/// First eccentricity squared, `f(2 − f)`.
pub const ECCENTRICITY_SQUARED: f64 = FLATTENING * (2.0 - FLATTENING);

/// Convergence tolerance of the geodetic latitude iteration, in radians.
pub const LATITUDE_TOLERANCE: f64 = 1.0e-10;

/// Iteration cap for the geodetic latitude refinement.
///
/// The fixed point converges in a handful of steps for any point outside the
/// Earth's core; the cap only bounds pathological input such as NaN.
pub const MAX_LATITUDE_ITERATIONS: usize = 64;

/// Seconds per day.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Errors that can occur when validating coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordError {
    #[error("Invalid latitude: {0} (must be between {MIN_LAT} and {MAX_LAT})")]
    InvalidLatitude(f64),

    #[error("Invalid longitude: {0} (must be between {MIN_LON} and {MAX_LON})")]
    InvalidLongitude(f64),

    #[error("Non-finite coordinate component")]
    NonFinite,
}

/// A geodetic position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geodetic {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees, in `(-180, 180]`.
    pub longitude: f64,
    /// Height above the reference ellipsoid in meters.
    pub elevation_m: f64,
}

impl Geodetic {
    pub fn new(latitude: f64, longitude: f64, elevation_m: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation_m,
        }
    }

    /// Packs into the geographic vector layout (`x` lat, `y` lon, `z` elevation).
    pub fn to_vector(self) -> Vector3d {
        Vector3d::new(self.latitude, self.longitude, self.elevation_m)
    }
}

impl From<Vector3d> for Geodetic {
    fn from(v: Vector3d) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl fmt::Display for Geodetic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.6}°, {:.6}°, {:.1} m",
            self.latitude, self.longitude, self.elevation_m
        )
    }
}
