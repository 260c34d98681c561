//! Coordinate conversion module
//!
//! Provides conversions between geographic positions (latitude, longitude,
//! elevation), the Earth-fixed Cartesian frame shared by viewers and moving
//! objects, and Earth-centered inertial (ECI) coordinates produced by orbit
//! propagation.
//!
//! The Cartesian frame is spherical with radius [`EARTH_RADIUS_M`] plus
//! elevation. Axes: `x = r cosφ sinθ`, `y = r sinφ`, `z = r cosφ cosθ`,
//! where φ is latitude and θ is longitude.

mod time;
mod types;

pub use time::{gmst, gmst_from_julian, julian_date, julian_date_parts};
pub use types::{
    CoordError, Geodetic, EARTH_RADIUS_M, ECCENTRICITY_SQUARED, EQUATORIAL_RADIUS_KM, FLATTENING,
    LATITUDE_TOLERANCE, MAX_LAT, MAX_LATITUDE_ITERATIONS, MAX_LON, MIN_LAT, MIN_LON,
    SECONDS_PER_DAY,
};

use std::f64::consts::TAU;

use crate::spatiotemporal::Vector3d;

/// Validates a geographic position.
///
/// # Arguments
///
/// * `position` - `x` latitude in degrees, `y` longitude in degrees, `z` elevation in meters
#[inline]
pub fn validate_position(position: &Vector3d) -> Result<(), CoordError> {
    if !position.is_finite() {
        return Err(CoordError::NonFinite);
    }
    if !(MIN_LAT..=MAX_LAT).contains(&position.x) {
        return Err(CoordError::InvalidLatitude(position.x));
    }
    if !(MIN_LON..=MAX_LON).contains(&position.y) {
        return Err(CoordError::InvalidLongitude(position.y));
    }
    Ok(())
}

/// Wraps a longitude in degrees into `(-180, 180]`.
#[inline]
pub fn normalize_longitude(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 {
        180.0
    } else {
        wrapped
    }
}

/// Converts a geographic position to the common Cartesian frame (meters).
#[inline]
pub fn geodetic_to_cartesian(position: &Vector3d) -> Vector3d {
    let r = EARTH_RADIUS_M + position.z;
    let phi = position.x.to_radians();
    let theta = position.y.to_radians();
    let r_cos_phi = r * phi.cos();
    Vector3d::new(r_cos_phi * theta.sin(), r * phi.sin(), r_cos_phi * theta.cos())
}

/// Converts a point of the common Cartesian frame back to a geographic
/// position.
#[inline]
pub fn cartesian_to_geodetic(xyz: &Vector3d) -> Vector3d {
    let r = xyz.length();
    let lat = xyz.y.atan2(xyz.x.hypot(xyz.z)).to_degrees();
    let lon = normalize_longitude(xyz.x.atan2(xyz.z).to_degrees());
    Vector3d::new(lat, lon, r - EARTH_RADIUS_M)
}

/// Converts Earth-centered inertial coordinates (kilometers) to a geodetic
/// position on the WGS-72 ellipsoid.
///
/// `gmst` is the Greenwich mean sidereal time in radians at the instant the
/// ECI position refers to. Latitude is refined by fixed-point iteration until
/// consecutive estimates differ by at most [`LATITUDE_TOLERANCE`].
pub fn eci_to_geodetic(eci_km: &Vector3d, gmst: f64) -> Geodetic {
    let lon = (eci_km.y.atan2(eci_km.x) - gmst).rem_euclid(TAU);
    let r = eci_km.x.hypot(eci_km.y);

    let mut lat = eci_km.z.atan2(r);
    let mut c;
    let mut iterations = 0;
    loop {
        let phi = lat;
        let sin_phi = phi.sin();
        c = 1.0 / (1.0 - ECCENTRICITY_SQUARED * sin_phi * sin_phi).sqrt();
        lat = (eci_km.z + EQUATORIAL_RADIUS_KM * c * ECCENTRICITY_SQUARED * sin_phi).atan2(r);
        iterations += 1;
        if (lat - phi).abs() <= LATITUDE_TOLERANCE || iterations >= MAX_LATITUDE_ITERATIONS {
            break;
        }
    }
    let elevation_km = r / lat.cos() - EQUATORIAL_RADIUS_KM * c;

    Geodetic::new(
        lat.to_degrees(),
        normalize_longitude(lon.to_degrees()),
        elevation_km * 1000.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_position() {
        assert!(validate_position(&Vector3d::new(38.0, -77.0, 0.0)).is_ok());
        assert_eq!(
            validate_position(&Vector3d::new(91.0, 0.0, 0.0)),
            Err(CoordError::InvalidLatitude(91.0))
        );
        assert_eq!(
            validate_position(&Vector3d::new(0.0, -181.0, 0.0)),
            Err(CoordError::InvalidLongitude(-181.0))
        );
        assert_eq!(
            validate_position(&Vector3d::new(f64::NAN, 0.0, 0.0)),
            Err(CoordError::NonFinite)
        );
    }

    #[test]
    fn test_normalize_longitude() {
        assert_eq!(normalize_longitude(190.0), -170.0);
        assert_eq!(normalize_longitude(-180.0), 180.0);
        assert_eq!(normalize_longitude(360.0), 0.0);
        assert_eq!(normalize_longitude(-77.0), -77.0);
    }

    #[test]
    fn test_geodetic_to_cartesian_axes() {
        let origin = geodetic_to_cartesian(&Vector3d::new(0.0, 0.0, 0.0));
        assert!(origin.x.abs() < 1e-6);
        assert!(origin.y.abs() < 1e-6);
        assert!((origin.z - EARTH_RADIUS_M).abs() < 1e-6);

        let pole = geodetic_to_cartesian(&Vector3d::new(90.0, 0.0, 1000.0));
        assert!((pole.y - (EARTH_RADIUS_M + 1000.0)).abs() < 1e-6);

        let east = geodetic_to_cartesian(&Vector3d::new(0.0, 90.0, 0.0));
        assert!((east.x - EARTH_RADIUS_M).abs() < 1e-6);
    }

    #[test]
    fn test_eci_equatorial_point_on_surface() {
        let geo = eci_to_geodetic(&Vector3d::new(EQUATORIAL_RADIUS_KM, 0.0, 0.0), 0.0);
        assert!(geo.latitude.abs() < 1e-9);
        assert!(geo.longitude.abs() < 1e-9);
        assert!(geo.elevation_m.abs() < 1e-3);
    }

    #[test]
    fn test_eci_longitude_subtracts_gmst() {
        let gmst = 30f64.to_radians();
        let geo = eci_to_geodetic(&Vector3d::new(7000.0, 0.0, 0.0), gmst);
        assert!((geo.longitude - -30.0).abs() < 1e-9);
        assert!((geo.elevation_m - (7000.0 - EQUATORIAL_RADIUS_KM) * 1000.0).abs() < 1e-3);
    }

    #[test]
    fn test_eci_iteration_converges_off_equator() {
        // A point 400 km above 45° geodetic latitude.
        let lat = 45f64.to_radians();
        let n = EQUATORIAL_RADIUS_KM / (1.0 - ECCENTRICITY_SQUARED * lat.sin().powi(2)).sqrt();
        let h = 400.0;
        let r = (n + h) * lat.cos();
        let z = (n * (1.0 - ECCENTRICITY_SQUARED) + h) * lat.sin();
        let geo = eci_to_geodetic(&Vector3d::new(r, 0.0, z), 0.0);
        assert!((geo.latitude - 45.0).abs() < 1e-6);
        assert!((geo.elevation_m - 400_000.0).abs() < 1.0);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_cartesian_roundtrip(
                lat in -89.0f64..89.0,
                lon in -179.9f64..179.9,
                elev in -400.0f64..2_000_000.0,
            ) {
                let xyz = geodetic_to_cartesian(&Vector3d::new(lat, lon, elev));
                let back = cartesian_to_geodetic(&xyz);
                prop_assert!((back.x - lat).abs() < 1e-7);
                prop_assert!((back.y - lon).abs() < 1e-7);
                prop_assert!((back.z - elev).abs() < 1e-3);
            }

            #[test]
            fn prop_eci_longitude_in_range(
                x in -9000.0f64..9000.0,
                y in -9000.0f64..9000.0,
                z in -9000.0f64..9000.0,
                gmst in 0.0f64..std::f64::consts::TAU,
            ) {
                prop_assume!(x.hypot(y) > 1.0);
                let geo = eci_to_geodetic(&Vector3d::new(x, y, z), gmst);
                prop_assert!(geo.longitude > -180.0 && geo.longitude <= 180.0);
                prop_assert!((-90.0..=90.0).contains(&geo.latitude));
            }
        }
    }
}
