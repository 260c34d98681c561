//! Earth satellites propagated from mean orbital elements.
//!
//! Propagation is two-body Keplerian: the mean anomaly advances linearly
//! from the element epoch, Kepler's equation is solved by Newton iteration
//! and the orbital-plane position is rotated into Earth-centered inertial
//! coordinates. The ECI position is then rotated by sidereal time and
//! converted to geodetic coordinates.

use std::f64::consts::{PI, TAU};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::coord::{self, Geodetic, SECONDS_PER_DAY};
use crate::spatiotemporal::{fields, HandleId, ResultHandle, Vector3d};

use super::calc::{CalcObject, CalcState};

/// WGS-72 gravitational parameter, km³/s².
pub const MU_KM3_PER_S2: f64 = 398_600.8;

/// Convergence tolerance for Kepler's equation, radians.
const KEPLER_TOLERANCE: f64 = 1.0e-12;

/// Iteration cap for Kepler's equation.
const KEPLER_MAX_ITERATIONS: usize = 50;

/// Interval over which velocity is differenced, seconds.
const VELOCITY_STEP_SECS: i64 = 1;

/// Mean orbital elements at an epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitalElements {
    pub epoch: DateTime<Utc>,
    pub inclination_deg: f64,
    pub raan_deg: f64,
    pub eccentricity: f64,
    pub arg_perigee_deg: f64,
    pub mean_anomaly_deg: f64,
    /// Revolutions per day.
    pub mean_motion: f64,
}

impl OrbitalElements {
    /// Mean motion in radians/second.
    pub fn mean_motion_rad_per_sec(&self) -> f64 {
        self.mean_motion * TAU / SECONDS_PER_DAY
    }

    /// Semi-major axis in kilometers.
    pub fn semi_major_axis_km(&self) -> f64 {
        let n = self.mean_motion_rad_per_sec();
        (MU_KM3_PER_S2 / (n * n)).cbrt()
    }

    /// ECI position in kilometers at `time`.
    pub fn eci_position_km(&self, time: DateTime<Utc>) -> Vector3d {
        let elapsed = (time - self.epoch).num_milliseconds() as f64 / 1000.0;
        let e = self.eccentricity;
        let a = self.semi_major_axis_km();

        let mean_anomaly =
            (self.mean_anomaly_deg.to_radians() + self.mean_motion_rad_per_sec() * elapsed)
                .rem_euclid(TAU);
        let eccentric = solve_kepler(mean_anomaly, e);

        let x_orbit = a * (eccentric.cos() - e);
        let y_orbit = a * (1.0 - e * e).sqrt() * eccentric.sin();

        let (sin_raan, cos_raan) = self.raan_deg.to_radians().sin_cos();
        let (sin_argp, cos_argp) = self.arg_perigee_deg.to_radians().sin_cos();
        let (sin_inc, cos_inc) = self.inclination_deg.to_radians().sin_cos();

        Vector3d::new(
            (cos_raan * cos_argp - sin_raan * sin_argp * cos_inc) * x_orbit
                + (-cos_raan * sin_argp - sin_raan * cos_argp * cos_inc) * y_orbit,
            (sin_raan * cos_argp + cos_raan * sin_argp * cos_inc) * x_orbit
                + (-sin_raan * sin_argp + cos_raan * cos_argp * cos_inc) * y_orbit,
            (sin_argp * sin_inc) * x_orbit + (cos_argp * sin_inc) * y_orbit,
        )
    }
}

/// Solves `E − e·sin E = M` for the eccentric anomaly `E`.
pub fn solve_kepler(mean_anomaly: f64, eccentricity: f64) -> f64 {
    let mut eccentric = if eccentricity > 0.8 { PI } else { mean_anomaly };
    for _ in 0..KEPLER_MAX_ITERATIONS {
        let delta = (eccentric - eccentricity * eccentric.sin() - mean_anomaly)
            / (1.0 - eccentricity * eccentric.cos());
        eccentric -= delta;
        if delta.abs() < KEPLER_TOLERANCE {
            break;
        }
    }
    eccentric
}

/// A catalogued satellite.
#[derive(Debug, Clone)]
pub struct Satellite {
    id: HandleId,
    catalog_number: String,
    name: String,
    owner: String,
    mission: String,
    elements: OrbitalElements,
}

impl Satellite {
    pub fn new(
        catalog_number: impl Into<String>,
        name: impl Into<String>,
        owner: impl Into<String>,
        mission: impl Into<String>,
        elements: OrbitalElements,
    ) -> Self {
        let catalog_number = catalog_number.into();
        Self {
            id: HandleId::from_key(&catalog_number),
            catalog_number,
            name: name.into(),
            owner: owner.into(),
            mission: mission.into(),
            elements,
        }
    }

    pub fn catalog_number(&self) -> &str {
        &self.catalog_number
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mission(&self) -> &str {
        &self.mission
    }

    pub fn elements(&self) -> &OrbitalElements {
        &self.elements
    }

    /// Map name reported to clients, `owner:name`.
    pub fn map_name(&self) -> String {
        format!("{}:{}", self.owner, self.name)
    }

    /// Geodetic position at `time`.
    pub fn geodetic(&self, time: DateTime<Utc>) -> Geodetic {
        coord::eci_to_geodetic(&self.elements.eci_position_km(time), coord::gmst(&time))
    }
}

impl CalcObject for Satellite {
    fn id(&self) -> HandleId {
        self.id
    }

    fn compute(&self, time: DateTime<Utc>) -> CalcState {
        let step = Duration::seconds(VELOCITY_STEP_SECS);
        let dt = VELOCITY_STEP_SECS as f64;

        let now = self.geodetic(time);
        let next = self.geodetic(time + step);

        let position = coord::geodetic_to_cartesian(&now.to_vector());
        let next_position = coord::geodetic_to_cartesian(&next.to_vector());
        let velocity = (next_position - position) * (1.0 / dt);

        // lat deg/s, lon deg/s, elevation m/s
        let geodetic_velocity = Vector3d::new(
            (next.latitude - now.latitude) / dt,
            coord::normalize_longitude(next.longitude - now.longitude) / dt,
            (next.elevation_m - now.elevation_m) / dt,
        );

        let handle = ResultHandle::new(self.id)
            .with_field(fields::POSITION, now.to_vector())
            .with_field(fields::VELOCITY, geodetic_velocity)
            .with_field(fields::TIME, time)
            .with_field(fields::MAPNAME, self.map_name());

        CalcState {
            position,
            velocity,
            handle,
        }
    }
}
