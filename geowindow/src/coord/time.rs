//! Astronomical time: Julian dates and Greenwich mean sidereal time.

use std::f64::consts::TAU;

use chrono::{DateTime, Datelike, Timelike, Utc};

use super::types::SECONDS_PER_DAY;

/// Julian date of J2000.0.
const J2000: f64 = 2_451_545.0;

/// Sidereal rotation rate, in sidereal days per solar day.
const SIDEREAL_RATE: f64 = 1.002_737_909_34;

/// Julian date for a calendar date and time of day (UTC).
///
/// Integer arithmetic truncates toward zero, as the Fliegel–Van Flandern
/// formula requires.
pub fn julian_date_parts(
    year: i64,
    month: i64,
    day: i64,
    hour: i64,
    minute: i64,
    second: f64,
) -> f64 {
    let m1 = (month - 14) / 12;
    let y1 = year + 4800;
    let day_number = 1461 * (y1 + m1) / 4 + 367 * (month - 2 - 12 * m1) / 12
        - (3 * ((y1 + m1 + 100) / 100)) / 4
        + day
        - 32075;
    let fraction = (hour as f64 + (minute as f64 + second / 60.0) / 60.0) / 24.0;
    day_number as f64 - 0.5 + fraction
}

/// Julian date of a UTC instant.
pub fn julian_date(time: &DateTime<Utc>) -> f64 {
    let second = time.second() as f64 + f64::from(time.nanosecond() % 1_000_000_000) / 1e9;
    julian_date_parts(
        i64::from(time.year()),
        i64::from(time.month()),
        i64::from(time.day()),
        i64::from(time.hour()),
        i64::from(time.minute()),
        second,
    )
}

/// Greenwich mean sidereal time, in radians `[0, 2π)`, for a Julian date.
pub fn gmst_from_julian(jd: f64) -> f64 {
    let t = jd + 0.5;
    let ut = t - t.floor();
    let midnight = jd - ut;
    let tu = (midnight - J2000) / 36_525.0;
    let seconds = 24_110.548_41 + tu * (8_640_184.812_866 + tu * (0.093_104 - tu * 6.2e-6));
    let seconds = (seconds + SECONDS_PER_DAY * SIDEREAL_RATE * ut).rem_euclid(SECONDS_PER_DAY);
    TAU * seconds / SECONDS_PER_DAY
}

/// Greenwich mean sidereal time, in radians, of a UTC instant.
pub fn gmst(time: &DateTime<Utc>) -> f64 {
    gmst_from_julian(julian_date(time))
}
