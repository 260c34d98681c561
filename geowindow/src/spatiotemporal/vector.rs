//! Three-component vector used for positions, extents and velocities.
//!
//! Geographic positions use `x` = latitude (degrees), `y` = longitude
//! (degrees) and `z` = elevation (meters). Cartesian positions use meters on
//! every axis.

use std::fmt;
use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

/// A vector of three `f64` components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3d {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3d {
    /// The zero vector.
    pub const ZERO: Vector3d = Vector3d {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Creates a vector from its components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Dot product.
    pub fn dot(&self, other: &Vector3d) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Euclidean length.
    pub fn length(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Returns `self + scale * direction`.
    pub fn scale_add(&self, scale: f64, direction: &Vector3d) -> Vector3d {
        *self + *direction * scale
    }

    /// Angle between two vectors in radians, in `[0, π]`.
    ///
    /// Returns NaN when either vector has zero length. The cosine is clamped
    /// so rounding on nearly parallel vectors cannot leave `acos`'s domain.
    pub fn angle(&self, other: &Vector3d) -> f64 {
        let denominator = self.length() * other.length();
        if denominator == 0.0 {
            return f64::NAN;
        }
        (self.dot(other) / denominator).clamp(-1.0, 1.0).acos()
    }

    /// True when every component is finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Vector3d {
    type Output = Vector3d;

    fn add(self, rhs: Vector3d) -> Vector3d {
        Vector3d::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vector3d {
    type Output = Vector3d;

    fn sub(self, rhs: Vector3d) -> Vector3d {
        Vector3d::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vector3d {
    type Output = Vector3d;

    fn mul(self, rhs: f64) -> Vector3d {
        Vector3d::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl fmt::Display for Vector3d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_arithmetic() {
        let a = Vector3d::new(1.0, 2.0, 3.0);
        let b = Vector3d::new(0.5, 0.5, 0.5);
        assert_eq!(a + b, Vector3d::new(1.5, 2.5, 3.5));
        assert_eq!(a - b, Vector3d::new(0.5, 1.5, 2.5));
        assert_eq!(a * 2.0, Vector3d::new(2.0, 4.0, 6.0));
        assert_eq!(a.scale_add(2.0, &b), Vector3d::new(2.0, 3.0, 4.0));
    }

    #[test]
    fn test_angle_orthogonal() {
        let a = Vector3d::new(1.0, 0.0, 0.0);
        let b = Vector3d::new(0.0, 5.0, 0.0);
        assert!((a.angle(&b) - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_angle_parallel_is_zero() {
        let a = Vector3d::new(3.0, 4.0, 12.0);
        assert_eq!(a.angle(&(a * 7.0)), 0.0);
    }

    #[test]
    fn test_angle_with_zero_vector_is_nan() {
        let a = Vector3d::new(1.0, 0.0, 0.0);
        assert!(a.angle(&Vector3d::ZERO).is_nan());
    }

    #[test]
    fn test_length() {
        assert_eq!(Vector3d::new(3.0, 4.0, 0.0).length(), 5.0);
    }
}
