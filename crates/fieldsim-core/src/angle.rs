use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::Vector2;

/// A heading in radians, always in (-pi, pi].
///
/// Robot orientations are stored as plain `f64` so that snapshots serialize
/// bit-exactly; this type is the place where wrapping and rotation happen.
///
/// ```
/// # use fieldsim_core::Angle;
/// let a = Angle::from_degrees(170.0) + Angle::from_degrees(20.0);
/// assert!((a.degrees() + 170.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialOrd, Serialize, Deserialize)]
pub struct Angle(f64);

impl Angle {
    pub const PI: Angle = Angle(PI);
    pub const PI_2: Angle = Angle(PI / 2.0);

    /// Create a new angle from radians.
    pub fn from_radians(radians: f64) -> Self {
        Angle(wrap_angle(radians))
    }

    /// Create a new angle from degrees.
    pub fn from_degrees(degrees: f64) -> Self {
        Self::from_radians(degrees.to_radians())
    }

    /// Heading of a direction vector. The zero vector maps to zero.
    pub fn of_vector(v: &Vector2) -> Self {
        Self::from_radians(v.y.atan2(v.x))
    }

    pub fn radians(&self) -> f64 {
        self.0
    }

    pub fn degrees(&self) -> f64 {
        self.0.to_degrees()
    }

    /// Unit vector pointing along this heading.
    pub fn to_vector(&self) -> Vector2 {
        Vector2::new(self.0.cos(), self.0.sin())
    }

    /// Rotate a vector counter-clockwise by this angle.
    pub fn rotate_vector(&self, v: &Vector2) -> Vector2 {
        let rot = nalgebra::Rotation2::new(self.0);
        rot * v
    }

    /// Mirror the heading across the y axis (x component negated).
    pub fn mirror_x(&self) -> Self {
        Self::from_radians(PI - self.0)
    }

    /// Mirror the heading across the x axis (y component negated).
    pub fn mirror_y(&self) -> Self {
        Self::from_radians(-self.0)
    }

    pub fn abs(&self) -> f64 {
        self.0.abs()
    }
}

impl std::ops::Add for Angle {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Angle::from_radians(self.0 + other.0)
    }
}

impl std::ops::Sub for Angle {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Angle::from_radians(self.0 - other.0)
    }
}

impl std::ops::Neg for Angle {
    type Output = Self;

    fn neg(self) -> Self {
        Angle::from_radians(-self.0)
    }
}

impl std::ops::Mul<Vector2> for Angle {
    type Output = Vector2;

    fn mul(self, v: Vector2) -> Vector2 {
        self.rotate_vector(&v)
    }
}

impl std::fmt::Display for Angle {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} rad", self.0)
    }
}

impl Default for Angle {
    fn default() -> Self {
        Self::from_radians(0.0)
    }
}

impl PartialEq for Angle {
    fn eq(&self, other: &Self) -> bool {
        let diff: f64 = (self.radians() - other.radians()).abs();
        const TOLERANCE: f64 = 1e-9;
        !(TOLERANCE..=(2.0 * PI - TOLERANCE)).contains(&diff)
    }
}

/// Wrap an angle in radians into (-pi, pi]. Values already in range are
/// returned unchanged.
pub fn wrap_angle(angle: f64) -> f64 {
    let mut angle = angle % (2.0 * PI);
    if angle <= -PI {
        angle += 2.0 * PI;
    } else if angle > PI {
        angle -= 2.0 * PI;
    }
    angle
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_wrap_angle() {
        assert_eq!(wrap_angle(0.0), 0.0);
        assert_eq!(wrap_angle(1.0), 1.0);
        assert_eq!(wrap_angle(PI), PI);
        assert_eq!(wrap_angle(-PI), PI);
        assert_eq!(wrap_angle(3.0 * PI), PI);
        assert_eq!(wrap_angle(-3.0 * PI), PI);
    }

    #[test]
    fn test_add_wraps_past_pi() {
        let a = Angle::from_degrees(170.0);
        let b = Angle::from_degrees(20.0);
        assert_relative_eq!((a + b).degrees(), -170.0, epsilon = 1e-9);
        assert_relative_eq!((-a - b).degrees(), 170.0, epsilon = 1e-9);
    }

    #[test]
    fn test_mirrors() {
        let a = Angle::from_degrees(30.0);
        assert_relative_eq!(a.mirror_x().degrees(), 150.0, epsilon = 1e-9);
        assert_relative_eq!(a.mirror_y().degrees(), -30.0, epsilon = 1e-9);
        assert_relative_eq!(a.mirror_x().mirror_y().degrees(), -150.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rotate_vector() {
        let r = Angle::PI_2 * Vector2::new(1.0, 0.0);
        assert_relative_eq!(r.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(r.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_of_vector() {
        let angle = Angle::of_vector(&Vector2::new(-1.0, -1.0));
        assert_relative_eq!(angle.degrees(), -135.0, epsilon = 1e-9);
        assert_eq!(Angle::of_vector(&Vector2::zeros()).radians(), 0.0);
    }
}
