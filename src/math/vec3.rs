//! A minimal 3-component vector and axis rotations.
//!
//! Positions and force deltas are f64 throughout; the simulation accumulates
//! many small contributions per step and f32 drift is visible as jitter.

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// A 3D vector in layout space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
}

/// A principal rotation axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    /// The X axis.
    X,
    /// The Y axis.
    Y,
    /// The Z axis.
    Z,
}

impl Vec3 {
    /// The zero vector.
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Create a vector from components.
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean length. Never negative; zero only for the zero vector.
    #[inline]
    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Unit vector in the same direction, or `None` for the zero vector.
    ///
    /// The force loops skip coincident node pairs based on this: a zero
    /// direction has no meaningful normalization and must not divide.
    #[inline]
    pub fn normalized(self) -> Option<Vec3> {
        let len = self.length();
        if len == 0.0 {
            None
        } else {
            Some(Vec3::new(self.x / len, self.y / len, self.z / len))
        }
    }
}

/// Rotate `v` about the given principal axis by `angle` radians.
///
/// Applies the standard 3x3 rotation matrix for the axis. Pure; the caller
/// handles any translation into and out of the rotation center.
pub fn rotate_about_axis(v: Vec3, axis: Axis, angle: f64) -> Vec3 {
    let (sin, cos) = angle.sin_cos();
    match axis {
        Axis::X => Vec3::new(v.x, cos * v.y - sin * v.z, sin * v.y + cos * v.z),
        Axis::Y => Vec3::new(cos * v.x + sin * v.z, v.y, -sin * v.x + cos * v.z),
        Axis::Z => Vec3::new(cos * v.x - sin * v.y, sin * v.x + cos * v.y, v.z),
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    #[inline]
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    #[inline]
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl AddAssign for Vec3 {
    #[inline]
    fn add_assign(&mut self, rhs: Vec3) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl SubAssign for Vec3 {
    #[inline]
    fn sub_assign(&mut self, rhs: Vec3) {
        self.x -= rhs.x;
        self.y -= rhs.y;
        self.z -= rhs.z;
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;

    #[inline]
    fn mul(self, rhs: f64) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;

    #[inline]
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
