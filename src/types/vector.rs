//! Point and vector types for stream geometry

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

/// Coordinate value marking a gap between point runs.
///
/// A point whose x equals this value is a "disconnect" and splits a
/// line-string into separate pieces.
pub const DISCONNECT: f64 = 1.0e31;

/// 2D point or vector (also used for surface uv parameters)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    /// Create a new 2D vector
    pub const fn new(x: f64, y: f64) -> Self {
        Vector2 { x, y }
    }

    /// Zero vector
    pub const ZERO: Vector2 = Vector2::new(0.0, 0.0);

    /// Disconnect marker point
    pub const DISCONNECT: Vector2 = Vector2::new(DISCONNECT, DISCONNECT);

    /// Check whether this is a disconnect marker
    pub fn is_disconnect(&self) -> bool {
        self.x == DISCONNECT
    }

    /// Lift into 3D at the given z
    pub fn with_z(&self, z: f64) -> Vector3 {
        Vector3::new(self.x, self.y, z)
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Cross product (returns scalar for 2D)
    pub fn cross(&self, other: &Vector2) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn distance(&self, other: &Vector2) -> f64 {
        (*self - *other).length()
    }
}

impl Default for Vector2 {
    fn default() -> Self {
        Vector2::ZERO
    }
}

impl Add for Vector2 {
    type Output = Vector2;
    fn add(self, other: Vector2) -> Vector2 {
        Vector2::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Vector2 {
    type Output = Vector2;
    fn sub(self, other: Vector2) -> Vector2 {
        Vector2::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f64> for Vector2 {
    type Output = Vector2;
    fn mul(self, scalar: f64) -> Vector2 {
        Vector2::new(self.x * scalar, self.y * scalar)
    }
}

impl fmt::Display for Vector2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// 3D point or vector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    /// Create a new 3D vector
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Vector3 { x, y, z }
    }

    /// Zero vector
    pub const ZERO: Vector3 = Vector3::new(0.0, 0.0, 0.0);

    /// Unit X vector
    pub const UNIT_X: Vector3 = Vector3::new(1.0, 0.0, 0.0);

    /// Unit Y vector
    pub const UNIT_Y: Vector3 = Vector3::new(0.0, 1.0, 0.0);

    /// Unit Z vector
    pub const UNIT_Z: Vector3 = Vector3::new(0.0, 0.0, 1.0);

    /// Disconnect marker point
    pub const DISCONNECT: Vector3 = Vector3::new(DISCONNECT, DISCONNECT, DISCONNECT);

    /// Check whether this is a disconnect marker
    pub fn is_disconnect(&self) -> bool {
        self.x == DISCONNECT
    }

    /// Drop the z coordinate
    pub fn xy(&self) -> Vector2 {
        Vector2::new(self.x, self.y)
    }

    /// Calculate the length (magnitude) of the vector
    pub fn length(&self) -> f64 {
        self.length_squared().sqrt()
    }

    pub fn length_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Unit vector in the same direction, or `None` for a zero-length vector
    pub fn try_normalize(&self) -> Option<Self> {
        let len = self.length();
        if len > 1.0e-14 {
            Some(Vector3::new(self.x / len, self.y / len, self.z / len))
        } else {
            None
        }
    }

    /// Normalize the vector (zero vectors are returned unchanged)
    pub fn normalize(&self) -> Self {
        self.try_normalize().unwrap_or(*self)
    }

    /// Dot product
    pub fn dot(&self, other: &Vector3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product
    pub fn cross(&self, other: &Vector3) -> Vector3 {
        Vector3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Distance to another point
    pub fn distance(&self, other: &Vector3) -> f64 {
        (*self - *other).length()
    }

    /// Linear interpolation, `fraction` 0 gives `self`
    pub fn interpolate(&self, fraction: f64, other: &Vector3) -> Vector3 {
        *self + (*other - *self) * fraction
    }

    /// Component-wise comparison within a tolerance
    pub fn is_almost_equal(&self, other: &Vector3, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance
            && (self.y - other.y).abs() <= tolerance
            && (self.z - other.z).abs() <= tolerance
    }

    /// Largest absolute coordinate
    pub fn max_abs(&self) -> f64 {
        self.x.abs().max(self.y.abs()).max(self.z.abs())
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn from_array(a: [f64; 3]) -> Self {
        Vector3::new(a[0], a[1], a[2])
    }
}

impl Default for Vector3 {
    fn default() -> Self {
        Vector3::ZERO
    }
}

impl Add for Vector3 {
    type Output = Vector3;
    fn add(self, other: Vector3) -> Vector3 {
        Vector3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl AddAssign for Vector3 {
    fn add_assign(&mut self, other: Vector3) {
        self.x += other.x;
        self.y += other.y;
        self.z += other.z;
    }
}

impl Sub for Vector3 {
    type Output = Vector3;
    fn sub(self, other: Vector3) -> Vector3 {
        Vector3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Mul<f64> for Vector3 {
    type Output = Vector3;
    fn mul(self, scalar: f64) -> Vector3 {
        Vector3::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

impl Div<f64> for Vector3 {
    type Output = Vector3;
    fn div(self, scalar: f64) -> Vector3 {
        Vector3::new(self.x / scalar, self.y / scalar, self.z / scalar)
    }
}

impl Neg for Vector3 {
    type Output = Vector3;
    fn neg(self) -> Vector3 {
        Vector3::new(-self.x, -self.y, -self.z)
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnect_marker() {
        assert!(Vector3::DISCONNECT.is_disconnect());
        assert!(Vector2::DISCONNECT.is_disconnect());
        assert!(!Vector3::new(1.0, 2.0, 3.0).is_disconnect());
    }

    #[test]
    fn test_vector3_cross() {
        let cross = Vector3::UNIT_X.cross(&Vector3::UNIT_Y);
        assert_eq!(cross, Vector3::UNIT_Z);
    }

    #[test]
    fn test_try_normalize_zero() {
        assert!(Vector3::ZERO.try_normalize().is_none());
        let n = Vector3::new(3.0, 0.0, 4.0).try_normalize().unwrap();
        assert!((n.length() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_interpolate() {
        let a = Vector3::new(0.0, 0.0, 0.0);
        let b = Vector3::new(2.0, 4.0, 6.0);
        assert_eq!(a.interpolate(0.5, &b), Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_almost_equal() {
        let a = Vector3::new(1.0, 1.0, 1.0);
        let b = Vector3::new(1.0 + 1e-9, 1.0, 1.0);
        assert!(a.is_almost_equal(&b, 1e-8));
        assert!(!a.is_almost_equal(&b, 0.0));
    }
}
