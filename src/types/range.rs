//! Axis-aligned range with an explicit null (empty) state

use super::{Transform, Vector3};
use std::fmt;

/// Axis-aligned 3D range.
///
/// A null range has `low > high` in every axis and acts as the identity for
/// [`Range3d::union`]. Ranges only ever grow through the `extend_*` calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range3d {
    /// Lower corner
    pub low: Vector3,
    /// Upper corner
    pub high: Vector3,
}

impl Default for Range3d {
    fn default() -> Self {
        Range3d::null()
    }
}

impl Range3d {
    /// The empty range
    pub const fn null() -> Self {
        Range3d {
            low: Vector3::new(f64::MAX, f64::MAX, f64::MAX),
            high: Vector3::new(-f64::MAX, -f64::MAX, -f64::MAX),
        }
    }

    /// Range spanning two corners in any order
    pub fn new(a: Vector3, b: Vector3) -> Self {
        let mut range = Range3d::from_point(a);
        range.extend_point(b);
        range
    }

    /// Degenerate range holding one point
    pub fn from_point(point: Vector3) -> Self {
        Range3d {
            low: point,
            high: point,
        }
    }

    /// Range of all points, skipping disconnect markers
    pub fn from_points(points: &[Vector3]) -> Self {
        let mut range = Range3d::null();
        for point in points.iter().filter(|p| !p.is_disconnect()) {
            range.extend_point(*point);
        }
        range
    }

    /// Check for the empty range
    pub fn is_null(&self) -> bool {
        self.low.x > self.high.x || self.low.y > self.high.y || self.low.z > self.high.z
    }

    /// Non-empty and finite, usable as a placement box
    pub fn is_valid_box(&self) -> bool {
        !self.is_null()
            && self.low.to_array().iter().all(|v| v.is_finite())
            && self.high.to_array().iter().all(|v| v.is_finite())
    }

    /// Grow to include a point
    pub fn extend_point(&mut self, point: Vector3) {
        self.low.x = self.low.x.min(point.x);
        self.low.y = self.low.y.min(point.y);
        self.low.z = self.low.z.min(point.z);
        self.high.x = self.high.x.max(point.x);
        self.high.y = self.high.y.max(point.y);
        self.high.z = self.high.z.max(point.z);
    }

    /// Grow to include another range (null ranges are ignored)
    pub fn extend_range(&mut self, other: &Range3d) {
        if other.is_null() {
            return;
        }
        self.extend_point(other.low);
        self.extend_point(other.high);
    }

    pub fn union(&self, other: &Range3d) -> Range3d {
        let mut result = *self;
        result.extend_range(other);
        result
    }

    /// Overlap of two ranges, null when disjoint
    pub fn intersection(&self, other: &Range3d) -> Range3d {
        if self.is_null() || other.is_null() {
            return Range3d::null();
        }
        let result = Range3d {
            low: Vector3::new(
                self.low.x.max(other.low.x),
                self.low.y.max(other.low.y),
                self.low.z.max(other.low.z),
            ),
            high: Vector3::new(
                self.high.x.min(other.high.x),
                self.high.y.min(other.high.y),
                self.high.z.min(other.high.z),
            ),
        };
        if result.is_null() {
            Range3d::null()
        } else {
            result
        }
    }

    /// Pad each side by the given amounts
    pub fn expand(&mut self, dx: f64, dy: f64, dz: f64) {
        if self.is_null() {
            return;
        }
        self.low = self.low - Vector3::new(dx, dy, dz);
        self.high = self.high + Vector3::new(dx, dy, dz);
    }

    /// Scale each axis extent about the center
    pub fn scale_about_center(&self, factor: f64) -> Range3d {
        if self.is_null() {
            return *self;
        }
        let center = self.center();
        let half = (self.high - self.low) * (0.5 * factor);
        Range3d {
            low: center - half,
            high: center + half,
        }
    }

    pub fn x_length(&self) -> f64 {
        if self.is_null() { 0.0 } else { self.high.x - self.low.x }
    }

    pub fn y_length(&self) -> f64 {
        if self.is_null() { 0.0 } else { self.high.y - self.low.y }
    }

    pub fn z_length(&self) -> f64 {
        if self.is_null() { 0.0 } else { self.high.z - self.low.z }
    }

    pub fn center(&self) -> Vector3 {
        self.low.interpolate(0.5, &self.high)
    }

    pub fn contains_point(&self, point: Vector3) -> bool {
        !self.is_null()
            && point.x >= self.low.x
            && point.x <= self.high.x
            && point.y >= self.low.y
            && point.y <= self.high.y
            && point.z >= self.low.z
            && point.z <= self.high.z
    }

    /// True when `other` lies entirely inside this range
    pub fn contains_range(&self, other: &Range3d) -> bool {
        if other.is_null() {
            return true;
        }
        self.contains_point(other.low) && self.contains_point(other.high)
    }

    pub fn intersects(&self, other: &Range3d) -> bool {
        !self.intersection(other).is_null()
    }

    /// The eight box corners
    pub fn corners(&self) -> [Vector3; 8] {
        let (l, h) = (self.low, self.high);
        [
            Vector3::new(l.x, l.y, l.z),
            Vector3::new(h.x, l.y, l.z),
            Vector3::new(l.x, h.y, l.z),
            Vector3::new(h.x, h.y, l.z),
            Vector3::new(l.x, l.y, h.z),
            Vector3::new(h.x, l.y, h.z),
            Vector3::new(l.x, h.y, h.z),
            Vector3::new(h.x, h.y, h.z),
        ]
    }

    /// Range of the transformed corners
    pub fn transformed(&self, transform: &Transform) -> Range3d {
        if self.is_null() {
            return *self;
        }
        let mut result = Range3d::null();
        for corner in self.corners() {
            result.extend_point(transform.multiply_point(corner));
        }
        result
    }

    pub fn is_almost_equal(&self, other: &Range3d, tolerance: f64) -> bool {
        if self.is_null() || other.is_null() {
            return self.is_null() == other.is_null();
        }
        self.low.is_almost_equal(&other.low, tolerance)
            && self.high.is_almost_equal(&other.high, tolerance)
    }
}

impl fmt::Display for Range3d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "Range3d[null]")
        } else {
            write!(f, "Range3d[{} -> {}]", self.low, self.high)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_range() {
        let r = Range3d::null();
        assert!(r.is_null());
        assert!(!r.is_valid_box());
        assert_eq!(r.x_length(), 0.0);
    }

    #[test]
    fn test_from_points_skips_disconnect() {
        let points = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::DISCONNECT,
            Vector3::new(10.0, 5.0, -2.0),
        ];
        let r = Range3d::from_points(&points);
        assert_eq!(r.low, Vector3::new(0.0, 0.0, -2.0));
        assert_eq!(r.high, Vector3::new(10.0, 5.0, 0.0));
    }

    #[test]
    fn test_union_with_null() {
        let a = Range3d::new(Vector3::ZERO, Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(a.union(&Range3d::null()), a);
        assert_eq!(Range3d::null().union(&a), a);
    }

    #[test]
    fn test_intersection() {
        let a = Range3d::new(Vector3::ZERO, Vector3::new(2.0, 2.0, 2.0));
        let b = Range3d::new(Vector3::new(1.0, 1.0, 1.0), Vector3::new(3.0, 3.0, 3.0));
        let c = a.intersection(&b);
        assert_eq!(c.low, Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(c.high, Vector3::new(2.0, 2.0, 2.0));

        let far = Range3d::from_point(Vector3::new(10.0, 10.0, 10.0));
        assert!(a.intersection(&far).is_null());
    }

    #[test]
    fn test_expand_and_contains() {
        let mut r = Range3d::new(Vector3::ZERO, Vector3::new(1.0, 1.0, 0.0));
        r.expand(0.5, 0.5, 0.0);
        assert!(r.contains_point(Vector3::new(-0.5, 1.5, 0.0)));
        assert!(!r.contains_point(Vector3::new(-0.5, 1.5, 0.1)));
    }

    #[test]
    fn test_scale_about_center() {
        let r = Range3d::new(Vector3::ZERO, Vector3::new(10.0, 10.0, 10.0));
        let s = r.scale_about_center(1.2);
        assert!((s.x_length() - 12.0).abs() < 1e-10);
        assert_eq!(s.center(), r.center());
    }
}
