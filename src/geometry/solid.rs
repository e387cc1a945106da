//! Analytic solid primitives

use super::CurveVector;
use crate::types::{Matrix3, Range3d, Transform, Vector3};
use std::f64::consts::TAU;

/// Box with parallel base and top rectangles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxDetail {
    pub base_origin: Vector3,
    pub top_origin: Vector3,
    pub vector_x: Vector3,
    pub vector_y: Vector3,
    pub base_x: f64,
    pub base_y: f64,
    pub top_x: f64,
    pub top_y: f64,
    pub capped: bool,
}

impl BoxDetail {
    /// Axis-aligned box from a corner and sizes
    pub fn axis_aligned(origin: Vector3, size: Vector3, capped: bool) -> Self {
        BoxDetail {
            base_origin: origin,
            top_origin: origin + Vector3::new(0.0, 0.0, size.z),
            vector_x: Vector3::UNIT_X,
            vector_y: Vector3::UNIT_Y,
            base_x: size.x,
            base_y: size.y,
            top_x: size.x,
            top_y: size.y,
            capped,
        }
    }

    fn corners(&self) -> [Vector3; 8] {
        let base = |dx: f64, dy: f64| self.base_origin + self.vector_x * dx + self.vector_y * dy;
        let top = |dx: f64, dy: f64| self.top_origin + self.vector_x * dx + self.vector_y * dy;
        [
            base(0.0, 0.0),
            base(self.base_x, 0.0),
            base(0.0, self.base_y),
            base(self.base_x, self.base_y),
            top(0.0, 0.0),
            top(self.top_x, 0.0),
            top(0.0, self.top_y),
            top(self.top_x, self.top_y),
        ]
    }
}

/// Sphere, possibly non-uniformly scaled through its frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereDetail {
    pub center: Vector3,
    /// Columns are the scaled local axes (radius folded in)
    pub axes: Matrix3,
}

/// Cone or cylinder between two circular sections
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConeDetail {
    pub center_a: Vector3,
    pub center_b: Vector3,
    pub vector0: Vector3,
    pub vector90: Vector3,
    pub radius_a: f64,
    pub radius_b: f64,
    pub capped: bool,
}

/// Linear sweep of a base curve vector
#[derive(Debug, Clone, PartialEq)]
pub struct ExtrusionDetail {
    pub base: CurveVector,
    pub vector: Vector3,
    pub capped: bool,
}

/// Discriminant of [`SolidPrimitive`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SolidPrimitiveType {
    Box = 0,
    Sphere = 1,
    Cone = 2,
    Extrusion = 3,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SolidPrimitive {
    Box(BoxDetail),
    Sphere(SphereDetail),
    Cone(ConeDetail),
    Extrusion(ExtrusionDetail),
}

impl SolidPrimitive {
    pub fn solid_type(&self) -> SolidPrimitiveType {
        match self {
            SolidPrimitive::Box(_) => SolidPrimitiveType::Box,
            SolidPrimitive::Sphere(_) => SolidPrimitiveType::Sphere,
            SolidPrimitive::Cone(_) => SolidPrimitiveType::Cone,
            SolidPrimitive::Extrusion(_) => SolidPrimitiveType::Extrusion,
        }
    }

    /// Encloses a volume. Extrusions need a capped region base.
    pub fn has_capped_volume(&self) -> bool {
        match self {
            SolidPrimitive::Box(b) => b.capped,
            SolidPrimitive::Sphere(_) => true,
            SolidPrimitive::Cone(c) => c.capped,
            SolidPrimitive::Extrusion(e) => e.capped && e.base.is_any_region_type(),
        }
    }

    pub fn range(&self) -> Range3d {
        match self {
            SolidPrimitive::Box(b) => Range3d::from_points(&b.corners()),
            SolidPrimitive::Sphere(s) => {
                // extent along each world axis is the row length of the axes
                let m = &s.axes.m;
                let ext = Vector3::new(
                    Vector3::from_array(m[0]).length(),
                    Vector3::from_array(m[1]).length(),
                    Vector3::from_array(m[2]).length(),
                );
                Range3d::new(s.center - ext, s.center + ext)
            }
            SolidPrimitive::Cone(c) => {
                let mut range = Range3d::null();
                for (center, radius) in [(c.center_a, c.radius_a), (c.center_b, c.radius_b)] {
                    let circle = super::curve::Ellipse {
                        center,
                        vector0: c.vector0 * radius,
                        vector90: c.vector90 * radius,
                        start: 0.0,
                        sweep: TAU,
                    };
                    range.extend_range(&circle.range());
                }
                range
            }
            SolidPrimitive::Extrusion(e) => {
                let base = e.base.range();
                let mut range = base;
                range.extend_range(&base.transformed(&Transform::from_translation(e.vector)));
                range
            }
        }
    }

    /// Frame the primitive was constructed in
    pub fn construction_frame(&self) -> Option<Transform> {
        let frame = |origin: Vector3, x: Vector3, y: Vector3| {
            let x = x.try_normalize()?;
            let z = x.cross(&y).try_normalize()?;
            Some(Transform::from_matrix_and_translation(
                Matrix3::from_columns(x, z.cross(&x), z),
                origin,
            ))
        };
        match self {
            SolidPrimitive::Box(b) => frame(b.base_origin, b.vector_x, b.vector_y),
            SolidPrimitive::Sphere(s) => frame(s.center, s.axes.column(0), s.axes.column(1)),
            SolidPrimitive::Cone(c) => frame(c.center_a, c.vector0, c.vector90),
            SolidPrimitive::Extrusion(e) => e.base.any_frenet_frame(),
        }
    }

    pub fn transform_in_place(&mut self, transform: &Transform) {
        match self {
            SolidPrimitive::Box(b) => {
                b.base_origin = transform.multiply_point(b.base_origin);
                b.top_origin = transform.multiply_point(b.top_origin);
                let sx = transform.multiply_vector(b.vector_x);
                let sy = transform.multiply_vector(b.vector_y);
                let (lx, ly) = (sx.length(), sy.length());
                b.vector_x = sx.normalize();
                b.vector_y = sy.normalize();
                b.base_x *= lx;
                b.top_x *= lx;
                b.base_y *= ly;
                b.top_y *= ly;
            }
            SolidPrimitive::Sphere(s) => {
                s.center = transform.multiply_point(s.center);
                s.axes = transform.matrix * s.axes;
            }
            SolidPrimitive::Cone(c) => {
                c.center_a = transform.multiply_point(c.center_a);
                c.center_b = transform.multiply_point(c.center_b);
                let v0 = transform.multiply_vector(c.vector0);
                let v90 = transform.multiply_vector(c.vector90);
                let scale = v0.length();
                c.vector0 = v0.normalize();
                c.vector90 = v90.normalize();
                c.radius_a *= scale;
                c.radius_b *= scale;
            }
            SolidPrimitive::Extrusion(e) => {
                e.base.transform_in_place(transform);
                e.vector = transform.multiply_vector(e.vector);
            }
        }
    }

    pub fn is_same_structure_and_geometry(&self, other: &SolidPrimitive, tolerance: f64) -> bool {
        match (self, other) {
            (SolidPrimitive::Box(a), SolidPrimitive::Box(b)) => {
                a.capped == b.capped
                    && super::curve::same_points(&a.corners(), &b.corners(), tolerance)
            }
            (SolidPrimitive::Sphere(a), SolidPrimitive::Sphere(b)) => {
                a.center.is_almost_equal(&b.center, tolerance)
                    && (0..3).all(|i| a.axes.column(i).is_almost_equal(&b.axes.column(i), tolerance))
            }
            (SolidPrimitive::Cone(a), SolidPrimitive::Cone(b)) => {
                a.capped == b.capped
                    && a.center_a.is_almost_equal(&b.center_a, tolerance)
                    && a.center_b.is_almost_equal(&b.center_b, tolerance)
                    && a.vector0.is_almost_equal(&b.vector0, tolerance)
                    && a.vector90.is_almost_equal(&b.vector90, tolerance)
                    && (a.radius_a - b.radius_a).abs() <= tolerance
                    && (a.radius_b - b.radius_b).abs() <= tolerance
            }
            (SolidPrimitive::Extrusion(a), SolidPrimitive::Extrusion(b)) => {
                a.capped == b.capped
                    && a.vector.is_almost_equal(&b.vector, tolerance)
                    && a.base.is_same_structure_and_geometry(&b.base, tolerance)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BoundaryType;

    #[test]
    fn test_box_range_and_capping() {
        let b = SolidPrimitive::Box(BoxDetail::axis_aligned(Vector3::ZERO, Vector3::new(1.0, 2.0, 3.0), true));
        assert!(b.has_capped_volume());
        let r = b.range();
        assert_eq!(r.high, Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_uncapped_cone() {
        let cone = SolidPrimitive::Cone(ConeDetail {
            center_a: Vector3::ZERO,
            center_b: Vector3::new(0.0, 0.0, 5.0),
            vector0: Vector3::UNIT_X,
            vector90: Vector3::UNIT_Y,
            radius_a: 2.0,
            radius_b: 1.0,
            capped: false,
        });
        assert!(!cone.has_capped_volume());
        let r = cone.range();
        assert!(r.low.is_almost_equal(&Vector3::new(-2.0, -2.0, 0.0), 1e-12));
        assert!(r.high.is_almost_equal(&Vector3::new(2.0, 2.0, 5.0), 1e-12));
    }

    #[test]
    fn test_extrusion_of_open_path_is_not_volume() {
        let base = CurveVector::create_linear(vec![Vector3::ZERO, Vector3::UNIT_X], BoundaryType::Open);
        let e = SolidPrimitive::Extrusion(ExtrusionDetail {
            base,
            vector: Vector3::UNIT_Z,
            capped: true,
        });
        assert!(!e.has_capped_volume());
        assert_eq!(e.range().high, Vector3::new(1.0, 0.0, 1.0));
    }

    #[test]
    fn test_sphere_range() {
        let s = SolidPrimitive::Sphere(SphereDetail {
            center: Vector3::new(1.0, 1.0, 1.0),
            axes: Matrix3::from_scale(2.0),
        });
        let r = s.range();
        assert_eq!(r.low, Vector3::new(-1.0, -1.0, -1.0));
        assert_eq!(r.high, Vector3::new(3.0, 3.0, 3.0));
    }
}
