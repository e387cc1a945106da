//! Curve primitives: lines, line strings, point strings, arcs, B-spline
//! curves and nested curve vectors

use super::CurveVector;
use crate::types::{Matrix3, Range3d, Transform, Vector3};
use std::f64::consts::{PI, TAU};

/// Straight line segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Vector3,
    pub end: Vector3,
}

impl Segment {
    pub fn new(start: Vector3, end: Vector3) -> Self {
        Segment { start, end }
    }
}

/// Elliptic arc `center + vector0 * cos(t) + vector90 * sin(t)` for
/// `t` in `start ..= start + sweep` (radians)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse {
    pub center: Vector3,
    pub vector0: Vector3,
    pub vector90: Vector3,
    pub start: f64,
    pub sweep: f64,
}

impl Ellipse {
    /// Circular arc in the XY plane
    pub fn circular_xy(center: Vector3, radius: f64, start: f64, sweep: f64) -> Self {
        Ellipse {
            center,
            vector0: Vector3::new(radius, 0.0, 0.0),
            vector90: Vector3::new(0.0, radius, 0.0),
            start,
            sweep,
        }
    }

    pub fn point_at_angle(&self, theta: f64) -> Vector3 {
        self.center + self.vector0 * theta.cos() + self.vector90 * theta.sin()
    }

    pub fn start_point(&self) -> Vector3 {
        self.point_at_angle(self.start)
    }

    pub fn end_point(&self) -> Vector3 {
        self.point_at_angle(self.start + self.sweep)
    }

    /// Sweep covers the full ellipse
    pub fn is_full(&self) -> bool {
        (self.sweep.abs() - TAU).abs() < 1.0e-10
    }

    /// Tangent direction at an angle, oriented along the sweep
    pub fn tangent_at_angle(&self, theta: f64) -> Vector3 {
        let d = self.vector90 * theta.cos() - self.vector0 * theta.sin();
        if self.sweep < 0.0 { -d } else { d }
    }

    fn angle_in_sweep(&self, theta: f64) -> bool {
        if self.is_full() {
            return true;
        }
        let (lo, span) = if self.sweep >= 0.0 {
            (self.start, self.sweep)
        } else {
            (self.start + self.sweep, -self.sweep)
        };
        let delta = (theta - lo).rem_euclid(TAU);
        delta <= span + 1.0e-12
    }

    /// Tight range: endpoints plus any axis extrema inside the sweep
    pub fn range(&self) -> Range3d {
        let mut range = Range3d::from_point(self.start_point());
        range.extend_point(self.end_point());
        let v0 = self.vector0.to_array();
        let v90 = self.vector90.to_array();
        for axis in 0..3 {
            let theta = v90[axis].atan2(v0[axis]);
            for candidate in [theta, theta + PI] {
                if self.angle_in_sweep(candidate) {
                    range.extend_point(self.point_at_angle(candidate));
                }
            }
        }
        range
    }

    pub fn transform(&mut self, transform: &Transform) {
        self.center = transform.multiply_point(self.center);
        self.vector0 = transform.multiply_vector(self.vector0);
        self.vector90 = transform.multiply_vector(self.vector90);
    }
}

/// Non-rational or rational B-spline curve
#[derive(Debug, Clone, PartialEq)]
pub struct BsplineCurve {
    pub order: usize,
    pub poles: Vec<Vector3>,
    pub weights: Option<Vec<f64>>,
    pub knots: Vec<f64>,
    pub closed: bool,
}

impl BsplineCurve {
    /// Uniform clamped curve through the given poles
    pub fn from_poles(poles: Vec<Vector3>, order: usize) -> Option<Self> {
        if order < 2 || poles.len() < order {
            return None;
        }
        let knots = super::bspline::clamped_uniform_knots(poles.len(), order);
        Some(BsplineCurve {
            order,
            poles,
            weights: None,
            knots,
            closed: false,
        })
    }
}

/// Discriminant of [`CurvePrimitive`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurvePrimitiveType {
    Line,
    LineString,
    PointString,
    Arc,
    BsplineCurve,
    CurveVector,
}

/// A single curve
#[derive(Debug, Clone, PartialEq)]
pub enum CurvePrimitive {
    Line(Segment),
    LineString(Vec<Vector3>),
    PointString(Vec<Vector3>),
    Arc(Ellipse),
    BsplineCurve(BsplineCurve),
    /// Nested curve vector, used for region children
    CurveVector(Box<CurveVector>),
}

impl CurvePrimitive {
    pub fn create_line(start: Vector3, end: Vector3) -> Self {
        CurvePrimitive::Line(Segment::new(start, end))
    }

    pub fn create_line_string(points: Vec<Vector3>) -> Self {
        CurvePrimitive::LineString(points)
    }

    pub fn create_point_string(points: Vec<Vector3>) -> Self {
        CurvePrimitive::PointString(points)
    }

    pub fn create_arc(arc: Ellipse) -> Self {
        CurvePrimitive::Arc(arc)
    }

    pub fn create_child_curve_vector(child: CurveVector) -> Self {
        CurvePrimitive::CurveVector(Box::new(child))
    }

    pub fn curve_type(&self) -> CurvePrimitiveType {
        match self {
            CurvePrimitive::Line(_) => CurvePrimitiveType::Line,
            CurvePrimitive::LineString(_) => CurvePrimitiveType::LineString,
            CurvePrimitive::PointString(_) => CurvePrimitiveType::PointString,
            CurvePrimitive::Arc(_) => CurvePrimitiveType::Arc,
            CurvePrimitive::BsplineCurve(_) => CurvePrimitiveType::BsplineCurve,
            CurvePrimitive::CurveVector(_) => CurvePrimitiveType::CurveVector,
        }
    }

    pub fn child_curve_vector(&self) -> Option<&CurveVector> {
        match self {
            CurvePrimitive::CurveVector(child) => Some(child),
            _ => None,
        }
    }

    /// Point array of line, line string and point string primitives
    pub fn points(&self) -> Option<Vec<Vector3>> {
        match self {
            CurvePrimitive::Line(seg) => Some(vec![seg.start, seg.end]),
            CurvePrimitive::LineString(pts) | CurvePrimitive::PointString(pts) => Some(pts.clone()),
            _ => None,
        }
    }

    /// True if any point in the primitive is a disconnect marker
    pub fn has_disconnect(&self) -> bool {
        match self {
            CurvePrimitive::Line(seg) => seg.start.is_disconnect() || seg.end.is_disconnect(),
            CurvePrimitive::LineString(pts) | CurvePrimitive::PointString(pts) => {
                pts.iter().any(|p| p.is_disconnect())
            }
            CurvePrimitive::BsplineCurve(curve) => curve.poles.iter().any(|p| p.is_disconnect()),
            CurvePrimitive::Arc(_) => false,
            CurvePrimitive::CurveVector(child) => child.has_disconnect(),
        }
    }

    pub fn start_point(&self) -> Option<Vector3> {
        match self {
            CurvePrimitive::Line(seg) => Some(seg.start),
            CurvePrimitive::LineString(pts) | CurvePrimitive::PointString(pts) => pts.first().copied(),
            CurvePrimitive::Arc(arc) => Some(arc.start_point()),
            CurvePrimitive::BsplineCurve(curve) => curve.poles.first().copied(),
            CurvePrimitive::CurveVector(child) => child.start_point(),
        }
    }

    pub fn end_point(&self) -> Option<Vector3> {
        match self {
            CurvePrimitive::Line(seg) => Some(seg.end),
            CurvePrimitive::LineString(pts) | CurvePrimitive::PointString(pts) => pts.last().copied(),
            CurvePrimitive::Arc(arc) => Some(arc.end_point()),
            CurvePrimitive::BsplineCurve(curve) => curve.poles.last().copied(),
            CurvePrimitive::CurveVector(child) => child.end_point(),
        }
    }

    pub fn range(&self) -> Range3d {
        match self {
            CurvePrimitive::Line(seg) => Range3d::new(seg.start, seg.end),
            CurvePrimitive::LineString(pts) | CurvePrimitive::PointString(pts) => Range3d::from_points(pts),
            CurvePrimitive::Arc(arc) => arc.range(),
            CurvePrimitive::BsplineCurve(curve) => Range3d::from_points(&curve.poles),
            CurvePrimitive::CurveVector(child) => child.range(),
        }
    }

    pub fn transform_in_place(&mut self, transform: &Transform) {
        match self {
            CurvePrimitive::Line(seg) => {
                seg.start = transform.multiply_point(seg.start);
                seg.end = transform.multiply_point(seg.end);
            }
            CurvePrimitive::LineString(pts) | CurvePrimitive::PointString(pts) => {
                transform.multiply_points(pts)
            }
            CurvePrimitive::Arc(arc) => arc.transform(transform),
            CurvePrimitive::BsplineCurve(curve) => transform.multiply_points(&mut curve.poles),
            CurvePrimitive::CurveVector(child) => child.transform_in_place(transform),
        }
    }

    /// Frenet-style frame at the curve start: x along the tangent, z along
    /// the curvature plane normal when one exists.
    pub fn frenet_frame_at_start(&self) -> Option<Transform> {
        match self {
            CurvePrimitive::Line(seg) => frame_from_points(&[seg.start, seg.end]),
            CurvePrimitive::LineString(pts) => frame_from_points(pts),
            CurvePrimitive::PointString(_) => None,
            CurvePrimitive::Arc(arc) => {
                let origin = arc.start_point();
                let x = arc.tangent_at_angle(arc.start).try_normalize()?;
                let mut z = arc.vector0.cross(&arc.vector90).try_normalize()?;
                if arc.sweep < 0.0 {
                    z = -z;
                }
                let y = z.cross(&x);
                Some(Transform::from_matrix_and_translation(
                    Matrix3::from_columns(x, y, z),
                    origin,
                ))
            }
            CurvePrimitive::BsplineCurve(curve) => frame_from_points(&curve.poles),
            CurvePrimitive::CurveVector(child) => child.any_frenet_frame(),
        }
    }

    /// Structural and coordinate equality within `tolerance`
    pub fn is_same_structure_and_geometry(&self, other: &CurvePrimitive, tolerance: f64) -> bool {
        match (self, other) {
            (CurvePrimitive::Line(a), CurvePrimitive::Line(b)) => {
                a.start.is_almost_equal(&b.start, tolerance) && a.end.is_almost_equal(&b.end, tolerance)
            }
            // the compact encoding stores a segment as a two point polyline
            (CurvePrimitive::Line(seg), CurvePrimitive::LineString(points))
            | (CurvePrimitive::LineString(points), CurvePrimitive::Line(seg)) => {
                same_points(&[seg.start, seg.end], points, tolerance)
            }
            (CurvePrimitive::LineString(a), CurvePrimitive::LineString(b))
            | (CurvePrimitive::PointString(a), CurvePrimitive::PointString(b)) => {
                same_points(a, b, tolerance)
            }
            (CurvePrimitive::Arc(a), CurvePrimitive::Arc(b)) => {
                a.center.is_almost_equal(&b.center, tolerance)
                    && a.vector0.is_almost_equal(&b.vector0, tolerance)
                    && a.vector90.is_almost_equal(&b.vector90, tolerance)
                    && (a.start - b.start).abs() <= tolerance
                    && (a.sweep - b.sweep).abs() <= tolerance
            }
            (CurvePrimitive::BsplineCurve(a), CurvePrimitive::BsplineCurve(b)) => {
                a.order == b.order
                    && a.closed == b.closed
                    && same_points(&a.poles, &b.poles, tolerance)
                    && same_scalars(&a.knots, &b.knots, tolerance)
                    && match (&a.weights, &b.weights) {
                        (Some(wa), Some(wb)) => same_scalars(wa, wb, tolerance),
                        (None, None) => true,
                        _ => false,
                    }
            }
            (CurvePrimitive::CurveVector(a), CurvePrimitive::CurveVector(b)) => {
                a.is_same_structure_and_geometry(b, tolerance)
            }
            _ => false,
        }
    }
}

pub(crate) fn same_points(a: &[Vector3], b: &[Vector3], tolerance: f64) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(p, q)| p.is_almost_equal(q, tolerance))
}

pub(crate) fn same_scalars(a: &[f64], b: &[f64], tolerance: f64) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(p, q)| (p - q).abs() <= tolerance)
}

/// Frame at the first point of a polyline: x toward the first distinct
/// point, z normal to the first non-collinear point, else the horizontal
/// perpendicular.
pub(crate) fn frame_from_points(points: &[Vector3]) -> Option<Transform> {
    let mut valid = points.iter().filter(|p| !p.is_disconnect());
    let origin = *valid.next()?;
    let rest: Vec<Vector3> = valid.copied().collect();
    let x = rest.iter().find_map(|p| (*p - origin).try_normalize())?;

    let z = rest
        .iter()
        .find_map(|p| x.cross(&(*p - origin)).try_normalize())
        .or_else(|| {
            // straight line: choose z as close to world Z as possible
            let reference = if x.z.abs() > 1.0 - 1.0e-10 { Vector3::UNIT_X } else { Vector3::UNIT_Z };
            let y = reference.cross(&x).try_normalize()?;
            Some(x.cross(&y))
        })?;
    let y = z.cross(&x);
    Some(Transform::from_matrix_and_translation(
        Matrix3::from_columns(x, y, z),
        origin,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_arc_range_quarter_circle() {
        let arc = Ellipse::circular_xy(Vector3::ZERO, 2.0, 0.0, FRAC_PI_2);
        let range = arc.range();
        assert!(range.low.is_almost_equal(&Vector3::new(0.0, 0.0, 0.0), 1e-12));
        assert!(range.high.is_almost_equal(&Vector3::new(2.0, 2.0, 0.0), 1e-12));
    }

    #[test]
    fn test_arc_range_full_circle() {
        let arc = Ellipse::circular_xy(Vector3::new(1.0, 1.0, 0.0), 1.0, 0.0, TAU);
        let range = arc.range();
        assert!(range.low.is_almost_equal(&Vector3::new(0.0, 0.0, 0.0), 1e-12));
        assert!(range.high.is_almost_equal(&Vector3::new(2.0, 2.0, 0.0), 1e-12));
    }

    #[test]
    fn test_line_frame_horizontal() {
        let line = CurvePrimitive::create_line(Vector3::new(1.0, 1.0, 0.0), Vector3::new(1.0, 5.0, 0.0));
        let frame = line.frenet_frame_at_start().unwrap();
        assert_eq!(frame.translation, Vector3::new(1.0, 1.0, 0.0));
        assert!(frame.matrix.column(0).is_almost_equal(&Vector3::UNIT_Y, 1e-12));
        assert!(frame.matrix.column(2).is_almost_equal(&Vector3::UNIT_Z, 1e-12));
    }

    #[test]
    fn test_point_string_has_no_frame() {
        let ps = CurvePrimitive::create_point_string(vec![Vector3::ZERO, Vector3::UNIT_X]);
        assert!(ps.frenet_frame_at_start().is_none());
        assert_eq!(ps.start_point(), Some(Vector3::ZERO));
    }

    #[test]
    fn test_disconnect_detection() {
        let ls = CurvePrimitive::create_line_string(vec![Vector3::ZERO, Vector3::DISCONNECT, Vector3::UNIT_X]);
        assert!(ls.has_disconnect());
    }

    #[test]
    fn test_same_structure_segment_as_polyline() {
        let line = CurvePrimitive::create_line(Vector3::ZERO, Vector3::UNIT_X);
        let ls = CurvePrimitive::create_line_string(vec![Vector3::ZERO, Vector3::UNIT_X]);
        let ps = CurvePrimitive::create_point_string(vec![Vector3::ZERO, Vector3::UNIT_X]);
        assert!(line.is_same_structure_and_geometry(&ls, 0.0));
        assert!(!line.is_same_structure_and_geometry(&ps, 0.0));
        assert!(line.is_same_structure_and_geometry(&line.clone(), 0.0));
    }
}
