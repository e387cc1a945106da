//! Curve vectors: ordered curve collections with a boundary type

use super::curve::{frame_from_points, CurvePrimitive, CurvePrimitiveType};
use crate::types::{Range3d, Transform, Vector3};

/// How the curves of a [`CurveVector`] combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum BoundaryType {
    /// Unstructured collection
    #[default]
    None = 0,
    /// Connected open path
    Open = 1,
    /// Closed loop, outer boundary of a region
    Outer = 2,
    /// Closed loop, hole of a region
    Inner = 3,
    /// Loops combined by parity (even-odd)
    ParityRegion = 4,
    /// Regions combined by union
    UnionRegion = 5,
}

impl BoundaryType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(BoundaryType::None),
            1 => Some(BoundaryType::Open),
            2 => Some(BoundaryType::Outer),
            3 => Some(BoundaryType::Inner),
            4 => Some(BoundaryType::ParityRegion),
            5 => Some(BoundaryType::UnionRegion),
            _ => None,
        }
    }
}

/// A collection of curves with a boundary type.
///
/// Region types (`ParityRegion`, `UnionRegion`) hold child curve vectors
/// wrapped in [`CurvePrimitive::CurveVector`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CurveVector {
    boundary_type: BoundaryType,
    curves: Vec<CurvePrimitive>,
}

impl CurveVector {
    pub fn new(boundary_type: BoundaryType) -> Self {
        CurveVector {
            boundary_type,
            curves: Vec::new(),
        }
    }

    /// Curve vector holding one primitive
    pub fn create(boundary_type: BoundaryType, primitive: CurvePrimitive) -> Self {
        CurveVector {
            boundary_type,
            curves: vec![primitive],
        }
    }

    /// Line string (or point string for `BoundaryType::None`) wrapped in a
    /// curve vector
    pub fn create_linear(points: Vec<Vector3>, boundary_type: BoundaryType) -> Self {
        let primitive = if boundary_type == BoundaryType::None {
            CurvePrimitive::create_point_string(points)
        } else {
            CurvePrimitive::create_line_string(points)
        };
        CurveVector::create(boundary_type, primitive)
    }

    pub fn boundary_type(&self) -> BoundaryType {
        self.boundary_type
    }

    pub fn set_boundary_type(&mut self, boundary_type: BoundaryType) {
        self.boundary_type = boundary_type;
    }

    pub fn push(&mut self, primitive: CurvePrimitive) {
        self.curves.push(primitive);
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    pub fn curves(&self) -> &[CurvePrimitive] {
        &self.curves
    }

    pub fn curves_mut(&mut self) -> &mut [CurvePrimitive] {
        &mut self.curves
    }

    pub fn into_curves(self) -> Vec<CurvePrimitive> {
        self.curves
    }

    pub fn is_open_path(&self) -> bool {
        self.boundary_type == BoundaryType::Open
    }

    /// Outer or inner loop
    pub fn is_closed_path(&self) -> bool {
        matches!(self.boundary_type, BoundaryType::Outer | BoundaryType::Inner)
    }

    pub fn is_parity_region(&self) -> bool {
        self.boundary_type == BoundaryType::ParityRegion
    }

    pub fn is_union_region(&self) -> bool {
        self.boundary_type == BoundaryType::UnionRegion
    }

    /// Closed loop or one of the region types
    pub fn is_any_region_type(&self) -> bool {
        self.is_closed_path() || self.is_parity_region() || self.is_union_region()
    }

    /// Single point-string child or point-string only collection
    pub fn is_point_string(&self) -> bool {
        !self.curves.is_empty()
            && self
                .curves
                .iter()
                .all(|c| c.curve_type() == CurvePrimitiveType::PointString)
    }

    pub fn has_disconnect(&self) -> bool {
        self.curves.iter().any(|c| c.has_disconnect())
    }

    pub fn start_point(&self) -> Option<Vector3> {
        self.curves.first().and_then(|c| c.start_point())
    }

    pub fn end_point(&self) -> Option<Vector3> {
        self.curves.last().and_then(|c| c.end_point())
    }

    pub fn range(&self) -> Range3d {
        let mut range = Range3d::null();
        for curve in &self.curves {
            range.extend_range(&curve.range());
        }
        range
    }

    pub fn transform_in_place(&mut self, transform: &Transform) {
        for curve in &mut self.curves {
            curve.transform_in_place(transform);
        }
    }

    /// First frame any child can produce.
    ///
    /// For planar loops the z axis is taken from the first three
    /// non-collinear points of the whole vector, so a closed polygon gets its
    /// plane normal even when its first child is a straight line.
    pub fn any_frenet_frame(&self) -> Option<Transform> {
        if self.is_any_region_type() || self.is_open_path() {
            let mut points = Vec::new();
            self.collect_stroke_points(&mut points);
            if let Some(frame) = frame_from_points(&points) {
                return Some(frame);
            }
        }
        self.curves.iter().find_map(|c| c.frenet_frame_at_start())
    }

    /// Control points of every child, in order
    pub(crate) fn collect_stroke_points(&self, out: &mut Vec<Vector3>) {
        for curve in &self.curves {
            match curve {
                CurvePrimitive::Arc(arc) => {
                    for i in 0..=8 {
                        out.push(arc.point_at_angle(arc.start + arc.sweep * (i as f64) / 8.0));
                    }
                }
                CurvePrimitive::BsplineCurve(b) => out.extend(b.poles.iter().copied()),
                CurvePrimitive::CurveVector(child) => child.collect_stroke_points(out),
                other => {
                    if let Some(points) = other.points() {
                        out.extend(points);
                    }
                }
            }
        }
    }

    pub fn is_same_structure_and_geometry(&self, other: &CurveVector, tolerance: f64) -> bool {
        self.boundary_type == other.boundary_type
            && self.curves.len() == other.curves.len()
            && self
                .curves
                .iter()
                .zip(&other.curves)
                .all(|(a, b)| a.is_same_structure_and_geometry(b, tolerance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Vector3> {
        vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(4.0, 0.0, 0.0),
            Vector3::new(4.0, 4.0, 0.0),
            Vector3::new(0.0, 4.0, 0.0),
            Vector3::new(0.0, 0.0, 0.0),
        ]
    }

    #[test]
    fn test_region_classification() {
        let loop_ = CurveVector::create_linear(square(), BoundaryType::Outer);
        assert!(loop_.is_closed_path());
        assert!(loop_.is_any_region_type());
        assert!(!loop_.is_open_path());

        let mut parity = CurveVector::new(BoundaryType::ParityRegion);
        parity.push(CurvePrimitive::create_child_curve_vector(loop_));
        assert!(parity.is_parity_region());
        assert!(parity.is_any_region_type());
    }

    #[test]
    fn test_point_string_vector() {
        let cv = CurveVector::create_linear(square(), BoundaryType::None);
        assert!(cv.is_point_string());
    }

    #[test]
    fn test_frame_of_planar_loop() {
        let cv = CurveVector::create_linear(square(), BoundaryType::Outer);
        let frame = cv.any_frenet_frame().unwrap();
        assert!(frame.matrix.is_identity());
        assert_eq!(frame.translation, Vector3::ZERO);
    }

    #[test]
    fn test_range() {
        let cv = CurveVector::create_linear(square(), BoundaryType::Outer);
        let r = cv.range();
        assert_eq!(r.low, Vector3::ZERO);
        assert_eq!(r.high, Vector3::new(4.0, 4.0, 0.0));
    }
}
