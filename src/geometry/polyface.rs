//! Indexed polygon meshes

use super::moments::principal_axes_frame;
use crate::types::{Range3d, Transform, Vector3};
use ahash::AHashMap;

/// Closure the producer of a mesh declared for it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum ExpectedClosure {
    /// Determine from edge pairing
    #[default]
    Unknown = 0,
    /// Open sheet
    Sheet = 1,
    /// Closed volume
    Solid = 2,
}

impl ExpectedClosure {
    pub fn from_u32(value: u32) -> Self {
        match value {
            1 => ExpectedClosure::Sheet,
            2 => ExpectedClosure::Solid,
            _ => ExpectedClosure::Unknown,
        }
    }
}

/// Polygon mesh with zero-based face indices into a shared point array
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polyface {
    pub points: Vec<Vector3>,
    pub faces: Vec<Vec<u32>>,
    pub expected_closure: ExpectedClosure,
}

impl Polyface {
    pub fn new(points: Vec<Vector3>, faces: Vec<Vec<u32>>) -> Self {
        Polyface {
            points,
            faces,
            expected_closure: ExpectedClosure::Unknown,
        }
    }

    pub fn with_closure(mut self, closure: ExpectedClosure) -> Self {
        self.expected_closure = closure;
        self
    }

    /// Closed unit cube with outward-facing quads
    pub fn unit_cube() -> Polyface {
        let points = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(1.0, 0.0, 1.0),
            Vector3::new(1.0, 1.0, 1.0),
            Vector3::new(0.0, 1.0, 1.0),
        ];
        let faces = vec![
            vec![0, 3, 2, 1],
            vec![4, 5, 6, 7],
            vec![0, 1, 5, 4],
            vec![1, 2, 6, 5],
            vec![2, 3, 7, 6],
            vec![3, 0, 4, 7],
        ];
        Polyface::new(points, faces)
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Index audit: every face has at least three in-range indices
    pub fn is_valid(&self) -> bool {
        !self.points.is_empty()
            && !self.faces.is_empty()
            && self.faces.iter().all(|face| {
                face.len() >= 3 && face.iter().all(|&i| (i as usize) < self.points.len())
            })
    }

    /// Every directed edge is matched by exactly one reversed edge
    pub fn is_closed_by_edge_pairing(&self) -> bool {
        if self.faces.is_empty() {
            return false;
        }
        let mut edges: AHashMap<(u32, u32), i32> = AHashMap::new();
        for face in &self.faces {
            for k in 0..face.len() {
                let a = face[k];
                let b = face[(k + 1) % face.len()];
                if a == b {
                    continue;
                }
                let (key, delta) = if a < b { ((a, b), 1) } else { ((b, a), -1) };
                *edges.entry(key).or_insert(0) += delta;
            }
        }
        edges.values().all(|&balance| balance == 0)
    }

    /// Declared closure wins over topology
    pub fn is_solid(&self) -> bool {
        match self.expected_closure {
            ExpectedClosure::Solid => true,
            ExpectedClosure::Sheet => false,
            ExpectedClosure::Unknown => self.is_closed_by_edge_pairing(),
        }
    }

    pub fn range(&self, transform: Option<&Transform>) -> Range3d {
        match transform {
            None => Range3d::from_points(&self.points),
            Some(t) => {
                let mut range = Range3d::null();
                for p in &self.points {
                    range.extend_point(t.multiply_point(*p));
                }
                range
            }
        }
    }

    pub fn transform_in_place(&mut self, transform: &Transform) {
        transform.multiply_points(&mut self.points);
        if transform.has_mirror() {
            for face in &mut self.faces {
                face.reverse();
            }
        }
    }

    /// Centroidal principal-axes frame of the vertices
    pub fn principal_frame(&self) -> Option<Transform> {
        principal_axes_frame(&self.points)
    }

    pub fn is_same_structure_and_geometry(&self, other: &Polyface, tolerance: f64) -> bool {
        self.faces == other.faces && super::curve::same_points(&self.points, &other.points, tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_is_closed() {
        let cube = Polyface::unit_cube();
        assert!(cube.is_valid());
        assert!(cube.is_closed_by_edge_pairing());
        assert!(cube.is_solid());
    }

    #[test]
    fn test_open_box_is_sheet() {
        let mut open = Polyface::unit_cube();
        open.faces.pop();
        assert!(!open.is_closed_by_edge_pairing());
        assert!(!open.is_solid());
        assert!(open.clone().with_closure(ExpectedClosure::Solid).is_solid());
    }

    #[test]
    fn test_declared_sheet_overrides() {
        let cube = Polyface::unit_cube().with_closure(ExpectedClosure::Sheet);
        assert!(!cube.is_solid());
    }

    #[test]
    fn test_index_audit() {
        let mut bad = Polyface::unit_cube();
        bad.faces.push(vec![0, 1, 99]);
        assert!(!bad.is_valid());
    }
}
