//! Boundary-representation entities produced by a solid-modeling kernel
//!
//! The crate never interprets the kernel's entity bytes. A `BRepEntity`
//! carries them opaquely together with what the stream needs without a
//! kernel: body type, entity transform, range, face symbology and any
//! pre-computed fallback geometry.

use super::{CurveVector, Polyface};
use crate::types::{ColorDef, MaterialId, Range3d, Transform};

/// Body type of a BRep entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum BRepType {
    Solid = 0,
    Sheet = 1,
    Wire = 2,
    #[default]
    Invalid = 3,
}

impl BRepType {
    pub fn from_u32(value: u32) -> Self {
        match value {
            0 => BRepType::Solid,
            1 => BRepType::Sheet,
            2 => BRepType::Wire,
            _ => BRepType::Invalid,
        }
    }
}

/// Appearance override attached to a group of faces.
///
/// Entry 0 of a face symbology table is the body's base appearance (no
/// overrides); further entries list only the faces that differ from it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FaceSymbology {
    pub color: Option<ColorDef>,
    /// 0.0 = opaque, 1.0 = invisible
    pub transparency: Option<f64>,
    pub material: Option<MaterialId>,
}

impl FaceSymbology {
    pub fn is_default(&self) -> bool {
        self.color.is_none() && self.transparency.is_none() && self.material.is_none()
    }
}

/// Face attachment data: the sparse symbology table plus, for each face,
/// its index into that table
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FaceAttachments {
    pub table: Vec<FaceSymbology>,
    pub face_index: Vec<u32>,
}

impl FaceAttachments {
    /// True when any face references a non-base entry
    pub fn has_non_default(&self) -> bool {
        self.table.iter().skip(1).any(|s| !s.is_default())
            && self.face_index.iter().any(|&i| i != 0)
    }
}

/// One fallback mesh, optionally tied to a face symbology table entry
#[derive(Debug, Clone, PartialEq)]
pub struct FaceMesh {
    pub mesh: Polyface,
    pub symbology_index: Option<usize>,
}

/// Pre-computed non-kernel representation of a body
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackGeometry {
    Curves(CurveVector),
    Meshes(Vec<FaceMesh>),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BRepEntity {
    pub entity_type: BRepType,
    /// Kernel space to stream local
    pub transform: Transform,
    /// Opaque kernel serialization
    pub data: Vec<u8>,
    /// Range in kernel space
    pub entity_range: Range3d,
    pub attachments: Option<FaceAttachments>,
    /// Set when the body is a single planar face
    pub is_single_planar_face: bool,
    pub fallback: Option<FallbackGeometry>,
}

impl BRepEntity {
    pub fn new(entity_type: BRepType, data: Vec<u8>, entity_range: Range3d) -> Self {
        BRepEntity {
            entity_type,
            data,
            entity_range,
            ..Default::default()
        }
    }

    pub fn with_fallback(mut self, fallback: FallbackGeometry) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn with_attachments(mut self, attachments: FaceAttachments) -> Self {
        self.attachments = Some(attachments);
        self
    }

    pub fn has_face_symbology(&self) -> bool {
        self.attachments.as_ref().map_or(false, |a| a.has_non_default())
    }

    /// Range in stream coordinates; falls back to the fallback geometry
    /// when no entity range was recorded
    pub fn range(&self, transform: Option<&Transform>) -> Range3d {
        let mut range = self.entity_range.transformed(&self.transform);
        if range.is_null() {
            range = match &self.fallback {
                Some(FallbackGeometry::Curves(curves)) => curves.range(),
                Some(FallbackGeometry::Meshes(meshes)) => {
                    let mut r = Range3d::null();
                    for m in meshes {
                        r.extend_range(&m.mesh.range(None));
                    }
                    r
                }
                None => Range3d::null(),
            };
        }
        match transform {
            Some(t) => range.transformed(t),
            None => range,
        }
    }

    /// Only the entity transform changes; fallback geometry follows it
    pub fn transform_in_place(&mut self, transform: &Transform) {
        self.transform = *transform * self.transform;
        match &mut self.fallback {
            Some(FallbackGeometry::Curves(curves)) => curves.transform_in_place(transform),
            Some(FallbackGeometry::Meshes(meshes)) => {
                for m in meshes {
                    m.mesh.transform_in_place(transform);
                }
            }
            None => {}
        }
    }

    pub fn is_same_structure_and_geometry(&self, other: &BRepEntity, tolerance: f64) -> bool {
        self.entity_type == other.entity_type
            && self.data == other.data
            && self.transform.translation.is_almost_equal(&other.transform.translation, tolerance)
            && (0..3).all(|i| {
                self.transform
                    .matrix
                    .column(i)
                    .is_almost_equal(&other.transform.matrix.column(i), tolerance)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Vector3;

    #[test]
    fn test_face_symbology_default() {
        let mut a = FaceAttachments {
            table: vec![FaceSymbology::default(), FaceSymbology::default()],
            face_index: vec![0, 1],
        };
        assert!(!a.has_non_default());
        a.table[1].color = Some(ColorDef::RED);
        assert!(a.has_non_default());
    }

    #[test]
    fn test_range_uses_entity_transform() {
        let mut e = BRepEntity::new(
            BRepType::Solid,
            vec![1, 2, 3],
            Range3d::new(Vector3::ZERO, Vector3::new(1.0, 1.0, 1.0)),
        );
        e.transform_in_place(&Transform::from_translation(Vector3::new(5.0, 0.0, 0.0)));
        assert_eq!(e.range(None).low, Vector3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn test_type_from_u32() {
        assert_eq!(BRepType::from_u32(1), BRepType::Sheet);
        assert_eq!(BRepType::from_u32(42), BRepType::Invalid);
    }
}
