//! Solid modeling kernel seam
//!
//! The stream never interprets BRep entity bytes itself. Anything that needs
//! the kernel (validity, facetting, wire and sheet extraction) goes through
//! [`SolidKernel`]. When no kernel is linked, [`FallbackOnlyKernel`] serves
//! the fallback geometry an entity already carries.

use crate::config::FacetOptions;
use crate::geometry::{BRepEntity, CurveVector, FaceAttachments, FaceMesh, FallbackGeometry};

pub trait SolidKernel {
    /// Whether primary BRep data can be produced and consumed
    fn is_available(&self) -> bool;

    fn is_valid(&self, entity: &BRepEntity) -> bool;

    /// Meshes for a sheet or solid. With face symbology, one mesh per
    /// symbology group, each tagged with its table index.
    fn facet(&self, entity: &BRepEntity, options: &FacetOptions) -> Vec<FaceMesh>;

    /// Boundary of a single planar face sheet
    fn planar_sheet_boundary(&self, entity: &BRepEntity) -> Option<CurveVector>;

    fn wire_curves(&self, entity: &BRepEntity) -> Option<CurveVector>;

    fn face_attachments(&self, entity: &BRepEntity) -> Option<FaceAttachments>;
}

/// Kernel stand-in that is never available.
///
/// Facetting and curve extraction return whatever
/// [`BRepEntity::fallback`] holds.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackOnlyKernel;

impl SolidKernel for FallbackOnlyKernel {
    fn is_available(&self) -> bool {
        false
    }

    fn is_valid(&self, entity: &BRepEntity) -> bool {
        entity.fallback.is_some()
    }

    fn facet(&self, entity: &BRepEntity, _options: &FacetOptions) -> Vec<FaceMesh> {
        match &entity.fallback {
            Some(FallbackGeometry::Meshes(meshes)) => meshes.clone(),
            _ => Vec::new(),
        }
    }

    fn planar_sheet_boundary(&self, entity: &BRepEntity) -> Option<CurveVector> {
        if !entity.is_single_planar_face {
            return None;
        }
        self.wire_curves(entity)
    }

    fn wire_curves(&self, entity: &BRepEntity) -> Option<CurveVector> {
        match &entity.fallback {
            Some(FallbackGeometry::Curves(curves)) => Some(curves.clone()),
            _ => None,
        }
    }

    fn face_attachments(&self, entity: &BRepEntity) -> Option<FaceAttachments> {
        entity.attachments.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{BRepType, BoundaryType, Polyface};
    use crate::types::{Range3d, Vector3};

    #[test]
    fn test_serves_mesh_fallback() {
        let mesh = FaceMesh {
            mesh: Polyface::unit_cube(),
            symbology_index: None,
        };
        let entity = BRepEntity::new(BRepType::Solid, Vec::new(), Range3d::null())
            .with_fallback(FallbackGeometry::Meshes(vec![mesh]));
        let kernel = FallbackOnlyKernel;
        assert!(!kernel.is_available());
        assert_eq!(kernel.facet(&entity, &FacetOptions::default()).len(), 1);
        assert!(kernel.wire_curves(&entity).is_none());
    }

    #[test]
    fn test_planar_boundary_needs_single_face() {
        let curves = CurveVector::create_linear(
            vec![Vector3::ZERO, Vector3::UNIT_X, Vector3::UNIT_Y, Vector3::ZERO],
            BoundaryType::Outer,
        );
        let mut entity = BRepEntity::new(BRepType::Sheet, Vec::new(), Range3d::null())
            .with_fallback(FallbackGeometry::Curves(curves));
        assert!(FallbackOnlyKernel.planar_sheet_boundary(&entity).is_none());
        entity.is_single_planar_face = true;
        assert!(FallbackOnlyKernel.planar_sheet_boundary(&entity).is_some());
    }
}
