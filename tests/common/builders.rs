//! Test fixtures: a populated store, simple geometry and a stand-in kernel.

#![allow(dead_code)]

use geomstream::config::FacetOptions;
use geomstream::geometry::{
    BRepEntity, BRepType, BoundaryType, CurvePrimitive, CurveVector, FaceAttachments, FaceMesh, FaceSymbology,
    FallbackGeometry, Polyface,
};
use geomstream::kernel::{FallbackOnlyKernel, SolidKernel};
use geomstream::symbology::SubCategoryAppearance;
use geomstream::{
    BuilderConfiguration, CategoryId, ColorDef, GeometryBuilder, LineStyleId, MaterialId, MemoryStore, Range3d,
    SubCategoryId, Vector3, YawPitchRollAngles,
};

pub const CATEGORY: CategoryId = CategoryId::new(0x10);
pub const SUB_CATEGORY: SubCategoryId = SubCategoryId::new(0x11);
pub const OTHER_SUB_CATEGORY: SubCategoryId = SubCategoryId::new(0x12);
pub const WIDE_STYLE: LineStyleId = LineStyleId::new(0x20);

/// Store with two sub-categories of [`CATEGORY`] and one wide line style.
pub fn store() -> MemoryStore {
    let mut store = MemoryStore::new();
    store.insert_sub_category(
        SUB_CATEGORY,
        CATEGORY,
        SubCategoryAppearance {
            color: ColorDef::RED,
            weight: 2,
            ..Default::default()
        },
    );
    store.insert_sub_category(
        OTHER_SUB_CATEGORY,
        CATEGORY,
        SubCategoryAppearance {
            color: ColorDef::BLUE,
            weight: 5,
            ..Default::default()
        },
    );
    store.insert_line_style(WIDE_STYLE, 0.5);
    store
}

/// Element builder placed at `origin` with no rotation.
pub fn element_builder_at<'b>(store: &'b MemoryStore, origin: Vector3) -> GeometryBuilder<'b> {
    GeometryBuilder::create_3d_with_placement(CATEGORY, origin, YawPitchRollAngles::default(), BuilderConfiguration::default())
        .unwrap()
        .with_resolver(store)
        .with_geometry_source(store)
}

pub fn element_builder(store: &MemoryStore) -> GeometryBuilder<'_> {
    element_builder_at(store, Vector3::ZERO)
}

/// Closed square loop with its lower left corner at `(x, y)`.
pub fn square(x: f64, y: f64, size: f64) -> CurveVector {
    CurveVector::create_linear(
        vec![
            Vector3::new(x, y, 0.0),
            Vector3::new(x + size, y, 0.0),
            Vector3::new(x + size, y + size, 0.0),
            Vector3::new(x, y + size, 0.0),
            Vector3::new(x, y, 0.0),
        ],
        BoundaryType::Outer,
    )
}

pub fn line(start: Vector3, end: Vector3) -> CurvePrimitive {
    CurvePrimitive::create_line(start, end)
}

/// Solid body whose fallback is two cube meshes with their own face colors.
pub fn two_face_solid() -> BRepEntity {
    let faces = vec![
        FaceMesh {
            mesh: Polyface::unit_cube(),
            symbology_index: Some(0),
        },
        FaceMesh {
            mesh: Polyface::unit_cube(),
            symbology_index: Some(1),
        },
    ];
    BRepEntity::new(
        BRepType::Solid,
        vec![0xB0, 0xD1],
        Range3d::new(Vector3::ZERO, Vector3::new(1.0, 1.0, 1.0)),
    )
    .with_fallback(FallbackGeometry::Meshes(faces))
    .with_attachments(FaceAttachments {
        table: vec![
            FaceSymbology {
                color: Some(ColorDef::GREEN),
                ..Default::default()
            },
            FaceSymbology {
                color: Some(ColorDef::BLUE),
                material: Some(MaterialId::new(0x30)),
                ..Default::default()
            },
        ],
        face_index: vec![0, 1],
    })
}

/// Kernel that accepts every body carrying fallback geometry and serves
/// that geometry as its facets.
#[derive(Debug, Default)]
pub struct FacetingKernel;

impl SolidKernel for FacetingKernel {
    fn is_available(&self) -> bool {
        true
    }

    fn is_valid(&self, entity: &BRepEntity) -> bool {
        FallbackOnlyKernel.is_valid(entity)
    }

    fn facet(&self, entity: &BRepEntity, options: &FacetOptions) -> Vec<FaceMesh> {
        FallbackOnlyKernel.facet(entity, options)
    }

    fn planar_sheet_boundary(&self, entity: &BRepEntity) -> Option<CurveVector> {
        FallbackOnlyKernel.planar_sheet_boundary(entity)
    }

    fn wire_curves(&self, entity: &BRepEntity) -> Option<CurveVector> {
        FallbackOnlyKernel.wire_curves(entity)
    }

    fn face_attachments(&self, entity: &BRepEntity) -> Option<FaceAttachments> {
        FallbackOnlyKernel.face_attachments(entity)
    }
}
