//! The geometric primitive sum type and its uniform capability surface

use super::{
    BRepEntity, BRepType, BsplineSurface, CurvePrimitive, CurvePrimitiveType,
    CurveVector, Polyface, SolidPrimitive, TextString,
};
use crate::error::{unreachable_variant, GeomStreamError, Result};
use crate::replay::DrawingConsumer;
use crate::types::{Range3d, Transform};

/// Discriminant of [`GeometricPrimitive`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryType {
    CurvePrimitive,
    CurveVector,
    SolidPrimitive,
    BsplineSurface,
    Polyface,
    BRepEntity,
    TextString,
}

/// Exactly one concrete geometry value.
///
/// The variant never changes after construction; every query dispatches
/// by matching on it.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometricPrimitive {
    CurvePrimitive(CurvePrimitive),
    CurveVector(CurveVector),
    SolidPrimitive(SolidPrimitive),
    BsplineSurface(BsplineSurface),
    Polyface(Polyface),
    BRepEntity(BRepEntity),
    TextString(TextString),
}

impl GeometricPrimitive {
    // ------------------------------------------------------------------
    // Factories
    // ------------------------------------------------------------------

    /// Rejects empty point arrays
    pub fn from_curve_primitive(curve: CurvePrimitive) -> Option<Self> {
        let empty = match &curve {
            CurvePrimitive::LineString(p) | CurvePrimitive::PointString(p) => p.is_empty(),
            CurvePrimitive::BsplineCurve(b) => b.poles.is_empty(),
            CurvePrimitive::CurveVector(cv) => cv.is_empty(),
            _ => false,
        };
        (!empty).then_some(GeometricPrimitive::CurvePrimitive(curve))
    }

    pub fn from_curve_vector(curves: CurveVector) -> Option<Self> {
        (!curves.is_empty()).then_some(GeometricPrimitive::CurveVector(curves))
    }

    pub fn from_solid_primitive(solid: SolidPrimitive) -> Option<Self> {
        Some(GeometricPrimitive::SolidPrimitive(solid))
    }

    pub fn from_bspline_surface(surface: BsplineSurface) -> Option<Self> {
        surface.is_valid().then_some(GeometricPrimitive::BsplineSurface(surface))
    }

    pub fn from_polyface(mesh: Polyface) -> Option<Self> {
        mesh.is_valid().then_some(GeometricPrimitive::Polyface(mesh))
    }

    pub fn from_brep(entity: BRepEntity) -> Option<Self> {
        (entity.entity_type != BRepType::Invalid).then_some(GeometricPrimitive::BRepEntity(entity))
    }

    pub fn from_text_string(text: TextString) -> Option<Self> {
        (!text.text.is_empty()).then_some(GeometricPrimitive::TextString(text))
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn geometry_type(&self) -> GeometryType {
        match self {
            GeometricPrimitive::CurvePrimitive(_) => GeometryType::CurvePrimitive,
            GeometricPrimitive::CurveVector(_) => GeometryType::CurveVector,
            GeometricPrimitive::SolidPrimitive(_) => GeometryType::SolidPrimitive,
            GeometricPrimitive::BsplineSurface(_) => GeometryType::BsplineSurface,
            GeometricPrimitive::Polyface(_) => GeometryType::Polyface,
            GeometricPrimitive::BRepEntity(_) => GeometryType::BRepEntity,
            GeometricPrimitive::TextString(_) => GeometryType::TextString,
        }
    }

    pub fn as_curve_primitive(&self) -> Option<&CurvePrimitive> {
        match self {
            GeometricPrimitive::CurvePrimitive(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_curve_vector(&self) -> Option<&CurveVector> {
        match self {
            GeometricPrimitive::CurveVector(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_solid_primitive(&self) -> Option<&SolidPrimitive> {
        match self {
            GeometricPrimitive::SolidPrimitive(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bspline_surface(&self) -> Option<&BsplineSurface> {
        match self {
            GeometricPrimitive::BsplineSurface(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_polyface(&self) -> Option<&Polyface> {
        match self {
            GeometricPrimitive::Polyface(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_brep(&self) -> Option<&BRepEntity> {
        match self {
            GeometricPrimitive::BRepEntity(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_text_string(&self) -> Option<&TextString> {
        match self {
            GeometricPrimitive::TextString(t) => Some(t),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Range and frames
    // ------------------------------------------------------------------

    /// Range in stream coordinates, or after `transform` when given.
    /// `None` when the geometry has no extent.
    pub fn get_range(&self, transform: Option<&Transform>) -> Option<Range3d> {
        let range = match self {
            GeometricPrimitive::CurvePrimitive(c) => transformed_range(c.range(), c, transform),
            GeometricPrimitive::CurveVector(c) => {
                let mut clone = c.clone();
                if let Some(t) = transform {
                    clone.transform_in_place(t);
                }
                clone.range()
            }
            GeometricPrimitive::SolidPrimitive(s) => {
                let mut clone = s.clone();
                if let Some(t) = transform {
                    clone.transform_in_place(t);
                }
                clone.range()
            }
            GeometricPrimitive::BsplineSurface(s) => s.range(transform),
            GeometricPrimitive::Polyface(p) => p.range(transform),
            GeometricPrimitive::BRepEntity(b) => b.range(transform),
            GeometricPrimitive::TextString(t) => t.range(transform),
        };
        (!range.is_null()).then_some(range)
    }

    /// Canonical local-to-world frame.
    ///
    /// Falls back to a translation to the start point when no frame can be
    /// built, and to identity with `false` when there is no start point.
    /// The rotation is always squared and normalized on success.
    pub fn get_local_coordinate_frame(&self) -> (Transform, bool) {
        let frame = match self {
            GeometricPrimitive::CurvePrimitive(c) => c
                .frenet_frame_at_start()
                .or_else(|| c.start_point().map(Transform::from_translation)),
            GeometricPrimitive::CurveVector(c) => c
                .any_frenet_frame()
                .or_else(|| c.start_point().map(Transform::from_translation)),
            GeometricPrimitive::SolidPrimitive(s) => s.construction_frame(),
            GeometricPrimitive::BsplineSurface(s) => s
                .principal_frame()
                .or_else(|| s.poles.first().copied().map(Transform::from_translation)),
            GeometricPrimitive::Polyface(p) => p
                .principal_frame()
                .or_else(|| p.points.first().copied().map(Transform::from_translation)),
            GeometricPrimitive::BRepEntity(b) => Some(b.transform),
            GeometricPrimitive::TextString(t) => Some(t.compute_transform()),
        };

        let Some(frame) = frame else {
            return (Transform::identity(), false);
        };
        let squared = frame
            .square_and_normalize()
            .unwrap_or_else(|| Transform::from_translation(frame.translation));
        (squared, true)
    }

    /// Range measured in the local frame, with that frame
    pub fn get_local_range(&self) -> Option<(Range3d, Transform)> {
        let (local_to_world, ok) = self.get_local_coordinate_frame();
        if !ok {
            return None;
        }
        if local_to_world.is_identity() {
            return self.get_range(None).map(|r| (r, local_to_world));
        }
        let world_to_local = local_to_world.inverse()?;
        let mut clone = self.clone();
        clone.transform_in_place(&world_to_local).ok()?;
        clone.get_range(None).map(|r| (r, local_to_world))
    }

    // ------------------------------------------------------------------
    // Mutation and comparison
    // ------------------------------------------------------------------

    pub fn transform_in_place(&mut self, transform: &Transform) -> Result<()> {
        match self {
            GeometricPrimitive::CurvePrimitive(c) => c.transform_in_place(transform),
            GeometricPrimitive::CurveVector(c) => c.transform_in_place(transform),
            GeometricPrimitive::SolidPrimitive(s) => s.transform_in_place(transform),
            GeometricPrimitive::BsplineSurface(s) => s.transform_in_place(transform),
            GeometricPrimitive::Polyface(p) => p.transform_in_place(transform),
            GeometricPrimitive::BRepEntity(b) => b.transform_in_place(transform),
            GeometricPrimitive::TextString(t) => t.transform_in_place(transform),
        }
        Ok(())
    }

    /// Same variant, same structure, coordinates within `tolerance`.
    /// Text is never compared and always reports different.
    pub fn is_same_structure_and_geometry(&self, other: &GeometricPrimitive, tolerance: f64) -> bool {
        match (self, other) {
            (GeometricPrimitive::CurvePrimitive(a), GeometricPrimitive::CurvePrimitive(b)) => {
                a.is_same_structure_and_geometry(b, tolerance)
            }
            (GeometricPrimitive::CurveVector(a), GeometricPrimitive::CurveVector(b)) => {
                a.is_same_structure_and_geometry(b, tolerance)
            }
            (GeometricPrimitive::SolidPrimitive(a), GeometricPrimitive::SolidPrimitive(b)) => {
                a.is_same_structure_and_geometry(b, tolerance)
            }
            (GeometricPrimitive::BsplineSurface(a), GeometricPrimitive::BsplineSurface(b)) => {
                a.is_same_structure_and_geometry(b, tolerance)
            }
            (GeometricPrimitive::Polyface(a), GeometricPrimitive::Polyface(b)) => {
                a.is_same_structure_and_geometry(b, tolerance)
            }
            (GeometricPrimitive::BRepEntity(a), GeometricPrimitive::BRepEntity(b)) => {
                a.is_same_structure_and_geometry(b, tolerance)
            }
            _ => false,
        }
    }

    // ------------------------------------------------------------------
    // Classification
    // ------------------------------------------------------------------

    pub fn is_solid(&self) -> bool {
        match self {
            GeometricPrimitive::SolidPrimitive(s) => s.has_capped_volume(),
            GeometricPrimitive::Polyface(p) => p.is_solid(),
            GeometricPrimitive::BRepEntity(b) => b.entity_type == BRepType::Solid,
            _ => false,
        }
    }

    pub fn is_sheet(&self) -> bool {
        match self {
            GeometricPrimitive::CurveVector(c) => c.is_any_region_type(),
            GeometricPrimitive::BsplineSurface(_) => true,
            GeometricPrimitive::SolidPrimitive(s) => !s.has_capped_volume(),
            GeometricPrimitive::Polyface(p) => !p.is_solid(),
            GeometricPrimitive::BRepEntity(b) => b.entity_type == BRepType::Sheet,
            _ => false,
        }
    }

    pub fn is_wire(&self) -> bool {
        match self {
            GeometricPrimitive::CurvePrimitive(c) => c.curve_type() != CurvePrimitiveType::PointString,
            GeometricPrimitive::CurveVector(c) => c.is_open_path(),
            GeometricPrimitive::BRepEntity(b) => b.entity_type == BRepType::Wire,
            _ => false,
        }
    }

    /// BRep body type this geometry would become
    pub fn brep_entity_type(&self) -> BRepType {
        match self {
            GeometricPrimitive::CurvePrimitive(_) => BRepType::Wire,
            GeometricPrimitive::CurveVector(c) => {
                if c.is_any_region_type() {
                    BRepType::Sheet
                } else if c.is_open_path() {
                    BRepType::Wire
                } else {
                    BRepType::Invalid
                }
            }
            GeometricPrimitive::SolidPrimitive(s) => {
                if s.has_capped_volume() { BRepType::Solid } else { BRepType::Sheet }
            }
            GeometricPrimitive::BsplineSurface(_) => BRepType::Sheet,
            GeometricPrimitive::Polyface(p) => {
                if p.is_solid() { BRepType::Solid } else { BRepType::Sheet }
            }
            GeometricPrimitive::BRepEntity(b) => b.entity_type,
            GeometricPrimitive::TextString(_) => BRepType::Invalid,
        }
    }

    // ------------------------------------------------------------------
    // Drawing
    // ------------------------------------------------------------------

    /// Hand the geometry to a drawing consumer.
    ///
    /// BRep entities go through `add_brep` and fail when the consumer cannot
    /// draw them; the caller then draws the stream's fallback geometry.
    pub fn add_to_graphic(&self, consumer: &mut dyn DrawingConsumer, filled: bool) -> Result<()> {
        match self {
            GeometricPrimitive::BRepEntity(b) => {
                // the factory never admits an untyped body
                if b.entity_type == BRepType::Invalid {
                    return Err(unreachable_variant("BRep entity of invalid type"));
                }
                if !consumer.can_draw_brep(b.entity_type) {
                    return Err(GeomStreamError::DisallowedOperation(
                        "consumer cannot draw BRep entities".to_string(),
                    ));
                }
                consumer.add_brep(b);
            }
            // point strings never fill
            GeometricPrimitive::CurvePrimitive(c) => {
                consumer.add_geometry(self, filled && c.curve_type() != CurvePrimitiveType::PointString)
            }
            _ => consumer.add_geometry(self, filled),
        }
        Ok(())
    }
}

/// Range of a curve primitive, measured after an optional transform
fn transformed_range(range: Range3d, curve: &CurvePrimitive, transform: Option<&Transform>) -> Range3d {
    match transform {
        None => range,
        Some(t) => {
            let mut clone = curve.clone();
            clone.transform_in_place(t);
            clone.range()
        }
    }
}
