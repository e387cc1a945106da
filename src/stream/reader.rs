//! Typed views of operations
//!
//! Each `get_*` checks the opcode first and reports a mismatch as
//! [`GeomStreamError::DecodeMismatch`]; payload problems surface as
//! [`GeomStreamError::Payload`].

use super::codec::{self, CompactBoundary};
use super::{HeaderFlags, OpCode, Operation};
use crate::error::{GeomStreamError, Result};
use crate::geometry::{
    BRepEntity, BoundaryType, BsplineSurface, CurvePrimitive, CurveVector, Ellipse,
    GeometricPrimitive, ImageGraphic, Polyface, Segment, SolidPrimitive, TextString,
};
use crate::store::SymbologyResolver;
use crate::symbology::{BackgroundFill, FillDisplay, GeometryParams, LineStyleInfo};
use crate::types::{GeometryPartId, Range3d, SubCategoryId, Transform, Vector3};

fn expect(op: &Operation<'_>, expected: OpCode) -> Result<()> {
    if op.opcode == expected {
        Ok(())
    } else {
        Err(GeomStreamError::DecodeMismatch {
            expected,
            actual: op.opcode,
        })
    }
}

fn expect_any(op: &Operation<'_>, expected: &[OpCode]) -> Result<()> {
    if expected.contains(&op.opcode) {
        Ok(())
    } else {
        Err(GeomStreamError::DecodeMismatch {
            expected: expected[0],
            actual: op.opcode,
        })
    }
}

/// Operation decoder.
///
/// The resolver is only consulted to find the category of a sub-category
/// when symbology arrives before any category is known.
#[derive(Clone, Copy, Default)]
pub struct Reader<'r> {
    resolver: Option<&'r dyn SymbologyResolver>,
}

impl std::fmt::Debug for Reader<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reader")
            .field("has_resolver", &self.resolver.is_some())
            .finish()
    }
}

impl<'r> Reader<'r> {
    pub fn new() -> Self {
        Reader { resolver: None }
    }

    pub fn with_resolver(resolver: &'r dyn SymbologyResolver) -> Self {
        Reader {
            resolver: Some(resolver),
        }
    }

    pub fn get_header(&self, op: &Operation<'_>) -> Result<(u32, HeaderFlags)> {
        expect(op, OpCode::Header)?;
        codec::decode_header(op.data)
    }

    /// Compact points of either dimension, lifted to 3-D
    pub fn get_points(&self, op: &Operation<'_>) -> Result<(Vec<Vector3>, CompactBoundary)> {
        match op.opcode {
            OpCode::PointPrimitive => codec::decode_points(op.data),
            OpCode::PointPrimitive2d => {
                let (points, boundary) = codec::decode_points_2d(op.data)?;
                Ok((points.iter().map(|p| p.with_z(0.0)).collect(), boundary))
            }
            actual => Err(GeomStreamError::DecodeMismatch {
                expected: OpCode::PointPrimitive,
                actual,
            }),
        }
    }

    pub fn get_arc(&self, op: &Operation<'_>) -> Result<(Ellipse, CompactBoundary)> {
        expect(op, OpCode::ArcPrimitive)?;
        codec::decode_arc(op.data)
    }

    /// Boundary flag of a compact point or arc operation, without decoding
    /// the geometry
    pub fn get_compact_boundary(&self, op: &Operation<'_>) -> Result<CompactBoundary> {
        match op.opcode {
            OpCode::PointPrimitive | OpCode::PointPrimitive2d => Ok(self.get_points(op)?.1),
            OpCode::ArcPrimitive => Ok(self.get_arc(op)?.1),
            actual => Err(GeomStreamError::DecodeMismatch {
                expected: OpCode::PointPrimitive,
                actual,
            }),
        }
    }

    /// Range hint; two or more points, the first two are the corners
    pub fn get_sub_graphic_range(&self, op: &Operation<'_>) -> Result<Range3d> {
        expect(op, OpCode::SubGraphicRange)?;
        codec::decode_range(op.data)
    }

    pub fn get_curve_primitive(&self, op: &Operation<'_>) -> Result<CurvePrimitive> {
        expect(op, OpCode::CurvePrimitive)?;
        codec::decode_curve_primitive(op.data)
    }

    /// `CurveVector` or its BRep fallback twin
    pub fn get_curve_vector(&self, op: &Operation<'_>) -> Result<CurveVector> {
        expect_any(op, &[OpCode::CurveVector, OpCode::BRepCurveVector])?;
        codec::decode_curve_vector(op.data)
    }

    /// `Polyface` or its BRep fallback twin
    pub fn get_polyface(&self, op: &Operation<'_>) -> Result<Polyface> {
        expect_any(op, &[OpCode::Polyface, OpCode::BRepPolyface])?;
        codec::decode_polyface(op.data)
    }

    pub fn get_solid(&self, op: &Operation<'_>) -> Result<SolidPrimitive> {
        expect(op, OpCode::SolidPrimitive)?;
        codec::decode_solid(op.data)
    }

    pub fn get_bspline_surface(&self, op: &Operation<'_>) -> Result<BsplineSurface> {
        expect(op, OpCode::BsplineSurface)?;
        codec::decode_bspline_surface(op.data)
    }

    pub fn get_brep(&self, op: &Operation<'_>) -> Result<BRepEntity> {
        expect(op, OpCode::ParasolidBRep)?;
        codec::decode_brep(op.data)
    }

    pub fn get_text(&self, op: &Operation<'_>) -> Result<TextString> {
        expect(op, OpCode::TextString)?;
        codec::decode_text(op.data)
    }

    pub fn get_image(&self, op: &Operation<'_>) -> Result<ImageGraphic> {
        expect(op, OpCode::Image)?;
        codec::decode_image(op.data)
    }

    /// Part id and instance transform (identity when none was stored)
    pub fn get_part_instance(&self, op: &Operation<'_>) -> Result<(GeometryPartId, Transform)> {
        expect(op, OpCode::GeometryPartInstance)?;
        let record = codec::decode_part_instance(op.data)?;
        Ok((record.part_id, record.to_transform()))
    }

    /// Decode any geometry operation into a primitive.
    ///
    /// Compact points become a point string (no boundary), a line string
    /// (open) or a single-loop outer region (closed); compact arcs become
    /// an arc or a single-arc outer region.
    pub fn get_geometry(&self, op: &Operation<'_>) -> Result<GeometricPrimitive> {
        let invalid = |what: &str| GeomStreamError::InvalidGeometry(format!("{what} in {}", op.opcode));
        match op.opcode {
            OpCode::PointPrimitive | OpCode::PointPrimitive2d => {
                let (points, boundary) = self.get_points(op)?;
                let geometry = match boundary {
                    CompactBoundary::None => GeometricPrimitive::from_curve_primitive(CurvePrimitive::PointString(points)),
                    CompactBoundary::Open => GeometricPrimitive::from_curve_primitive(CurvePrimitive::LineString(points)),
                    CompactBoundary::Closed => GeometricPrimitive::from_curve_vector(CurveVector::create(
                        BoundaryType::Outer,
                        CurvePrimitive::LineString(points),
                    )),
                };
                geometry.ok_or_else(|| invalid("empty point list"))
            }
            OpCode::ArcPrimitive => {
                let (arc, boundary) = self.get_arc(op)?;
                let geometry = match boundary {
                    CompactBoundary::None | CompactBoundary::Open => {
                        GeometricPrimitive::from_curve_primitive(CurvePrimitive::Arc(arc))
                    }
                    CompactBoundary::Closed => GeometricPrimitive::from_curve_vector(CurveVector::create(
                        BoundaryType::Outer,
                        CurvePrimitive::Arc(arc),
                    )),
                };
                geometry.ok_or_else(|| invalid("degenerate arc"))
            }
            OpCode::CurvePrimitive => GeometricPrimitive::from_curve_primitive(self.get_curve_primitive(op)?)
                .ok_or_else(|| invalid("empty curve")),
            OpCode::CurveVector | OpCode::BRepCurveVector => {
                GeometricPrimitive::from_curve_vector(self.get_curve_vector(op)?)
                    .ok_or_else(|| invalid("empty curve vector"))
            }
            OpCode::Polyface | OpCode::BRepPolyface => GeometricPrimitive::from_polyface(self.get_polyface(op)?)
                .ok_or_else(|| invalid("empty mesh")),
            OpCode::SolidPrimitive => GeometricPrimitive::from_solid_primitive(self.get_solid(op)?)
                .ok_or_else(|| invalid("invalid solid")),
            OpCode::BsplineSurface => GeometricPrimitive::from_bspline_surface(self.get_bspline_surface(op)?)
                .ok_or_else(|| invalid("invalid surface")),
            OpCode::ParasolidBRep => {
                GeometricPrimitive::from_brep(self.get_brep(op)?).ok_or_else(|| invalid("invalid body type"))
            }
            OpCode::TextString => {
                GeometricPrimitive::from_text_string(self.get_text(op)?).ok_or_else(|| invalid("empty text"))
            }
            actual => Err(GeomStreamError::DecodeMismatch {
                expected: OpCode::CurvePrimitive,
                actual,
            }),
        }
    }

    /// Apply a symbology operation to the running params.
    ///
    /// Returns whether anything changed. A `BasicSymbology` naming a
    /// sub-category resets the params to that sub-category's appearance
    /// before applying its overrides.
    pub fn get_params(&self, op: &Operation<'_>, params: &mut GeometryParams) -> Result<bool> {
        let mut changed = false;
        match op.opcode {
            OpCode::BasicSymbology => {
                let record = codec::decode_basic_symbology(op.data)?;
                let mut sub_category_id = record.sub_category_id;
                if !sub_category_id.is_valid() {
                    sub_category_id = params.sub_category_id();
                }
                if sub_category_id.is_valid() {
                    let mut category_id = params.category_id();
                    if !category_id.is_valid() {
                        category_id = self
                            .resolver
                            .and_then(|r| r.category_of_sub_category(sub_category_id))
                            .unwrap_or_default();
                    }
                    *params = GeometryParams::new(category_id, sub_category_id);
                    changed = true;
                }

                if record.use_color
                    && (params.is_line_color_from_sub_category_appearance() || params.line_color() != record.color)
                {
                    params.set_line_color(record.color);
                    changed = true;
                }
                if record.use_weight
                    && (params.is_weight_from_sub_category_appearance() || params.weight() != record.weight)
                {
                    params.set_weight(record.weight);
                    changed = true;
                }
                if record.use_style {
                    let current = params.line_style().map(|s| s.style_id).unwrap_or_default();
                    if params.is_line_style_from_sub_category_appearance() || current != record.line_style_id {
                        let style = record
                            .line_style_id
                            .is_valid()
                            .then(|| LineStyleInfo::new(record.line_style_id, None));
                        params.set_line_style(style);
                        changed = true;
                    }
                }
                if params.transparency() != record.transparency {
                    params.set_transparency(record.transparency);
                    changed = true;
                }
                if params.display_priority() != record.display_priority {
                    params.set_display_priority(record.display_priority);
                    changed = true;
                }
                if params.geometry_class() != record.geometry_class {
                    params.set_geometry_class(record.geometry_class);
                    changed = true;
                }
            }
            OpCode::LineStyleModifiers => {
                let style_params = codec::decode_line_style_modifiers(op.data)?;
                let style_id = params.line_style().map(|s| s.style_id).unwrap_or_default();
                if style_id.is_valid() {
                    let style = LineStyleInfo::new(style_id, Some(style_params));
                    let same = params.line_style().map_or(false, |s| s.is_equivalent(&style));
                    if !same {
                        params.set_line_style(Some(style));
                        changed = true;
                    }
                }
            }
            OpCode::AreaFill => {
                let record = codec::decode_area_fill(op.data)?;
                if params.fill_display() != record.fill_display {
                    params.set_fill_display(record.fill_display);
                    changed = true;
                }
                if record.fill_display != FillDisplay::Never {
                    if params.fill_transparency() != record.transparency {
                        params.set_fill_transparency(record.transparency);
                        changed = true;
                    }
                    match record.gradient {
                        Some(gradient) => {
                            if params.gradient() != Some(&gradient) {
                                params.set_gradient(Some(gradient));
                                changed = true;
                            }
                        }
                        None if record.use_color => {
                            if params.is_fill_color_from_sub_category_appearance() || params.fill_color() != record.color {
                                params.set_fill_color(record.color);
                                changed = true;
                            }
                        }
                        None if record.background_fill != BackgroundFill::None => {
                            if params.background_fill() != record.background_fill {
                                params.set_fill_color_from_view_background(record.background_fill == BackgroundFill::Outline);
                                changed = true;
                            }
                        }
                        None => {}
                    }
                }
            }
            OpCode::Pattern => {
                let pattern = codec::decode_pattern(op.data)?;
                if params.pattern() != Some(&pattern) {
                    params.set_pattern(Some(pattern));
                    changed = true;
                }
            }
            OpCode::Material => {
                let record = codec::decode_material(op.data)?;
                if record.use_material
                    && (params.is_material_from_sub_category_appearance() || params.material_id() != record.material_id)
                {
                    params.set_material_id(record.material_id);
                    changed = true;
                }
            }
            actual => {
                return Err(GeomStreamError::DecodeMismatch {
                    expected: OpCode::BasicSymbology,
                    actual,
                })
            }
        }
        Ok(changed)
    }

    /// Sub-category named by a `BasicSymbology` operation, invalid when it
    /// keeps the current one
    pub fn get_sub_category(&self, op: &Operation<'_>) -> Result<SubCategoryId> {
        expect(op, OpCode::BasicSymbology)?;
        Ok(codec::decode_basic_symbology(op.data)?.sub_category_id)
    }
}

/// Segment from a two point line string, for callers that want the
/// compact open encoding back as a line
pub fn as_segment(curve: &CurvePrimitive) -> Option<Segment> {
    match curve {
        CurvePrimitive::Line(seg) => Some(*seg),
        CurvePrimitive::LineString(points) if points.len() == 2 => Some(Segment::new(points[0], points[1])),
        _ => None,
    }
}
