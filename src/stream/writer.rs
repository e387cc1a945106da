//! Stream writer: envelopes plus opcode selection for every appendable type

use byteorder::{LittleEndian, WriteBytesExt};

use super::codec::{self, AreaFillRecord, BasicSymbologyRecord, CompactBoundary, MaterialRecord, PartInstanceRecord};
use super::operation::{padded_length, Operation};
use super::{HeaderFlags, OpCode, STREAM_FORMAT_VERSION};
use crate::config::FacetOptions;
use crate::error::{GeomStreamError, Result};
use crate::geometry::{
    BRepEntity, BRepType, BsplineSurface, CurvePrimitive, CurveVector, Ellipse, ExpectedClosure,
    FaceMesh, FaceSymbology, GeometricPrimitive, ImageGraphic, Polyface, SolidPrimitive, TextString,
};
use crate::kernel::{FallbackOnlyKernel, SolidKernel};
use crate::symbology::{BackgroundFill, FillDisplay, GeometryParams};
use crate::types::{GeometryPartId, LineStyleId, Range3d, SubCategoryId, Transform, Vector2, Vector3};

/// What [`Writer::append_brep`] wrote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BRepAppendStatus {
    /// A `ParasolidBRep` operation was written
    pub primary: bool,
    /// Per-face symbology operations were written before the fallback meshes
    pub face_symbology: bool,
    /// Opcode of the fallback operations
    pub fallback_opcode: OpCode,
}

/// Appends operations to an owned buffer.
///
/// Every `append_*` that can fail validates and encodes before touching the
/// buffer, so a failed call leaves it unchanged.
#[derive(Debug, Clone)]
pub struct Writer {
    buffer: Vec<u8>,
    is_3d: bool,
}

impl Writer {
    pub fn new(is_3d: bool) -> Self {
        Writer {
            buffer: Vec::new(),
            is_3d,
        }
    }

    pub fn is_3d(&self) -> bool {
        self.is_3d
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Write one envelope, zero padding the payload to the alignment
    pub fn append_op(&mut self, opcode: OpCode, payload: &[u8]) {
        self.append_raw(opcode.value(), payload);
    }

    /// Copy an operation, keeping its raw code
    pub fn append_operation(&mut self, op: &Operation<'_>) {
        self.append_raw(op.code, op.data);
    }

    /// Move the operations staged in `other` onto the end of this buffer
    pub fn append_writer(&mut self, other: &Writer) {
        self.buffer.extend_from_slice(&other.buffer);
    }

    fn append_raw(&mut self, code: u32, payload: &[u8]) {
        let padded = padded_length(payload.len());
        self.buffer.reserve(8 + padded);
        // Vec<u8> writes cannot fail
        let _ = self.buffer.write_u32::<LittleEndian>(code);
        let _ = self.buffer.write_u32::<LittleEndian>(padded as u32);
        self.buffer.extend_from_slice(payload);
        self.buffer.resize(self.buffer.len() + padded - payload.len(), 0);
    }

    pub fn append_header(&mut self, flags: HeaderFlags) -> Result<()> {
        let payload = codec::encode_header(STREAM_FORMAT_VERSION, flags)?;
        self.append_op(OpCode::Header, &payload);
        Ok(())
    }

    /// Compact points; 2-D streams drop z
    pub fn append_points(&mut self, points: &[Vector3], boundary: CompactBoundary) -> Result<()> {
        if points.iter().any(Vector3::is_disconnect) {
            return Err(GeomStreamError::DisconnectPoint);
        }
        if self.is_3d {
            let payload = codec::encode_points(points, boundary)?;
            self.append_op(OpCode::PointPrimitive, &payload);
        } else {
            let points: Vec<Vector2> = points.iter().map(Vector3::xy).collect();
            self.append_points_2d(&points, boundary)?;
        }
        Ok(())
    }

    pub fn append_points_2d(&mut self, points: &[Vector2], boundary: CompactBoundary) -> Result<()> {
        if points.iter().any(Vector2::is_disconnect) {
            return Err(GeomStreamError::DisconnectPoint);
        }
        let payload = codec::encode_points_2d(points, boundary)?;
        self.append_op(OpCode::PointPrimitive2d, &payload);
        Ok(())
    }

    pub fn append_sub_graphic_range(&mut self, range: &Range3d) -> Result<()> {
        let payload = codec::encode_range(range)?;
        self.append_op(OpCode::SubGraphicRange, &payload);
        Ok(())
    }

    pub fn append_arc(&mut self, arc: &Ellipse, boundary: CompactBoundary) -> Result<()> {
        let payload = codec::encode_arc(arc, boundary)?;
        self.append_op(OpCode::ArcPrimitive, &payload);
        Ok(())
    }

    pub fn append_curve_primitive(&mut self, curve: &CurvePrimitive) -> Result<()> {
        let payload = codec::encode_curve_primitive(curve)?;
        self.append_op(OpCode::CurvePrimitive, &payload);
        Ok(())
    }

    /// General curve vector; `opcode` is `CurveVector` or `BRepCurveVector`
    pub fn append_curve_vector(&mut self, curves: &CurveVector, opcode: OpCode) -> Result<()> {
        let payload = codec::encode_curve_vector(curves)?;
        self.append_op(opcode, &payload);
        Ok(())
    }

    /// Mesh; `opcode` is `Polyface` or `BRepPolyface`
    pub fn append_polyface(&mut self, mesh: &Polyface, opcode: OpCode) -> Result<()> {
        let payload = codec::encode_polyface(mesh)?;
        self.append_op(opcode, &payload);
        Ok(())
    }

    pub fn append_solid(&mut self, solid: &SolidPrimitive) -> Result<()> {
        let payload = codec::encode_solid(solid)?;
        self.append_op(OpCode::SolidPrimitive, &payload);
        Ok(())
    }

    pub fn append_bspline_surface(&mut self, surface: &BsplineSurface) -> Result<()> {
        let payload = codec::encode_bspline_surface(surface)?;
        self.append_op(OpCode::BsplineSurface, &payload);
        Ok(())
    }

    pub fn append_text(&mut self, text: &TextString) -> Result<()> {
        let payload = codec::encode_text(text)?;
        self.append_op(OpCode::TextString, &payload);
        Ok(())
    }

    pub fn append_image(&mut self, image: &ImageGraphic) -> Result<()> {
        if !image.is_valid() {
            return Err(GeomStreamError::InvalidGeometry("image has no texture".into()));
        }
        let payload = codec::encode_image(image)?;
        self.append_op(OpCode::Image, &payload);
        Ok(())
    }

    /// Instance of a geometry part. An identity (or absent) transform
    /// writes only the part id; a mirroring transform is rejected.
    pub fn append_part_instance(&mut self, part_id: GeometryPartId, transform: Option<&Transform>) -> Result<()> {
        let record = PartInstanceRecord::from_transform(part_id, transform)?;
        let payload = codec::encode_part_instance(&record)?;
        self.append_op(OpCode::GeometryPartInstance, &payload);
        Ok(())
    }

    /// Compact encoding of a single curve.
    ///
    /// `closed` marks a line string or arc as the boundary of a closed path.
    pub fn append_simplified_curve(&mut self, curve: &CurvePrimitive, closed: bool) -> Result<OpCode> {
        let boundary = if closed {
            CompactBoundary::Closed
        } else {
            CompactBoundary::Open
        };
        match curve {
            CurvePrimitive::Line(seg) => {
                self.append_points(&[seg.start, seg.end], CompactBoundary::Open)?;
            }
            CurvePrimitive::LineString(points) => self.append_points(points, boundary)?,
            CurvePrimitive::PointString(points) => self.append_points(points, CompactBoundary::None)?,
            CurvePrimitive::Arc(arc) => {
                self.append_arc(arc, boundary)?;
                return Ok(OpCode::ArcPrimitive);
            }
            _ => {
                self.append_curve_primitive(curve)?;
                return Ok(OpCode::CurvePrimitive);
            }
        }
        Ok(self.point_opcode())
    }

    /// Compact encoding when the vector holds one simple curve, otherwise
    /// the validated general encoding
    pub fn append_simplified_curve_vector(&mut self, curves: &CurveVector) -> Result<OpCode> {
        if let [curve] = curves.curves() {
            match curve {
                CurvePrimitive::Line(_) | CurvePrimitive::PointString(_) => {
                    return self.append_simplified_curve(curve, false);
                }
                CurvePrimitive::LineString(_) | CurvePrimitive::Arc(_) => {
                    return self.append_simplified_curve(curve, curves.is_closed_path());
                }
                _ => {}
            }
        }
        validate_curve_vector(curves)?;
        self.append_curve_vector(curves, OpCode::CurveVector)?;
        Ok(OpCode::CurveVector)
    }

    /// Append any primitive through the compact path where one applies.
    ///
    /// BRep entities go through [`FallbackOnlyKernel`]; use
    /// [`append_brep`](Self::append_brep) to supply a kernel.
    pub fn append_geometry(&mut self, geometry: &GeometricPrimitive) -> Result<OpCode> {
        match geometry {
            GeometricPrimitive::CurvePrimitive(curve) => self.append_simplified_curve(curve, false),
            GeometricPrimitive::CurveVector(curves) => self.append_simplified_curve_vector(curves),
            GeometricPrimitive::SolidPrimitive(solid) => {
                self.append_solid(solid)?;
                Ok(OpCode::SolidPrimitive)
            }
            GeometricPrimitive::BsplineSurface(surface) => {
                self.append_bspline_surface(surface)?;
                Ok(OpCode::BsplineSurface)
            }
            GeometricPrimitive::Polyface(mesh) => {
                self.append_polyface(mesh, OpCode::Polyface)?;
                Ok(OpCode::Polyface)
            }
            GeometricPrimitive::BRepEntity(entity) => {
                let status = self.append_brep(
                    entity,
                    &FallbackOnlyKernel,
                    &GeometryParams::default(),
                    &FacetOptions::default(),
                )?;
                Ok(if status.primary {
                    OpCode::ParasolidBRep
                } else {
                    status.fallback_opcode
                })
            }
            GeometricPrimitive::TextString(text) => {
                self.append_text(text)?;
                Ok(OpCode::TextString)
            }
        }
    }

    /// BRep entity: the primary `ParasolidBRep` when the kernel can save
    /// it, followed by its fallback representation.
    ///
    /// Fallbacks trailing a primary use the `BRep*` opcodes; without a
    /// primary they are plain `CurveVector`/`Polyface`. Meshes carrying
    /// face symbology are each preceded by that face's symbology, derived
    /// from `base_params`.
    pub fn append_brep(
        &mut self,
        entity: &BRepEntity,
        kernel: &dyn SolidKernel,
        base_params: &GeometryParams,
        facet_options: &FacetOptions,
    ) -> Result<BRepAppendStatus> {
        let write_primary = entity.entity_type != BRepType::Wire && kernel.is_available() && kernel.is_valid(entity);
        let fallback = brep_fallback(entity, kernel, facet_options);
        if fallback.is_empty() {
            return Err(GeomStreamError::InvalidGeometry(format!(
                "no fallback geometry for {:?} body",
                entity.entity_type
            )));
        }
        tracing::debug!(
            target: "geomstream::writer",
            entity_type = ?entity.entity_type,
            write_primary,
            fallback = fallback.describe(),
            "writing BRep"
        );

        let mut attachments = kernel.face_attachments(entity);
        let primary_payload = if write_primary {
            let mut entity = entity.clone();
            if attachments.is_some() {
                entity.attachments = attachments.clone();
            }
            Some(codec::encode_brep(&entity)?)
        } else {
            None
        };

        // Encode everything first so a failure leaves the buffer untouched
        let mut pending = Writer::new(self.is_3d);
        if let Some(payload) = &primary_payload {
            pending.append_op(OpCode::ParasolidBRep, payload);
        }
        let (curve_op, mesh_op) = if write_primary {
            (OpCode::BRepCurveVector, OpCode::BRepPolyface)
        } else {
            (OpCode::CurveVector, OpCode::Polyface)
        };

        let mut face_symbology = false;
        let fallback_opcode = match fallback {
            BRepFallback::Curves(curves) => {
                pending.append_curve_vector(&curves, curve_op)?;
                curve_op
            }
            BRepFallback::Meshes(meshes) => {
                let table = attachments.take().map(|a| a.table).unwrap_or_default();
                let per_face = !table.is_empty() && meshes.iter().any(|m| m.symbology_index.is_some());
                for face in &meshes {
                    if face.mesh.points.is_empty() {
                        continue;
                    }
                    if per_face {
                        let symb = face
                            .symbology_index
                            .and_then(|i| table.get(i))
                            .copied()
                            .unwrap_or_default();
                        pending.append_params(&face_params(base_params, &symb), true)?;
                        face_symbology = true;
                    }
                    pending.append_polyface(&face.mesh, mesh_op)?;
                }
                mesh_op
            }
        };

        self.buffer.extend_from_slice(&pending.buffer);
        Ok(BRepAppendStatus {
            primary: write_primary,
            face_symbology,
            fallback_opcode,
        })
    }

    /// Symbology operations for `params`.
    ///
    /// `BasicSymbology` is always written; with `ignore_sub_category` its
    /// sub-category is 0 (keep current). `LineStyleModifiers`, `AreaFill`,
    /// `Pattern` and, in 3-D, `Material` follow when they carry anything.
    pub fn append_params(&mut self, params: &GeometryParams, ignore_sub_category: bool) -> Result<()> {
        let mut pending: Vec<(OpCode, Vec<u8>)> = Vec::with_capacity(5);

        let basic = basic_symbology_record(params, ignore_sub_category, self.is_3d);
        pending.push((OpCode::BasicSymbology, codec::encode_basic_symbology(&basic)?));

        if basic.use_style {
            if let Some(style_params) = params.line_style().and_then(|s| s.params.as_ref()) {
                pending.push((OpCode::LineStyleModifiers, codec::encode_line_style_modifiers(style_params)?));
            }
        }

        if params.fill_display() != FillDisplay::Never {
            pending.push((OpCode::AreaFill, codec::encode_area_fill(&area_fill_record(params))?));
        }

        if let Some(pattern) = params.pattern() {
            pending.push((OpCode::Pattern, codec::encode_pattern(pattern)?));
        }

        if self.is_3d && !params.is_material_from_sub_category_appearance() {
            let record = MaterialRecord {
                use_material: true,
                material_id: params.material_id(),
            };
            pending.push((OpCode::Material, codec::encode_material(&record)?));
        }

        for (opcode, payload) in &pending {
            self.append_op(*opcode, payload);
        }
        Ok(())
    }

    fn point_opcode(&self) -> OpCode {
        if self.is_3d {
            OpCode::PointPrimitive
        } else {
            OpCode::PointPrimitive2d
        }
    }
}

/// Structural check for the general curve vector encoding.
///
/// Union regions hold closed loops or parity regions, parity regions hold
/// closed loops, and other vectors must not contain disconnect points.
pub fn validate_curve_vector(curves: &CurveVector) -> Result<()> {
    if curves.is_union_region() {
        for curve in curves.curves() {
            let child = curve.child_curve_vector().ok_or_else(|| {
                GeomStreamError::InvalidCurveVector("union region member is not a loop or parity region".into())
            })?;
            if !child.is_closed_path() && !child.is_parity_region() {
                return Err(GeomStreamError::InvalidCurveVector(
                    "union region member is not a loop or parity region".into(),
                ));
            }
            validate_curve_vector(child)?;
        }
    } else if curves.is_parity_region() {
        for curve in curves.curves() {
            let child = curve
                .child_curve_vector()
                .filter(|child| child.is_closed_path())
                .ok_or_else(|| GeomStreamError::InvalidCurveVector("parity region member is not a closed loop".into()))?;
            validate_curve_vector(child)?;
        }
    } else {
        for curve in curves.curves() {
            match curve.child_curve_vector() {
                Some(child) => validate_curve_vector(child)?,
                None if curve.has_disconnect() => return Err(GeomStreamError::DisconnectPoint),
                None => {}
            }
        }
    }
    Ok(())
}

enum BRepFallback {
    Curves(CurveVector),
    Meshes(Vec<FaceMesh>),
}

impl BRepFallback {
    fn is_empty(&self) -> bool {
        match self {
            BRepFallback::Curves(curves) => curves.is_empty(),
            BRepFallback::Meshes(meshes) => meshes.iter().all(|m| m.mesh.points.is_empty()),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            BRepFallback::Curves(_) => "curves",
            BRepFallback::Meshes(_) => "meshes",
        }
    }
}

fn brep_fallback(entity: &BRepEntity, kernel: &dyn SolidKernel, facet_options: &FacetOptions) -> BRepFallback {
    let meshes = |closure: ExpectedClosure| {
        let mut meshes = kernel.facet(entity, facet_options);
        for face in &mut meshes {
            face.mesh.expected_closure = closure;
        }
        BRepFallback::Meshes(meshes)
    };
    match entity.entity_type {
        BRepType::Wire => BRepFallback::Curves(kernel.wire_curves(entity).unwrap_or_default()),
        BRepType::Sheet => match kernel.planar_sheet_boundary(entity) {
            Some(boundary) => BRepFallback::Curves(boundary),
            None => meshes(ExpectedClosure::Sheet),
        },
        BRepType::Solid => meshes(ExpectedClosure::Solid),
        BRepType::Invalid => BRepFallback::Meshes(Vec::new()),
    }
}

/// Base params with a face's color, transparency and material applied
fn face_params(base: &GeometryParams, symb: &FaceSymbology) -> GeometryParams {
    let mut params = base.clone();
    if let Some(color) = symb.color {
        params.set_line_color(color);
        params.set_fill_color(color);
    }
    if let Some(transparency) = symb.transparency {
        params.set_transparency(transparency);
    }
    if let Some(material) = symb.material {
        params.set_material_id(material);
    }
    params
}

pub(crate) fn basic_symbology_record(params: &GeometryParams, ignore_sub_category: bool, is_3d: bool) -> BasicSymbologyRecord {
    let use_color = !params.is_line_color_from_sub_category_appearance();
    let use_weight = !params.is_weight_from_sub_category_appearance();
    let use_style = !params.is_line_style_from_sub_category_appearance();
    BasicSymbologyRecord {
        sub_category_id: if ignore_sub_category {
            SubCategoryId::INVALID
        } else {
            params.sub_category_id()
        },
        color: if use_color { params.line_color() } else { Default::default() },
        weight: if use_weight { params.weight() } else { 0 },
        line_style_id: match params.line_style() {
            Some(style) if use_style => style.style_id,
            _ => LineStyleId::INVALID,
        },
        transparency: params.transparency(),
        display_priority: if is_3d { 0 } else { params.display_priority() },
        geometry_class: params.geometry_class(),
        use_color,
        use_weight,
        use_style,
    }
}

fn area_fill_record(params: &GeometryParams) -> AreaFillRecord {
    let fill_display = params.fill_display();
    let transparency = params.fill_transparency();
    if let Some(gradient) = params.gradient() {
        return AreaFillRecord {
            fill_display,
            transparency,
            gradient: Some(gradient.clone()),
            ..Default::default()
        };
    }
    let background_fill = params.background_fill();
    let use_color = background_fill == BackgroundFill::None && !params.is_fill_color_from_sub_category_appearance();
    AreaFillRecord {
        fill_display,
        color: if use_color { params.fill_color() } else { Default::default() },
        use_color,
        background_fill,
        transparency,
        gradient: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{BoundaryType, FaceAttachments, FallbackGeometry};
    use crate::stream::Collection;
    use crate::types::{CategoryId, ColorDef, MaterialId};

    fn square() -> Vec<Vector3> {
        vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 0.0),
        ]
    }

    fn opcodes(writer: &Writer) -> Vec<OpCode> {
        Collection::new(writer.as_bytes()).iter().map(|op| op.opcode).collect()
    }

    #[test]
    fn test_envelope_padding_zeroed() {
        let mut writer = Writer::new(true);
        writer.append_op(OpCode::Material, &[0xFF; 3]);
        let bytes = writer.as_bytes();
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[0..4], &21u32.to_le_bytes());
        assert_eq!(&bytes[4..8], &8u32.to_le_bytes());
        assert!(bytes[11..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_empty_payload_header_only() {
        let mut writer = Writer::new(true);
        writer.append_op(OpCode::Pattern, &[]);
        assert_eq!(writer.len(), 8);
    }

    #[test]
    fn test_closed_loop_compact() {
        let mut writer = Writer::new(true);
        let loop_ = CurveVector::create_linear(square(), BoundaryType::Outer);
        assert_eq!(writer.append_simplified_curve_vector(&loop_).unwrap(), OpCode::PointPrimitive);
        let op = Collection::new(writer.as_bytes()).iter().next().unwrap();
        let (_, boundary) = codec::decode_points(op.data).unwrap();
        assert_eq!(boundary, CompactBoundary::Closed);
    }

    #[test]
    fn test_2d_uses_point_primitive_2d() {
        let mut writer = Writer::new(false);
        let line = CurvePrimitive::create_line(Vector3::ZERO, Vector3::UNIT_X);
        assert_eq!(writer.append_simplified_curve(&line, false).unwrap(), OpCode::PointPrimitive2d);
    }

    #[test]
    fn test_disconnect_leaves_buffer() {
        let mut writer = Writer::new(true);
        writer.append_header(HeaderFlags::NONE).unwrap();
        let before = writer.len();
        let curve = CurvePrimitive::create_line_string(vec![Vector3::ZERO, Vector3::DISCONNECT, Vector3::UNIT_X]);
        let err = writer.append_simplified_curve(&curve, false).unwrap_err();
        assert!(matches!(err, GeomStreamError::DisconnectPoint));
        assert_eq!(writer.len(), before);
    }

    #[test]
    fn test_parity_region_rejects_open_member() {
        let mut region = CurveVector::new(BoundaryType::ParityRegion);
        region.push(CurvePrimitive::create_child_curve_vector(CurveVector::create_linear(
            vec![Vector3::ZERO, Vector3::UNIT_X],
            BoundaryType::Open,
        )));
        let mut writer = Writer::new(true);
        let err = writer.append_simplified_curve_vector(&region).unwrap_err();
        assert!(matches!(err, GeomStreamError::InvalidCurveVector(_)));
        assert!(writer.is_empty());
    }

    #[test]
    fn test_union_accepts_parity_member() {
        let mut parity = CurveVector::new(BoundaryType::ParityRegion);
        parity.push(CurvePrimitive::create_child_curve_vector(CurveVector::create_linear(
            square(),
            BoundaryType::Outer,
        )));
        let mut union = CurveVector::new(BoundaryType::UnionRegion);
        union.push(CurvePrimitive::create_child_curve_vector(parity));
        union.push(CurvePrimitive::create_child_curve_vector(CurveVector::create_linear(
            square(),
            BoundaryType::Outer,
        )));
        assert!(validate_curve_vector(&union).is_ok());
    }

    #[test]
    fn test_params_always_write_basic_symbology() {
        let mut writer = Writer::new(true);
        writer
            .append_params(&GeometryParams::new(CategoryId::new(1), SubCategoryId::new(2)), false)
            .unwrap();
        assert_eq!(opcodes(&writer), vec![OpCode::BasicSymbology]);
    }

    #[test]
    fn test_params_material_only_3d() {
        let mut params = GeometryParams::new(CategoryId::new(1), SubCategoryId::new(2));
        params.set_material_id(MaterialId::new(5));
        params.set_fill_display(FillDisplay::Always);

        let mut writer = Writer::new(true);
        writer.append_params(&params, false).unwrap();
        assert_eq!(opcodes(&writer), vec![OpCode::BasicSymbology, OpCode::AreaFill, OpCode::Material]);

        let mut writer = Writer::new(false);
        writer.append_params(&params, false).unwrap();
        assert_eq!(opcodes(&writer), vec![OpCode::BasicSymbology, OpCode::AreaFill]);
    }

    #[test]
    fn test_ignored_sub_category_written_as_zero() {
        let params = GeometryParams::new(CategoryId::new(1), SubCategoryId::new(2));
        let record = basic_symbology_record(&params, true, true);
        assert!(!record.sub_category_id.is_valid());
    }

    fn two_face_solid() -> BRepEntity {
        let meshes = vec![
            FaceMesh {
                mesh: Polyface::unit_cube(),
                symbology_index: Some(0),
            },
            FaceMesh {
                mesh: Polyface::unit_cube(),
                symbology_index: Some(1),
            },
        ];
        BRepEntity::new(BRepType::Solid, vec![1, 2, 3, 4], Range3d::null())
            .with_fallback(FallbackGeometry::Meshes(meshes))
            .with_attachments(FaceAttachments {
                table: vec![
                    FaceSymbology {
                        color: Some(ColorDef::RED),
                        ..Default::default()
                    },
                    FaceSymbology {
                        color: Some(ColorDef::BLUE),
                        material: Some(MaterialId::new(8)),
                        ..Default::default()
                    },
                ],
                face_index: vec![0, 1],
            })
    }

    #[test]
    fn test_brep_without_kernel_writes_plain_fallbacks() {
        let mut writer = Writer::new(true);
        let status = writer
            .append_brep(&two_face_solid(), &FallbackOnlyKernel, &GeometryParams::default(), &FacetOptions::default())
            .unwrap();
        assert!(!status.primary);
        assert!(status.face_symbology);
        assert_eq!(status.fallback_opcode, OpCode::Polyface);
        assert_eq!(
            opcodes(&writer),
            vec![
                OpCode::BasicSymbology,
                OpCode::Polyface,
                OpCode::BasicSymbology,
                OpCode::Material,
                OpCode::Polyface,
            ]
        );
    }

    #[test]
    fn test_brep_without_fallback_rejected() {
        let entity = BRepEntity::new(BRepType::Solid, vec![1], Range3d::null());
        let mut writer = Writer::new(true);
        let result = writer.append_brep(&entity, &FallbackOnlyKernel, &GeometryParams::default(), &FacetOptions::default());
        assert!(matches!(result, Err(GeomStreamError::InvalidGeometry(_))));
        assert!(writer.is_empty());
    }

    #[test]
    fn test_part_instance_rejects_mirror() {
        let mut writer = Writer::new(true);
        let mirror = Transform::from_matrix(crate::types::Matrix3::from_rows(
            [-1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ));
        assert!(writer.append_part_instance(GeometryPartId::new(3), Some(&mirror)).is_err());
        assert!(writer.is_empty());
    }
}
