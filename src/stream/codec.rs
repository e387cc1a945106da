//! Payload layouts for every opcode
//!
//! Each `encode_*` returns a complete payload (version byte included) and
//! each `decode_*` accepts one, ignoring envelope padding.

use super::payload::{PayloadReader, PayloadWriter};
use super::HeaderFlags;
use crate::error::{GeomStreamError, Result};
use crate::geometry::{
    BRepEntity, BRepType, BoundaryType, BoxDetail, BsplineCurve, BsplineSurface, ConeDetail,
    CurvePrimitive, CurveVector, Ellipse, ExpectedClosure, ExtrusionDetail, FaceAttachments,
    FaceSymbology, ImageGraphic, Polyface, Segment, SolidPrimitive, SphereDetail, TextString,
};
use crate::symbology::{
    BackgroundFill, FillDisplay, GeometryClass, GradientMode, GradientSymb, HatchDefLine,
    LineStyleModifiers, LineStyleParams, PatternParams,
};
use crate::types::{
    ColorDef, FontId, GeometryPartId, LineStyleId, MaterialId, Range3d, SubCategoryId, TextureId,
    Transform, Vector2, Vector3, YawPitchRollAngles,
};

/// Nested curve vectors deeper than this are rejected as malformed
const MAX_NESTING: usize = 64;

/// Boundary flag of the compact point and arc encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CompactBoundary {
    /// Disjoint points
    None = 0,
    Open = 1,
    Closed = 2,
}

impl CompactBoundary {
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            0 => Ok(CompactBoundary::None),
            1 => Ok(CompactBoundary::Open),
            2 => Ok(CompactBoundary::Closed),
            other => Err(GeomStreamError::Payload(format!("bad boundary flag {other}"))),
        }
    }
}

// ============================================================================
// Compact primitives and ranges
// ============================================================================

pub fn encode_points(points: &[Vector3], boundary: CompactBoundary) -> Result<Vec<u8>> {
    let mut w = PayloadWriter::new();
    w.write_u8(boundary as u8)?;
    w.write_points(points)?;
    Ok(w.into_bytes())
}

pub fn decode_points(data: &[u8]) -> Result<(Vec<Vector3>, CompactBoundary)> {
    let mut r = PayloadReader::new(data)?;
    let boundary = CompactBoundary::from_u8(r.read_u8()?)?;
    Ok((r.read_points()?, boundary))
}

pub fn encode_points_2d(points: &[Vector2], boundary: CompactBoundary) -> Result<Vec<u8>> {
    let mut w = PayloadWriter::new();
    w.write_u8(boundary as u8)?;
    w.write_points_2d(points)?;
    Ok(w.into_bytes())
}

pub fn decode_points_2d(data: &[u8]) -> Result<(Vec<Vector2>, CompactBoundary)> {
    let mut r = PayloadReader::new(data)?;
    let boundary = CompactBoundary::from_u8(r.read_u8()?)?;
    Ok((r.read_points_2d()?, boundary))
}

/// Range as a two-point point list
pub fn encode_range(range: &Range3d) -> Result<Vec<u8>> {
    encode_points(&[range.low, range.high], CompactBoundary::None)
}

/// Accepts two or more points and uses the first two
pub fn decode_range(data: &[u8]) -> Result<Range3d> {
    let (points, _) = decode_points(data)?;
    if points.len() < 2 {
        return Err(GeomStreamError::Payload(format!(
            "range needs 2 points, found {}",
            points.len()
        )));
    }
    Ok(Range3d {
        low: points[0],
        high: points[1],
    })
}

pub fn encode_arc(arc: &Ellipse, boundary: CompactBoundary) -> Result<Vec<u8>> {
    let mut w = PayloadWriter::new();
    write_ellipse(&mut w, arc)?;
    w.write_u8(boundary as u8)?;
    Ok(w.into_bytes())
}

pub fn decode_arc(data: &[u8]) -> Result<(Ellipse, CompactBoundary)> {
    let mut r = PayloadReader::new(data)?;
    let arc = read_ellipse(&mut r)?;
    let boundary = CompactBoundary::from_u8(r.read_u8()?)?;
    Ok((arc, boundary))
}

fn write_ellipse(w: &mut PayloadWriter, arc: &Ellipse) -> Result<()> {
    w.write_point(arc.center)?;
    w.write_point(arc.vector0)?;
    w.write_point(arc.vector90)?;
    w.write_f64(arc.start)?;
    w.write_f64(arc.sweep)
}

fn read_ellipse(r: &mut PayloadReader<'_>) -> Result<Ellipse> {
    Ok(Ellipse {
        center: r.read_point()?,
        vector0: r.read_point()?,
        vector90: r.read_point()?,
        start: r.read_f64()?,
        sweep: r.read_f64()?,
    })
}

// ============================================================================
// Curves
// ============================================================================

const TAG_LINE: u8 = 0;
const TAG_LINE_STRING: u8 = 1;
const TAG_POINT_STRING: u8 = 2;
const TAG_ARC: u8 = 3;
const TAG_BSPLINE: u8 = 4;
const TAG_CHILD: u8 = 5;

pub fn encode_curve_primitive(curve: &CurvePrimitive) -> Result<Vec<u8>> {
    let mut w = PayloadWriter::new();
    write_curve_primitive(&mut w, curve, 0)?;
    Ok(w.into_bytes())
}

pub fn decode_curve_primitive(data: &[u8]) -> Result<CurvePrimitive> {
    let mut r = PayloadReader::new(data)?;
    read_curve_primitive(&mut r, 0)
}

pub fn encode_curve_vector(curves: &CurveVector) -> Result<Vec<u8>> {
    let mut w = PayloadWriter::new();
    write_curve_vector(&mut w, curves, 0)?;
    Ok(w.into_bytes())
}

pub fn decode_curve_vector(data: &[u8]) -> Result<CurveVector> {
    let mut r = PayloadReader::new(data)?;
    read_curve_vector(&mut r, 0)
}

fn check_depth(depth: usize) -> Result<()> {
    if depth > MAX_NESTING {
        return Err(GeomStreamError::Payload("curve vector nesting too deep".into()));
    }
    Ok(())
}

fn write_curve_primitive(w: &mut PayloadWriter, curve: &CurvePrimitive, depth: usize) -> Result<()> {
    check_depth(depth)?;
    match curve {
        CurvePrimitive::Line(seg) => {
            w.write_u8(TAG_LINE)?;
            w.write_point(seg.start)?;
            w.write_point(seg.end)
        }
        CurvePrimitive::LineString(points) => {
            w.write_u8(TAG_LINE_STRING)?;
            w.write_points(points)
        }
        CurvePrimitive::PointString(points) => {
            w.write_u8(TAG_POINT_STRING)?;
            w.write_points(points)
        }
        CurvePrimitive::Arc(arc) => {
            w.write_u8(TAG_ARC)?;
            write_ellipse(w, arc)
        }
        CurvePrimitive::BsplineCurve(b) => {
            w.write_u8(TAG_BSPLINE)?;
            w.write_u32(b.order as u32)?;
            w.write_bool(b.closed)?;
            w.write_points(&b.poles)?;
            write_optional_f64s(w, b.weights.as_deref())?;
            w.write_f64s(&b.knots)
        }
        CurvePrimitive::CurveVector(child) => {
            w.write_u8(TAG_CHILD)?;
            write_curve_vector(w, child, depth + 1)
        }
    }
}

fn read_curve_primitive(r: &mut PayloadReader<'_>, depth: usize) -> Result<CurvePrimitive> {
    check_depth(depth)?;
    match r.read_u8()? {
        TAG_LINE => Ok(CurvePrimitive::Line(Segment::new(r.read_point()?, r.read_point()?))),
        TAG_LINE_STRING => Ok(CurvePrimitive::LineString(r.read_points()?)),
        TAG_POINT_STRING => Ok(CurvePrimitive::PointString(r.read_points()?)),
        TAG_ARC => Ok(CurvePrimitive::Arc(read_ellipse(r)?)),
        TAG_BSPLINE => {
            let order = r.read_u32()? as usize;
            let closed = r.read_bool()?;
            let poles = r.read_points()?;
            let weights = read_optional_f64s(r)?;
            let knots = r.read_f64s()?;
            Ok(CurvePrimitive::BsplineCurve(BsplineCurve {
                order,
                poles,
                weights,
                knots,
                closed,
            }))
        }
        TAG_CHILD => Ok(CurvePrimitive::create_child_curve_vector(read_curve_vector(r, depth + 1)?)),
        other => Err(GeomStreamError::Payload(format!("bad curve tag {other}"))),
    }
}

fn write_curve_vector(w: &mut PayloadWriter, curves: &CurveVector, depth: usize) -> Result<()> {
    check_depth(depth)?;
    w.write_u8(curves.boundary_type() as u8)?;
    w.write_count(curves.len())?;
    for curve in curves.curves() {
        write_curve_primitive(w, curve, depth)?;
    }
    Ok(())
}

fn read_curve_vector(r: &mut PayloadReader<'_>, depth: usize) -> Result<CurveVector> {
    check_depth(depth)?;
    let raw = r.read_u8()?;
    let boundary = BoundaryType::from_u8(raw)
        .ok_or_else(|| GeomStreamError::Payload(format!("bad boundary type {raw}")))?;
    let count = r.read_count(1)?;
    let mut curves = CurveVector::new(boundary);
    for _ in 0..count {
        curves.push(read_curve_primitive(r, depth)?);
    }
    Ok(curves)
}

fn write_optional_f64s(w: &mut PayloadWriter, values: Option<&[f64]>) -> Result<()> {
    match values {
        Some(values) => {
            w.write_bool(true)?;
            w.write_f64s(values)
        }
        None => w.write_bool(false),
    }
}

fn read_optional_f64s(r: &mut PayloadReader<'_>) -> Result<Option<Vec<f64>>> {
    if r.read_bool()? {
        Ok(Some(r.read_f64s()?))
    } else {
        Ok(None)
    }
}

// ============================================================================
// Surfaces, meshes and solids
// ============================================================================

pub fn encode_polyface(mesh: &Polyface) -> Result<Vec<u8>> {
    let mut w = PayloadWriter::new();
    w.write_points(&mesh.points)?;
    w.write_count(mesh.faces.len())?;
    for face in &mesh.faces {
        w.write_u32s(face)?;
    }
    w.write_u32(mesh.expected_closure as u32)?;
    Ok(w.into_bytes())
}

pub fn decode_polyface(data: &[u8]) -> Result<Polyface> {
    let mut r = PayloadReader::new(data)?;
    let points = r.read_points()?;
    let face_count = r.read_count(4)?;
    let faces = (0..face_count)
        .map(|_| r.read_u32s())
        .collect::<Result<Vec<_>>>()?;
    let closure = ExpectedClosure::from_u32(r.read_u32()?);
    Ok(Polyface::new(points, faces).with_closure(closure))
}

pub fn encode_bspline_surface(surface: &BsplineSurface) -> Result<Vec<u8>> {
    let mut w = PayloadWriter::new();
    w.write_u32(surface.u_order as u32)?;
    w.write_u32(surface.v_order as u32)?;
    w.write_u32(surface.num_u as u32)?;
    w.write_u32(surface.num_v as u32)?;
    w.write_points(&surface.poles)?;
    write_optional_f64s(&mut w, surface.weights.as_deref())?;
    w.write_f64s(&surface.u_knots)?;
    w.write_f64s(&surface.v_knots)?;
    w.write_count(surface.trims.len())?;
    for trim in &surface.trims {
        w.write_points_2d(trim)?;
    }
    Ok(w.into_bytes())
}

pub fn decode_bspline_surface(data: &[u8]) -> Result<BsplineSurface> {
    let mut r = PayloadReader::new(data)?;
    let u_order = r.read_u32()? as usize;
    let v_order = r.read_u32()? as usize;
    let num_u = r.read_u32()? as usize;
    let num_v = r.read_u32()? as usize;
    let poles = r.read_points()?;
    let weights = read_optional_f64s(&mut r)?;
    let u_knots = r.read_f64s()?;
    let v_knots = r.read_f64s()?;
    let trim_count = r.read_count(4)?;
    let trims = (0..trim_count)
        .map(|_| r.read_points_2d())
        .collect::<Result<Vec<_>>>()?;
    let surface = BsplineSurface {
        u_order,
        v_order,
        num_u,
        num_v,
        poles,
        weights,
        u_knots,
        v_knots,
        trims,
    };
    if !surface.is_valid() {
        return Err(GeomStreamError::Payload("inconsistent B-spline surface".into()));
    }
    Ok(surface)
}

pub fn encode_solid(solid: &SolidPrimitive) -> Result<Vec<u8>> {
    let mut w = PayloadWriter::new();
    w.write_u8(solid.solid_type() as u8)?;
    match solid {
        SolidPrimitive::Box(b) => {
            w.write_point(b.base_origin)?;
            w.write_point(b.top_origin)?;
            w.write_point(b.vector_x)?;
            w.write_point(b.vector_y)?;
            w.write_f64(b.base_x)?;
            w.write_f64(b.base_y)?;
            w.write_f64(b.top_x)?;
            w.write_f64(b.top_y)?;
            w.write_bool(b.capped)?;
        }
        SolidPrimitive::Sphere(s) => {
            w.write_point(s.center)?;
            w.write_matrix(&s.axes)?;
        }
        SolidPrimitive::Cone(c) => {
            w.write_point(c.center_a)?;
            w.write_point(c.center_b)?;
            w.write_point(c.vector0)?;
            w.write_point(c.vector90)?;
            w.write_f64(c.radius_a)?;
            w.write_f64(c.radius_b)?;
            w.write_bool(c.capped)?;
        }
        SolidPrimitive::Extrusion(e) => {
            write_curve_vector(&mut w, &e.base, 0)?;
            w.write_point(e.vector)?;
            w.write_bool(e.capped)?;
        }
    }
    Ok(w.into_bytes())
}

pub fn decode_solid(data: &[u8]) -> Result<SolidPrimitive> {
    let mut r = PayloadReader::new(data)?;
    match r.read_u8()? {
        0 => Ok(SolidPrimitive::Box(BoxDetail {
            base_origin: r.read_point()?,
            top_origin: r.read_point()?,
            vector_x: r.read_point()?,
            vector_y: r.read_point()?,
            base_x: r.read_f64()?,
            base_y: r.read_f64()?,
            top_x: r.read_f64()?,
            top_y: r.read_f64()?,
            capped: r.read_bool()?,
        })),
        1 => Ok(SolidPrimitive::Sphere(SphereDetail {
            center: r.read_point()?,
            axes: r.read_matrix()?,
        })),
        2 => Ok(SolidPrimitive::Cone(ConeDetail {
            center_a: r.read_point()?,
            center_b: r.read_point()?,
            vector0: r.read_point()?,
            vector90: r.read_point()?,
            radius_a: r.read_f64()?,
            radius_b: r.read_f64()?,
            capped: r.read_bool()?,
        })),
        3 => Ok(SolidPrimitive::Extrusion(ExtrusionDetail {
            base: read_curve_vector(&mut r, 0)?,
            vector: r.read_point()?,
            capped: r.read_bool()?,
        })),
        other => Err(GeomStreamError::Payload(format!("bad solid tag {other}"))),
    }
}

// ============================================================================
// BRep, text and images
// ============================================================================

const FACE_USE_COLOR: u8 = 0x01;
const FACE_USE_TRANSPARENCY: u8 = 0x02;
const FACE_USE_MATERIAL: u8 = 0x04;

/// Entity transform, type, opaque data, range, face table and, for
/// entities with non-default attachments, the face index table
pub fn encode_brep(entity: &BRepEntity) -> Result<Vec<u8>> {
    let mut w = PayloadWriter::new();
    w.write_transform(&entity.transform)?;
    w.write_u32(entity.entity_type as u32)?;
    w.write_bytes(&entity.data)?;
    w.write_range(&entity.entity_range)?;
    w.write_bool(entity.is_single_planar_face)?;

    let table = entity.attachments.as_ref().map(|a| a.table.as_slice()).unwrap_or(&[]);
    w.write_count(table.len())?;
    for symb in table {
        write_face_symbology(&mut w, symb)?;
    }
    match entity.attachments.as_ref().filter(|a| a.has_non_default()) {
        Some(attachments) => {
            w.write_bool(true)?;
            w.write_u32s(&attachments.face_index)?;
        }
        None => w.write_bool(false)?,
    }
    Ok(w.into_bytes())
}

pub fn decode_brep(data: &[u8]) -> Result<BRepEntity> {
    let mut r = PayloadReader::new(data)?;
    let transform = r.read_transform()?;
    let entity_type = BRepType::from_u32(r.read_u32()?);
    let bytes = r.read_bytes()?;
    let entity_range = r.read_range()?;
    let is_single_planar_face = r.read_bool()?;

    let count = r.read_count(1)?;
    let table = (0..count)
        .map(|_| read_face_symbology(&mut r))
        .collect::<Result<Vec<_>>>()?;
    let face_index = if r.read_bool()? { r.read_u32s()? } else { Vec::new() };

    let mut entity = BRepEntity::new(entity_type, bytes, entity_range);
    entity.transform = transform;
    entity.is_single_planar_face = is_single_planar_face;
    if !table.is_empty() {
        entity.attachments = Some(FaceAttachments { table, face_index });
    }
    Ok(entity)
}

fn write_face_symbology(w: &mut PayloadWriter, symb: &FaceSymbology) -> Result<()> {
    let mut flags = 0u8;
    if symb.color.is_some() {
        flags |= FACE_USE_COLOR;
    }
    if symb.transparency.is_some() {
        flags |= FACE_USE_TRANSPARENCY;
    }
    if symb.material.is_some() {
        flags |= FACE_USE_MATERIAL;
    }
    w.write_u8(flags)?;
    w.write_u32(symb.color.map_or(0, |c| c.raw()))?;
    w.write_f64(symb.transparency.unwrap_or(0.0))?;
    w.write_u64(symb.material.map_or(0, |m| m.value()))
}

fn read_face_symbology(r: &mut PayloadReader<'_>) -> Result<FaceSymbology> {
    let flags = r.read_u8()?;
    let color = ColorDef::from_raw(r.read_u32()?);
    let transparency = r.read_f64()?;
    let material = MaterialId::new(r.read_u64()?);
    Ok(FaceSymbology {
        color: (flags & FACE_USE_COLOR != 0).then_some(color),
        transparency: (flags & FACE_USE_TRANSPARENCY != 0).then_some(transparency),
        material: (flags & FACE_USE_MATERIAL != 0).then_some(material),
    })
}

const TEXT_BOLD: u8 = 0x01;
const TEXT_ITALIC: u8 = 0x02;
const TEXT_UNDERLINE: u8 = 0x04;

pub fn encode_text(text: &TextString) -> Result<Vec<u8>> {
    let mut w = PayloadWriter::new();
    w.write_string(&text.text)?;
    w.write_u64(text.font.value())?;
    w.write_f64(text.height)?;
    w.write_f64(text.width)?;
    w.write_point(text.origin)?;
    w.write_matrix(&text.orientation)?;
    let mut flags = 0u8;
    if text.is_bold {
        flags |= TEXT_BOLD;
    }
    if text.is_italic {
        flags |= TEXT_ITALIC;
    }
    if text.is_underlined {
        flags |= TEXT_UNDERLINE;
    }
    w.write_u8(flags)?;
    Ok(w.into_bytes())
}

pub fn decode_text(data: &[u8]) -> Result<TextString> {
    let mut r = PayloadReader::new(data)?;
    let text = r.read_string()?;
    let font = FontId::new(r.read_u64()?);
    let height = r.read_f64()?;
    let width = r.read_f64()?;
    let origin = r.read_point()?;
    let orientation = r.read_matrix()?;
    let flags = r.read_u8()?;
    Ok(TextString {
        text,
        font,
        height,
        width,
        origin,
        orientation,
        is_bold: flags & TEXT_BOLD != 0,
        is_italic: flags & TEXT_ITALIC != 0,
        is_underlined: flags & TEXT_UNDERLINE != 0,
    })
}

pub fn encode_image(image: &ImageGraphic) -> Result<Vec<u8>> {
    let mut w = PayloadWriter::new();
    for corner in &image.corners {
        w.write_point(*corner)?;
    }
    w.write_u64(image.texture_id.value())?;
    w.write_bool(image.has_border)?;
    Ok(w.into_bytes())
}

pub fn decode_image(data: &[u8]) -> Result<ImageGraphic> {
    let mut r = PayloadReader::new(data)?;
    let corners = [r.read_point()?, r.read_point()?, r.read_point()?, r.read_point()?];
    let texture_id = TextureId::new(r.read_u64()?);
    let has_border = r.read_bool()?;
    Ok(ImageGraphic {
        corners,
        texture_id,
        has_border,
    })
}

// ============================================================================
// Header and part instances
// ============================================================================

pub fn encode_header(version: u32, flags: HeaderFlags) -> Result<Vec<u8>> {
    let mut w = PayloadWriter::new();
    w.write_u32(version)?;
    w.write_u32(flags.bits())?;
    Ok(w.into_bytes())
}

/// Unknown flag bits are dropped
pub fn decode_header(data: &[u8]) -> Result<(u32, HeaderFlags)> {
    let mut r = PayloadReader::new(data)?;
    let version = r.read_u32()?;
    let flags = HeaderFlags::from_bits_truncate(r.read_u32()?);
    Ok((version, flags))
}

/// Part instance payload: the part id, plus origin, angles in degrees and
/// uniform scale when the instance transform is not identity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartInstanceRecord {
    pub part_id: GeometryPartId,
    pub placement: Option<(Vector3, YawPitchRollAngles, f64)>,
}

impl PartInstanceRecord {
    /// Decompose an instance transform; mirrors are rejected
    pub fn from_transform(part_id: GeometryPartId, transform: Option<&Transform>) -> Result<Self> {
        let Some(transform) = transform.filter(|t| !t.is_identity()) else {
            return Ok(PartInstanceRecord { part_id, placement: None });
        };
        if transform.has_mirror() {
            return Err(GeomStreamError::InvalidGeometry(
                "part instance transform has a mirror".into(),
            ));
        }
        let scale = transform.matrix.column(0).length();
        if scale <= 0.0 {
            return Err(GeomStreamError::InvalidGeometry("degenerate part instance transform".into()));
        }
        let rotation = transform.matrix * crate::types::Matrix3::from_scale(1.0 / scale);
        let angles = YawPitchRollAngles::from_matrix(&rotation).ok_or_else(|| {
            GeomStreamError::InvalidGeometry("part instance transform is not a rigid scale".into())
        })?;
        Ok(PartInstanceRecord {
            part_id,
            placement: Some((transform.translation, angles, scale)),
        })
    }

    pub fn to_transform(&self) -> Transform {
        match self.placement {
            None => Transform::identity(),
            Some((origin, angles, scale)) => {
                let rotation = angles.to_matrix() * crate::types::Matrix3::from_scale(scale);
                Transform::from_matrix_and_translation(rotation, origin)
            }
        }
    }
}

pub fn encode_part_instance(record: &PartInstanceRecord) -> Result<Vec<u8>> {
    let mut w = PayloadWriter::new();
    w.write_u64(record.part_id.value())?;
    match record.placement {
        None => w.write_bool(false)?,
        Some((origin, angles, scale)) => {
            w.write_bool(true)?;
            w.write_point(origin)?;
            w.write_f64(angles.yaw)?;
            w.write_f64(angles.pitch)?;
            w.write_f64(angles.roll)?;
            w.write_f64(scale)?;
        }
    }
    Ok(w.into_bytes())
}

pub fn decode_part_instance(data: &[u8]) -> Result<PartInstanceRecord> {
    let mut r = PayloadReader::new(data)?;
    let part_id = GeometryPartId::new(r.read_u64()?);
    let placement = if r.read_bool()? {
        let origin = r.read_point()?;
        let angles = YawPitchRollAngles::from_degrees(r.read_f64()?, r.read_f64()?, r.read_f64()?);
        Some((origin, angles, r.read_f64()?))
    } else {
        None
    };
    Ok(PartInstanceRecord { part_id, placement })
}

// ============================================================================
// Symbology records
// ============================================================================

/// `BasicSymbology` payload.
///
/// A zero sub-category means "keep the current one"; the `use_*` flags mark
/// which of color, weight and style are explicit.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BasicSymbologyRecord {
    pub sub_category_id: SubCategoryId,
    pub color: ColorDef,
    pub weight: u32,
    pub line_style_id: LineStyleId,
    pub transparency: f64,
    pub display_priority: i32,
    pub geometry_class: GeometryClass,
    pub use_color: bool,
    pub use_weight: bool,
    pub use_style: bool,
}

pub fn encode_basic_symbology(record: &BasicSymbologyRecord) -> Result<Vec<u8>> {
    let mut w = PayloadWriter::new();
    w.write_u64(record.sub_category_id.value())?;
    w.write_u32(record.color.raw())?;
    w.write_u32(record.weight)?;
    w.write_u64(record.line_style_id.value())?;
    w.write_f64(record.transparency)?;
    w.write_i32(record.display_priority)?;
    w.write_u8(record.geometry_class as u8)?;
    let flags = u8::from(record.use_color) | (u8::from(record.use_weight) << 1) | (u8::from(record.use_style) << 2);
    w.write_u8(flags)?;
    Ok(w.into_bytes())
}

pub fn decode_basic_symbology(data: &[u8]) -> Result<BasicSymbologyRecord> {
    let mut r = PayloadReader::new(data)?;
    let sub_category_id = SubCategoryId::new(r.read_u64()?);
    let color = ColorDef::from_raw(r.read_u32()?);
    let weight = r.read_u32()?;
    let line_style_id = LineStyleId::new(r.read_u64()?);
    let transparency = r.read_f64()?;
    let display_priority = r.read_i32()?;
    let geometry_class = GeometryClass::from_u8(r.read_u8()?);
    let flags = r.read_u8()?;
    Ok(BasicSymbologyRecord {
        sub_category_id,
        color,
        weight,
        line_style_id,
        transparency,
        display_priority,
        geometry_class,
        use_color: flags & 0x01 != 0,
        use_weight: flags & 0x02 != 0,
        use_style: flags & 0x04 != 0,
    })
}

/// Style modifiers; the rotation travels as yaw/pitch/roll degrees
pub fn encode_line_style_modifiers(params: &LineStyleParams) -> Result<Vec<u8>> {
    let mut w = PayloadWriter::new();
    w.write_u32(params.modifiers.bits())?;
    w.write_f64(params.scale)?;
    w.write_f64(params.dash_scale)?;
    w.write_f64(params.gap_scale)?;
    w.write_f64(params.start_width)?;
    w.write_f64(params.end_width)?;
    w.write_f64(params.distance_phase)?;
    w.write_f64(params.fractional_phase)?;
    w.write_point(params.normal)?;
    let angles = YawPitchRollAngles::from_matrix(&params.rotation).unwrap_or_default();
    w.write_f64(angles.yaw)?;
    w.write_f64(angles.pitch)?;
    w.write_f64(angles.roll)?;
    Ok(w.into_bytes())
}

pub fn decode_line_style_modifiers(data: &[u8]) -> Result<LineStyleParams> {
    let mut r = PayloadReader::new(data)?;
    let modifiers = LineStyleModifiers::from_bits_truncate(r.read_u32()?);
    let scale = r.read_f64()?;
    let dash_scale = r.read_f64()?;
    let gap_scale = r.read_f64()?;
    let start_width = r.read_f64()?;
    let end_width = r.read_f64()?;
    let distance_phase = r.read_f64()?;
    let fractional_phase = r.read_f64()?;
    let normal = r.read_point()?;
    let angles = YawPitchRollAngles::from_degrees(r.read_f64()?, r.read_f64()?, r.read_f64()?);
    Ok(LineStyleParams {
        modifiers,
        scale,
        dash_scale,
        gap_scale,
        start_width,
        end_width,
        distance_phase,
        fractional_phase,
        normal,
        rotation: angles.to_matrix(),
    })
}

/// `AreaFill` payload: solid/background fill or a gradient
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AreaFillRecord {
    pub fill_display: FillDisplay,
    pub color: ColorDef,
    pub use_color: bool,
    pub background_fill: BackgroundFill,
    pub transparency: f64,
    pub gradient: Option<GradientSymb>,
}

pub fn encode_area_fill(record: &AreaFillRecord) -> Result<Vec<u8>> {
    let mut w = PayloadWriter::new();
    w.write_u32(record.fill_display as u32)?;
    w.write_u32(record.color.raw())?;
    w.write_bool(record.use_color)?;
    w.write_u8(record.background_fill as u8)?;
    w.write_f64(record.transparency)?;
    match &record.gradient {
        None => w.write_u32(GradientMode::None as u32)?,
        Some(gradient) => {
            w.write_u32(gradient.mode as u32)?;
            w.write_u16(gradient.flags)?;
            w.write_f64(gradient.angle)?;
            w.write_f64(gradient.tint)?;
            w.write_f64(gradient.shift)?;
            w.write_count(gradient.keys.len())?;
            for (color, value) in &gradient.keys {
                w.write_u32(color.raw())?;
                w.write_f64(*value)?;
            }
        }
    }
    Ok(w.into_bytes())
}

pub fn decode_area_fill(data: &[u8]) -> Result<AreaFillRecord> {
    let mut r = PayloadReader::new(data)?;
    let fill_display = FillDisplay::from_u32(r.read_u32()?);
    let color = ColorDef::from_raw(r.read_u32()?);
    let use_color = r.read_bool()?;
    let background_fill = BackgroundFill::from_u8(r.read_u8()?);
    let transparency = r.read_f64()?;
    let mode = GradientMode::from_u32(r.read_u32()?);
    let gradient = if mode == GradientMode::None {
        None
    } else {
        let flags = r.read_u16()?;
        let angle = r.read_f64()?;
        let tint = r.read_f64()?;
        let shift = r.read_f64()?;
        let count = r.read_count(12)?;
        let keys = (0..count)
            .map(|_| Ok((ColorDef::from_raw(r.read_u32()?), r.read_f64()?)))
            .collect::<Result<Vec<_>>>()?;
        Some(GradientSymb {
            mode,
            flags,
            angle,
            tint,
            shift,
            keys,
        })
    };
    Ok(AreaFillRecord {
        fill_display,
        color,
        use_color,
        background_fill,
        transparency,
        gradient,
    })
}

pub fn encode_pattern(pattern: &PatternParams) -> Result<Vec<u8>> {
    let mut w = PayloadWriter::new();
    w.write_point(pattern.origin)?;
    w.write_matrix(&pattern.orientation)?;
    w.write_f64(pattern.primary_spacing)?;
    w.write_f64(pattern.secondary_spacing)?;
    w.write_f64(pattern.primary_angle)?;
    w.write_f64(pattern.secondary_angle)?;
    w.write_f64(pattern.scale)?;
    w.write_bool(pattern.color.is_some())?;
    w.write_u32(pattern.color.map_or(0, |c| c.raw()))?;
    w.write_bool(pattern.weight.is_some())?;
    w.write_u32(pattern.weight.unwrap_or(0))?;
    w.write_bool(pattern.invisible_boundary)?;
    w.write_bool(pattern.snappable)?;
    w.write_u64(pattern.symbol_id.value())?;
    w.write_count(pattern.hatch_lines.len())?;
    for line in &pattern.hatch_lines {
        w.write_f64(line.angle)?;
        w.write_point_2d(line.through)?;
        w.write_point_2d(line.offset)?;
        w.write_f64s(&line.dashes)?;
    }
    Ok(w.into_bytes())
}

pub fn decode_pattern(data: &[u8]) -> Result<PatternParams> {
    let mut r = PayloadReader::new(data)?;
    let origin = r.read_point()?;
    let orientation = r.read_matrix()?;
    let primary_spacing = r.read_f64()?;
    let secondary_spacing = r.read_f64()?;
    let primary_angle = r.read_f64()?;
    let secondary_angle = r.read_f64()?;
    let scale = r.read_f64()?;
    let use_color = r.read_bool()?;
    let color = ColorDef::from_raw(r.read_u32()?);
    let use_weight = r.read_bool()?;
    let weight = r.read_u32()?;
    let invisible_boundary = r.read_bool()?;
    let snappable = r.read_bool()?;
    let symbol_id = GeometryPartId::new(r.read_u64()?);
    let count = r.read_count(40)?;
    let hatch_lines = (0..count)
        .map(|_| {
            Ok(HatchDefLine {
                angle: r.read_f64()?,
                through: r.read_point_2d()?,
                offset: r.read_point_2d()?,
                dashes: r.read_f64s()?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(PatternParams {
        origin,
        orientation,
        primary_spacing,
        secondary_spacing,
        primary_angle,
        secondary_angle,
        scale,
        color: use_color.then_some(color),
        weight: use_weight.then_some(weight),
        invisible_boundary,
        snappable,
        symbol_id,
        hatch_lines,
    })
}

/// `Material` payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MaterialRecord {
    pub use_material: bool,
    pub material_id: MaterialId,
}

pub fn encode_material(record: &MaterialRecord) -> Result<Vec<u8>> {
    let mut w = PayloadWriter::new();
    w.write_bool(record.use_material)?;
    w.write_u64(record.material_id.value())?;
    Ok(w.into_bytes())
}

pub fn decode_material(data: &[u8]) -> Result<MaterialRecord> {
    let mut r = PayloadReader::new(data)?;
    Ok(MaterialRecord {
        use_material: r.read_bool()?,
        material_id: MaterialId::new(r.read_u64()?),
    })
}
