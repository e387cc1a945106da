//! Incremental construction of element and part streams
//!
//! A [`GeometryBuilder`] buffers symbology until geometry arrives, so only
//! the params that actually precede a geometry are written. Each geometry
//! grows the placement's element box and has its symbology checked against
//! what that kind of geometry can display.
//!
//! Element builders either start from a known placement or derive one
//! from the first geometry appended in world coordinates. Part builders
//! always work in local coordinates.

mod capability;
mod part;

pub use capability::{strip_disallowed, Capabilities};

use tracing::debug;

use crate::config::BuilderConfiguration;
use crate::error::{GeomStreamError, Result};
use crate::geometry::{
    BRepEntity, BsplineSurface, CurvePrimitive, CurveVector, GeometricPrimitive, GeometryType, ImageGraphic,
    Polyface, SolidPrimitive, TextString,
};
use crate::geometry_collection::GeometryCollection;
use crate::kernel::{FallbackOnlyKernel, SolidKernel};
use crate::store::{GeometrySource, SymbologyResolver};
use crate::stream::{GeometryStream, GeometryStreamEntryId, HeaderFlags, OpCode, Reader, Writer};
use crate::symbology::GeometryParams;
use crate::types::{
    CategoryId, GeometryPartId, Placement, Range3d, SubCategoryId, Transform, Vector2, Vector3, YawPitchRollAngles,
};

static FALLBACK_KERNEL: FallbackOnlyKernel = FallbackOnlyKernel;

/// Coordinates of appended geometry and params
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordSystem {
    /// Relative to the placement
    #[default]
    Local,
    /// World coordinates, converted with the inverse placement transform
    World,
}

/// Builds one element or geometry part stream
pub struct GeometryBuilder<'b> {
    writer: Writer,
    config: BuilderConfiguration,
    resolver: Option<&'b dyn SymbologyResolver>,
    source: Option<&'b dyn GeometrySource>,
    kernel: &'b dyn SolidKernel,
    is_part: bool,
    is_3d: bool,
    placement: Placement,
    have_placement: bool,
    /// Bytes taken by the leading header, if any
    header_len: usize,
    params: GeometryParams,
    /// Last capability-stripped params written in place of `params`
    written_params: GeometryParams,
    appearance_changed: bool,
    appearance_modified: bool,
    sub_category_changed: bool,
    append_as_sub_graphics: bool,
}

impl std::fmt::Debug for GeometryBuilder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeometryBuilder")
            .field("is_part", &self.is_part)
            .field("is_3d", &self.is_3d)
            .field("len", &self.writer.len())
            .field("placement", &self.have_placement.then_some(&self.placement))
            .field("params", &self.params)
            .finish()
    }
}

impl<'b> GeometryBuilder<'b> {
    fn new(category_id: CategoryId, is_3d: bool, is_part: bool, config: BuilderConfiguration) -> Result<Self> {
        let placement = if is_3d {
            Placement::new_3d(Vector3::ZERO, YawPitchRollAngles::default())
        } else {
            Placement::new_2d(Vector3::ZERO, 0.0)
        };
        let mut writer = Writer::new(is_3d);
        if let Some(flags) = config.header_flags {
            writer.append_header(flags)?;
        }
        let params = GeometryParams::new(category_id, SubCategoryId::INVALID);
        Ok(GeometryBuilder {
            header_len: writer.len(),
            writer,
            config,
            resolver: None,
            source: None,
            kernel: &FALLBACK_KERNEL,
            is_part,
            is_3d,
            placement,
            // parts are always in local coordinates
            have_placement: is_part,
            written_params: params.clone(),
            params,
            appearance_changed: false,
            appearance_modified: false,
            sub_category_changed: false,
            append_as_sub_graphics: false,
        })
    }

    fn new_element(category_id: CategoryId, is_3d: bool, config: BuilderConfiguration) -> Result<Self> {
        if !category_id.is_valid() {
            return Err(GeomStreamError::DisallowedOperation(
                "an element builder needs a valid category".to_string(),
            ));
        }
        Self::new(category_id, is_3d, false, config)
    }

    /// 3-D element whose placement comes from the first world geometry
    pub fn create_3d(category_id: CategoryId, config: BuilderConfiguration) -> Result<Self> {
        Self::new_element(category_id, true, config)
    }

    /// 2-D element whose placement comes from the first world geometry
    pub fn create_2d(category_id: CategoryId, config: BuilderConfiguration) -> Result<Self> {
        Self::new_element(category_id, false, config)
    }

    pub fn create_3d_with_placement(
        category_id: CategoryId,
        origin: Vector3,
        angles: YawPitchRollAngles,
        config: BuilderConfiguration,
    ) -> Result<Self> {
        Self::with_placement(category_id, Placement::new_3d(origin, angles), config)
    }

    pub fn create_2d_with_placement(
        category_id: CategoryId,
        origin: Vector2,
        rotation_degrees: f64,
        config: BuilderConfiguration,
    ) -> Result<Self> {
        Self::with_placement(category_id, Placement::new_2d(origin.with_z(0.0), rotation_degrees), config)
    }

    /// Element with a known placement. Any element box it carries is
    /// discarded and recomputed from the appended geometry.
    pub fn with_placement(category_id: CategoryId, placement: Placement, config: BuilderConfiguration) -> Result<Self> {
        let mut builder = Self::new_element(category_id, placement.is_3d, config)?;
        builder.placement = placement;
        builder.placement.element_box = Range3d::null();
        builder.have_placement = true;
        Ok(builder)
    }

    /// Geometry part. Parts have no category and an identity placement.
    pub fn create_part(is_3d: bool, config: BuilderConfiguration) -> Result<Self> {
        Self::new(CategoryId::INVALID, is_3d, true, config)
    }

    /// Resolver for sub-category checks and line style widths
    pub fn with_resolver(mut self, resolver: &'b dyn SymbologyResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Source of part ranges for [`append_part`](Self::append_part)
    pub fn with_geometry_source(mut self, source: &'b dyn GeometrySource) -> Self {
        self.source = Some(source);
        self
    }

    /// Kernel used when appending BRep entities
    pub fn with_kernel(mut self, kernel: &'b dyn SolidKernel) -> Self {
        self.kernel = kernel;
        self
    }

    pub fn is_3d(&self) -> bool {
        self.is_3d
    }

    pub fn is_part(&self) -> bool {
        self.is_part
    }

    /// Current placement, once known
    pub fn placement(&self) -> Option<&Placement> {
        self.have_placement.then_some(&self.placement)
    }

    /// Params the next geometry will be written with
    pub fn geometry_params(&self) -> &GeometryParams {
        &self.params
    }

    /// Whether anything besides the header has been written
    pub fn has_geometry(&self) -> bool {
        self.writer.len() > self.header_len
    }

    /// Encoded bytes so far
    pub fn as_bytes(&self) -> &[u8] {
        self.writer.as_bytes()
    }

    /// Entry id of the last entry written
    pub fn current_entry_id(&self) -> GeometryStreamEntryId {
        GeometryCollection::new(self.writer.as_bytes()).entry_id_for_offset(None)
    }

    /// Geometry appended from now on is preceded by a `SubGraphicRange`.
    /// Ignored for parts and when the configuration disallows it.
    pub fn set_append_as_sub_graphics(&mut self, enabled: bool) {
        if enabled && (self.is_part || !self.config.allow_sub_graphic_ranges) {
            debug!(target: "geomstream::builder", is_part = self.is_part, "sub-graphic ranges not written");
            return;
        }
        self.append_as_sub_graphics = enabled;
    }

    // ------------------------------------------------------------------
    // Symbology
    // ------------------------------------------------------------------

    /// Params for geometry that follows, in local coordinates.
    ///
    /// Nothing is written until the next geometry. Params equivalent to
    /// the current ones are a no-op.
    pub fn append_params(&mut self, params: &GeometryParams) -> Result<()> {
        self.append_params_in(params, CoordSystem::Local)
    }

    /// Params whose pattern and line style frame are in world coordinates
    pub fn append_world_params(&mut self, params: &GeometryParams) -> Result<()> {
        self.append_params_in(params, CoordSystem::World)
    }

    /// Switch to a sub-category of the builder's category with its
    /// default appearance
    pub fn append_sub_category(&mut self, sub_category_id: SubCategoryId) -> Result<()> {
        let params = GeometryParams::new(self.params.category_id(), sub_category_id);
        self.append_params(&params)
    }

    fn append_params_in(&mut self, params: &GeometryParams, coord: CoordSystem) -> Result<()> {
        if !self.is_part {
            self.check_category(params)?;
        }

        let mut params = params.clone();
        if params.is_transformable() {
            match coord {
                CoordSystem::World if self.is_part => {
                    return Err(GeomStreamError::DisallowedOperation(
                        "part params must be in local coordinates".to_string(),
                    ));
                }
                // applied once the first geometry fixes the placement
                CoordSystem::World if !self.have_placement => {}
                CoordSystem::World => {
                    let world_to_local = self.world_to_local()?;
                    if !world_to_local.is_identity() {
                        params.apply_transform(&world_to_local);
                    }
                }
                CoordSystem::Local if !self.have_placement => {
                    return Err(GeomStreamError::PlacementPrecondition(
                        "local params need a placement".to_string(),
                    ));
                }
                CoordSystem::Local => {}
            }
        }

        if self.params.is_equivalent(&params) {
            return Ok(());
        }
        self.sub_category_changed = !self.is_part && params.sub_category_id() != self.params.sub_category_id();
        self.params = params;
        self.appearance_changed = true;
        Ok(())
    }

    fn check_category(&self, params: &GeometryParams) -> Result<()> {
        let expected = self.params.category_id();
        if !expected.is_valid() || params.category_id() != expected {
            return Err(GeomStreamError::CategoryMismatch {
                expected: expected.value(),
                actual: params.category_id().value(),
            });
        }
        let sub_category_id = params.sub_category_id();
        if !sub_category_id.is_valid() {
            return Ok(());
        }
        if let Some(resolver) = self.resolver {
            let owner = resolver.category_of_sub_category(sub_category_id).unwrap_or_default();
            if owner != expected {
                return Err(GeomStreamError::CategoryMismatch {
                    expected: expected.value(),
                    actual: owner.value(),
                });
            }
        }
        Ok(())
    }

    /// Replace the leading header. Only valid before anything else is
    /// written and never for parts.
    pub fn append_header(&mut self, flags: HeaderFlags) -> Result<()> {
        if self.is_part {
            return Err(GeomStreamError::DisallowedOperation(
                "header flags are not valid for a part".to_string(),
            ));
        }
        if self.has_geometry() {
            return Err(GeomStreamError::DisallowedOperation(
                "header must precede all other operations".to_string(),
            ));
        }
        self.writer.reset();
        self.writer.append_header(flags)?;
        self.header_len = self.writer.len();
        Ok(())
    }

    /// Explicit sub-graphic range for the next geometry
    pub fn append_sub_graphic_range(&mut self, range: &Range3d) -> Result<()> {
        if self.is_part {
            return Err(GeomStreamError::DisallowedOperation(
                "a part must produce a single graphic".to_string(),
            ));
        }
        if !self.config.allow_sub_graphic_ranges {
            debug!(target: "geomstream::builder", "sub-graphic range ignored");
            return Ok(());
        }
        self.writer.append_sub_graphic_range(range)
    }

    // ------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------

    /// Append a geometric primitive.
    ///
    /// In world coordinates the first geometry of a builder without a
    /// placement defines it: the origin and orientation come from the
    /// geometry's local frame. 2-D builders reject solids, surfaces,
    /// meshes and BReps.
    pub fn append_geometry(&mut self, geometry: &GeometricPrimitive, coord: CoordSystem) -> Result<()> {
        if !self.is_3d && is_3d_only(geometry.geometry_type()) {
            return Err(GeomStreamError::DisallowedOperation(format!(
                "{:?} is 3-D only",
                geometry.geometry_type()
            )));
        }
        match coord {
            CoordSystem::Local => self.append_local(geometry, None),
            CoordSystem::World => {
                let mut local = geometry.clone();
                let (frame, has_frame) = local.get_local_coordinate_frame();
                let conversion = self.convert_to_local(has_frame.then_some(frame))?;
                if let Some(world_to_local) = &conversion.world_to_local {
                    local.transform_in_place(world_to_local)?;
                }
                self.append_local(&local, Some(conversion))
            }
        }
    }

    pub fn append_curve_primitive(&mut self, curve: &CurvePrimitive, coord: CoordSystem) -> Result<()> {
        let geometry = GeometricPrimitive::from_curve_primitive(curve.clone())
            .ok_or_else(|| invalid("curve primitive"))?;
        self.append_geometry(&geometry, coord)
    }

    pub fn append_curve_vector(&mut self, curves: &CurveVector, coord: CoordSystem) -> Result<()> {
        let geometry = GeometricPrimitive::from_curve_vector(curves.clone()).ok_or_else(|| invalid("curve vector"))?;
        self.append_geometry(&geometry, coord)
    }

    pub fn append_polyface(&mut self, mesh: &Polyface, coord: CoordSystem) -> Result<()> {
        let geometry = GeometricPrimitive::from_polyface(mesh.clone()).ok_or_else(|| invalid("polyface"))?;
        self.append_geometry(&geometry, coord)
    }

    pub fn append_solid(&mut self, solid: &SolidPrimitive, coord: CoordSystem) -> Result<()> {
        let geometry =
            GeometricPrimitive::from_solid_primitive(solid.clone()).ok_or_else(|| invalid("solid primitive"))?;
        self.append_geometry(&geometry, coord)
    }

    pub fn append_bspline_surface(&mut self, surface: &BsplineSurface, coord: CoordSystem) -> Result<()> {
        let geometry =
            GeometricPrimitive::from_bspline_surface(surface.clone()).ok_or_else(|| invalid("bspline surface"))?;
        self.append_geometry(&geometry, coord)
    }

    pub fn append_brep(&mut self, entity: &BRepEntity, coord: CoordSystem) -> Result<()> {
        let geometry = GeometricPrimitive::from_brep(entity.clone()).ok_or_else(|| invalid("BRep entity"))?;
        self.append_geometry(&geometry, coord)
    }

    pub fn append_text(&mut self, text: &TextString, coord: CoordSystem) -> Result<()> {
        let geometry = GeometricPrimitive::from_text_string(text.clone()).ok_or_else(|| invalid("text string"))?;
        self.append_geometry(&geometry, coord)
    }

    /// Append a raster image. Its first corner anchors a derived placement.
    pub fn append_image(&mut self, image: &ImageGraphic, coord: CoordSystem) -> Result<()> {
        if !image.is_valid() {
            return Err(invalid("image"));
        }
        let mut local = image.clone();
        let mut conversion = None;
        if coord == CoordSystem::World {
            let world = self.convert_to_local(Some(Transform::from_translation(image.corners[0])))?;
            if let Some(world_to_local) = &world.world_to_local {
                local.transform_in_place(world_to_local);
            }
            conversion = Some(world);
        }
        self.check_local_placement(conversion.as_ref())?;

        let mut staged = Writer::new(self.is_3d);
        staged.append_image(&local)?;
        self.commit_conversion(conversion);
        self.on_new_geom(local.range(), self.append_as_sub_graphics, OpCode::Image)?;
        self.writer.append_writer(&staged);
        Ok(())
    }

    /// Instance a geometry part, its range looked up through the
    /// [`GeometrySource`].
    ///
    /// Without a placement, `geometry_to_element` is taken as world
    /// coordinates and the placement origin moves to the instance origin.
    pub fn append_part(&mut self, part_id: GeometryPartId, geometry_to_element: &Transform) -> Result<()> {
        let source = self.source.ok_or_else(|| {
            GeomStreamError::DisallowedOperation("part instances need a geometry source".to_string())
        })?;
        let range = source
            .part_range(part_id)
            .ok_or_else(|| GeomStreamError::InvalidGeometry(format!("geometry part {part_id} not found")))?;
        self.append_part_with_range(part_id, geometry_to_element, range)
    }

    pub fn append_part_ypr(&mut self, part_id: GeometryPartId, origin: Vector3, angles: YawPitchRollAngles) -> Result<()> {
        self.append_part(part_id, &angles.to_transform(origin))
    }

    pub fn append_part_2d(&mut self, part_id: GeometryPartId, origin: Vector2, rotation_degrees: f64) -> Result<()> {
        let angles = YawPitchRollAngles::from_degrees(rotation_degrees, 0.0, 0.0);
        self.append_part(part_id, &angles.to_transform(origin.with_z(0.0)))
    }

    /// Instance a geometry part whose local range is already known
    pub fn append_part_with_range(
        &mut self,
        part_id: GeometryPartId,
        geometry_to_element: &Transform,
        part_range: Range3d,
    ) -> Result<()> {
        if self.is_part {
            return Err(GeomStreamError::DisallowedOperation(
                "nested geometry parts are not supported".to_string(),
            ));
        }

        let mut transform = *geometry_to_element;
        let mut derived = None;
        if !self.have_placement {
            let placement = if self.is_3d {
                Placement::new_3d(transform.translation, YawPitchRollAngles::default())
            } else {
                Placement::new_2d(transform.translation, 0.0)
            };
            let world_to_local = placement
                .to_transform()
                .inverse()
                .ok_or_else(|| GeomStreamError::PlacementPrecondition("placement transform is singular".to_string()))?;
            transform = world_to_local * transform;
            derived = Some(placement);
        }

        let mut staged = Writer::new(self.is_3d);
        staged.append_part_instance(part_id, Some(&transform))?;

        if let Some(placement) = derived {
            debug!(target: "geomstream::builder", origin = ?placement.origin, "placement derived from part instance");
            self.placement = placement;
            self.have_placement = true;
        }
        let range = if transform.is_identity() {
            part_range
        } else {
            part_range.transformed(&transform)
        };
        self.on_new_geom(range, false, OpCode::GeometryPartInstance)?;
        self.writer.append_writer(&staged);
        Ok(())
    }

    /// Append every entry of an existing stream, in local coordinates.
    ///
    /// Symbology is carried over as params and sub-graphic ranges are
    /// re-derived. BRep fallbacks that trail a primary are skipped since
    /// appending the primary writes them again.
    pub fn append_stream(&mut self, data: &[u8]) -> Result<()> {
        let collection = GeometryCollection::new(data).with_params(self.params.clone());
        for entry in &collection {
            if entry.is_brep_fallback() {
                continue;
            }
            self.append_params(entry.geometry_params())?;
            if entry.is_part_instance() {
                self.append_part(entry.geometry_part_id(), &entry.geometry_to_source())?;
                continue;
            }
            self.set_append_as_sub_graphics(entry.sub_graphic_local_range().is_some());
            if entry.opcode() == OpCode::Image {
                let image = Reader::new().get_image(entry.operation())?;
                self.append_image(&image, CoordSystem::Local)?;
                continue;
            }
            match entry.geometry() {
                Some(geometry) => self.append_geometry(geometry, CoordSystem::Local)?,
                None => debug!(target: "geomstream::builder", opcode = %entry.opcode(), "entry not decoded, skipped"),
            }
        }
        Ok(())
    }

    /// Placement derived from `frame` if there is none yet, and the
    /// world-to-local transform to apply. Nothing is committed here.
    fn convert_to_local(&self, frame: Option<Transform>) -> Result<WorldConversion> {
        if self.is_part {
            return Err(GeomStreamError::DisallowedOperation(
                "part geometry must be in local coordinates".to_string(),
            ));
        }

        let derived = if self.have_placement {
            None
        } else {
            let frame = frame.ok_or_else(|| {
                GeomStreamError::InvalidGeometry("geometry has no local coordinate frame".to_string())
            })?;
            let (origin, angles) = YawPitchRollAngles::from_transform(&frame)
                .unwrap_or((frame.translation, YawPitchRollAngles::default()));
            let placement = if self.is_3d {
                Placement::new_3d(origin, angles)
            } else {
                Placement::new_2d(origin, angles.yaw)
            };
            Some(placement)
        };

        let world_to_local = placement_world_to_local(derived.as_ref().unwrap_or(&self.placement))?;
        Ok(WorldConversion {
            derived,
            world_to_local: (!world_to_local.is_identity()).then_some(world_to_local),
        })
    }

    /// Adopt a derived placement once the geometry that needed it was staged
    fn commit_conversion(&mut self, conversion: Option<WorldConversion>) {
        let Some(WorldConversion {
            derived: Some(placement),
            world_to_local,
        }) = conversion
        else {
            return;
        };
        self.placement = placement;
        self.have_placement = true;
        debug!(target: "geomstream::builder", origin = ?self.placement.origin, angles = ?self.placement.angles, "placement derived from geometry");
        // params appended in world coordinates before the placement existed
        if let Some(world_to_local) = world_to_local {
            if self.params.is_transformable() {
                self.params.apply_transform(&world_to_local);
            }
        }
    }

    fn check_local_placement(&self, conversion: Option<&WorldConversion>) -> Result<()> {
        if self.have_placement || conversion.is_some_and(|c| c.derived.is_some()) {
            return Ok(());
        }
        Err(GeomStreamError::PlacementPrecondition(
            "local geometry needs a placement".to_string(),
        ))
    }

    fn world_to_local(&self) -> Result<Transform> {
        placement_world_to_local(&self.placement)
    }

    fn append_local(&mut self, geometry: &GeometricPrimitive, conversion: Option<WorldConversion>) -> Result<()> {
        self.check_local_placement(conversion.as_ref())?;
        let range = geometry
            .get_range(None)
            .ok_or_else(|| GeomStreamError::InvalidGeometry("geometry has no range".to_string()))?;

        // stage first so a rejected geometry leaves the builder alone
        let mut staged = Writer::new(self.is_3d);
        let mut face_symbology = false;
        match geometry {
            GeometricPrimitive::BRepEntity(entity) => {
                let status = staged.append_brep(entity, self.kernel, &self.params, &self.config.facet_options)?;
                face_symbology = status.face_symbology;
            }
            _ => {
                staged.append_geometry(geometry)?;
            }
        }

        self.commit_conversion(conversion);
        self.on_new_geom(range, self.append_as_sub_graphics, capability_opcode(geometry))?;
        self.writer.append_writer(&staged);
        if face_symbology {
            // per-face symbology replaced the active params in the stream
            self.appearance_changed = true;
        }
        Ok(())
    }

    /// Bookkeeping ahead of every geometry: grow the element box, write
    /// pending params stripped to what `opcode` can display and the
    /// sub-graphic range when requested.
    fn on_new_geom(&mut self, local_range: Range3d, sub_graphic: bool, opcode: OpCode) -> Result<()> {
        let mut range = local_range;
        if self.params.category_id().is_valid() {
            if let Some(resolver) = self.resolver {
                resolver.resolve(&mut self.params);
            }
            let width = self.line_style_width();
            if width > 0.0 {
                range.expand(width, width, if self.is_3d { width } else { 0.0 });
            }
        }

        if self.is_3d {
            self.placement.element_box.extend_range(&range);
        } else if !range.is_null() {
            let flat = Range3d::new(
                Vector3::new(range.low.x, range.low.y, 0.0),
                Vector3::new(range.high.x, range.high.y, 0.0),
            );
            self.placement.element_box.extend_range(&flat);
        }

        match strip_disallowed(&self.params, Capabilities::for_opcode(opcode)) {
            Some(local) => {
                if !self.appearance_modified || !self.written_params.is_equivalent(&local) {
                    debug!(target: "geomstream::builder", %opcode, "symbology stripped to what the geometry displays");
                    self.writer
                        .append_params(&local, self.is_part || !self.sub_category_changed)?;
                    self.written_params = local;
                    self.appearance_changed = true;
                    self.appearance_modified = true;
                    self.sub_category_changed = false;
                }
            }
            None if self.appearance_changed => {
                self.writer
                    .append_params(&self.params, self.is_part || !self.sub_category_changed)?;
                self.appearance_changed = false;
                self.appearance_modified = false;
                self.sub_category_changed = false;
            }
            None => {}
        }

        if sub_graphic && !self.is_part {
            self.writer.append_sub_graphic_range(&range)?;
        }
        Ok(())
    }

    fn line_style_width(&self) -> f64 {
        let Some(style) = self.params.line_style() else {
            return 0.0;
        };
        if style.definition_width > 0.0 {
            return style.max_width();
        }
        let definition_width = self
            .resolver
            .and_then(|r| r.line_style_width(style.style_id))
            .unwrap_or(0.0);
        let mut cooked = style.clone();
        cooked.definition_width = definition_width;
        cooked.max_width()
    }

    // ------------------------------------------------------------------
    // Finish
    // ------------------------------------------------------------------

    /// Finished part stream and its local range.
    ///
    /// When no geometry grew the box (operations copied verbatim), the
    /// range is computed from the stream itself.
    pub fn finish_part(&self) -> Result<(GeometryStream, Range3d)> {
        if !self.is_part {
            return Err(GeomStreamError::PlacementPrecondition(
                "not a part builder".to_string(),
            ));
        }
        if !self.has_geometry() {
            return Err(GeomStreamError::PlacementPrecondition(
                "no geometry was appended".to_string(),
            ));
        }
        let mut range = self.placement.element_box;
        if !range.is_valid_box() {
            range = geometry_range(self.writer.as_bytes());
        }
        if !range.is_valid_box() {
            return Err(GeomStreamError::PlacementPrecondition("part range is empty".to_string()));
        }
        Ok((GeometryStream::new(self.writer.as_bytes().to_vec()), range))
    }

    /// Finished element stream and its placement
    pub fn finish_element(&self) -> Result<(GeometryStream, Placement)> {
        if self.is_part {
            return Err(GeomStreamError::PlacementPrecondition(
                "a part builder cannot finish an element".to_string(),
            ));
        }
        if !self.has_geometry() {
            return Err(GeomStreamError::PlacementPrecondition(
                "no geometry was appended".to_string(),
            ));
        }
        if !self.have_placement {
            return Err(GeomStreamError::PlacementPrecondition(
                "placement was never defined".to_string(),
            ));
        }
        if !self.placement.is_valid() {
            return Err(GeomStreamError::PlacementPrecondition(
                "element box is empty".to_string(),
            ));
        }
        Ok((GeometryStream::new(self.writer.as_bytes().to_vec()), self.placement))
    }
}

/// Union of the ranges of every geometry entry in a stream.
///
/// Part instances contribute nothing; their range lives with the part.
pub fn geometry_range(data: &[u8]) -> Range3d {
    let mut range = Range3d::null();
    for entry in &GeometryCollection::new(data) {
        if entry.opcode() == OpCode::Image {
            if let Ok(image) = Reader::new().get_image(entry.operation()) {
                range.extend_range(&image.range());
            }
            continue;
        }
        if let Some(geometry_range) = entry.geometry().and_then(|g| g.get_range(None)) {
            range.extend_range(&geometry_range);
        }
    }
    range
}

/// Outcome of mapping world geometry into the element's local frame
struct WorldConversion {
    /// Placement to adopt, when the builder had none
    derived: Option<Placement>,
    world_to_local: Option<Transform>,
}

fn placement_world_to_local(placement: &Placement) -> Result<Transform> {
    placement
        .to_transform()
        .inverse()
        .ok_or_else(|| GeomStreamError::PlacementPrecondition("placement transform is singular".to_string()))
}

fn is_3d_only(geometry_type: GeometryType) -> bool {
    matches!(
        geometry_type,
        GeometryType::SolidPrimitive | GeometryType::BsplineSurface | GeometryType::Polyface | GeometryType::BRepEntity
    )
}

/// Opcode a geometry is classified as for symbology capabilities
fn capability_opcode(geometry: &GeometricPrimitive) -> OpCode {
    match geometry {
        GeometricPrimitive::CurvePrimitive(_) => OpCode::CurvePrimitive,
        GeometricPrimitive::CurveVector(curves) if curves.is_any_region_type() => OpCode::CurveVector,
        GeometricPrimitive::CurveVector(_) => OpCode::CurvePrimitive,
        GeometricPrimitive::SolidPrimitive(_) => OpCode::SolidPrimitive,
        GeometricPrimitive::BsplineSurface(_) => OpCode::BsplineSurface,
        GeometricPrimitive::Polyface(_) => OpCode::Polyface,
        GeometricPrimitive::BRepEntity(_) => OpCode::ParasolidBRep,
        GeometricPrimitive::TextString(_) => OpCode::TextString,
    }
}

fn invalid(what: &str) -> GeomStreamError {
    GeomStreamError::InvalidGeometry(format!("invalid {what}"))
}
