//! Semantic iteration over a geometry stream
//!
//! [`GeometryCollection`] layers running symbology, the active sub-graphic
//! range, the active part instance and the entry id on top of the raw
//! [`Collection`] scan. Each step consumes any number of symbology
//! operations and yields one [`GeometryEntry`].
//!
//! Part instances are yielded as entries of their own. Their geometry is
//! reached through [`GeometryCollection::for_part`], which iterates the
//! part's stream starting from the instance's state.

use std::cell::OnceCell;

use ahash::RandomState;
use indexmap::IndexSet;
use tracing::debug;

use crate::geometry::{BRepType, GeometricPrimitive};
use crate::store::{GeometrySource, SymbologyResolver};
use crate::stream::{
    CompactBoundary, Collection, GeometryStreamEntryId, HeaderFlags, OpCode, Operation, OperationIter, Reader,
};
use crate::symbology::GeometryParams;
use crate::types::{CategoryId, GeometryPartId, Range3d, Transform};

/// What kind of entry an operation produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryType {
    GeometryPart,
    CurvePrimitive,
    CurveVector,
    SolidPrimitive,
    BsplineSurface,
    Polyface,
    BRepEntity,
    TextString,
    Image,
}

/// Running state shared by consecutive entries
#[derive(Debug, Clone, Default)]
struct IterationState {
    params: GeometryParams,
    entry_id: GeometryStreamEntryId,
    source_to_world: Transform,
    geometry_to_source: Transform,
    local_range: Option<Range3d>,
}

/// Restartable semantic view over an encoded stream
#[derive(Clone)]
pub struct GeometryCollection<'a> {
    data: &'a [u8],
    resolver: Option<&'a dyn SymbologyResolver>,
    state: IterationState,
}

impl std::fmt::Debug for GeometryCollection<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeometryCollection")
            .field("len", &self.data.len())
            .field("has_resolver", &self.resolver.is_some())
            .field("state", &self.state)
            .finish()
    }
}

impl<'a> GeometryCollection<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        GeometryCollection {
            data,
            resolver: None,
            state: IterationState::default(),
        }
    }

    /// Collection over an element's stream: its category seeds the params
    /// and its placement becomes source-to-world
    pub fn for_element(data: &'a [u8], category_id: CategoryId, source_to_world: Transform) -> Self {
        let mut collection = Self::new(data);
        collection.state.params.set_category_id(category_id);
        collection.state.source_to_world = source_to_world;
        collection
    }

    /// Re-resolve inherited appearance after each symbology change
    pub fn with_resolver(mut self, resolver: &'a dyn SymbologyResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn with_params(mut self, params: GeometryParams) -> Self {
        self.state.params = params;
        self
    }

    pub fn with_source_to_world(mut self, source_to_world: Transform) -> Self {
        self.state.source_to_world = source_to_world;
        self
    }

    /// Iterate the stream of the part that `entry` instances.
    ///
    /// Returns `None` when the entry is not a part instance or the source
    /// has no stream for the part.
    pub fn for_part(entry: &GeometryEntry<'_>, source: &'a dyn GeometrySource) -> Option<Self> {
        let part_id = entry.geometry_part_id();
        if !part_id.is_valid() {
            return None;
        }
        let data = source.part_stream(part_id)?;
        let mut collection = Self::new(data);
        collection.set_nested_iteration_context(entry);
        Some(collection)
    }

    /// Start from the state of a part instance entry: its params, entry
    /// id, source-to-world and instance transform
    pub fn set_nested_iteration_context(&mut self, entry: &GeometryEntry<'_>) {
        self.state.params = entry.state.params.clone();
        self.state.entry_id = entry.state.entry_id;
        self.state.source_to_world = entry.state.source_to_world;
        self.state.geometry_to_source = entry.state.geometry_to_source;
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn iter(&self) -> GeometryIter<'a> {
        GeometryIter {
            ops: Collection::new(self.data).iter(),
            resolver: self.resolver,
            state: self.state.clone(),
            last_was_part: false,
        }
    }

    /// Flags of the leading `Header` operation, if there is one
    pub fn header_flags(&self) -> Option<HeaderFlags> {
        let op = Collection::new(self.data).iter().next()?;
        Reader::new().get_header(&op).ok().map(|(_, flags)| flags)
    }

    /// Whether drawing this stream as a part depends on more than the
    /// instancing element's symbology.
    ///
    /// True for any symbology operation, for curves when the base params
    /// carry a stroked line style, and for BReps with face symbology.
    pub fn has_symbology_changes(&self, base_params: &GeometryParams) -> bool {
        let reader = Reader::new();
        Collection::new(self.data).iter().any(|op| match op.opcode {
            opcode if opcode.is_symbology_op() => true,
            OpCode::PointPrimitive
            | OpCode::PointPrimitive2d
            | OpCode::ArcPrimitive
            | OpCode::CurveVector
            | OpCode::CurvePrimitive => base_params.has_stroked_line_style(),
            OpCode::ParasolidBRep => reader
                .get_brep(&op)
                .map_or(false, |entity| entity.has_face_symbology()),
            _ => false,
        })
    }

    /// Distinct parts instanced by this stream, in first-use order
    pub fn geometry_part_ids(&self) -> IndexSet<GeometryPartId, RandomState> {
        let reader = Reader::new();
        Collection::new(self.data)
            .iter()
            .filter(|op| op.opcode == OpCode::GeometryPartInstance)
            .filter_map(|op| reader.get_part_instance(&op).ok())
            .map(|(part_id, _)| part_id)
            .collect()
    }

    /// Entry id of the last entry starting at or before `offset`, or of
    /// the last entry in the stream when `offset` is `None`.
    ///
    /// This numbers what a builder has written so far, so part entries do
    /// not count geometry inside the part.
    pub fn entry_id_for_offset(&self, offset: Option<usize>) -> GeometryStreamEntryId {
        let mut entry_id = GeometryStreamEntryId::new();
        for (op_offset, op) in Collection::new(self.data).operations_with_offsets() {
            if offset.map_or(false, |limit| op_offset > limit) {
                break;
            }
            if op.opcode == OpCode::GeometryPartInstance {
                let part_id = codec_part_id(&op);
                entry_id.set_active_part(GeometryPartId::INVALID);
                entry_id.increment();
                entry_id.set_active_part(part_id);
            } else if op.is_geometry_op() {
                entry_id.set_active_part(GeometryPartId::INVALID);
                entry_id.increment();
            }
        }
        entry_id
    }
}

fn codec_part_id(op: &Operation<'_>) -> GeometryPartId {
    Reader::new()
        .get_part_instance(op)
        .map(|(part_id, _)| part_id)
        .unwrap_or_default()
}

impl<'a> IntoIterator for &GeometryCollection<'a> {
    type Item = GeometryEntry<'a>;
    type IntoIter = GeometryIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over [`GeometryEntry`] values
pub struct GeometryIter<'a> {
    ops: OperationIter<'a>,
    resolver: Option<&'a dyn SymbologyResolver>,
    state: IterationState,
    last_was_part: bool,
}

impl<'a> GeometryIter<'a> {
    fn resolve_params(&mut self) {
        if let Some(resolver) = self.resolver {
            if self.state.params.category_id().is_valid() {
                resolver.resolve(&mut self.state.params);
            }
        }
    }

    fn entry(&self, op: Operation<'a>) -> GeometryEntry<'a> {
        GeometryEntry {
            op,
            state: self.state.clone(),
            geometry: OnceCell::new(),
        }
    }
}

impl<'a> Iterator for GeometryIter<'a> {
    type Item = GeometryEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let reader = match self.resolver {
            Some(resolver) => Reader::with_resolver(resolver),
            None => Reader::new(),
        };

        loop {
            let Some(op) = self.ops.next() else {
                self.state.entry_id.set_active(false);
                return None;
            };

            // a nested iteration starts inside its part, so only an
            // instance seen by this scan is cleared
            if self.last_was_part {
                self.last_was_part = false;
                self.state.entry_id.set_active_part(GeometryPartId::INVALID);
                self.state.geometry_to_source = Transform::identity();
            }

            match op.opcode {
                OpCode::Header => self.state.entry_id.set_active(true),
                opcode if opcode.is_symbology_op() => {
                    if let Err(err) = reader.get_params(&op, &mut self.state.params) {
                        debug!(target: "geomstream::geometry_collection", opcode = %op.opcode, error = %err, "symbology not applied");
                    }
                }
                OpCode::SubGraphicRange => match reader.get_sub_graphic_range(&op) {
                    Ok(range) => self.state.local_range = Some(range),
                    Err(err) => {
                        debug!(target: "geomstream::geometry_collection", error = %err, "sub-graphic range not applied");
                    }
                },
                OpCode::GeometryPartInstance => {
                    self.state.entry_id.increment();
                    let (part_id, geometry_to_source) = match reader.get_part_instance(&op) {
                        Ok(instance) => instance,
                        Err(err) => {
                            debug!(target: "geomstream::geometry_collection", error = %err, "part instance skipped");
                            continue;
                        }
                    };
                    self.state.entry_id.set_active_part(part_id);
                    self.state.geometry_to_source = geometry_to_source;
                    self.state.local_range = None;
                    self.last_was_part = true;
                    self.resolve_params();
                    return Some(self.entry(op));
                }
                opcode if opcode.is_geometry_op() || opcode.is_brep_fallback() => {
                    // fallbacks share the entry id of the primary before them
                    if !opcode.is_brep_fallback() {
                        self.state.entry_id.increment();
                    }
                    self.resolve_params();
                    return Some(self.entry(op));
                }
                _ => {}
            }
        }
    }
}

/// One geometry entry with a snapshot of the state it was drawn with
pub struct GeometryEntry<'a> {
    op: Operation<'a>,
    state: IterationState,
    geometry: OnceCell<Option<GeometricPrimitive>>,
}

impl std::fmt::Debug for GeometryEntry<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeometryEntry")
            .field("opcode", &self.op.opcode)
            .field("entry_id", &self.state.entry_id)
            .finish()
    }
}

impl<'a> GeometryEntry<'a> {
    pub fn operation(&self) -> &Operation<'a> {
        &self.op
    }

    pub fn opcode(&self) -> OpCode {
        self.op.opcode
    }

    pub fn entry_id(&self) -> GeometryStreamEntryId {
        self.state.entry_id
    }

    /// Part instanced by this entry, or the part being iterated in a
    /// nested collection
    pub fn geometry_part_id(&self) -> GeometryPartId {
        self.state.entry_id.part_id()
    }

    pub fn geometry_params(&self) -> &GeometryParams {
        &self.state.params
    }

    pub fn sub_graphic_local_range(&self) -> Option<&Range3d> {
        self.state.local_range.as_ref()
    }

    pub fn source_to_world(&self) -> Transform {
        self.state.source_to_world
    }

    pub fn geometry_to_source(&self) -> Transform {
        self.state.geometry_to_source
    }

    pub fn geometry_to_world(&self) -> Transform {
        self.state.source_to_world * self.state.geometry_to_source
    }

    pub fn is_part_instance(&self) -> bool {
        self.op.opcode == OpCode::GeometryPartInstance
    }

    pub fn is_brep_fallback(&self) -> bool {
        self.op.opcode.is_brep_fallback()
    }

    /// Decoded geometry, computed on first use.
    ///
    /// `None` for part instances, images and undecodable payloads.
    pub fn geometry(&self) -> Option<&GeometricPrimitive> {
        self.geometry
            .get_or_init(|| match self.op.opcode {
                OpCode::GeometryPartInstance | OpCode::Image => None,
                _ => match Reader::new().get_geometry(&self.op) {
                    Ok(geometry) => Some(geometry),
                    Err(err) => {
                        debug!(target: "geomstream::geometry_collection", opcode = %self.op.opcode, error = %err, "geometry not decoded");
                        None
                    }
                },
            })
            .as_ref()
    }

    /// Take the decoded geometry out of the entry
    pub fn into_geometry(self) -> Option<GeometricPrimitive> {
        let _ = self.geometry();
        self.geometry.into_inner().flatten()
    }

    pub fn entry_type(&self) -> Option<EntryType> {
        let entry_type = match self.op.opcode {
            OpCode::GeometryPartInstance => EntryType::GeometryPart,
            OpCode::PointPrimitive | OpCode::PointPrimitive2d | OpCode::ArcPrimitive => {
                if self.compact_boundary() == Some(CompactBoundary::Closed) {
                    EntryType::CurveVector
                } else {
                    EntryType::CurvePrimitive
                }
            }
            OpCode::CurvePrimitive => EntryType::CurvePrimitive,
            OpCode::CurveVector | OpCode::BRepCurveVector => EntryType::CurveVector,
            OpCode::Polyface | OpCode::BRepPolyface => EntryType::Polyface,
            OpCode::SolidPrimitive => EntryType::SolidPrimitive,
            OpCode::BsplineSurface => EntryType::BsplineSurface,
            OpCode::ParasolidBRep => EntryType::BRepEntity,
            OpCode::TextString => EntryType::TextString,
            OpCode::Image => EntryType::Image,
            _ => return None,
        };
        Some(entry_type)
    }

    fn compact_boundary(&self) -> Option<CompactBoundary> {
        Reader::new().get_compact_boundary(&self.op).ok()
    }

    fn brep_type(&self) -> Option<BRepType> {
        Reader::new().get_brep(&self.op).ok().map(|entity| entity.entity_type)
    }

    /// Open curves and paths
    pub fn is_curve(&self) -> bool {
        match self.op.opcode {
            OpCode::PointPrimitive | OpCode::PointPrimitive2d | OpCode::ArcPrimitive => {
                self.compact_boundary() == Some(CompactBoundary::Open)
            }
            OpCode::CurvePrimitive => true,
            OpCode::CurveVector | OpCode::BRepCurveVector => {
                self.geometry().map_or(false, |geometry| !geometry.is_sheet())
            }
            _ => false,
        }
    }

    /// Regions, open meshes and solids, surfaces and sheet bodies
    pub fn is_surface(&self) -> bool {
        match self.op.opcode {
            OpCode::PointPrimitive | OpCode::PointPrimitive2d | OpCode::ArcPrimitive => {
                self.compact_boundary() == Some(CompactBoundary::Closed)
            }
            OpCode::CurveVector
            | OpCode::BRepCurveVector
            | OpCode::SolidPrimitive
            | OpCode::Polyface
            | OpCode::BRepPolyface => self.geometry().map_or(false, GeometricPrimitive::is_sheet),
            OpCode::BsplineSurface => true,
            OpCode::ParasolidBRep => self.brep_type() == Some(BRepType::Sheet),
            _ => false,
        }
    }

    pub fn is_solid(&self) -> bool {
        match self.op.opcode {
            OpCode::SolidPrimitive | OpCode::Polyface | OpCode::BRepPolyface => {
                self.geometry().map_or(false, GeometricPrimitive::is_solid)
            }
            OpCode::ParasolidBRep => self.brep_type() == Some(BRepType::Solid),
            _ => false,
        }
    }
}
