//! Entry identifiers for geometry within an element stream

use std::fmt;

use crate::types::GeometryPartId;

/// Whether an entry sits in the element's own stream or inside a part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EntryIdKind {
    #[default]
    Top,
    InPart,
}

/// Position of a geometry entry.
///
/// `index` counts top-level geometry, `part_index` counts geometry within
/// the active part. Both are 1-based once incremented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GeometryStreamEntryId {
    active: bool,
    kind: EntryIdKind,
    index: u16,
    part_id: GeometryPartId,
    part_index: u16,
}

impl GeometryStreamEntryId {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(&self) -> EntryIdKind {
        self.kind
    }

    pub fn index(&self) -> u16 {
        self.index
    }

    pub fn part_id(&self) -> GeometryPartId {
        self.part_id
    }

    pub fn part_index(&self) -> u16 {
        self.part_index
    }

    pub fn is_valid(&self) -> bool {
        self.index != 0 || self.part_index != 0
    }

    /// Whether a stream header has been seen by the scan that owns this id
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Back to the unnumbered top-level state
    pub fn init(&mut self) {
        *self = Self::default();
    }

    pub fn increment(&mut self) {
        if self.part_id.is_valid() {
            self.part_index = self.part_index.wrapping_add(1);
        } else {
            self.index = self.index.wrapping_add(1);
        }
    }

    /// Enter (or, with the invalid id, leave) a part's numbering
    pub fn set_active_part(&mut self, part_id: GeometryPartId) {
        self.part_id = part_id;
        self.part_index = 0;
        self.kind = if part_id.is_valid() {
            EntryIdKind::InPart
        } else {
            EntryIdKind::Top
        };
    }
}

impl fmt::Display for GeometryStreamEntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            EntryIdKind::Top => write!(f, "#{}", self.index),
            EntryIdKind::InPart => write!(f, "#{}/{}#{}", self.index, self.part_id, self.part_index),
        }
    }
}
