//! Shared test utilities for geomstream integration tests.
//!
//! Stream inspection helpers and a recording [`DrawingConsumer`] that all
//! test crates import via `mod common;`.

#![allow(dead_code)]

pub mod builders;
pub mod comparison;

use geomstream::geometry::{BRepEntity, BRepType, GeometricPrimitive, GeometryType, ImageGraphic};
use geomstream::stream::EntryIdKind;
use geomstream::symbology::GeometryParams;
use geomstream::{Collection, DrawingConsumer, GeometryPartId, GeometryStreamEntryId, OpCode, Range3d, Transform};

// ===========================================================================
// Logging
// ===========================================================================

/// Route `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

// ===========================================================================
// Stream inspection
// ===========================================================================

/// Opcodes of every operation, in stream order.
pub fn opcodes(data: &[u8]) -> Vec<OpCode> {
    Collection::new(data).iter().map(|op| op.opcode).collect()
}

/// Number of operations with `opcode`.
pub fn count_opcode(data: &[u8], opcode: OpCode) -> usize {
    Collection::new(data).iter().filter(|op| op.opcode == opcode).count()
}

// ===========================================================================
// Recording consumer
// ===========================================================================

/// One call the replay engine made on the consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum Drawn {
    Geometry {
        entry: (EntryIdKind, u16, u16),
        geometry_type: GeometryType,
        filled: bool,
    },
    BRep {
        entry: (EntryIdKind, u16, u16),
    },
    Image {
        filled: bool,
    },
    PartInstance {
        part_id: GeometryPartId,
        translation: geomstream::Vector3,
    },
    SubGraphic(Range3d),
}

/// Consumer that records what it was asked to draw.
#[derive(Debug, Default)]
pub struct RecordingConsumer {
    pub drawn: Vec<Drawn>,
    pub activations: Vec<GeometryParams>,
    pub draws_breps: bool,
    pub open_sub_graphics: usize,
    entry_id: GeometryStreamEntryId,
}

impl RecordingConsumer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumer that draws BRep entities directly instead of their fallbacks.
    pub fn drawing_breps() -> Self {
        RecordingConsumer {
            draws_breps: true,
            ..Self::default()
        }
    }

    fn entry(&self) -> (EntryIdKind, u16, u16) {
        (self.entry_id.kind(), self.entry_id.index(), self.entry_id.part_index())
    }

    /// Top-level entry indices of every geometry drawn, in order.
    pub fn entry_indices(&self) -> Vec<u16> {
        self.drawn
            .iter()
            .filter_map(|d| match d {
                Drawn::Geometry { entry, .. } | Drawn::BRep { entry } => Some(entry.1),
                _ => None,
            })
            .collect()
    }
}

impl DrawingConsumer for RecordingConsumer {
    fn activate(&mut self, params: &GeometryParams) {
        self.activations.push(params.clone());
    }

    fn add_geometry(&mut self, geometry: &GeometricPrimitive, filled: bool) {
        self.drawn.push(Drawn::Geometry {
            entry: self.entry(),
            geometry_type: geometry.geometry_type(),
            filled,
        });
    }

    fn add_brep(&mut self, _entity: &BRepEntity) {
        self.drawn.push(Drawn::BRep { entry: self.entry() });
    }

    fn add_image(&mut self, _image: &ImageGraphic, filled: bool) {
        self.drawn.push(Drawn::Image { filled });
    }

    fn add_part_instance(&mut self, part_id: GeometryPartId, geometry_to_source: &Transform, _params: &GeometryParams) {
        self.drawn.push(Drawn::PartInstance {
            part_id,
            translation: geometry_to_source.translation,
        });
    }

    fn can_draw_brep(&self, _entity_type: BRepType) -> bool {
        self.draws_breps
    }

    fn create_sub_graphic(&mut self, range: &Range3d, _params: &GeometryParams) {
        self.open_sub_graphics += 1;
        self.drawn.push(Drawn::SubGraphic(*range));
    }

    fn finish_sub_graphic(&mut self) {
        self.open_sub_graphics -= 1;
    }

    fn set_entry_id(&mut self, entry_id: &GeometryStreamEntryId) {
        self.entry_id = *entry_id;
    }
}
