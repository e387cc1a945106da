//! Stream replay: drive a drawing consumer from an encoded stream
//!
//! [`Replay::draw`] walks the operations in order, keeps the running
//! symbology and entry id, and hands each visible geometry to a
//! [`DrawingConsumer`].

mod engine;

pub use engine::{Replay, ReplayContext};

use std::sync::atomic::{AtomicBool, Ordering};

use crate::geometry::{BRepEntity, BRepType, CurveVector, GeometricPrimitive, ImageGraphic};
use crate::stream::GeometryStreamEntryId;
use crate::symbology::GeometryParams;
use crate::types::{GeometryPartId, Range3d, Transform};

/// Receiver of replayed graphics.
///
/// Only the geometry and capability methods are required; the remaining
/// hooks default to no-ops so simple consumers stay small.
pub trait DrawingConsumer {
    /// Symbology for the geometry that follows, already cooked
    fn activate(&mut self, params: &GeometryParams);

    fn add_geometry(&mut self, geometry: &GeometricPrimitive, filled: bool);

    fn add_brep(&mut self, entity: &BRepEntity);

    fn add_image(&mut self, image: &ImageGraphic, filled: bool);

    fn add_part_instance(&mut self, part_id: GeometryPartId, geometry_to_source: &Transform, params: &GeometryParams);

    /// Whether BReps of this kind are drawn directly. When false the
    /// stream's fallback operations are drawn instead.
    fn can_draw_brep(&self, entity_type: BRepType) -> bool;

    /// Category, sub-category and range culling. Called before any decode.
    fn is_visible(&self, _params: &GeometryParams, _sub_graphic_range: Option<&Range3d>) -> bool {
        true
    }

    /// Open a sub-graphic for the next geometry
    fn create_sub_graphic(&mut self, _range: &Range3d, _params: &GeometryParams) {}

    fn finish_sub_graphic(&mut self) {}

    fn wants_area_patterns(&self) -> bool {
        false
    }

    fn draw_area_pattern(&mut self, _region: &CurveVector, _params: &GeometryParams) {}

    fn wants_line_styles(&self) -> bool {
        false
    }

    /// Draw a curve with a stroked line style applied
    fn draw_styled_curve_vector(&mut self, _curves: &CurveVector, _params: &GeometryParams) {}

    /// Fill visibility for [`FillDisplay::ByView`](crate::symbology::FillDisplay::ByView)
    fn view_fill_enabled(&self) -> bool {
        true
    }

    /// Entry id of the geometry about to be added
    fn set_entry_id(&mut self, _entry_id: &GeometryStreamEntryId) {}
}

/// How a replay ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayStatus {
    Completed,
    /// A stop was requested between entries
    Aborted,
}

/// Stop request shared with another thread.
///
/// Replay polls it between entries.
#[derive(Debug, Default)]
pub struct StopSignal {
    requested: AtomicBool,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.requested.store(true, Ordering::Release);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    pub fn reset(&self) {
        self.requested.store(false, Ordering::Release);
    }
}
