use tracing::{trace, warn};

use super::{DrawingConsumer, ReplayStatus, StopSignal};
use crate::config::ReplayOptions;
use crate::geometry::{BoundaryType, CurvePrimitiveType, CurveVector, GeometricPrimitive};
use crate::store::SymbologyResolver;
use crate::stream::{Collection, GeometryStreamEntryId, OpCode, Operation, Reader};
use crate::symbology::GeometryParams;
use crate::types::{GeometryPartId, Range3d};

/// State carried into and out of a replay.
///
/// `params` starts as the element's symbology (usually just its category)
/// and holds the last symbology seen when the replay returns.
pub struct ReplayContext<'c> {
    pub resolver: &'c dyn SymbologyResolver,
    pub params: GeometryParams,
    pub entry_id: GeometryStreamEntryId,
    pub stop: Option<&'c StopSignal>,
}

impl<'c> ReplayContext<'c> {
    pub fn new(resolver: &'c dyn SymbologyResolver, params: GeometryParams) -> Self {
        ReplayContext {
            resolver,
            params,
            entry_id: GeometryStreamEntryId::new(),
            stop: None,
        }
    }

    pub fn with_stop_signal(mut self, stop: &'c StopSignal) -> Self {
        self.stop = Some(stop);
        self
    }

    fn stop_requested(&self) -> bool {
        self.stop.map_or(false, StopSignal::is_stop_requested)
    }
}

/// Replays an encoded stream into a [`DrawingConsumer`]
pub struct Replay;

impl Replay {
    /// Draw every visible entry of `stream` in order.
    ///
    /// Operations that fail to decode are logged and skipped. The stop
    /// signal is polled after each operation.
    pub fn draw(
        consumer: &mut dyn DrawingConsumer,
        context: &mut ReplayContext<'_>,
        stream: &[u8],
        options: &ReplayOptions,
    ) -> ReplayStatus {
        let reader = Reader::with_resolver(context.resolver);
        let mut pass = Pass {
            consumer,
            context,
            reader,
            params_changed: true,
            sub_graphic_range: None,
            skip_brep_fallbacks: false,
        };

        let mut status = ReplayStatus::Completed;
        for op in Collection::new(stream) {
            trace!(target: "geomstream::replay", opcode = %op.opcode, len = op.data.len(), "replay operation");

            if op.opcode == OpCode::SubGraphicRange {
                if options.honor_sub_graphic_ranges && pass.open_sub_graphic(&op) {
                    // the next operation is drawn into the sub-graphic
                    continue;
                }
            } else {
                pass.replay(&op, options);
            }

            if pass.sub_graphic_range.take().is_some() {
                pass.consumer.finish_sub_graphic();
            }

            if pass.context.stop_requested() {
                status = ReplayStatus::Aborted;
                break;
            }
        }

        if pass.sub_graphic_range.take().is_some() {
            pass.consumer.finish_sub_graphic();
        }
        pass.context.entry_id.set_active(false);
        status
    }
}

struct Pass<'p, 'c> {
    consumer: &'p mut dyn DrawingConsumer,
    context: &'p mut ReplayContext<'c>,
    reader: Reader<'c>,
    params_changed: bool,
    sub_graphic_range: Option<Range3d>,
    /// Set after a `ParasolidBRep` that was drawn directly or culled
    skip_brep_fallbacks: bool,
}

impl Pass<'_, '_> {
    fn replay(&mut self, op: &Operation<'_>, options: &ReplayOptions) {
        match op.opcode {
            OpCode::Header => {
                self.context.entry_id.set_active(true);
                self.consumer.set_entry_id(&self.context.entry_id);
            }
            opcode if opcode.is_symbology_op() => match self.reader.get_params(op, &mut self.context.params) {
                Ok(changed) => self.params_changed |= changed,
                Err(err) => self.skip(op, &err),
            },
            OpCode::GeometryPartInstance => {
                self.skip_brep_fallbacks = false;
                self.next_entry();
                let (part_id, geometry_to_source) = match self.reader.get_part_instance(op) {
                    Ok(instance) => instance,
                    Err(err) => return self.skip(op, &err),
                };
                self.context.entry_id.set_active_part(part_id);
                self.consumer.set_entry_id(&self.context.entry_id);
                self.cook();
                self.consumer
                    .add_part_instance(part_id, &geometry_to_source, &self.context.params);
                self.context.entry_id.set_active_part(GeometryPartId::INVALID);
                self.consumer.set_entry_id(&self.context.entry_id);
            }
            OpCode::ParasolidBRep => {
                self.next_entry();
                // culled entities skip their fallbacks too
                self.skip_brep_fallbacks = true;
                if !self.is_visible() {
                    return;
                }
                let entity = match self.reader.get_brep(op) {
                    Ok(entity) => entity,
                    Err(err) => return self.skip(op, &err),
                };
                if options.brep_fallbacks_only || !self.consumer.can_draw_brep(entity.entity_type) {
                    self.skip_brep_fallbacks = false;
                    return;
                }
                self.cook();
                self.consumer.add_brep(&entity);
            }
            OpCode::BRepPolyface | OpCode::BRepCurveVector => {
                // fallbacks share the entry id of their primary
                if self.skip_brep_fallbacks || !self.is_visible() {
                    return;
                }
                self.draw_geometry(op);
            }
            OpCode::Image => {
                self.skip_brep_fallbacks = false;
                self.next_entry();
                if !self.is_visible() {
                    return;
                }
                let image = match self.reader.get_image(op) {
                    Ok(image) => image,
                    Err(err) => return self.skip(op, &err),
                };
                self.cook();
                let filled = self.fill_visible();
                self.consumer.add_image(&image, filled);
            }
            opcode if opcode.is_geometry_op() => {
                self.skip_brep_fallbacks = false;
                self.next_entry();
                if self.is_visible() {
                    self.draw_geometry(op);
                }
            }
            _ => {}
        }
    }

    /// Returns false when the range could not be decoded
    fn open_sub_graphic(&mut self, op: &Operation<'_>) -> bool {
        let range = match self.reader.get_sub_graphic_range(op) {
            Ok(range) => range,
            Err(err) => {
                self.skip(op, &err);
                return false;
            }
        };
        self.context.resolver.cook(&mut self.context.params);
        self.consumer.create_sub_graphic(&range, &self.context.params);
        self.consumer.activate(&self.context.params);
        self.params_changed = false;
        self.sub_graphic_range = Some(range);
        true
    }

    fn next_entry(&mut self) {
        self.context.entry_id.increment();
        self.consumer.set_entry_id(&self.context.entry_id);
    }

    fn is_visible(&self) -> bool {
        self.consumer
            .is_visible(&self.context.params, self.sub_graphic_range.as_ref())
    }

    fn fill_visible(&self) -> bool {
        self.context
            .params
            .fill_display()
            .is_visible(self.consumer.view_fill_enabled())
    }

    /// Cook when symbology changed since the last activation, otherwise
    /// only resolve so styles and priorities can be tested
    fn cook(&mut self) {
        if self.params_changed {
            self.context.resolver.cook(&mut self.context.params);
            self.consumer.activate(&self.context.params);
            self.params_changed = false;
        } else {
            self.context.resolver.resolve(&mut self.context.params);
        }
    }

    fn skip(&self, op: &Operation<'_>, err: &crate::error::GeomStreamError) {
        warn!(target: "geomstream::replay", opcode = %op.opcode, error = %err, "skipping undecodable operation");
    }

    fn draw_geometry(&mut self, op: &Operation<'_>) {
        let geometry = match self.reader.get_geometry(op) {
            Ok(geometry) => geometry,
            Err(err) => return self.skip(op, &err),
        };
        self.cook();

        let result = match geometry {
            GeometricPrimitive::CurvePrimitive(_) | GeometricPrimitive::CurveVector(_) => self.draw_curves(geometry),
            GeometricPrimitive::Polyface(_) => {
                let filled = self.fill_visible();
                geometry.add_to_graphic(self.consumer, filled)
            }
            _ => geometry.add_to_graphic(self.consumer, false),
        };
        if let Err(err) = result {
            self.skip(op, &err);
        }
    }

    /// Regions draw their pattern first; an invisible-boundary pattern
    /// without visible fill suppresses the boundary itself.
    fn draw_curves(&mut self, geometry: GeometricPrimitive) -> crate::error::Result<()> {
        let params = &self.context.params;
        let fill_visible = self.fill_visible();
        let region = geometry
            .as_curve_vector()
            .map_or(false, CurveVector::is_any_region_type);

        if region {
            if let (Some(pattern), Some(curves)) = (params.pattern(), geometry.as_curve_vector()) {
                if self.consumer.wants_area_patterns() {
                    self.consumer.draw_area_pattern(curves, params);
                }
                if pattern.invisible_boundary && !fill_visible {
                    return Ok(());
                }
            }
        }

        let point_string = match &geometry {
            GeometricPrimitive::CurvePrimitive(curve) => curve.curve_type() == CurvePrimitiveType::PointString,
            GeometricPrimitive::CurveVector(curves) => curves.is_point_string(),
            _ => false,
        };
        if !point_string && self.consumer.wants_line_styles() && params.has_stroked_line_style() {
            let curves = match geometry {
                GeometricPrimitive::CurveVector(curves) => curves,
                GeometricPrimitive::CurvePrimitive(curve) => CurveVector::create(BoundaryType::Open, curve),
                _ => return Ok(()),
            };
            self.consumer.draw_styled_curve_vector(&curves, params);
            return Ok(());
        }

        geometry.add_to_graphic(self.consumer, region && fill_visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{BRepEntity, BRepType, ImageGraphic};
    use crate::store::MemoryStore;
    use crate::stream::{CompactBoundary, Writer};
    use crate::symbology::{FillDisplay, PatternParams};
    use crate::types::{CategoryId, SubCategoryId, Transform, Vector3};

    #[derive(Default)]
    struct Recorder {
        activations: usize,
        geometry: Vec<(OpCode, bool)>,
        patterns: usize,
        sub_graphics: usize,
        finished: usize,
        parts: Vec<GeometryPartId>,
        entry_ids: Vec<GeometryStreamEntryId>,
        hidden: bool,
    }

    impl DrawingConsumer for Recorder {
        fn activate(&mut self, _params: &GeometryParams) {
            self.activations += 1;
        }

        fn add_geometry(&mut self, geometry: &GeometricPrimitive, filled: bool) {
            let opcode = match geometry {
                GeometricPrimitive::Polyface(_) => OpCode::Polyface,
                GeometricPrimitive::CurveVector(_) => OpCode::CurveVector,
                _ => OpCode::CurvePrimitive,
            };
            self.geometry.push((opcode, filled));
        }

        fn add_brep(&mut self, _entity: &BRepEntity) {
            self.geometry.push((OpCode::ParasolidBRep, false));
        }

        fn add_image(&mut self, _image: &ImageGraphic, filled: bool) {
            self.geometry.push((OpCode::Image, filled));
        }

        fn add_part_instance(&mut self, part_id: GeometryPartId, _geometry_to_source: &Transform, _params: &GeometryParams) {
            self.parts.push(part_id);
        }

        fn can_draw_brep(&self, _entity_type: BRepType) -> bool {
            false
        }

        fn is_visible(&self, _params: &GeometryParams, _range: Option<&Range3d>) -> bool {
            !self.hidden
        }

        fn create_sub_graphic(&mut self, _range: &Range3d, _params: &GeometryParams) {
            self.sub_graphics += 1;
        }

        fn finish_sub_graphic(&mut self) {
            self.finished += 1;
        }

        fn wants_area_patterns(&self) -> bool {
            true
        }

        fn draw_area_pattern(&mut self, _region: &CurveVector, _params: &GeometryParams) {
            self.patterns += 1;
        }

        fn set_entry_id(&mut self, entry_id: &GeometryStreamEntryId) {
            self.entry_ids.push(*entry_id);
        }
    }

    fn square() -> Vec<Vector3> {
        vec![
            Vector3::ZERO,
            Vector3::UNIT_X,
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::UNIT_Y,
            Vector3::ZERO,
        ]
    }

    fn base_params() -> GeometryParams {
        GeometryParams::new(CategoryId::new(1), SubCategoryId::new(2))
    }

    #[test]
    fn test_activate_once_per_run() {
        let mut writer = Writer::new(true);
        writer.append_points(&square(), CompactBoundary::Closed).unwrap();
        writer.append_points(&square(), CompactBoundary::Open).unwrap();
        let store = MemoryStore::new();
        let mut context = ReplayContext::new(&store, base_params());
        let mut recorder = Recorder::default();

        let status = Replay::draw(&mut recorder, &mut context, writer.as_bytes(), &ReplayOptions::default());
        assert_eq!(status, ReplayStatus::Completed);
        assert_eq!(recorder.activations, 1);
        assert_eq!(recorder.geometry, vec![(OpCode::CurveVector, false), (OpCode::CurvePrimitive, false)]);
        assert_eq!(context.entry_id.index(), 2);
    }

    #[test]
    fn test_pattern_before_boundary_and_invisible_boundary() {
        let mut params = base_params();
        let mut pattern = PatternParams::hatch(0.1, 0.0);
        pattern.invisible_boundary = true;
        params.set_pattern(Some(pattern));

        let mut writer = Writer::new(true);
        writer.append_params(&params, false).unwrap();
        writer.append_points(&square(), CompactBoundary::Closed).unwrap();

        let store = MemoryStore::new();
        let mut context = ReplayContext::new(&store, base_params());
        let mut recorder = Recorder::default();
        Replay::draw(&mut recorder, &mut context, writer.as_bytes(), &ReplayOptions::default());
        assert_eq!(recorder.patterns, 1);
        assert!(recorder.geometry.is_empty());
    }

    #[test]
    fn test_fill_follows_display() {
        let mut params = base_params();
        params.set_fill_display(FillDisplay::Always);
        let mut writer = Writer::new(true);
        writer.append_params(&params, false).unwrap();
        writer.append_points(&square(), CompactBoundary::Closed).unwrap();

        let store = MemoryStore::new();
        let mut context = ReplayContext::new(&store, base_params());
        let mut recorder = Recorder::default();
        Replay::draw(&mut recorder, &mut context, writer.as_bytes(), &ReplayOptions::default());
        assert_eq!(recorder.geometry, vec![(OpCode::CurveVector, true)]);
    }

    #[test]
    fn test_sub_graphic_wraps_next_operation() {
        let mut writer = Writer::new(true);
        writer
            .append_sub_graphic_range(&Range3d::new(Vector3::ZERO, Vector3::new(1.0, 1.0, 0.0)))
            .unwrap();
        writer.append_points(&square(), CompactBoundary::Open).unwrap();
        writer.append_points(&square(), CompactBoundary::Open).unwrap();

        let store = MemoryStore::new();
        let mut context = ReplayContext::new(&store, base_params());
        let mut recorder = Recorder::default();
        Replay::draw(&mut recorder, &mut context, writer.as_bytes(), &ReplayOptions::default());
        assert_eq!(recorder.sub_graphics, 1);
        assert_eq!(recorder.finished, 1);
        assert_eq!(recorder.geometry.len(), 2);
    }

    #[test]
    fn test_invisible_geometry_still_counts() {
        let mut writer = Writer::new(true);
        writer.append_points(&square(), CompactBoundary::Open).unwrap();
        let store = MemoryStore::new();
        let mut context = ReplayContext::new(&store, base_params());
        let mut recorder = Recorder {
            hidden: true,
            ..Default::default()
        };
        Replay::draw(&mut recorder, &mut context, writer.as_bytes(), &ReplayOptions::default());
        assert!(recorder.geometry.is_empty());
        assert_eq!(context.entry_id.index(), 1);
    }

    #[test]
    fn test_part_instance_entry_id() {
        let mut writer = Writer::new(true);
        writer.append_part_instance(GeometryPartId::new(8), None).unwrap();
        let store = MemoryStore::new();
        let mut context = ReplayContext::new(&store, base_params());
        let mut recorder = Recorder::default();
        Replay::draw(&mut recorder, &mut context, writer.as_bytes(), &ReplayOptions::default());
        assert_eq!(recorder.parts, vec![GeometryPartId::new(8)]);
        assert!(recorder.entry_ids.iter().any(|id| id.part_id() == GeometryPartId::new(8)));
        assert!(!context.entry_id.part_id().is_valid());
    }

    #[test]
    fn test_stop_aborts() {
        let mut writer = Writer::new(true);
        writer.append_points(&square(), CompactBoundary::Open).unwrap();
        writer.append_points(&square(), CompactBoundary::Open).unwrap();
        let store = MemoryStore::new();
        let stop = StopSignal::new();
        stop.request_stop();
        let mut context = ReplayContext::new(&store, base_params()).with_stop_signal(&stop);
        let mut recorder = Recorder::default();
        let status = Replay::draw(&mut recorder, &mut context, writer.as_bytes(), &ReplayOptions::default());
        assert_eq!(status, ReplayStatus::Aborted);
        assert_eq!(recorder.geometry.len(), 1);
    }
}
