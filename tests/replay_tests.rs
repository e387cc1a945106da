//! Replay of built streams into a recording consumer

mod common;

use common::builders::{self, FacetingKernel, CATEGORY, SUB_CATEGORY};
use common::{Drawn, RecordingConsumer};
use geomstream::geometry::GeometryType;
use geomstream::replay::{ReplayContext, StopSignal};
use geomstream::stream::EntryIdKind;
use geomstream::symbology::FillDisplay;
use geomstream::{
    BuilderConfiguration, ColorDef, CoordSystem, GeometryBuilder, GeometryParams, GeometryPartId, GeometryStream,
    MemoryStore, Replay, ReplayOptions, ReplayStatus, SubCategoryId, Transform, Vector3,
};

const PART: GeometryPartId = GeometryPartId::new(0x40);

fn store_with_part() -> MemoryStore {
    let mut store = builders::store();
    let mut part = GeometryBuilder::create_part(true, BuilderConfiguration::default()).unwrap();
    part.append_curve_primitive(&builders::line(Vector3::ZERO, Vector3::UNIT_X), CoordSystem::Local)
        .unwrap();
    let (stream, range) = part.finish_part().unwrap();
    store.insert_part(PART, stream, range);
    store
}

/// Filled square, open line, part instance
fn mixed_element(store: &MemoryStore) -> GeometryStream {
    let mut builder = builders::element_builder(store);
    let mut params = GeometryParams::new(CATEGORY, SUB_CATEGORY);
    params.set_fill_display(FillDisplay::Always);
    params.set_fill_color(ColorDef::GREEN);
    builder.append_params(&params).unwrap();
    builder
        .append_curve_vector(&builders::square(0.0, 0.0, 1.0), CoordSystem::Local)
        .unwrap();
    builder
        .append_curve_primitive(&builders::line(Vector3::ZERO, Vector3::UNIT_Y), CoordSystem::Local)
        .unwrap();
    builder
        .append_part(PART, &Transform::from_translation(Vector3::new(0.0, 0.0, 2.0)))
        .unwrap();
    builder.finish_element().unwrap().0
}

fn replay(store: &MemoryStore, stream: &GeometryStream, consumer: &mut RecordingConsumer) -> ReplayStatus {
    let mut context = ReplayContext::new(store, GeometryParams::new(CATEGORY, SubCategoryId::INVALID));
    Replay::draw(consumer, &mut context, stream.as_bytes(), &ReplayOptions::default())
}

#[test]
fn test_entries_drawn_in_order() {
    common::init_tracing();
    let store = store_with_part();
    let stream = mixed_element(&store);

    let mut consumer = RecordingConsumer::new();
    assert_eq!(replay(&store, &stream, &mut consumer), ReplayStatus::Completed);
    assert_eq!(
        consumer.drawn,
        vec![
            Drawn::Geometry {
                entry: (EntryIdKind::Top, 1, 0),
                geometry_type: GeometryType::CurveVector,
                filled: true,
            },
            Drawn::Geometry {
                entry: (EntryIdKind::Top, 2, 0),
                geometry_type: GeometryType::CurvePrimitive,
                filled: false,
            },
            Drawn::PartInstance {
                part_id: PART,
                translation: Vector3::new(0.0, 0.0, 2.0),
            },
        ]
    );

    let first = &consumer.activations[0];
    assert_eq!(first.sub_category_id(), SUB_CATEGORY);
    assert_eq!(first.line_color(), ColorDef::RED);
}

#[test]
fn test_brep_fallbacks_drawn_only_when_needed() {
    let store = builders::store();
    let kernel = FacetingKernel;
    let mut builder = builders::element_builder(&store).with_kernel(&kernel);
    builder.append_brep(&builders::two_face_solid(), CoordSystem::Local).unwrap();
    builder
        .append_curve_primitive(&builders::line(Vector3::ZERO, Vector3::UNIT_X), CoordSystem::Local)
        .unwrap();
    let (stream, _) = builder.finish_element().unwrap();

    let mut direct = RecordingConsumer::drawing_breps();
    replay(&store, &stream, &mut direct);
    assert_eq!(direct.entry_indices(), vec![1, 2]);
    assert!(matches!(direct.drawn[0], Drawn::BRep { .. }));

    let mut meshes = RecordingConsumer::new();
    replay(&store, &stream, &mut meshes);
    assert_eq!(meshes.entry_indices(), vec![1, 1, 2]);
    assert!(meshes.drawn[..2].iter().all(|d| matches!(
        d,
        Drawn::Geometry {
            geometry_type: GeometryType::Polyface,
            ..
        }
    )));

    let mut forced = RecordingConsumer::drawing_breps();
    let mut context = ReplayContext::new(&store, GeometryParams::new(CATEGORY, SubCategoryId::INVALID));
    let options = ReplayOptions {
        brep_fallbacks_only: true,
        ..Default::default()
    };
    Replay::draw(&mut forced, &mut context, stream.as_bytes(), &options);
    assert_eq!(forced.entry_indices(), vec![1, 1, 2]);
}

#[test]
fn test_sub_graphics_wrap_each_entry() {
    let store = builders::store();
    let mut builder = builders::element_builder(&store);
    builder.set_append_as_sub_graphics(true);
    builder
        .append_curve_primitive(&builders::line(Vector3::ZERO, Vector3::UNIT_X), CoordSystem::Local)
        .unwrap();
    builder
        .append_curve_primitive(&builders::line(Vector3::ZERO, Vector3::UNIT_Y), CoordSystem::Local)
        .unwrap();
    let (stream, _) = builder.finish_element().unwrap();

    let mut consumer = RecordingConsumer::new();
    replay(&store, &stream, &mut consumer);
    let sub_graphics = consumer
        .drawn
        .iter()
        .filter(|d| matches!(d, Drawn::SubGraphic(_)))
        .count();
    assert_eq!(sub_graphics, 2);
    assert_eq!(consumer.open_sub_graphics, 0);
    assert_eq!(consumer.entry_indices(), vec![1, 2]);

    let mut flat = RecordingConsumer::new();
    let mut context = ReplayContext::new(&store, GeometryParams::new(CATEGORY, SubCategoryId::INVALID));
    let options = ReplayOptions {
        honor_sub_graphic_ranges: false,
        ..Default::default()
    };
    Replay::draw(&mut flat, &mut context, stream.as_bytes(), &options);
    assert!(flat.drawn.iter().all(|d| !matches!(d, Drawn::SubGraphic(_))));
    assert_eq!(flat.entry_indices(), vec![1, 2]);
}

#[test]
fn test_stop_signal_aborts_between_entries() {
    let store = store_with_part();
    let stream = mixed_element(&store);
    let stop = StopSignal::new();
    stop.request_stop();

    let mut consumer = RecordingConsumer::new();
    let mut context =
        ReplayContext::new(&store, GeometryParams::new(CATEGORY, SubCategoryId::INVALID)).with_stop_signal(&stop);
    let status = Replay::draw(&mut consumer, &mut context, stream.as_bytes(), &ReplayOptions::default());
    assert_eq!(status, ReplayStatus::Aborted);
    assert!(consumer.drawn.is_empty());
}
