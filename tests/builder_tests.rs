//! Builder scenarios: symbology deltas, ranges, parts and BRep fallbacks

mod common;

use common::builders::{self, FacetingKernel, CATEGORY, OTHER_SUB_CATEGORY, SUB_CATEGORY};
use common::comparison::{assert_range_eq, assert_vec3_eq, encloses, TOL};
use geomstream::stream::EntryIdKind;
use geomstream::{
    BuilderConfiguration, ColorDef, CoordSystem, GeometryBuilder, GeometryCollection, GeometryParams,
    GeometryPartId, HeaderFlags, OpCode, Range3d, Transform, Vector2, Vector3,
};
use proptest::prelude::*;

const PART: GeometryPartId = GeometryPartId::new(0x40);

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_element_box_only_grows(
        segments in proptest::collection::vec(
            (-100.0f64..100.0, -100.0f64..100.0, -100.0f64..100.0, -100.0f64..100.0),
            1..10,
        )
    ) {
        let store = builders::store();
        let mut builder = builders::element_builder(&store);
        let mut previous = Range3d::null();
        for (x0, y0, x1, y1) in segments {
            let start = Vector3::new(x0, y0, 0.0);
            let end = Vector3::new(x1, y1, 0.0);
            builder.append_curve_primitive(&builders::line(start, end), CoordSystem::Local).unwrap();

            let current = builder.placement().unwrap().element_box;
            prop_assert!(encloses(&current, &previous));
            prop_assert!(current.contains_point(start) && current.contains_point(end));
            previous = current;
        }
    }
}

#[test]
fn test_only_symbology_changes_are_written() {
    common::init_tracing();
    let store = builders::store();
    let mut builder = builders::element_builder(&store);
    let base = GeometryParams::new(CATEGORY, SUB_CATEGORY);
    let mut heavy = base.clone();
    heavy.set_weight(9);
    let other = GeometryParams::new(CATEGORY, OTHER_SUB_CATEGORY);

    for (i, params) in [&base, &base, &heavy, &other].into_iter().enumerate() {
        builder.append_params(params).unwrap();
        let x = i as f64;
        builder
            .append_curve_primitive(&builders::line(Vector3::new(x, 0.0, 0.0), Vector3::new(x, 1.0, 0.0)), CoordSystem::Local)
            .unwrap();
    }
    let (stream, placement) = builder.finish_element().unwrap();
    assert_eq!(common::count_opcode(stream.as_bytes(), OpCode::BasicSymbology), 3);

    let collection =
        GeometryCollection::for_element(stream.as_bytes(), CATEGORY, placement.to_transform()).with_resolver(&store);
    let entries: Vec<_> = collection.iter().collect();
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[1].geometry_params().weight(), 2);
    assert_eq!(entries[2].geometry_params().sub_category_id(), SUB_CATEGORY);
    assert_eq!(entries[2].geometry_params().weight(), 9);
    assert_eq!(entries[3].geometry_params().sub_category_id(), OTHER_SUB_CATEGORY);
    assert_eq!(entries[3].geometry_params().weight(), 5);
    assert_eq!(entries[3].geometry_params().line_color(), ColorDef::BLUE);
}

#[test]
fn test_part_geometry_inherits_instance_symbology() {
    let mut store = builders::store();
    let mut part = GeometryBuilder::create_part(true, BuilderConfiguration::default()).unwrap();
    part.append_curve_vector(&builders::square(0.0, 0.0, 1.0), CoordSystem::Local)
        .unwrap();
    let (part_stream, part_range) = part.finish_part().unwrap();
    store.insert_part(PART, part_stream, part_range);

    let mut element = builders::element_builder(&store);
    let mut params = GeometryParams::new(CATEGORY, SUB_CATEGORY);
    params.set_line_color(ColorDef::GREEN);
    element.append_params(&params).unwrap();
    element
        .append_part(PART, &Transform::from_translation(Vector3::new(3.0, 0.0, 0.0)))
        .unwrap();
    let (stream, placement) = element.finish_element().unwrap();
    assert_range_eq(
        &placement.element_box,
        &Range3d::new(Vector3::new(3.0, 0.0, 0.0), Vector3::new(4.0, 1.0, 0.0)),
        TOL,
    );

    let collection =
        GeometryCollection::for_element(stream.as_bytes(), CATEGORY, placement.to_transform()).with_resolver(&store);
    let instance = collection.iter().next().unwrap();
    assert!(instance.is_part_instance());
    assert_eq!(instance.geometry_part_id(), PART);
    assert_eq!(collection.geometry_part_ids().len(), 1);

    let nested = GeometryCollection::for_part(&instance, &store).unwrap();
    let entries: Vec<_> = nested.iter().collect();
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.geometry_params().line_color(), ColorDef::GREEN);
    assert_eq!(entry.geometry_params().sub_category_id(), SUB_CATEGORY);
    assert_eq!(entry.entry_id().kind(), EntryIdKind::InPart);
    assert_eq!(entry.entry_id().index(), 1);
    assert_eq!(entry.entry_id().part_index(), 1);
    assert_vec3_eq(&entry.geometry_to_source().translation, &Vector3::new(3.0, 0.0, 0.0), TOL);
}

#[test]
fn test_brep_fallbacks_share_the_entry_id() {
    let store = builders::store();
    let kernel = FacetingKernel;
    let mut builder = builders::element_builder(&store).with_kernel(&kernel);
    builder.append_brep(&builders::two_face_solid(), CoordSystem::Local).unwrap();
    builder
        .append_curve_primitive(&builders::line(Vector3::ZERO, Vector3::UNIT_X), CoordSystem::Local)
        .unwrap();
    let (stream, placement) = builder.finish_element().unwrap();

    let ops = common::opcodes(stream.as_bytes());
    assert_eq!(ops[0], OpCode::ParasolidBRep);
    assert_eq!(common::count_opcode(stream.as_bytes(), OpCode::BRepPolyface), 2);
    assert_eq!(common::count_opcode(stream.as_bytes(), OpCode::Polyface), 0);
    // per-face symbology leaves the stream appearance dirty
    assert_eq!(ops[ops.len() - 2..], [OpCode::BasicSymbology, OpCode::PointPrimitive]);

    let collection = GeometryCollection::for_element(stream.as_bytes(), CATEGORY, placement.to_transform());
    let ids: Vec<_> = collection
        .iter()
        .map(|entry| (entry.opcode(), entry.is_brep_fallback(), entry.entry_id().index()))
        .collect();
    assert_eq!(
        ids,
        vec![
            (OpCode::ParasolidBRep, false, 1),
            (OpCode::BRepPolyface, true, 1),
            (OpCode::BRepPolyface, true, 1),
            (OpCode::PointPrimitive, false, 2),
        ]
    );
}

#[test]
fn test_brep_without_kernel_writes_meshes() {
    let store = builders::store();
    let mut builder = builders::element_builder(&store);
    builder.append_brep(&builders::two_face_solid(), CoordSystem::Local).unwrap();
    let (stream, _) = builder.finish_element().unwrap();

    assert_eq!(common::count_opcode(stream.as_bytes(), OpCode::ParasolidBRep), 0);
    assert_eq!(common::count_opcode(stream.as_bytes(), OpCode::Polyface), 2);
    assert_eq!(common::count_opcode(stream.as_bytes(), OpCode::Material), 1);
}

#[test]
fn test_create_geometry_part_from_element_stream() {
    let store = builders::store();
    let config = BuilderConfiguration {
        header_flags: Some(HeaderFlags::NONE),
        ..Default::default()
    };
    let mut builder = GeometryBuilder::create_3d_with_placement(CATEGORY, Vector3::ZERO, Default::default(), config)
        .unwrap()
        .with_resolver(&store);
    builder.set_append_as_sub_graphics(true);
    builder.append_params(&GeometryParams::new(CATEGORY, SUB_CATEGORY)).unwrap();
    builder
        .append_curve_vector(&builders::square(0.0, 0.0, 1.0), CoordSystem::Local)
        .unwrap();
    builder.append_sub_category(OTHER_SUB_CATEGORY).unwrap();
    builder
        .append_curve_primitive(&builders::line(Vector3::ZERO, Vector3::UNIT_Z), CoordSystem::Local)
        .unwrap();
    let (element, _) = builder.finish_element().unwrap();
    assert_eq!(common::count_opcode(element.as_bytes(), OpCode::SubGraphicRange), 2);

    let (part, params) = GeometryBuilder::create_geometry_part(element.as_bytes(), false).unwrap();
    assert_eq!(params.unwrap().sub_category_id(), SUB_CATEGORY);
    assert_eq!(
        common::opcodes(part.as_bytes()),
        vec![OpCode::PointPrimitive, OpCode::PointPrimitive]
    );

    let (bare, params) = GeometryBuilder::create_geometry_part(element.as_bytes(), true).unwrap();
    assert!(params.is_none());
    assert_eq!(bare, part);
}

#[test]
fn test_2d_builder_flattens_the_box() -> anyhow::Result<()> {
    let mut builder = GeometryBuilder::create_2d_with_placement(
        CATEGORY,
        Vector2::new(1.0, 1.0),
        0.0,
        BuilderConfiguration::default(),
    )?;
    builder.append_curve_primitive(
        &builders::line(Vector3::ZERO, Vector3::new(2.0, 3.0, 0.0)),
        CoordSystem::Local,
    )?;
    let (stream, placement) = builder.finish_element()?;

    assert_eq!(common::opcodes(stream.as_bytes()), vec![OpCode::PointPrimitive2d]);
    assert_eq!(placement.element_box.low.z, 0.0);
    assert_eq!(placement.element_box.high.z, 0.0);
    assert_eq!(placement.element_box.high.y, 3.0);
    Ok(())
}
