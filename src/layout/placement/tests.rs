// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sld-designer and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use proptest::prelude::*;
use rstest::{fixture, rstest};

use super::place;
use crate::layout::attributes::{Geometry, Point};
use crate::layout::reference::SclSchemaOrder;
use crate::model::fixtures::{substation, SubstationFixture};
use crate::model::{Element, NodeId, Tag, COORDS_PRIVATE, GROUNDED, LINKED_IEDS_PRIVATE};
use crate::ops::{apply_edits, EditBatch};
use crate::query;

#[fixture]
fn fx() -> SubstationFixture {
    substation()
}

fn apply(fx: &mut SubstationFixture, batch: &EditBatch) {
    let rev = fx.doc.rev();
    apply_edits(&mut fx.doc, rev, batch).expect("apply");
}

fn place_and_apply(fx: &mut SubstationFixture, element: NodeId, parent: NodeId, x: f64, y: f64) {
    let placement = place(&mut fx.doc, &SclSchemaOrder, element, parent, Point::new(x, y));
    apply(fx, &placement.edits);
    if let Some(follow_up) = placement.follow_up {
        let batch = follow_up.wrap_linked_ied(&mut fx.doc, &SclSchemaOrder);
        apply(fx, &batch);
    }
}

fn add_bay(fx: &mut SubstationFixture, name: &str, x: &str, y: &str) -> NodeId {
    let bay = fx.doc.alloc(
        Element::scl("Bay")
            .with_local("name", name)
            .with_geo("x", x)
            .with_geo("y", y)
            .with_geo("w", "4")
            .with_geo("h", "4"),
    );
    let mut batch = EditBatch::new();
    batch.insert(bay, fx.level, None);
    apply(fx, &batch);
    bay
}

fn geometry(fx: &SubstationFixture, node: NodeId) -> Geometry {
    Geometry::of(&fx.doc, node)
}

#[rstest]
fn first_equipment_placement_offsets_the_label(mut fx: SubstationFixture) {
    let equipment = fx
        .doc
        .alloc(Element::scl("ConductingEquipment").with_local("type", "CBR"));

    let bay = fx.bay;
    place_and_apply(&mut fx, equipment, bay, 5.0, 5.0);

    let placed = geometry(&fx, equipment);
    assert_eq!(placed.pos, Point::new(5.0, 5.0));
    assert_eq!(placed.label, Point::new(6.0, 6.0));
    assert_eq!(fx.doc.parent(equipment), Some(fx.bay));
    assert_eq!(fx.doc.name(equipment), Some("C1"));
}

#[rstest]
fn odd_rotation_keeps_the_equipment_label_on_the_symbol(mut fx: SubstationFixture) {
    let equipment = fx
        .doc
        .alloc(Element::scl("ConductingEquipment").with_geo("rot", "1"));

    let bay = fx.bay;
    place_and_apply(&mut fx, equipment, bay, 5.0, 5.0);

    assert_eq!(geometry(&fx, equipment).label, Point::new(5.0, 5.0));
}

#[rstest]
#[case("0", Point::new(5.5, 4.0))]
#[case("1", Point::new(5.5, 4.0))]
#[case("2", Point::new(2.0, 6.0))]
#[case("3", Point::new(2.0, 6.0))]
fn transformer_label_depends_on_rotation(
    mut fx: SubstationFixture,
    #[case] rot: &str,
    #[case] label: Point,
) {
    let transformer = fx.doc.alloc(
        Element::scl("PowerTransformer")
            .with_local("type", "PTR")
            .with_geo("rot", rot),
    );

    let bay = fx.bay;
    place_and_apply(&mut fx, transformer, bay, 4.0, 4.0);

    assert_eq!(geometry(&fx, transformer).label, label);
}

#[rstest]
fn explicit_labels_move_with_the_element(mut fx: SubstationFixture) {
    let equipment = fx.doc.alloc(
        Element::scl("ConductingEquipment")
            .with_geo("x", "1")
            .with_geo("y", "1")
            .with_geo("lx", "3")
            .with_geo("ly", "1"),
    );

    let bay = fx.bay;
    place_and_apply(&mut fx, equipment, bay, 5.0, 4.0);

    assert_eq!(geometry(&fx, equipment).label, Point::new(7.0, 4.0));
}

#[rstest]
fn dragging_in_place_emits_nothing(mut fx: SubstationFixture) {
    let placement = place(
        &mut fx.doc,
        &SclSchemaOrder,
        fx.breaker,
        fx.bay,
        Point::new(3.0, 5.0),
    );
    assert!(placement.edits.is_empty());
    assert!(placement.follow_up.is_none());
}

#[rstest]
fn moving_equipment_drops_its_sole_connection(mut fx: SubstationFixture) {
    let other = add_bay(&mut fx, "B2", "10", "4");

    let disconnector = fx.disconnector;
    place_and_apply(&mut fx, disconnector, other, 11.0, 5.0);

    assert_eq!(fx.doc.connectivity_node("S1/V1/B1/L1"), None);
    assert!(!fx.doc.is_attached(fx.node));
    assert!(!fx.doc.is_attached(fx.disconnector_t1));
    assert!(!fx.doc.is_attached(fx.breaker_t1));
    assert!(fx.doc.is_attached(fx.breaker_t2));
    assert_eq!(fx.doc.parent(fx.disconnector), Some(other));
}

#[rstest]
fn grounded_pins_follow_the_new_bay(mut fx: SubstationFixture) {
    let other = add_bay(&mut fx, "B2", "10", "4");
    let earth = fx.doc.alloc(
        Element::scl("ConductingEquipment")
            .with_local("name", "QC1")
            .with_local("type", "DIS"),
    );
    let pin = fx
        .doc
        .alloc_child(
            earth,
            Element::scl("Terminal")
                .with_local("name", "T1")
                .with_local("cNodeName", GROUNDED)
                .with_local("connectivityNode", "S1/V1/B1/grounded"),
        )
        .expect("pin");
    let bay = fx.bay;
    place_and_apply(&mut fx, earth, bay, 4.0, 7.0);
    let first = fx
        .doc
        .connectivity_node("S1/V1/B1/grounded")
        .expect("grounded node in B1");
    assert_eq!(fx.doc.parent(first), Some(fx.bay));

    place_and_apply(&mut fx, earth, other, 11.0, 5.0);

    let grounded = fx
        .doc
        .connectivity_node("S1/V1/B2/grounded")
        .expect("grounded node in B2");
    assert_eq!(fx.doc.parent(grounded), Some(other));
    assert!(fx.doc.is_attached(pin));
    assert_eq!(fx.doc.attr(pin, "connectivityNode"), Some("S1/V1/B2/grounded"));
    assert_eq!(fx.doc.attr(pin, "bayName"), Some("B2"));
    assert_eq!(fx.doc.attr(pin, "cNodeName"), Some(GROUNDED));
}

#[rstest]
fn grounded_pins_without_a_bay_are_removed(mut fx: SubstationFixture) {
    let transformer = fx.doc.alloc(Element::scl("PowerTransformer").with_local("name", "TR1"));
    let winding = fx
        .doc
        .alloc_child(transformer, Element::scl("TransformerWinding"))
        .expect("winding");
    let neutral = fx
        .doc
        .alloc_child(
            winding,
            Element::scl("NeutralPoint").with_local("cNodeName", GROUNDED),
        )
        .expect("neutral");

    let level = fx.level;
    place_and_apply(&mut fx, transformer, level, 20.0, 10.0);

    assert!(fx.doc.is_attached(transformer));
    assert!(!fx.doc.is_attached(neutral));
}

#[rstest]
fn moving_a_bay_cuts_links_to_outside_nodes(mut fx: SubstationFixture) {
    let bay = fx.bay;
    let level = fx.level;
    place_and_apply(&mut fx, bay, level, 2.0, 8.0);

    assert!(!fx.doc.is_attached(fx.breaker_t2));
    assert!(fx.doc.is_attached(fx.bus_node));
    assert!(fx.doc.is_attached(fx.bus_section));
    assert!(fx.doc.is_attached(fx.node));
    assert!(fx.doc.is_attached(fx.breaker_t1));
    let sections = fx.doc.descendants_tagged(fx.bus_node, &[Tag::Section]);
    assert_eq!(sections, vec![fx.bus_section]);
}

#[rstest]
fn moving_a_bay_translates_everything_inside(mut fx: SubstationFixture) {
    let route = fx.doc.descendants_tagged(fx.node, &[Tag::Vertex]);
    let before = route
        .iter()
        .map(|vertex| geometry(&fx, *vertex).pos)
        .collect::<Vec<_>>();

    let bay = fx.bay;
    let level = fx.level;
    place_and_apply(&mut fx, bay, level, 5.0, 6.0);

    assert_eq!(geometry(&fx, fx.bay).pos, Point::new(5.0, 6.0));
    assert_eq!(geometry(&fx, fx.breaker).pos, Point::new(6.0, 7.0));
    assert_eq!(geometry(&fx, fx.breaker).label, Point::new(6.0, 7.0));
    assert_eq!(geometry(&fx, fx.disconnector).pos, Point::new(6.0, 10.0));
    for (vertex, old) in route.iter().zip(before) {
        assert_eq!(geometry(&fx, *vertex).pos, old.translate(3.0, 2.0));
        assert_eq!(fx.doc.geo(*vertex, "lx"), None);
    }
    assert_eq!(geometry(&fx, fx.bus_bay).pos, Point::new(2.0, 2.0));
}

#[rstest]
fn vertices_ignore_the_requested_parent(mut fx: SubstationFixture) {
    let trailing = query::section_vertices(&fx.doc, fx.bus_section)[1];

    let placement = place(
        &mut fx.doc,
        &SclSchemaOrder,
        trailing,
        fx.bay,
        Point::new(14.5, 2.5),
    );
    apply(&mut fx, &placement.edits);

    assert_eq!(fx.doc.parent(trailing), Some(fx.bus_section));
    assert_eq!(fx.doc.geo(fx.bus_bay, "w"), Some("13"));
    assert_eq!(fx.doc.geo(fx.bus_bay, "h"), Some("1"));
}

#[rstest]
fn placed_ied_names_get_wrapped_and_linked(mut fx: SubstationFixture) {
    let text = fx.doc.alloc(Element::scl("Text"));
    let mut batch = EditBatch::new();
    batch.insert(text, fx.ied, None);
    apply(&mut fx, &batch);
    let ied_name = fx.doc.alloc(Element::sld("IEDName").with_geo("name", "IED1"));

    let bay = fx.bay;
    place_and_apply(&mut fx, ied_name, bay, 4.0, 4.0);

    let holder = fx.doc.parent(ied_name).expect("holder");
    assert_eq!(fx.doc.tag(holder), Tag::Private);
    assert_eq!(fx.doc.attr(holder, "type"), Some(LINKED_IEDS_PRIVATE));
    assert_eq!(fx.doc.parent(holder), Some(fx.bay));
    assert_eq!(geometry(&fx, ied_name).label, Point::new(5.0, 5.0));

    let coords = query::coords_of(&fx.doc, fx.ied).expect("coords created");
    assert_eq!(geometry(&fx, coords).label, Point::new(3.0, 3.0));
    assert!(query::child_private(&fx.doc, fx.ied, COORDS_PRIVATE).is_some());

    let bay = fx.bay;
    place_and_apply(&mut fx, ied_name, bay, 5.0, 4.0);
    assert_eq!(fx.doc.parent(ied_name), Some(holder));
    assert_eq!(geometry(&fx, coords).label, Point::new(4.0, 3.0));

    let other = add_bay(&mut fx, "B2", "10", "4");
    place_and_apply(&mut fx, ied_name, other, 11.0, 5.0);
    let new_holder = fx.doc.parent(ied_name).expect("new holder");
    assert_eq!(fx.doc.parent(new_holder), Some(other));
    assert!(!fx.doc.is_attached(holder));
}

#[rstest]
fn ied_text_placement_creates_the_coords_record(mut fx: SubstationFixture) {
    let text = fx.doc.alloc(Element::scl("Text"));
    let mut batch = EditBatch::new();
    batch.insert(text, fx.ied, None);
    apply(&mut fx, &batch);

    let ied = fx.ied;
    place_and_apply(&mut fx, text, ied, 7.0, 1.0);

    let coords = query::coords_of(&fx.doc, fx.ied).expect("coords");
    assert_eq!(geometry(&fx, coords).pos, Point::new(7.0, 1.0));
    assert_eq!(geometry(&fx, coords).label, Point::new(7.0, 2.0));
    assert_eq!(fx.doc.geo(text, "x"), None);

    let ied = fx.ied;
    place_and_apply(&mut fx, text, ied, 9.0, 4.0);
    assert_eq!(geometry(&fx, coords).pos, Point::new(9.0, 4.0));
    assert_eq!(geometry(&fx, coords).label, Point::new(9.0, 5.0));
}

#[rstest]
fn new_bays_are_renamed_in_schema_order(mut fx: SubstationFixture) {
    let bay = fx.doc.alloc(Element::scl("Bay"));
    let level = fx.level;
    place_and_apply(&mut fx, bay, level, 20.0, 2.0);
    assert_eq!(fx.doc.name(bay), Some("B2"));
    assert_eq!(fx.doc.children(fx.level).last(), Some(&bay));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn placing_reads_back_the_target(x in 0_u8..60, y in 0_u8..60) {
        let mut fx = substation();
        let equipment = fx.doc.alloc(Element::scl("ConductingEquipment"));
        let bay = fx.bay;
        place_and_apply(&mut fx, equipment, bay, f64::from(x), f64::from(y));
        prop_assert_eq!(geometry(&fx, equipment).pos, Point::new(f64::from(x), f64::from(y)));
    }

    #[test]
    fn moving_a_level_translates_descendants_only(dx in 0_u8..20, dy in 0_u8..20) {
        let mut fx = substation();
        let (dx, dy) = (f64::from(dx), f64::from(dy));
        let inside = fx
            .doc
            .descendants_tagged(fx.level, &[Tag::Bay, Tag::ConductingEquipment, Tag::Vertex]);
        let before = inside.iter().map(|node| geometry(&fx, *node)).collect::<Vec<_>>();
        let substation_before = geometry(&fx, fx.substation);

        let level = fx.level;
        let substation = fx.substation;
        place_and_apply(&mut fx, level, substation, 1.0 + dx, 1.0 + dy);

        for (node, old) in inside.iter().zip(before) {
            let now = geometry(&fx, *node);
            prop_assert_eq!(now.pos, old.pos.translate(dx, dy));
            if fx.doc.tag(*node) != Tag::Vertex {
                prop_assert_eq!(now.label, old.label.translate(dx, dy));
            }
        }
        prop_assert_eq!(geometry(&fx, fx.substation), substation_before);
    }

    #[test]
    fn rotating_four_times_is_identity(start in 0_i64..4) {
        use crate::layout::attributes::Rotation;
        let mut rot = Rotation::new(start);
        for _ in 0..4 {
            rot = rot.next();
        }
        prop_assert_eq!(rot, Rotation::new(start));
    }
}
