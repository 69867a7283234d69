// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sld-designer and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::document::Document;
use super::ids::NodeId;
use super::node::{Element, DEFAULT_SLD_PREFIX, LAYOUT_PRIVATE, SLD_NS};

/// Small placed substation used across unit tests.
///
/// ```text
/// S1 (1,1 50x25)
/// └─ V1 (1,1 40x20)
///    ├─ BB1 (2,2 10x1)   bus bar, node S1/V1/BB1/L
///    └─ B1  (2,4 6x6)
///       ├─ QA1 CBR (3,5)  T1 -> S1/V1/B1/L1, T2 -> S1/V1/BB1/L
///       ├─ QB1 DIS (3,8)  T1 -> S1/V1/B1/L1
///       └─ L1             routed QA1/T1 -> QB1/T1
/// IED1
/// ```
#[derive(Debug, Clone)]
pub(crate) struct SubstationFixture {
    pub(crate) doc: Document,
    pub(crate) substation: NodeId,
    pub(crate) level: NodeId,
    pub(crate) bus_bay: NodeId,
    pub(crate) bus_node: NodeId,
    pub(crate) bus_section: NodeId,
    pub(crate) bay: NodeId,
    pub(crate) breaker: NodeId,
    pub(crate) breaker_t1: NodeId,
    pub(crate) breaker_t2: NodeId,
    pub(crate) disconnector: NodeId,
    pub(crate) disconnector_t1: NodeId,
    pub(crate) node: NodeId,
    pub(crate) ied: NodeId,
}

fn terminal(name: &str, path: &str, uuid: &str) -> Element {
    let segments = path.split('/').collect::<Vec<_>>();
    Element::scl("Terminal")
        .with_local("name", name)
        .with_local("connectivityNode", path)
        .with_local("substationName", segments[0])
        .with_local("voltageLevelName", segments[1])
        .with_local("bayName", segments[2])
        .with_local("cNodeName", segments[3])
        .with_geo("uuid", uuid)
}

fn vertex(x: &str, y: &str) -> Element {
    Element::sld("Vertex").with_geo("x", x).with_geo("y", y)
}

fn placed(local: &str, name: &str, x: &str, y: &str) -> Element {
    Element::scl(local)
        .with_local("name", name)
        .with_geo("x", x)
        .with_geo("y", y)
}

pub(crate) fn substation() -> SubstationFixture {
    let mut doc = Document::new_scl();
    doc.bind_namespace(Some(DEFAULT_SLD_PREFIX), SLD_NS);
    let root = doc.root();

    let substation = doc.alloc(
        placed("Substation", "S1", "1", "1")
            .with_geo("w", "50")
            .with_geo("h", "25"),
    );
    let level = child(
        &mut doc,
        substation,
        placed("VoltageLevel", "V1", "1", "1")
            .with_geo("w", "40")
            .with_geo("h", "20"),
    );

    let bus_bay = child(
        &mut doc,
        level,
        placed("Bay", "BB1", "2", "2").with_geo("w", "10").with_geo("h", "1"),
    );
    let bus_node = child(
        &mut doc,
        bus_bay,
        Element::scl("ConnectivityNode")
            .with_local("name", "L")
            .with_local("pathName", "S1/V1/BB1/L"),
    );
    let bus_layout = child(
        &mut doc,
        bus_node,
        Element::scl("Private").with_local("type", LAYOUT_PRIVATE),
    );
    let bus_section = child(
        &mut doc,
        bus_layout,
        Element::sld("Section").with_local("bus", "true"),
    );
    child(&mut doc, bus_section, vertex("2.5", "2.5"));
    child(&mut doc, bus_section, vertex("11.5", "2.5"));
    let feeder = child(&mut doc, bus_layout, Element::sld("Section"));
    child(&mut doc, feeder, vertex("3.5", "5").with_geo("uuid", "qa1-t2"));
    child(&mut doc, feeder, vertex("3.5", "2.5"));

    let bay = child(
        &mut doc,
        level,
        placed("Bay", "B1", "2", "4").with_geo("w", "6").with_geo("h", "6"),
    );
    let breaker = child(
        &mut doc,
        bay,
        placed("ConductingEquipment", "QA1", "3", "5").with_local("type", "CBR"),
    );
    let breaker_t1 = child(&mut doc, breaker, terminal("T1", "S1/V1/B1/L1", "qa1-t1"));
    let breaker_t2 = child(&mut doc, breaker, terminal("T2", "S1/V1/BB1/L", "qa1-t2"));
    let disconnector = child(
        &mut doc,
        bay,
        placed("ConductingEquipment", "QB1", "3", "8").with_local("type", "DIS"),
    );
    let disconnector_t1 = child(
        &mut doc,
        disconnector,
        terminal("T1", "S1/V1/B1/L1", "qb1-t1"),
    );
    let node = child(
        &mut doc,
        bay,
        Element::scl("ConnectivityNode")
            .with_local("name", "L1")
            .with_local("pathName", "S1/V1/B1/L1"),
    );
    let layout = child(
        &mut doc,
        node,
        Element::scl("Private").with_local("type", LAYOUT_PRIVATE),
    );
    let route = child(&mut doc, layout, Element::sld("Section"));
    child(&mut doc, route, vertex("3.5", "6").with_geo("uuid", "qa1-t1"));
    child(&mut doc, route, vertex("3.5", "8").with_geo("uuid", "qb1-t1"));

    let ied = doc.alloc(Element::scl("IED").with_local("name", "IED1"));

    for top in [substation, ied] {
        doc.append_child(root, top).expect("attach fixture");
    }

    SubstationFixture {
        doc,
        substation,
        level,
        bus_bay,
        bus_node,
        bus_section,
        bay,
        breaker,
        breaker_t1,
        breaker_t2,
        disconnector,
        disconnector_t1,
        node,
        ied,
    }
}

fn child(doc: &mut Document, parent: NodeId, element: Element) -> NodeId {
    doc.alloc_child(parent, element).expect("detached fixture parent")
}
