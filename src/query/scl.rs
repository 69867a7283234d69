// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sld-designer and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::{
    ContainerNames, Document, NodeId, Tag, COORDS_PRIVATE, GROUNDED, LAYOUT_PRIVATE,
};

/// Resolves `/`-joined `name` attributes below the root, e.g. `S1/V1/B1/QA1`.
///
/// Only named elements take part; at each level the first child with the segment's name wins.
pub fn find_by_name_path(doc: &Document, path: &str) -> Option<NodeId> {
    let mut current = doc.root();
    for segment in path.split('/').filter(|segment| !segment.is_empty()) {
        current = doc
            .child_elements(current)
            .find(|child| doc.name(*child) == Some(segment))?;
    }
    (current != doc.root()).then_some(current)
}

/// Direct `Private` child of `parent` with the given `type`.
pub fn child_private(doc: &Document, parent: NodeId, private_type: &str) -> Option<NodeId> {
    doc.child_elements(parent).find(|child| {
        doc.tag(*child) == Tag::Private && doc.attr(*child, "type") == Some(private_type)
    })
}

/// Routing container of a ConnectivityNode.
pub fn layout_private(doc: &Document, cnode: NodeId) -> Option<NodeId> {
    child_private(doc, cnode, LAYOUT_PRIVATE)
}

/// Top-level `IED` with the given name.
pub fn ied_by_name(doc: &Document, name: &str) -> Option<NodeId> {
    doc.child_elements(doc.root())
        .find(|child| doc.tag(*child) == Tag::Ied && doc.name(*child) == Some(name))
}

pub fn ied_text(doc: &Document, ied: NodeId) -> Option<NodeId> {
    doc.child_elements(ied)
        .find(|child| doc.tag(*child) == Tag::Text)
}

/// `Coords` record inside the IED's `OpenSCD-Coords` Private.
pub fn coords_of(doc: &Document, ied: NodeId) -> Option<NodeId> {
    let private = child_private(doc, ied, COORDS_PRIVATE)?;
    doc.descendants(private)
        .into_iter()
        .find(|node| doc.tag(*node) == Tag::Coords)
}

pub fn is_bus_section(doc: &Document, section: NodeId) -> bool {
    doc.tag(section) == Tag::Section
        && matches!(doc.attr(section, "bus"), Some("true") | Some("1"))
}

/// Bus-flagged Sections anywhere inside `bay`, in document order.
pub fn bus_sections(doc: &Document, bay: NodeId) -> Vec<NodeId> {
    doc.descendants(bay)
        .into_iter()
        .filter(|node| is_bus_section(doc, *node))
        .collect()
}

pub fn is_bus_bar(doc: &Document, bay: NodeId) -> bool {
    doc.tag(bay) == Tag::Bay
        && doc
            .descendants(bay)
            .into_iter()
            .any(|node| is_bus_section(doc, node))
}

pub fn section_vertices(doc: &Document, section: NodeId) -> Vec<NodeId> {
    doc.child_elements(section)
        .filter(|child| doc.tag(*child) == Tag::Vertex)
        .collect()
}

pub fn is_grounded(doc: &Document, terminal: NodeId) -> bool {
    doc.attr(terminal, "cNodeName") == Some(GROUNDED)
}

fn is_path_container(tag: Tag) -> bool {
    matches!(tag, Tag::Substation | Tag::VoltageLevel | Tag::Bay)
}

/// Names of the Substation/VoltageLevel/Bay ancestors-or-self of `node`, outermost first, with
/// `rest` appended: the pathName a ConnectivityNode named `rest` would get under `node`.
pub fn element_path(doc: &Document, node: NodeId, rest: &str) -> String {
    let mut segments = std::iter::once(node)
        .chain(doc.ancestors(node))
        .filter(|candidate| is_path_container(doc.tag(*candidate)))
        .map(|candidate| doc.name(candidate).unwrap_or_default())
        .collect::<Vec<_>>();
    segments.reverse();
    if !rest.is_empty() {
        segments.push(rest);
    }
    segments.join("/")
}

/// Names of the enclosing Substation, VoltageLevel and Bay of `node` (itself included).
pub fn containers_of(doc: &Document, node: NodeId) -> ContainerNames {
    let name_of = |tag| {
        doc.closest(node, tag)
            .and_then(|container| doc.name(container))
            .map(smol_str::SmolStr::new)
    };
    ContainerNames {
        substation: name_of(Tag::Substation),
        voltage_level: name_of(Tag::VoltageLevel),
        bay: name_of(Tag::Bay),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{
        bus_sections, element_path, find_by_name_path, ied_by_name, is_bus_bar,
        section_vertices,
    };
    use crate::model::fixtures::substation;

    #[rstest]
    #[case("S1/V1/B1/QA1", true)]
    #[case("S1/V1/B1", true)]
    #[case("S1/V9", false)]
    #[case("", false)]
    fn name_paths_resolve_from_root(#[case] path: &str, #[case] found: bool) {
        let fx = substation();
        assert_eq!(find_by_name_path(&fx.doc, path).is_some(), found);
    }

    #[test]
    fn element_path_skips_non_containers() {
        let fx = substation();
        assert_eq!(element_path(&fx.doc, fx.bay, "grounded"), "S1/V1/B1/grounded");
        assert_eq!(element_path(&fx.doc, fx.breaker, ""), "S1/V1/B1");
    }

    #[test]
    fn bus_bar_detection_follows_sections() {
        let fx = substation();
        assert!(is_bus_bar(&fx.doc, fx.bus_bay));
        assert!(!is_bus_bar(&fx.doc, fx.bay));
        assert_eq!(bus_sections(&fx.doc, fx.bus_bay), vec![fx.bus_section]);
        assert_eq!(section_vertices(&fx.doc, fx.bus_section).len(), 2);
    }

    #[test]
    fn ieds_are_found_by_name() {
        let fx = substation();
        assert_eq!(ied_by_name(&fx.doc, "IED1"), Some(fx.ied));
        assert_eq!(ied_by_name(&fx.doc, "IED2"), None);
    }
}
