// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sld-designer and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Connection engine: joins two pins, or a pin and an existing ConnectivityNode, with a routed
//! Section, splicing the destination's routing when the path lands mid-segment.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use smol_str::SmolStr;
use uuid::Uuid;

use super::attributes::{format_coord, Geometry, Point};
use super::reference::ReferenceResolver;
use super::reparent::reparent;
use crate::model::{Document, Element, NodeId, QName, Tag, LAYOUT_PRIVATE};
use crate::ops::EditBatch;
use crate::query;

/// Name given to a freshly created ConnectivityNode before deduplication.
pub const NEW_NODE_NAME: &str = "L1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectRequest {
    pub from: NodeId,
    pub from_terminal: SmolStr,
    pub to: NodeId,
    /// Pin name on `to`; `T1` when the destination needs a pin and none is given.
    #[serde(default)]
    pub to_terminal: Option<SmolStr>,
    pub path: SmallVec<[Point; 8]>,
}

struct Destination {
    cnode: NodeId,
    private: NodeId,
    path_name: String,
    name: String,
}

/// Edits connecting `request.from` to `request.to` along `request.path`.
///
/// Empty for winding-to-winding requests, empty paths, and when neither endpoint lies in a Bay.
pub fn connect<R: ReferenceResolver + ?Sized>(
    doc: &mut Document,
    resolver: &R,
    request: &ConnectRequest,
) -> EditBatch {
    let mut edits = EditBatch::new();
    let ConnectRequest {
        from,
        to,
        path,
        ..
    } = request;
    let (from, to) = (*from, *to);
    if doc.tag(from) == Tag::TransformerWinding && doc.tag(to) == Tag::TransformerWinding {
        debug!(from:?, to:?; "refusing winding-to-winding connection");
        return edits;
    }
    let (Some(first), Some(last)) = (path.first().copied(), path.last().copied()) else {
        return edits;
    };

    let to_node = doc.tag(to) == Tag::ConnectivityNode;
    let Some(destination) = destination(doc, resolver, from, to, &mut edits) else {
        warn!(from:?, to:?; "no enclosing bay for connection");
        return EditBatch::new();
    };

    let from_uuid = Uuid::new_v4().to_string();
    let to_uuid = Uuid::new_v4().to_string();
    let section = doc.alloc(Element::sld("Section"));
    for (index, point) in path.iter().enumerate() {
        let mut vertex = Element::sld("Vertex")
            .with_geo("x", format_coord(point.x))
            .with_geo("y", format_coord(point.y));
        if index == 0 {
            vertex = vertex.with_geo("uuid", from_uuid.as_str());
        } else if index == path.len() - 1 && !to_node {
            vertex = vertex.with_geo("uuid", to_uuid.as_str());
        }
        // `section` is freshly allocated and detached.
        if let Err(error) = doc.alloc_child(section, vertex) {
            warn!(error:?; "failed to build routing section");
            return EditBatch::new();
        }
    }

    let existing_sections = doc.descendants_tagged(destination.private, &[Tag::Section]);
    edits.insert(section, destination.private, None);

    if to_node {
        if let Some((cut, index)) = find_tee(doc, &existing_sections, last) {
            edits.extend(cut_section_at(doc, cut, index, last));
        }
    }

    let from_pin = pin(doc, &request.from_terminal, &destination, &from_uuid);
    let from_pin_tag = pin_tag(&request.from_terminal);
    edits.insert(from_pin, from, resolver.reference(doc, from, from_pin_tag));

    // Windings get a pin too, so both ends reference the same node.
    if matches!(
        doc.tag(to),
        Tag::ConductingEquipment | Tag::TransformerWinding
    ) {
        let to_terminal = request
            .to_terminal
            .clone()
            .unwrap_or_else(|| SmolStr::new_static("T1"));
        let to_pin = pin(doc, &to_terminal, &destination, &to_uuid);
        edits.insert(to_pin, to, resolver.reference(doc, to, pin_tag(&to_terminal)));
    }

    debug!(
        from:?,
        to:?,
        cnode:? = destination.cnode,
        path_name = destination.path_name.as_str(),
        start:% = first,
        edits = edits.len();
        "computed connection"
    );
    edits
}

/// Resolves (or creates) the ConnectivityNode the connection lands on and its routing Private.
fn destination<R: ReferenceResolver + ?Sized>(
    doc: &mut Document,
    resolver: &R,
    from: NodeId,
    to: NodeId,
    edits: &mut EditBatch,
) -> Option<Destination> {
    if doc.tag(to) == Tag::ConnectivityNode {
        let path_name = doc.attr(to, "pathName").unwrap_or_default().to_owned();
        let name = doc.name(to).unwrap_or_default().to_owned();
        let private = match query::layout_private(doc, to) {
            Some(private) => private,
            None => {
                let private = doc.alloc(layout_private_element());
                edits.insert(private, to, resolver.reference(doc, to, "Private"));
                private
            }
        };
        return Some(Destination {
            cnode: to,
            private,
            path_name,
            name,
        });
    }

    let bay = doc
        .closest(from, Tag::Bay)
        .or_else(|| doc.closest(to, Tag::Bay))?;
    let cnode = doc.alloc(Element::scl("ConnectivityNode").with_local("name", NEW_NODE_NAME));
    let private = doc.alloc_child(cnode, layout_private_element()).ok()?;
    let moved = reparent(doc, resolver, cnode, bay);
    let name = moved
        .name
        .map(|name| name.to_string())
        .unwrap_or_else(|| NEW_NODE_NAME.to_owned());
    let path_name = moved.path_name.unwrap_or_default();
    edits.extend(moved.edits);
    Some(Destination {
        cnode,
        private,
        path_name,
        name,
    })
}

fn layout_private_element() -> Element {
    Element::scl("Private").with_local("type", LAYOUT_PRIVATE)
}

/// First segment of `sections` that contains `point`, as (section, index of the segment start).
fn find_tee(doc: &Document, sections: &[NodeId], point: Point) -> Option<(NodeId, usize)> {
    let Point { x, y } = point;
    sections.iter().find_map(|section| {
        let route = query::section_vertices(doc, *section)
            .into_iter()
            .map(|vertex| Geometry::of(doc, vertex).pos)
            .collect::<Vec<_>>();
        route
            .windows(2)
            .position(|segment| {
                let (a, b) = (segment[0], segment[1]);
                let horizontal =
                    a.y == y && y == b.y && ((a.x < x && x < b.x) || (b.x < x && x < a.x));
                let vertical =
                    a.x == x && x == b.x && ((a.y < y && y < b.y) || (b.y < y && y < a.y));
                horizontal || vertical || a == point
            })
            .map(|index| (*section, index))
    })
}

/// Splits `section` at `point`, which lies on the segment starting at vertex `index`.
///
/// The tail from `point` on moves into a new Section inserted right after the original; both
/// Sections end up sharing a vertex at `point`. Empty when `point` is already the first or last
/// vertex.
pub fn cut_section_at(
    doc: &mut Document,
    section: NodeId,
    index: usize,
    point: Point,
) -> EditBatch {
    let mut edits = EditBatch::new();
    let vertices = query::section_vertices(doc, section);
    let Some(split) = vertices.get(index).copied() else {
        return edits;
    };
    let at_point = vertices
        .iter()
        .copied()
        .find(|vertex| Geometry::of(doc, *vertex).pos == point);
    let endpoint = at_point.is_some()
        && (at_point == vertices.first().copied() || at_point == vertices.last().copied());
    if endpoint {
        return edits;
    }
    let Some(parent) = doc.parent(section) else {
        return edits;
    };

    let Some(mut tee) = doc.element(split).cloned() else {
        return edits;
    };
    tee.set(QName::geo("x"), Some(format_coord(point.x)));
    tee.set(QName::geo("y"), Some(format_coord(point.y)));
    tee.set(QName::geo("uuid"), None);

    let Some(shell) = doc.element(section).cloned() else {
        return edits;
    };
    let tail = doc.alloc(shell);
    let mut copies = vec![tee.clone()];
    copies.extend(
        vertices[index + 1..]
            .iter()
            .filter_map(|vertex| doc.element(*vertex).cloned()),
    );
    for copy in copies {
        if doc.alloc_child(tail, copy).is_err() {
            return EditBatch::new();
        }
    }
    edits.insert(tail, parent, doc.next_element_sibling(section));

    for vertex in &vertices[index + 1..] {
        edits.remove(*vertex);
    }
    if at_point.is_none() {
        let closing = doc.alloc(tee);
        edits.insert(closing, section, None);
    }
    edits
}

fn pin_tag(name: &str) -> &'static str {
    if name.starts_with('T') {
        "Terminal"
    } else {
        "NeutralPoint"
    }
}

/// Detached Terminal/NeutralPoint wired to the destination node.
fn pin(doc: &mut Document, name: &str, destination: &Destination, uuid: &str) -> NodeId {
    let mut element = Element::scl(pin_tag(name))
        .with_geo("uuid", uuid)
        .with_local("name", name)
        .with_local("connectivityNode", destination.path_name.as_str());
    let containers = destination.path_name.split('/').take(3);
    for (local, value) in ["substationName", "voltageLevelName", "bayName"]
        .into_iter()
        .zip(containers)
    {
        element = element.with_local(local, value);
    }
    element = element.with_local("cNodeName", destination.name.as_str());
    doc.alloc(element)
}
