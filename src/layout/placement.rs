// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sld-designer and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Placement engine: moving or inserting a diagram element at a grid cell.
//!
//! One call produces the geometry batch (reparent, own position and label, translated
//! descendants and labels, connectivity cleanup). Wrapping a placed IEDName into its
//! `OpenSCD-Linked-IEDs` holder depends on where the applied batch left it, so it is returned as
//! a [`FollowUp`] to resolve after the geometry batch is applied.

use std::collections::BTreeMap;

use log::debug;

use super::attributes::{
    format_coord, label_updates, position_updates, positioning_target, Geometry, Point,
};
use super::bus_bar;
use super::reference::ReferenceResolver;
use super::removal::remove_terminal;
use super::reparent::reparent;
use crate::model::{
    Document, Element, NodeId, Tag, COORDS_PRIVATE, GROUNDED, LINKED_IEDS_PRIVATE,
};
use crate::ops::{AttrUpdate, EditBatch};
use crate::query;

#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub edits: EditBatch,
    pub follow_up: Option<FollowUp>,
}

/// Second stage of placing an IEDName, resolved against the document after the geometry batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowUp {
    pub element: NodeId,
    pub old_parent: Option<NodeId>,
}

impl FollowUp {
    /// Wraps the IEDName into its parent's `OpenSCD-Linked-IEDs` Private (creating the holder
    /// when needed) and drops the previous holder once it is empty.
    pub fn wrap_linked_ied<R: ReferenceResolver + ?Sized>(
        &self,
        doc: &mut Document,
        resolver: &R,
    ) -> EditBatch {
        let mut edits = EditBatch::new();
        let Some(parent) = doc.parent(self.element) else {
            return edits;
        };

        let mut holder = Some(parent);
        if doc.tag(parent) != Tag::Private {
            let existing = query::child_private(doc, parent, LINKED_IEDS_PRIVATE);
            let target = match existing {
                Some(existing) => existing,
                None => {
                    let created = doc.alloc(
                        Element::scl("Private").with_local("type", LINKED_IEDS_PRIVATE),
                    );
                    edits.insert(created, parent, resolver.reference(doc, parent, "Private"));
                    created
                }
            };
            edits.insert(self.element, target, None);
            holder = Some(target);
        }

        if let Some(old_parent) = self.old_parent {
            let emptied = doc
                .child_elements(old_parent)
                .all(|child| child == self.element);
            if is_linked_holder(doc, old_parent) && emptied && holder != Some(old_parent) {
                edits.remove(old_parent);
            }
        }
        edits
    }
}

fn is_linked_holder(doc: &Document, node: NodeId) -> bool {
    doc.tag(node) == Tag::Private && doc.attr(node, "type") == Some(LINKED_IEDS_PRIVATE)
}

/// Computes the edits placing `element` under `parent` at `target`.
///
/// Vertices never change owner: they are routed to the bus-bar drag and `parent` is ignored.
/// Placing an element at its current position under its current parent yields no edits.
pub fn place<R: ReferenceResolver + ?Sized>(
    doc: &mut Document,
    resolver: &R,
    element: NodeId,
    parent: NodeId,
    target: Point,
) -> Placement {
    let tag = doc.tag(element);
    if tag == Tag::Vertex {
        return Placement {
            edits: bus_bar::drag_vertex(doc, element, target),
            follow_up: None,
        };
    }

    let old_parent = doc.parent(element);
    // A wrapped IEDName belongs to the container of its holder.
    let container = match old_parent {
        Some(holder) if tag == Tag::IedName && is_linked_holder(doc, holder) => doc.parent(holder),
        other => other,
    };
    let moves_parent = container != Some(parent);
    let anchor = positioning_target(doc, element);
    let geometry = Geometry::of(doc, anchor.unwrap_or(element));
    if !moves_parent && anchor.is_some() && geometry.pos == target {
        return Placement {
            edits: EditBatch::new(),
            follow_up: None,
        };
    }

    let mut edits = EditBatch::new();
    if moves_parent {
        edits.extend(reparent(doc, resolver, element, parent).edits);
    }

    let (dx, dy) = target.delta_from(geometry.pos);
    match anchor {
        Some(anchor) => {
            let label = first_placement_label(tag, &geometry).translate(dx, dy);
            let mut updates = position_updates(target);
            updates.extend(label_updates(label));
            edits.update(anchor, updates);
        }
        None => {
            if let Some(ied) = doc.parent(element) {
                let ly = if target.y < 2.0 { target.y + 1.0 } else { target.y - 1.0 };
                let coords = Element::sld("Coords")
                    .with_geo("x", format_coord(target.x))
                    .with_geo("y", format_coord(target.y))
                    .with_geo("lx", format_coord(target.x))
                    .with_geo("ly", format_coord(ly));
                edits.extend(insert_coords(doc, resolver, ied, coords));
            }
        }
    }

    let ied_texts = linked_ied_texts(doc, element, tag);
    let mut created_coords = Vec::new();
    for (text, ied_name) in &ied_texts {
        let Some(ied) = doc.parent(*text) else {
            continue;
        };
        if query::coords_of(doc, ied).is_some() {
            continue;
        }
        let label = Geometry::of(doc, *ied_name).label.translate(dx - 1.0, dy - 1.0);
        let coords = Element::sld("Coords")
            .with_geo("lx", format_coord(label.x))
            .with_geo("ly", format_coord(label.y));
        edits.extend(insert_coords(doc, resolver, ied, coords));
        created_coords.push(*text);
    }

    let texts = doc
        .descendants_tagged(element, &[Tag::Text])
        .into_iter()
        .chain(ied_texts.keys().copied())
        .filter(|text| !created_coords.contains(text))
        .collect::<Vec<_>>();
    for text in texts {
        let Some(target) = positioning_target(doc, text) else {
            continue;
        };
        let label = Geometry::of(doc, target).label.translate(dx, dy);
        edits.update(target, label_updates(label));
    }

    let translated = doc.descendants_tagged(
        element,
        &[
            Tag::Bay,
            Tag::ConductingEquipment,
            Tag::PowerTransformer,
            Tag::Vertex,
            Tag::IedName,
        ],
    );
    for descendant in translated {
        let geometry = Geometry::of(doc, descendant);
        let mut updates = position_updates(geometry.pos.translate(dx, dy));
        if doc.tag(descendant) != Tag::Vertex {
            updates.extend(label_updates(geometry.label.translate(dx, dy)));
        }
        edits.update(descendant, updates);
    }

    if tag.is_equipment() {
        edits.extend(clean_equipment_pins(doc, resolver, element, parent));
    } else if doc.is_attached(element) {
        edits.extend(clean_container_links(doc, element));
    }

    debug!(element:?, tag:?, dx, dy, edits = edits.len(); "computed placement");
    Placement {
        edits,
        follow_up: (tag == Tag::IedName).then_some(FollowUp {
            element,
            old_parent,
        }),
    }
}

fn first_placement_label(tag: Tag, geometry: &Geometry) -> Point {
    let label = geometry.label;
    if geometry.has_label {
        return label;
    }
    match tag {
        Tag::ConductingEquipment if geometry.rot.is_even() => label.translate(1.0, 1.0),
        Tag::PowerTransformer if geometry.rot.quarter_turns() < 2 => label.translate(1.5, 0.0),
        Tag::PowerTransformer => label.translate(-2.0, 2.0),
        Tag::IedName => label.translate(1.0, 1.0),
        _ => label,
    }
}

/// IED `Text` labels linked to the placed IEDName, or to every IEDName inside a moved
/// VoltageLevel/Bay, keyed by text.
fn linked_ied_texts(doc: &Document, element: NodeId, tag: Tag) -> BTreeMap<NodeId, NodeId> {
    let ied_names = match tag {
        Tag::IedName => vec![element],
        Tag::VoltageLevel | Tag::Bay => doc.descendants_tagged(element, &[Tag::IedName]),
        _ => Vec::new(),
    };
    let mut texts = BTreeMap::new();
    for ied_name in ied_names {
        let Some(name) = doc.geo(ied_name, "name") else {
            continue;
        };
        let Some(text) = query::ied_by_name(doc, name).and_then(|ied| query::ied_text(doc, ied))
        else {
            continue;
        };
        texts.entry(text).or_insert(ied_name);
    }
    texts
}

/// Puts `coords` into the IED's `OpenSCD-Coords` Private, creating the Private when missing.
fn insert_coords<R: ReferenceResolver + ?Sized>(
    doc: &mut Document,
    resolver: &R,
    ied: NodeId,
    coords: Element,
) -> EditBatch {
    let mut edits = EditBatch::new();
    let record = doc.alloc(coords);
    match query::child_private(doc, ied, COORDS_PRIVATE) {
        Some(private) => edits.insert(record, private, None),
        None => {
            let private = doc.alloc(Element::scl("Private").with_local("type", COORDS_PRIVATE));
            edits.insert(private, ied, resolver.reference(doc, ied, "Private"));
            edits.insert(record, private, None);
        }
    }
    edits
}

/// Pins of moved equipment: regular pins are disconnected, grounded pins follow the new Bay's
/// `grounded` node (or go away without a Bay).
fn clean_equipment_pins<R: ReferenceResolver + ?Sized>(
    doc: &mut Document,
    resolver: &R,
    element: NodeId,
    parent: NodeId,
) -> EditBatch {
    let mut edits = EditBatch::new();
    let pins = doc.descendants_tagged(element, &[Tag::Terminal, Tag::NeutralPoint]);
    let (grounded, regular): (Vec<_>, Vec<_>) =
        pins.into_iter().partition(|pin| query::is_grounded(doc, *pin));
    for pin in regular {
        edits.extend(remove_terminal(doc, pin));
    }
    if grounded.is_empty() {
        return edits;
    }

    let Some(bay) = doc.closest(parent, Tag::Bay) else {
        for pin in grounded {
            edits.extend(remove_terminal(doc, pin));
        }
        return edits;
    };

    let existing = doc.child_elements(bay).find(|child| {
        doc.tag(*child) == Tag::ConnectivityNode && doc.name(*child) == Some(GROUNDED)
    });
    let path_name = match existing {
        Some(cnode) => doc
            .attr(cnode, "pathName")
            .map(str::to_owned)
            .unwrap_or_else(|| query::element_path(doc, bay, GROUNDED)),
        None => {
            let path_name = query::element_path(doc, bay, GROUNDED);
            let cnode = doc.alloc(
                Element::scl("ConnectivityNode")
                    .with_local("name", GROUNDED)
                    .with_local("pathName", path_name.as_str()),
            );
            edits.insert(cnode, bay, resolver.reference(doc, bay, "ConnectivityNode"));
            path_name
        }
    };

    let containers = query::containers_of(doc, bay);
    for pin in grounded {
        let mut updates = vec![AttrUpdate::local("connectivityNode", path_name.as_str())];
        for (local, value) in [
            ("substationName", &containers.substation),
            ("voltageLevelName", &containers.voltage_level),
            ("bayName", &containers.bay),
        ] {
            if let Some(value) = value {
                updates.push(AttrUpdate::local(local, value.as_str()));
            }
        }
        edits.update(pin, updates);
    }
    edits
}

/// Dangling links of a moved container in both directions: nodes inside referenced from
/// outside, and nodes outside referenced from inside. Grounded pins are left alone.
fn clean_container_links(doc: &Document, element: NodeId) -> EditBatch {
    let mut edits = EditBatch::new();
    for cnode in doc.descendants_tagged(element, &[Tag::ConnectivityNode]) {
        let Some(path) = doc.attr(cnode, "pathName") else {
            continue;
        };
        let linked_from_outside = doc
            .terminals_referencing(path)
            .any(|pin| !query::is_grounded(doc, pin) && !doc.contains(element, pin));
        if linked_from_outside {
            edits.extend(super::removal::remove_node(doc, cnode));
        }
    }

    for pin in doc.descendants_tagged(element, &[Tag::Terminal, Tag::NeutralPoint]) {
        if query::is_grounded(doc, pin) {
            continue;
        }
        let Some(cnode) = doc
            .attr(pin, "connectivityNode")
            .and_then(|path| doc.connectivity_node(path))
        else {
            continue;
        };
        if !doc.contains(element, cnode) {
            edits.extend(super::removal::remove_node(doc, cnode));
        }
    }
    edits
}

#[cfg(test)]
mod tests;
