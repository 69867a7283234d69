// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sld-designer and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;

use log::trace;
use smol_str::SmolStr;

use super::reference::ReferenceResolver;
use crate::model::{Document, NodeId, PathName, Tag};
use crate::ops::{AttrUpdate, EditBatch};
use crate::query;

/// Edits moving an element under a new parent, plus the identifiers the move assigns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reparent {
    pub edits: EditBatch,
    /// Name after the move (named containers only).
    pub name: Option<SmolStr>,
    /// pathName after the move when the element is a ConnectivityNode.
    pub path_name: Option<String>,
}

/// Moves `element` under `parent` in schema order.
///
/// Keeps the element's name unique among its new siblings and rewrites the pathName of every
/// ConnectivityNode the move relocates, together with the connectivity attributes of all
/// Terminals/NeutralPoints referencing a rewritten pathName.
pub fn reparent<R: ReferenceResolver + ?Sized>(
    doc: &Document,
    resolver: &R,
    element: NodeId,
    parent: NodeId,
) -> Reparent {
    let mut edits = EditBatch::new();
    let tag = doc.tag(element);
    let local = doc
        .element(element)
        .map(|el| el.local_name().to_owned())
        .unwrap_or_default();
    edits.insert(element, parent, resolver.reference(doc, parent, &local));

    let name = tag.is_named_container().then(|| unique_name(doc, element, parent));
    if let Some(name) = &name {
        if doc.name(element) != Some(name.as_str()) {
            edits.update(element, vec![AttrUpdate::local("name", name.as_str())]);
        }
    }

    let mut path_name = None;
    let moved_nodes = if tag == Tag::ConnectivityNode {
        vec![element]
    } else {
        doc.descendants_tagged(element, &[Tag::ConnectivityNode])
    };
    for cnode in moved_nodes {
        let new_path = path_after_move(doc, cnode, element, parent, name.as_deref());
        if cnode == element {
            path_name = Some(new_path.clone());
        }
        let old_path = doc.attr(cnode, "pathName");
        if old_path == Some(new_path.as_str()) {
            continue;
        }
        trace!(cnode:?, old_path:?, new_path = new_path.as_str(); "rewriting pathName");
        edits.update(cnode, vec![AttrUpdate::local("pathName", new_path.as_str())]);
        if let Some(old_path) = old_path {
            for terminal in doc.terminals_referencing(old_path) {
                edits.update(terminal, connectivity_updates(&new_path));
            }
        }
    }

    Reparent {
        edits,
        name,
        path_name,
    }
}

/// Name for `element` that no other named child of `parent` carries.
///
/// The current name is kept when free; otherwise trailing digits are replaced by the first free
/// counter (`QA1` -> `QA2`). Unnamed elements use the initial of their tag.
pub fn unique_name(doc: &Document, element: NodeId, parent: NodeId) -> SmolStr {
    let taken = doc
        .child_elements(parent)
        .filter(|sibling| *sibling != element && doc.tag(*sibling).is_named_container())
        .filter_map(|sibling| doc.name(sibling))
        .collect::<BTreeSet<_>>();

    let current = doc.name(element).filter(|name| !name.is_empty());
    if let Some(current) = current {
        if !taken.contains(current) {
            return SmolStr::new(current);
        }
    }

    let base = current
        .map(|name| name.trim_end_matches(|c: char| c.is_ascii_digit()))
        .filter(|base| !base.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| {
            doc.element(element)
                .and_then(|el| el.local_name().chars().next())
                .map(String::from)
                .unwrap_or_default()
        });
    let mut counter = 1_u32;
    loop {
        let candidate = format!("{base}{counter}");
        if !taken.contains(candidate.as_str()) {
            return SmolStr::new(candidate);
        }
        counter += 1;
    }
}

fn path_after_move(
    doc: &Document,
    cnode: NodeId,
    element: NodeId,
    parent: NodeId,
    element_name: Option<&str>,
) -> String {
    let own_name = |node: NodeId| {
        if node == element {
            element_name.or(doc.name(node)).unwrap_or_default().to_owned()
        } else {
            doc.name(node).unwrap_or_default().to_owned()
        }
    };

    let mut inner = Vec::new();
    if cnode != element {
        for ancestor in doc.ancestors(cnode) {
            if ancestor == element {
                break;
            }
            if matches!(doc.tag(ancestor), Tag::Substation | Tag::VoltageLevel | Tag::Bay) {
                inner.push(own_name(ancestor));
            }
        }
        if matches!(doc.tag(element), Tag::Substation | Tag::VoltageLevel | Tag::Bay) {
            inner.push(own_name(element));
        }
        inner.reverse();
    }
    inner.push(own_name(cnode));

    let mut path = query::element_path(doc, parent, "");
    for segment in inner {
        if !path.is_empty() {
            path.push('/');
        }
        path.push_str(&segment);
    }
    path
}

/// The five connectivity attributes a Terminal/NeutralPoint carries for `path_name`.
pub fn connectivity_updates(path_name: &str) -> Vec<AttrUpdate> {
    let (containers, node_name) = match PathName::new(path_name) {
        Ok(path) => (path.containers(), path.node_name().to_owned()),
        Err(_) => (Default::default(), String::new()),
    };
    let mut updates = vec![AttrUpdate::local("connectivityNode", path_name)];
    for (local, value) in [
        ("substationName", containers.substation),
        ("voltageLevelName", containers.voltage_level),
        ("bayName", containers.bay),
    ] {
        if let Some(value) = value {
            updates.push(AttrUpdate::local(local, value.as_str()));
        }
    }
    updates.push(AttrUpdate::local("cNodeName", node_name));
    updates
}
