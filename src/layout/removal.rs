// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sld-designer and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::{Document, NodeId, Tag};
use crate::ops::EditBatch;
use crate::query;

/// Disconnects a Terminal/NeutralPoint.
///
/// Nodes of a bus bar, and nodes that keep at least two other pins, only lose the routing
/// Sections anchored at this pin. Any other node is removed with [`remove_node`].
pub fn remove_terminal(doc: &Document, terminal: NodeId) -> EditBatch {
    let mut edits = EditBatch::new();
    edits.remove(terminal);

    let Some(path) = doc.attr(terminal, "connectivityNode") else {
        return edits;
    };
    let Some(cnode) = doc.connectivity_node(path) else {
        return edits;
    };
    let others = doc
        .terminals_referencing(path)
        .filter(|other| *other != terminal)
        .count();
    let on_bus_bar = doc
        .closest(cnode, Tag::Bay)
        .is_some_and(|bay| query::is_bus_bar(doc, bay));

    if on_bus_bar || others > 1 {
        let Some(anchor) = doc.geo(terminal, "uuid") else {
            return edits;
        };
        for vertex in doc.descendants_tagged(cnode, &[Tag::Vertex]) {
            if doc.geo(vertex, "uuid") != Some(anchor) {
                continue;
            }
            if let Some(section) = doc.closest(vertex, Tag::Section) {
                edits.remove(section);
            }
        }
    } else {
        edits.extend(remove_node(doc, cnode));
    }
    edits
}

/// Removes a ConnectivityNode and every pin referencing it.
///
/// A bus-bar node stays in place and only drops its non-bus Sections.
pub fn remove_node(doc: &Document, cnode: NodeId) -> EditBatch {
    let mut edits = EditBatch::new();
    let on_bus_bar = doc
        .closest(cnode, Tag::Bay)
        .is_some_and(|bay| query::is_bus_bar(doc, bay));
    if on_bus_bar {
        for section in doc.descendants_tagged(cnode, &[Tag::Section]) {
            if !query::is_bus_section(doc, section) {
                edits.remove(section);
            }
        }
    } else {
        edits.remove(cnode);
    }

    if let Some(path) = doc.attr(cnode, "pathName") {
        for terminal in doc.terminals_referencing(path) {
            edits.remove(terminal);
        }
    }
    edits
}
