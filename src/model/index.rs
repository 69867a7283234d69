// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sld-designer and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeMap, BTreeSet};

use super::ids::NodeId;
use super::node::{Element, Tag};

/// Secondary index over the attached tree: ConnectivityNodes by `pathName` and
/// Terminals/NeutralPoints by the `connectivityNode` they reference.
///
/// Maintained by [`Document`](super::Document) on every attach, detach and attribute write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectivityIndex {
    nodes: BTreeMap<String, BTreeSet<NodeId>>,
    terminals: BTreeMap<String, BTreeSet<NodeId>>,
}

impl ConnectivityIndex {
    pub(crate) fn insert(&mut self, id: NodeId, element: &Element) {
        if let Some((map, key)) = self.slot(element) {
            map.entry(key.to_owned()).or_default().insert(id);
        }
    }

    pub(crate) fn remove(&mut self, id: NodeId, element: &Element) {
        let Some((map, key)) = self.slot(element) else {
            return;
        };
        if let Some(ids) = map.get_mut(key) {
            ids.remove(&id);
            if ids.is_empty() {
                map.remove(key);
            }
        }
    }

    fn slot<'a>(
        &mut self,
        element: &'a Element,
    ) -> Option<(&mut BTreeMap<String, BTreeSet<NodeId>>, &'a str)> {
        match element.tag() {
            Tag::ConnectivityNode => Some((&mut self.nodes, element.attr("pathName")?)),
            tag if tag.is_terminal() => {
                Some((&mut self.terminals, element.attr("connectivityNode")?))
            }
            _ => None,
        }
    }

    /// The ConnectivityNode carrying `path_name`, lowest handle first on duplicates.
    pub fn node(&self, path_name: &str) -> Option<NodeId> {
        self.nodes.get(path_name)?.iter().next().copied()
    }

    pub fn terminals(&self, path_name: &str) -> impl Iterator<Item = NodeId> + '_ {
        self.terminals.get(path_name).into_iter().flatten().copied()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.values().map(BTreeSet::len).sum()
    }

    pub fn terminal_count(&self) -> usize {
        self.terminals.values().map(BTreeSet::len).sum()
    }
}
