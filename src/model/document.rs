// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sld-designer and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use smol_str::SmolStr;

use super::ids::NodeId;
use super::index::ConnectivityIndex;
use super::node::{Element, NodeData, QName, Tag, SCL_NS, SLD_NS};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Slot {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceBinding {
    /// `None` is the default namespace.
    pub prefix: Option<SmolStr>,
    pub uri: SmolStr,
}

/// Where a node sat before it was moved or removed: enough to put it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub parent: NodeId,
    pub next: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    #[error("unknown node {node}")]
    UnknownNode { node: NodeId },
    #[error("node {node} is not an element")]
    NotAnElement { node: NodeId },
    #[error("node {parent} is attached; only detached subtrees can be built directly")]
    AttachedParent { parent: NodeId },
    #[error("reference {reference} is not a child of {parent}")]
    ForeignReference { parent: NodeId, reference: NodeId },
    #[error("inserting {node} under {parent} would create a cycle")]
    Cycle { node: NodeId, parent: NodeId },
    #[error("the document root cannot be moved or removed")]
    RootImmutable,
}

/// SCL document tree.
///
/// Nodes live in an arena and are addressed by [`NodeId`]. New nodes are allocated detached (the
/// equivalent of DOM `createElement`); the attached tree only changes through
/// [`crate::ops::apply_edits`], which bumps [`Document::rev`] once per batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    slots: Vec<Slot>,
    root: NodeId,
    rev: u64,
    namespaces: Vec<NamespaceBinding>,
    index: ConnectivityIndex,
}

impl Document {
    pub fn new(root: Element) -> Self {
        let mut index = ConnectivityIndex::default();
        index.insert(NodeId::from_index(0), &root);
        Self {
            slots: vec![Slot {
                data: NodeData::Element(root),
                parent: None,
                children: Vec::new(),
            }],
            root: NodeId::from_index(0),
            rev: 0,
            namespaces: Vec::new(),
            index,
        }
    }

    /// Empty `SCL` document with the SCL namespace as default namespace.
    pub fn new_scl() -> Self {
        let root = Element::scl("SCL")
            .with_local("version", "2007")
            .with_local("revision", "B")
            .with_local("release", "4");
        let mut doc = Self::new(root);
        doc.bind_namespace(None, SCL_NS);
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Edit count: bumped once per applied batch.
    pub fn rev(&self) -> u64 {
        self.rev
    }

    pub(crate) fn bump_rev(&mut self) {
        self.rev = self.rev.saturating_add(1);
    }

    pub fn namespaces(&self) -> &[NamespaceBinding] {
        &self.namespaces
    }

    /// Declares `prefix` for `uri` on the root. An existing binding of the same prefix is kept.
    pub fn bind_namespace(&mut self, prefix: Option<&str>, uri: &str) {
        if self.namespaces.iter().any(|ns| ns.prefix.as_deref() == prefix) {
            return;
        }
        self.namespaces.push(NamespaceBinding {
            prefix: prefix.map(SmolStr::new),
            uri: SmolStr::new(uri),
        });
    }

    pub fn prefix_for(&self, uri: &str) -> Option<&str> {
        self.namespaces
            .iter()
            .find(|ns| ns.uri == uri && ns.prefix.is_some())
            .and_then(|ns| ns.prefix.as_deref())
    }

    pub fn geometry_prefix(&self) -> Option<&str> {
        self.prefix_for(SLD_NS)
    }

    /// Reuses the document's prefix for the geometry namespace, or binds `default` (suffixed
    /// with a number if that prefix is taken) and remembers it for all later writes.
    pub fn ensure_geometry_prefix(&mut self, default: &str) -> SmolStr {
        if let Some(prefix) = self.geometry_prefix() {
            return SmolStr::new(prefix);
        }
        let taken = |candidate: &str| {
            self.namespaces
                .iter()
                .any(|ns| ns.prefix.as_deref() == Some(candidate))
        };
        let mut prefix = default.to_owned();
        let mut suffix = 1;
        while taken(&prefix) {
            prefix = format!("{default}{suffix}");
            suffix += 1;
        }
        self.bind_namespace(Some(&prefix), SLD_NS);
        SmolStr::new(prefix)
    }

    pub fn index(&self) -> &ConnectivityIndex {
        &self.index
    }

    /// Attached ConnectivityNode with the given `pathName`.
    pub fn connectivity_node(&self, path_name: &str) -> Option<NodeId> {
        self.index.node(path_name)
    }

    /// Attached Terminals/NeutralPoints whose `connectivityNode` is `path_name`.
    pub fn terminals_referencing(&self, path_name: &str) -> impl Iterator<Item = NodeId> + '_ {
        self.index.terminals(path_name)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains_id(&self, id: NodeId) -> bool {
        id.index() < self.slots.len()
    }

    fn slot(&self, id: NodeId) -> Result<&Slot, DocumentError> {
        self.slots
            .get(id.index())
            .ok_or(DocumentError::UnknownNode { node: id })
    }

    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.slots.get(id.index()).map(|slot| &slot.data)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.data(id).and_then(NodeData::as_element)
    }

    pub fn tag(&self, id: NodeId) -> Tag {
        self.element(id).map_or(Tag::Other, Element::tag)
    }

    pub fn attr(&self, id: NodeId, local: &str) -> Option<&str> {
        self.element(id)?.attr(local)
    }

    pub fn geo(&self, id: NodeId, local: &str) -> Option<&str> {
        self.element(id)?.geo(local)
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.attr(id, "name")
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.data(id)? {
            NodeData::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots.get(id.index())?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.slots
            .get(id.index())
            .map_or(&[], |slot| slot.children.as_slice())
    }

    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|child| self.element(*child).is_some())
    }

    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|sibling| *sibling == id)?;
        siblings[index + 1..]
            .iter()
            .copied()
            .find(|sibling| self.element(*sibling).is_some())
    }

    fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|sibling| *sibling == id)?;
        siblings.get(index + 1).copied()
    }

    /// Ancestors from the parent up to the root (or the top of a detached subtree).
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |current| self.parent(*current))
    }

    /// `id` itself or its nearest ancestor with `tag`.
    pub fn closest(&self, id: NodeId, tag: Tag) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|candidate| self.tag(*candidate) == tag)
    }

    /// Whether `node` is `ancestor` or lies inside it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).any(|candidate| candidate == ancestor)
    }

    pub fn is_attached(&self, id: NodeId) -> bool {
        self.contains(self.root, id)
    }

    /// Pre-order descendants of `id`, excluding `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = self.children(id).iter().rev().copied().collect::<Vec<_>>();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Pre-order descendants of `id` whose tag is one of `tags`.
    pub fn descendants_tagged(&self, id: NodeId, tags: &[Tag]) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|node| tags.contains(&self.tag(*node)))
            .collect()
    }

    /// Allocates a detached element.
    pub fn alloc(&mut self, element: Element) -> NodeId {
        self.push_slot(NodeData::Element(element), None)
    }

    pub fn alloc_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push_slot(NodeData::Text(text.into()), None)
    }

    pub fn alloc_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.push_slot(NodeData::Comment(text.into()), None)
    }

    pub fn alloc_processing_instruction(&mut self, target: &str, value: Option<&str>) -> NodeId {
        self.push_slot(
            NodeData::ProcessingInstruction {
                target: target.to_owned(),
                value: value.map(str::to_owned),
            },
            None,
        )
    }

    /// Allocates `element` as last child of a detached `parent`.
    pub fn alloc_child(&mut self, parent: NodeId, element: Element) -> Result<NodeId, DocumentError> {
        if self.element(parent).is_none() {
            self.slot(parent)?;
            return Err(DocumentError::NotAnElement { node: parent });
        }
        if self.is_attached(parent) {
            return Err(DocumentError::AttachedParent { parent });
        }
        let child = self.push_slot(NodeData::Element(element), Some(parent));
        self.slots[parent.index()].children.push(child);
        Ok(child)
    }

    /// Detached deep copy of `id`.
    pub fn deep_clone(&mut self, id: NodeId) -> Result<NodeId, DocumentError> {
        let data = self.slot(id)?.data.clone();
        let copy = self.push_slot(data, None);
        for child in self.children(id).to_vec() {
            let child_copy = self.deep_clone(child)?;
            self.slots[child_copy.index()].parent = Some(copy);
            self.slots[copy.index()].children.push(child_copy);
        }
        Ok(copy)
    }

    fn push_slot(&mut self, data: NodeData, parent: Option<NodeId>) -> NodeId {
        let id = NodeId::from_index(self.slots.len());
        self.slots.push(Slot {
            data,
            parent,
            children: Vec::new(),
        });
        id
    }

    /// Appends `child` under `parent` regardless of attachment. Used while loading documents.
    pub(crate) fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DocumentError> {
        self.insert_before(child, parent, None).map(|_| ())
    }

    /// DOM `insertBefore`: moves `node` (detaching it from any previous parent) before
    /// `reference` under `parent`, or to the end when `reference` is `None`.
    ///
    /// Returns the previous position of an already parented node.
    pub(crate) fn insert_before(
        &mut self,
        node: NodeId,
        parent: NodeId,
        reference: Option<NodeId>,
    ) -> Result<Option<Position>, DocumentError> {
        self.slot(node)?;
        self.slot(parent)?;
        if node == self.root {
            return Err(DocumentError::RootImmutable);
        }
        if self.element(parent).is_none() {
            return Err(DocumentError::NotAnElement { node: parent });
        }
        let reference = match reference {
            Some(reference) if reference == node => self.next_sibling(node),
            other => other,
        };
        if let Some(reference) = reference {
            if self.slot(reference)?.parent != Some(parent) {
                return Err(DocumentError::ForeignReference { parent, reference });
            }
        }
        if self.contains(node, parent) {
            return Err(DocumentError::Cycle { node, parent });
        }

        let was_attached = self.is_attached(node);
        let previous = self.take(node);
        let now_attached = self.is_attached(parent);

        let siblings = &mut self.slots[parent.index()].children;
        let at = reference
            .and_then(|reference| siblings.iter().position(|sibling| *sibling == reference))
            .unwrap_or(siblings.len());
        siblings.insert(at, node);
        self.slots[node.index()].parent = Some(parent);

        match (was_attached, now_attached) {
            (false, true) => self.reindex_subtree(node, true),
            (true, false) => self.reindex_subtree(node, false),
            _ => {}
        }
        Ok(previous)
    }

    /// DOM `remove`: detaches `node` from its parent. Detached nodes are left as they are.
    pub(crate) fn detach(&mut self, node: NodeId) -> Result<Option<Position>, DocumentError> {
        self.slot(node)?;
        if node == self.root {
            return Err(DocumentError::RootImmutable);
        }
        let was_attached = self.is_attached(node);
        let previous = self.take(node);
        if was_attached {
            self.reindex_subtree(node, false);
        }
        Ok(previous)
    }

    /// Sets or clears one attribute and returns its previous value.
    pub(crate) fn set_attribute(
        &mut self,
        id: NodeId,
        name: &QName,
        value: Option<String>,
    ) -> Result<Option<String>, DocumentError> {
        self.slot(id)?;
        let attached = self.is_attached(id);
        let NodeData::Element(element) = &mut self.slots[id.index()].data else {
            return Err(DocumentError::NotAnElement { node: id });
        };
        if attached {
            self.index.remove(id, element);
        }
        let previous = element.set(name.clone(), value);
        if attached {
            self.index.insert(id, element);
        }
        Ok(previous)
    }

    fn take(&mut self, node: NodeId) -> Option<Position> {
        let parent = self.slots[node.index()].parent.take()?;
        let siblings = &mut self.slots[parent.index()].children;
        let index = siblings.iter().position(|sibling| *sibling == node)?;
        siblings.remove(index);
        let next = siblings.get(index).copied();
        Some(Position { parent, next })
    }

    fn reindex_subtree(&mut self, node: NodeId, attach: bool) {
        let mut subtree = self.descendants(node);
        subtree.push(node);
        for id in subtree {
            let NodeData::Element(element) = &self.slots[id.index()].data else {
                continue;
            };
            if attach {
                self.index.insert(id, element);
            } else {
                self.index.remove(id, element);
            }
        }
    }
}
