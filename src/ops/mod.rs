// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sld-designer and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Edit batches and their transactional application.
//!
//! Layout algorithms never touch the attached tree: they compute an [`EditBatch`] which an
//! [`EditEmitter`] applies as one unit. [`apply_edits`] checks the base revision, applies every
//! edit or none, and returns the inverse batch so the host can undo.

use std::collections::BTreeSet;

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::model::{Document, DocumentError, NodeId, QName};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Edit {
    /// Places `node` before `reference` under `parent` (at the end when `reference` is `None`).
    /// An already attached node is moved.
    Insert {
        node: NodeId,
        parent: NodeId,
        reference: Option<NodeId>,
    },
    Remove {
        node: NodeId,
    },
    Update {
        element: NodeId,
        attributes: Vec<AttrUpdate>,
    },
}

impl Edit {
    pub fn target(&self) -> NodeId {
        match self {
            Self::Insert { node, .. } | Self::Remove { node } => *node,
            Self::Update { element, .. } => *element,
        }
    }
}

/// Sets (`Some`) or clears (`None`) one attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttrUpdate {
    pub name: QName,
    pub value: Option<String>,
}

impl AttrUpdate {
    pub fn set(name: QName, value: impl Into<String>) -> Self {
        Self {
            name,
            value: Some(value.into()),
        }
    }

    pub fn clear(name: QName) -> Self {
        Self { name, value: None }
    }

    pub fn local(local: &str, value: impl Into<String>) -> Self {
        Self::set(QName::local(local), value)
    }

    pub fn geo(local: &str, value: impl Into<String>) -> Self {
        Self::set(QName::geo(local), value)
    }
}

/// Ordered list of edits applied as one undoable unit.
///
/// Removing the same node twice collapses into the first removal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditBatch {
    edits: Vec<Edit>,
}

impl EditBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, edit: Edit) {
        if let Edit::Remove { node } = edit {
            if self.removes(node) {
                return;
            }
        }
        self.edits.push(edit);
    }

    pub fn insert(&mut self, node: NodeId, parent: NodeId, reference: Option<NodeId>) {
        self.push(Edit::Insert {
            node,
            parent,
            reference,
        });
    }

    pub fn remove(&mut self, node: NodeId) {
        self.push(Edit::Remove { node });
    }

    pub fn update(&mut self, element: NodeId, attributes: Vec<AttrUpdate>) {
        if attributes.is_empty() {
            return;
        }
        self.push(Edit::Update {
            element,
            attributes,
        });
    }

    pub fn extend(&mut self, other: EditBatch) {
        for edit in other.edits {
            self.push(edit);
        }
    }

    pub fn removes(&self, node: NodeId) -> bool {
        self.edits
            .iter()
            .any(|edit| matches!(edit, Edit::Remove { node: removed } if *removed == node))
    }

    /// Value the batch assigns last to `name` on `element`, if any.
    pub fn assigned(&self, element: NodeId, name: &QName) -> Option<&str> {
        self.edits
            .iter()
            .rev()
            .filter_map(|edit| match edit {
                Edit::Update {
                    element: target,
                    attributes,
                } if *target == element => Some(attributes),
                _ => None,
            })
            .find_map(|attributes| attributes.iter().rev().find(|attr| &attr.name == name))
            .and_then(|attr| attr.value.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Edit> {
        self.edits.iter()
    }

    pub fn into_edits(self) -> Vec<Edit> {
        self.edits
    }
}

impl From<Vec<Edit>> for EditBatch {
    fn from(edits: Vec<Edit>) -> Self {
        let mut batch = Self::new();
        for edit in edits {
            batch.push(edit);
        }
        batch
    }
}

impl<'a> IntoIterator for &'a EditBatch {
    type Item = &'a Edit;
    type IntoIter = std::slice::Iter<'a, Edit>;

    fn into_iter(self) -> Self::IntoIter {
        self.edits.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyResult {
    pub new_rev: u64,
    pub applied: usize,
    /// Batch that restores the state before this one.
    pub inverse: EditBatch,
    pub delta: Delta,
}

/// Nodes touched by a batch: newly attached, detached, or moved/updated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Delta {
    pub added: Vec<NodeId>,
    pub removed: Vec<NodeId>,
    pub updated: Vec<NodeId>,
}

#[derive(Debug, Default)]
struct DeltaBuilder {
    added: BTreeSet<NodeId>,
    removed: BTreeSet<NodeId>,
    updated: BTreeSet<NodeId>,
}

impl DeltaBuilder {
    fn record_added(&mut self, node: NodeId) {
        if self.removed.remove(&node) {
            self.updated.insert(node);
            return;
        }
        self.added.insert(node);
    }

    fn record_removed(&mut self, node: NodeId) {
        self.updated.remove(&node);
        if !self.added.remove(&node) {
            self.removed.insert(node);
        }
    }

    fn record_updated(&mut self, node: NodeId) {
        if self.added.contains(&node) || self.removed.contains(&node) {
            return;
        }
        self.updated.insert(node);
    }

    fn finish(self) -> Delta {
        Delta {
            added: self.added.into_iter().collect(),
            removed: self.removed.into_iter().collect(),
            updated: self.updated.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplyError {
    #[error("stale base_rev (base_rev={base_rev}, current_rev={current_rev})")]
    Conflict { base_rev: u64, current_rev: u64 },
    #[error("edit {index} failed: {source}")]
    Edit {
        index: usize,
        #[source]
        source: DocumentError,
    },
}

/// Applies `batch` to `doc` as one unit.
///
/// Fails with [`ApplyError::Conflict`] when `base_rev` is not the document's current revision.
/// When any edit fails, the edits before it are rolled back and the document is unchanged.
/// An empty batch does not bump the revision.
pub fn apply_edits(
    doc: &mut Document,
    base_rev: u64,
    batch: &EditBatch,
) -> Result<ApplyResult, ApplyError> {
    let current_rev = doc.rev();
    if base_rev != current_rev {
        return Err(ApplyError::Conflict {
            base_rev,
            current_rev,
        });
    }

    if batch.is_empty() {
        return Ok(ApplyResult {
            new_rev: current_rev,
            applied: 0,
            inverse: EditBatch::default(),
            delta: Delta::default(),
        });
    }

    let mut undo = Vec::with_capacity(batch.len());
    let mut delta = DeltaBuilder::default();
    for (index, edit) in batch.iter().enumerate() {
        trace!(index, edit:?; "applying edit");
        match apply_edit(doc, edit, &mut delta) {
            Ok(inverse) => undo.extend(inverse),
            Err(source) => {
                warn!(index, error:? = source; "edit failed, rolling back batch");
                rollback(doc, undo);
                return Err(ApplyError::Edit { index, source });
            }
        }
    }

    doc.bump_rev();
    let new_rev = doc.rev();
    debug!(edits = batch.len(), new_rev; "applied edit batch");

    undo.reverse();
    Ok(ApplyResult {
        new_rev,
        applied: batch.len(),
        inverse: EditBatch { edits: undo },
        delta: delta.finish(),
    })
}

/// Host side of the edit protocol: receives computed batches and applies them.
pub trait EditEmitter {
    fn emit(&mut self, doc: &mut Document, batch: EditBatch) -> Result<ApplyResult, ApplyError>;
}

/// In-memory emitter with undo/redo stacks.
#[derive(Debug, Clone, Default)]
pub struct History {
    undo: Vec<EditBatch>,
    redo: Vec<EditBatch>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Reverts the last emitted (or redone) batch. `None` when there is nothing to undo.
    pub fn undo(&mut self, doc: &mut Document) -> Result<Option<ApplyResult>, ApplyError> {
        let Some(batch) = self.undo.pop() else {
            return Ok(None);
        };
        let rev = doc.rev();
        match apply_edits(doc, rev, &batch) {
            Ok(result) => {
                self.redo.push(result.inverse.clone());
                Ok(Some(result))
            }
            Err(err) => {
                self.undo.push(batch);
                Err(err)
            }
        }
    }

    pub fn redo(&mut self, doc: &mut Document) -> Result<Option<ApplyResult>, ApplyError> {
        let Some(batch) = self.redo.pop() else {
            return Ok(None);
        };
        let rev = doc.rev();
        match apply_edits(doc, rev, &batch) {
            Ok(result) => {
                self.undo.push(result.inverse.clone());
                Ok(Some(result))
            }
            Err(err) => {
                self.redo.push(batch);
                Err(err)
            }
        }
    }
}

impl EditEmitter for History {
    fn emit(&mut self, doc: &mut Document, batch: EditBatch) -> Result<ApplyResult, ApplyError> {
        let rev = doc.rev();
        let result = apply_edits(doc, rev, &batch)?;
        if result.applied > 0 {
            self.undo.push(result.inverse.clone());
            self.redo.clear();
        }
        Ok(result)
    }
}

// Single-edit application and rollback.
include!("ops_impl.rs");
