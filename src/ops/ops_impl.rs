// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sld-designer and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Applies one edit and returns the edits that undo it, in application order.
fn apply_edit(
    doc: &mut Document,
    edit: &Edit,
    delta: &mut DeltaBuilder,
) -> Result<Vec<Edit>, DocumentError> {
    match edit {
        Edit::Insert {
            node,
            parent,
            reference,
        } => {
            let was_attached = doc.is_attached(*node);
            let previous = doc.insert_before(*node, *parent, *reference)?;
            match (was_attached, doc.is_attached(*node)) {
                (false, true) => delta.record_added(*node),
                (true, false) => delta.record_removed(*node),
                (true, true) => delta.record_updated(*node),
                (false, false) => {}
            }
            Ok(vec![restore(*node, previous)])
        }
        Edit::Remove { node } => {
            let was_attached = doc.is_attached(*node);
            let previous = doc.detach(*node)?;
            if was_attached {
                delta.record_removed(*node);
            }
            Ok(previous
                .map(|position| restore(*node, Some(position)))
                .into_iter()
                .collect())
        }
        Edit::Update {
            element,
            attributes,
        } => {
            let mut previous = Vec::with_capacity(attributes.len());
            for update in attributes {
                let old = doc.set_attribute(*element, &update.name, update.value.clone())?;
                previous.push(AttrUpdate {
                    name: update.name.clone(),
                    value: old,
                });
            }
            previous.reverse();
            if doc.is_attached(*element) {
                delta.record_updated(*element);
            }
            Ok(vec![Edit::Update {
                element: *element,
                attributes: previous,
            }])
        }
    }
}

fn restore(node: NodeId, previous: Option<crate::model::Position>) -> Edit {
    match previous {
        Some(position) => Edit::Insert {
            node,
            parent: position.parent,
            reference: position.next,
        },
        None => Edit::Remove { node },
    }
}

/// Undoes already applied edits, newest first. `undo` is in application order.
fn rollback(doc: &mut Document, undo: Vec<Edit>) {
    let mut scratch = DeltaBuilder::default();
    for edit in undo.into_iter().rev() {
        if let Err(err) = apply_edit(doc, &edit, &mut scratch) {
            warn!(edit:?, error:? = err; "rollback edit failed");
        }
    }
}
