// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sld-designer and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::{Document, NodeId, SLD_NS};

/// Tells where a new child belongs among its siblings.
pub trait ReferenceResolver {
    /// Sibling before which a `tag` child of `parent` must be inserted, `None` to append.
    fn reference(&self, doc: &Document, parent: NodeId, tag: &str) -> Option<NodeId>;
}

/// Child order of the SCL schema for the elements the diagram edits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SclSchemaOrder;

fn child_order(parent: &str) -> Option<&'static [&'static str]> {
    let order: &'static [&'static str] = match parent {
        "SCL" => &[
            "Text",
            "Private",
            "Header",
            "Substation",
            "Communication",
            "IED",
            "DataTypeTemplates",
            "Line",
            "Process",
        ],
        "Substation" => &[
            "Text",
            "Private",
            "LNode",
            "PowerTransformer",
            "GeneralEquipment",
            "VoltageLevel",
            "Function",
        ],
        "VoltageLevel" => &[
            "Text",
            "Private",
            "LNode",
            "PowerTransformer",
            "GeneralEquipment",
            "Voltage",
            "Bay",
            "Function",
        ],
        "Bay" => &[
            "Text",
            "Private",
            "LNode",
            "PowerTransformer",
            "GeneralEquipment",
            "ConductingEquipment",
            "ConnectivityNode",
            "Function",
        ],
        "ConductingEquipment" => &[
            "Text",
            "Private",
            "LNode",
            "Terminal",
            "SubEquipment",
            "EqFunction",
        ],
        "PowerTransformer" => &[
            "Text",
            "Private",
            "LNode",
            "TransformerWinding",
            "SubEquipment",
            "EqFunction",
        ],
        "TransformerWinding" => &[
            "Text",
            "Private",
            "LNode",
            "Terminal",
            "SubEquipment",
            "TapChanger",
            "NeutralPoint",
            "EqFunction",
        ],
        "ConnectivityNode" => &["Text", "Private", "LNode"],
        "IED" => &["Text", "Private", "Services", "AccessPoint", "KDC"],
        _ => return None,
    };
    Some(order)
}

impl ReferenceResolver for SclSchemaOrder {
    fn reference(&self, doc: &Document, parent: NodeId, tag: &str) -> Option<NodeId> {
        let parent_element = doc.element(parent)?;
        let order = child_order(parent_element.local_name())?;
        let index = order.iter().position(|candidate| *candidate == tag)?;
        let later = &order[index + 1..];
        doc.child_elements(parent).find(|child| {
            doc.element(*child).is_some_and(|element| {
                element.ns() != Some(SLD_NS) && later.contains(&element.local_name())
            })
        })
    }
}
