// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sld-designer and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Primary schema namespace of SCL documents.
pub const SCL_NS: &str = "http://www.iec.ch/61850/2003/SCL";
/// Namespace carrying all diagram geometry (positions, sections, linked IEDs).
pub const SLD_NS: &str = "https://openscd.org/SCL/SSD/SLD/v0";
pub const XMLNS_NS: &str = "http://www.w3.org/2000/xmlns/";

/// Prefix bound to [`SLD_NS`] when a document does not declare one yet.
pub const DEFAULT_SLD_PREFIX: &str = "esld";

/// `Private/@type` of a ConnectivityNode's routing container.
pub const LAYOUT_PRIVATE: &str = "OpenSCD-SLD-Layout";
/// `Private/@type` wrapping placed IEDName references.
pub const LINKED_IEDS_PRIVATE: &str = "OpenSCD-Linked-IEDs";
/// `Private/@type` holding an IED's label coordinates.
pub const COORDS_PRIVATE: &str = "OpenSCD-Coords";

/// `cNodeName` of an earthed pin.
pub const GROUNDED: &str = "grounded";

/// Namespaced attribute (or element) name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QName {
    pub ns: Option<SmolStr>,
    pub local: SmolStr,
}

impl QName {
    pub fn new(ns: Option<&str>, local: &str) -> Self {
        Self {
            ns: ns.map(SmolStr::new),
            local: SmolStr::new(local),
        }
    }

    /// Attribute without namespace (plain SCL attributes such as `name`).
    pub fn local(local: &str) -> Self {
        Self::new(None, local)
    }

    /// Attribute in the geometry namespace (`x`, `y`, `lx`, ...).
    pub fn geo(local: &str) -> Self {
        Self::new(Some(SLD_NS), local)
    }

    pub fn is_geo(&self) -> bool {
        self.ns.as_deref() == Some(SLD_NS)
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ns {
            Some(ns) => write!(f, "{{{ns}}}{}", self.local),
            None => f.write_str(&self.local),
        }
    }
}

/// Element kinds the diagram engine distinguishes. Everything else is [`Tag::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Scl,
    Substation,
    VoltageLevel,
    Bay,
    ConductingEquipment,
    PowerTransformer,
    TransformerWinding,
    ConnectivityNode,
    Terminal,
    NeutralPoint,
    Private,
    Ied,
    Text,
    Section,
    Vertex,
    IedName,
    Coords,
    Other,
}

impl Tag {
    pub fn classify(ns: Option<&str>, local: &str) -> Self {
        if ns == Some(SLD_NS) {
            return match local {
                "Section" => Self::Section,
                "Vertex" => Self::Vertex,
                "IEDName" => Self::IedName,
                "Coords" => Self::Coords,
                _ => Self::Other,
            };
        }
        match local {
            "SCL" => Self::Scl,
            "Substation" => Self::Substation,
            "VoltageLevel" => Self::VoltageLevel,
            "Bay" => Self::Bay,
            "ConductingEquipment" => Self::ConductingEquipment,
            "PowerTransformer" => Self::PowerTransformer,
            "TransformerWinding" => Self::TransformerWinding,
            "ConnectivityNode" => Self::ConnectivityNode,
            "Terminal" => Self::Terminal,
            "NeutralPoint" => Self::NeutralPoint,
            "Private" => Self::Private,
            "IED" => Self::Ied,
            "Text" => Self::Text,
            _ => Self::Other,
        }
    }

    /// Kinds that carry a sibling-unique SCL `name`.
    pub fn is_named_container(self) -> bool {
        matches!(
            self,
            Self::Substation
                | Self::VoltageLevel
                | Self::Bay
                | Self::ConductingEquipment
                | Self::PowerTransformer
                | Self::ConnectivityNode
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Terminal | Self::NeutralPoint)
    }

    pub fn is_equipment(self) -> bool {
        matches!(self, Self::ConductingEquipment | Self::PowerTransformer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    ns: Option<SmolStr>,
    local: SmolStr,
    tag: Tag,
    attributes: Vec<Attribute>,
}

impl Element {
    pub fn new(ns: Option<&str>, local: &str) -> Self {
        Self {
            ns: ns.map(SmolStr::new),
            local: SmolStr::new(local),
            tag: Tag::classify(ns, local),
            attributes: Vec::new(),
        }
    }

    pub fn scl(local: &str) -> Self {
        Self::new(Some(SCL_NS), local)
    }

    pub fn sld(local: &str) -> Self {
        Self::new(Some(SLD_NS), local)
    }

    pub fn with_attr(mut self, name: QName, value: impl Into<String>) -> Self {
        self.set(name, Some(value.into()));
        self
    }

    pub fn with_local(self, local: &str, value: impl Into<String>) -> Self {
        self.with_attr(QName::local(local), value)
    }

    pub fn with_geo(self, local: &str, value: impl Into<String>) -> Self {
        self.with_attr(QName::geo(local), value)
    }

    pub fn ns(&self) -> Option<&str> {
        self.ns.as_deref()
    }

    pub fn local_name(&self) -> &str {
        &self.local
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn get(&self, name: &QName) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| &attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    /// Plain (un-namespaced) attribute.
    pub fn attr(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name.ns.is_none() && attr.name.local == local)
            .map(|attr| attr.value.as_str())
    }

    /// Geometry-namespace attribute.
    pub fn geo(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name.is_geo() && attr.name.local == local)
            .map(|attr| attr.value.as_str())
    }

    pub fn name(&self) -> Option<&str> {
        self.attr("name")
    }

    /// Sets (`Some`) or clears (`None`) an attribute and returns the previous value.
    pub fn set(&mut self, name: QName, value: Option<String>) -> Option<String> {
        let position = self.attributes.iter().position(|attr| attr.name == name);
        match (position, value) {
            (Some(index), Some(value)) => {
                Some(std::mem::replace(&mut self.attributes[index].value, value))
            }
            (Some(index), None) => Some(self.attributes.remove(index).value),
            (None, Some(value)) => {
                self.attributes.push(Attribute { name, value });
                None
            }
            (None, None) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Element(Element),
    Text(String),
    Comment(String),
    ProcessingInstruction { target: String, value: Option<String> },
}

impl NodeData {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }
}
