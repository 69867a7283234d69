// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sld-designer and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Blank elements handed to the placement gesture.

use std::fmt;
use std::str::FromStr;

use log::error;
use serde::{Deserialize, Serialize};

use crate::model::{Document, Element, NodeId, LAYOUT_PRIVATE};

/// Conducting-equipment type codes offered for placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EquipmentType {
    Cab,
    Cap,
    Cbr,
    Ctr,
    Dis,
    Gen,
    Ifl,
    Lin,
    Mot,
    Rea,
    Res,
    Sar,
    Smc,
    Vtr,
}

impl EquipmentType {
    pub const ALL: [Self; 14] = [
        Self::Cab,
        Self::Cap,
        Self::Cbr,
        Self::Ctr,
        Self::Dis,
        Self::Gen,
        Self::Ifl,
        Self::Lin,
        Self::Mot,
        Self::Rea,
        Self::Res,
        Self::Sar,
        Self::Smc,
        Self::Vtr,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::Cab => "CAB",
            Self::Cap => "CAP",
            Self::Cbr => "CBR",
            Self::Ctr => "CTR",
            Self::Dis => "DIS",
            Self::Gen => "GEN",
            Self::Ifl => "IFL",
            Self::Lin => "LIN",
            Self::Mot => "MOT",
            Self::Rea => "REA",
            Self::Res => "RES",
            Self::Sar => "SAR",
            Self::Smc => "SMC",
            Self::Vtr => "VTR",
        }
    }
}

impl fmt::Display for EquipmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEquipmentType(pub String);

impl fmt::Display for UnknownEquipmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown equipment type: {}", self.0)
    }
}

impl std::error::Error for UnknownEquipmentType {}

impl FromStr for EquipmentType {
    type Err = UnknownEquipmentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownEquipmentType(s.to_owned()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformerKind {
    SingleWindingAuto,
    TwoWindingAuto,
    TwoWinding,
    ThreeWinding,
    SingleWindingEarthing,
    TwoWindingEarthing,
}

impl TransformerKind {
    fn windings(self) -> u8 {
        match self {
            Self::SingleWindingAuto | Self::SingleWindingEarthing => 1,
            Self::TwoWindingAuto | Self::TwoWinding | Self::TwoWindingEarthing => 2,
            Self::ThreeWinding => 3,
        }
    }

    fn kind(self) -> Option<&'static str> {
        match self {
            Self::SingleWindingAuto | Self::TwoWindingAuto => Some("auto"),
            Self::SingleWindingEarthing | Self::TwoWindingEarthing => Some("earthing"),
            Self::TwoWinding | Self::ThreeWinding => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "template", content = "variant", rename_all = "snake_case")]
pub enum Template {
    Substation,
    VoltageLevel,
    Bay,
    Equipment(EquipmentType),
    BusBar,
    Transformer(TransformerKind),
}

/// Allocates a detached, unplaced element for `template`.
pub fn instantiate(doc: &mut Document, template: Template) -> NodeId {
    match template {
        Template::Substation => doc.alloc(Element::scl("Substation")),
        Template::VoltageLevel => doc.alloc(Element::scl("VoltageLevel")),
        Template::Bay => doc.alloc(Element::scl("Bay")),
        Template::Equipment(kind) => {
            doc.alloc(Element::scl("ConductingEquipment").with_local("type", kind.code()))
        }
        Template::BusBar => bus_bar(doc),
        Template::Transformer(kind) => transformer(doc, kind),
    }
}

fn bus_bar(doc: &mut Document) -> NodeId {
    let bay = doc.alloc(
        Element::scl("Bay")
            .with_local("name", "BB1")
            .with_geo("w", "2"),
    );
    let chain = [
        Element::scl("ConnectivityNode").with_local("name", "L"),
        Element::scl("Private").with_local("type", LAYOUT_PRIVATE),
        Element::sld("Section").with_local("bus", "true"),
    ];
    let mut parent = bay;
    for element in chain {
        parent = attach(doc, parent, element);
    }
    for x in ["0.5", "1.5"] {
        attach(
            doc,
            parent,
            Element::sld("Vertex").with_geo("x", x).with_geo("y", "0.5"),
        );
    }
    bay
}

fn transformer(doc: &mut Document, kind: TransformerKind) -> NodeId {
    let mut element = Element::scl("PowerTransformer").with_local("type", "PTR");
    if let Some(value) = kind.kind() {
        element = element.with_geo("kind", value);
    }
    if kind == TransformerKind::SingleWindingAuto {
        element = element.with_geo("rot", "3");
    }
    let transformer = doc.alloc(element);
    for index in 1..=kind.windings() {
        attach(
            doc,
            transformer,
            Element::scl("TransformerWinding")
                .with_local("name", format!("W{index}"))
                .with_local("type", "PTW"),
        );
    }
    transformer
}

// Template parents are freshly allocated elements; attaching to them cannot fail.
fn attach(doc: &mut Document, parent: NodeId, element: Element) -> NodeId {
    let child = doc.alloc(element);
    if let Err(error) = doc.append_child(parent, child) {
        error!(parent:?, error:?; "template assembly failed");
    }
    child
}
