// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sld-designer and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use std::fmt::Write as _;

use sld_designer::format::parse_scl;
use sld_designer::model::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Small,
    Medium,
    Large,
}

impl Case {
    pub fn id(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }

    pub fn bays(self) -> usize {
        match self {
            Self::Small => 4,
            Self::Medium => 32,
            Self::Large => 256,
        }
    }
}

/// Bay origin; feeder bays sit side by side, 4 cells apart, below the bus bar.
pub fn bay_x(index: usize) -> usize {
    2 + 4 * index
}

fn terminal(out: &mut String, name: &str, bay: &str, cnode: &str) {
    let _ = write!(
        out,
        r#"<Terminal name="{name}" connectivityNode="S1/V1/{bay}/{cnode}" substationName="S1" voltageLevelName="V1" bayName="{bay}" cNodeName="{cnode}"/>"#
    );
}

/// One voltage level with a bus bar (`BB1`) and `bays` feeders `B1..`, each holding a
/// disconnector `QB1` on the bus and a breaker `QA1` joined to it by node `L1`.
pub fn scl(bays: usize) -> String {
    let width = bay_x(bays) + 2;
    let mut out = String::with_capacity(1024 + bays * 1024);
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    out.push_str(
        r#"<SCL xmlns="http://www.iec.ch/61850/2003/SCL" xmlns:esld="https://openscd.org/SCL/SSD/SLD/v0" version="2007">"#,
    );
    let _ = write!(
        out,
        r#"<Substation name="S1" esld:x="0" esld:y="0" esld:w="{}" esld:h="20">"#,
        width + 2
    );
    let _ = write!(
        out,
        r#"<VoltageLevel name="V1" esld:x="1" esld:y="1" esld:w="{width}" esld:h="16">"#
    );
    let _ = write!(
        out,
        r#"<Bay name="BB1" esld:x="2" esld:y="2" esld:w="{}" esld:h="1"><ConnectivityNode name="L" pathName="S1/V1/BB1/L"><Private type="OpenSCD-SLD-Layout"><esld:Section bus="true"><esld:Vertex esld:x="2.5" esld:y="2.5"/><esld:Vertex esld:x="{}.5" esld:y="2.5"/></esld:Section></Private></ConnectivityNode></Bay>"#,
        width - 2,
        width - 1
    );
    for index in 0..bays {
        let x = bay_x(index);
        let bay = format!("B{}", index + 1);
        let _ = write!(
            out,
            r#"<Bay name="{bay}" esld:x="{x}" esld:y="4" esld:w="3" esld:h="8">"#
        );
        let _ = write!(
            out,
            r#"<ConductingEquipment name="QB1" type="DIS" esld:x="{}" esld:y="5">"#,
            x + 1
        );
        out.push_str(
            r#"<Terminal name="T1" connectivityNode="S1/V1/BB1/L" substationName="S1" voltageLevelName="V1" bayName="BB1" cNodeName="L"/>"#,
        );
        terminal(&mut out, "T2", &bay, "L1");
        out.push_str("</ConductingEquipment>");
        let _ = write!(
            out,
            r#"<ConductingEquipment name="QA1" type="CBR" esld:x="{}" esld:y="7">"#,
            x + 1
        );
        terminal(&mut out, "T1", &bay, "L1");
        out.push_str("</ConductingEquipment>");
        let _ = write!(
            out,
            r#"<ConnectivityNode name="L1" pathName="S1/V1/{bay}/L1"><Private type="OpenSCD-SLD-Layout"><esld:Section><esld:Vertex esld:x="{cx}.5" esld:y="6"/><esld:Vertex esld:x="{cx}.5" esld:y="7"/></esld:Section></Private></ConnectivityNode>"#,
            cx = x + 1
        );
        out.push_str("</Bay>");
    }
    out.push_str("</VoltageLevel></Substation></SCL>");
    out
}

pub fn document(case: Case) -> Document {
    parse_scl(&scl(case.bays())).expect("bench fixture parses")
}
