// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sld-designer and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Positioned-geometry attributes.
//!
//! Geometry is stored as attributes of the SLD namespace (`x`, `y`, `w`, `h`, `rot`, `lx`, `ly`).
//! Reading is lenient: absent or unparsable values fall back to defaults, so layout code never
//! fails on a half-annotated document.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{Document, NodeId, Tag};
use crate::ops::AttrUpdate;
use crate::query;

/// Grid coordinate. Integral for positioned elements, `.5` offsets for bus-bar vertices.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn translate(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Offset that moves `from` onto `self`.
    pub fn delta_from(self, from: Point) -> (f64, f64) {
        (self.x - from.x, self.y - from.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", format_coord(self.x), format_coord(self.y))
    }
}

/// Quarter turns, always in `0..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Rotation(u8);

impl Rotation {
    pub fn new(quarter_turns: i64) -> Self {
        Self(quarter_turns.rem_euclid(4) as u8)
    }

    pub fn quarter_turns(self) -> u8 {
        self.0
    }

    pub fn next(self) -> Self {
        Self((self.0 + 1) % 4)
    }

    pub fn is_even(self) -> bool {
        self.0 % 2 == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub w: f64,
    pub h: f64,
}

impl Default for Size {
    fn default() -> Self {
        Self { w: 1.0, h: 1.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Geometry {
    pub pos: Point,
    pub dim: Size,
    /// Label anchor; equals `pos` unless `lx`/`ly` are stored.
    pub label: Point,
    pub rot: Rotation,
    pub bus: bool,
    /// Whether `lx` is stored. First-placement label rules only apply when it is not.
    pub has_label: bool,
}

impl Geometry {
    pub fn of(doc: &Document, node: NodeId) -> Self {
        let number = |local: &str| parse_coord(doc.geo(node, local));
        let pos = Point::new(
            number("x").unwrap_or(0.0).max(0.0),
            number("y").unwrap_or(0.0).max(0.0),
        );
        let dim = Size {
            w: number("w").unwrap_or(1.0).max(1.0),
            h: number("h").unwrap_or(1.0).max(1.0),
        };
        let label = Point::new(
            number("lx").unwrap_or(pos.x),
            number("ly").unwrap_or(pos.y),
        );
        Self {
            pos,
            dim,
            label,
            rot: parse_rotation(doc.geo(node, "rot")),
            bus: matches!(doc.attr(node, "bus"), Some("true") | Some("1")),
            has_label: number("lx").is_some(),
        }
    }
}

pub fn rotation(doc: &Document, target: NodeId) -> Rotation {
    parse_rotation(doc.geo(target, "rot"))
}

fn parse_coord(value: Option<&str>) -> Option<f64> {
    value?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

fn parse_rotation(value: Option<&str>) -> Rotation {
    parse_coord(value).map_or_else(Rotation::default, |turns| Rotation::new(turns.trunc() as i64))
}

/// Node whose attributes carry `node`'s position.
///
/// A `Text` of an `IED` is positioned by the `Coords` record in the IED's `OpenSCD-Coords`
/// Private and yields `None` while that record is missing. Every other node positions itself.
pub fn positioning_target(doc: &Document, node: NodeId) -> Option<NodeId> {
    if doc.tag(node) == Tag::Text {
        if let Some(ied) = doc.parent(node).filter(|parent| doc.tag(*parent) == Tag::Ied) {
            return query::coords_of(doc, ied);
        }
    }
    Some(node)
}

/// Base-10 integer when integral, shortest decimal otherwise.
pub fn format_coord(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
        let mut buffer = itoa::Buffer::new();
        return buffer.format(value as i64).to_owned();
    }
    value.to_string()
}

pub fn position_updates(pos: Point) -> Vec<AttrUpdate> {
    vec![
        AttrUpdate::geo("x", format_coord(pos.x)),
        AttrUpdate::geo("y", format_coord(pos.y)),
    ]
}

pub fn label_updates(label: Point) -> Vec<AttrUpdate> {
    vec![
        AttrUpdate::geo("lx", format_coord(label.x)),
        AttrUpdate::geo("ly", format_coord(label.y)),
    ]
}

pub fn size_updates(w: f64, h: f64) -> Vec<AttrUpdate> {
    vec![
        AttrUpdate::geo("w", format_coord(w)),
        AttrUpdate::geo("h", format_coord(h)),
    ]
}
