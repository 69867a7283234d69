// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sld-designer and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Bus-bar backbone drag.
//!
//! | attribute | role |
//! |---|---|
//! | first vertex of the first bus Section | fixed anchor `(x1, y1)` |
//! | last vertex of the last bus Section | dragged input |
//! | Bay `w`, `h` | derived: `x - x1 + 1`, `y - y1 + 1` |

use log::debug;

use super::attributes::{position_updates, size_updates, Geometry, Point};
use super::removal::remove_node;
use crate::model::{Document, NodeId, Tag};
use crate::ops::EditBatch;
use crate::query;

/// Edits for dragging a bus-bar's trailing vertex to `target`.
///
/// Empty when the vertex is not part of a bus bar or when `target` is an endpoint of the
/// vertex's own Section.
pub fn drag_vertex(doc: &Document, vertex: NodeId, target: Point) -> EditBatch {
    let mut edits = EditBatch::new();
    let Some(bay) = doc.closest(vertex, Tag::Bay) else {
        return edits;
    };
    let sections = query::bus_sections(doc, bay);
    let (Some(first_section), Some(last_section)) = (sections.first(), sections.last()) else {
        return edits;
    };
    let Some(first_vertex) = query::section_vertices(doc, *first_section).first().copied() else {
        return edits;
    };
    let Some(last_vertex) = query::section_vertices(doc, *last_section).last().copied() else {
        return edits;
    };

    let Some(own_section) = doc.closest(vertex, Tag::Section) else {
        return edits;
    };
    let own = query::section_vertices(doc, own_section);
    let at_endpoint = [own.first(), own.last()]
        .into_iter()
        .flatten()
        .any(|endpoint| Geometry::of(doc, *endpoint).pos == target);
    if at_endpoint {
        return edits;
    }

    let anchor = Geometry::of(doc, first_vertex).pos;

    if let Some(cnode) = doc.closest(*first_section, Tag::ConnectivityNode) {
        edits.extend(remove_node(doc, cnode));
    }
    edits.update(last_vertex, position_updates(target));
    let w = target.x - anchor.x + 1.0;
    let h = target.y - anchor.y + 1.0;
    edits.update(bay, size_updates(w, h));
    debug!(bay:?, w, h; "resized bus bar");
    edits
}

#[cfg(test)]
mod tests {
    use super::drag_vertex;
    use crate::designer::templates::{instantiate, Template};
    use crate::layout::attributes::Point;
    use crate::model::fixtures::substation;
    use crate::model::{Document, Element, QName, Tag};
    use crate::ops::Edit;
    use crate::query;

    #[test]
    fn dragging_the_template_backbone_resizes_the_bay() {
        let mut doc = Document::new_scl();
        let bay = instantiate(&mut doc, Template::BusBar);
        let section = query::bus_sections(&doc, bay)[0];
        let vertices = query::section_vertices(&doc, section);
        let trailing = vertices[1];

        let batch = drag_vertex(&doc, trailing, Point::new(10.5, 0.5));

        assert_eq!(batch.assigned(trailing, &QName::geo("x")), Some("10.5"));
        assert_eq!(batch.assigned(trailing, &QName::geo("y")), Some("0.5"));
        assert_eq!(batch.assigned(bay, &QName::geo("w")), Some("11"));
        assert_eq!(batch.assigned(bay, &QName::geo("h")), Some("1"));
    }

    #[test]
    fn dragging_onto_an_endpoint_is_a_no_op() {
        let fx = substation();
        let vertices = query::section_vertices(&fx.doc, fx.bus_section);
        assert!(drag_vertex(&fx.doc, vertices[1], Point::new(2.5, 2.5)).is_empty());
        assert!(drag_vertex(&fx.doc, vertices[1], Point::new(11.5, 2.5)).is_empty());
    }

    #[test]
    fn endpoints_are_those_of_the_dragged_section() {
        let mut doc = Document::new_scl();
        let bay = instantiate(&mut doc, Template::BusBar);
        let first = query::bus_sections(&doc, bay)[0];
        let layout = doc.parent(first).expect("layout private");
        let second = doc
            .alloc_child(layout, Element::sld("Section").with_local("bus", "true"))
            .expect("second section");
        for x in ["1.5", "4.5"] {
            doc.alloc_child(
                second,
                Element::sld("Vertex").with_geo("x", x).with_geo("y", "0.5"),
            )
            .expect("vertex");
        }
        let trailing = query::section_vertices(&doc, second)[1];

        assert!(drag_vertex(&doc, trailing, Point::new(1.5, 0.5)).is_empty());

        let batch = drag_vertex(&doc, trailing, Point::new(0.5, 0.5));
        assert_eq!(batch.assigned(trailing, &QName::geo("x")), Some("0.5"));
        assert_eq!(batch.assigned(bay, &QName::geo("w")), Some("1"));
    }

    #[test]
    fn drag_drops_feeder_routes_but_keeps_the_node() {
        let fx = substation();
        let vertices = query::section_vertices(&fx.doc, fx.bus_section);

        let batch = drag_vertex(&fx.doc, vertices[1], Point::new(15.5, 2.5));

        let removed = batch
            .iter()
            .filter_map(|edit| match edit {
                Edit::Remove { node } => Some(*node),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert!(removed.contains(&fx.breaker_t2));
        assert!(!removed.contains(&fx.bus_node));
        assert!(removed
            .iter()
            .all(|node| fx.doc.tag(*node) == Tag::Section || *node == fx.breaker_t2));
        assert_eq!(batch.assigned(fx.bus_bay, &QName::geo("w")), Some("14"));
    }

    #[test]
    fn vertices_outside_bus_bars_are_ignored() {
        let fx = substation();
        let route = fx.doc.descendants_tagged(fx.node, &[Tag::Vertex])[0];
        assert!(drag_vertex(&fx.doc, route, Point::new(9.0, 9.0)).is_empty());
    }
}
