// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sld-designer and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Geometry and connectivity algorithms for single-line diagrams.
//!
//! Every entry point computes an [`EditBatch`](crate::ops::EditBatch) against the current
//! document and leaves the tree untouched; new nodes are allocated detached and attached by the
//! batch once it is applied.

pub mod attributes;
pub mod bus_bar;
pub mod connection;
pub mod placement;
pub mod reference;
pub mod removal;
pub mod reparent;

pub use attributes::{Geometry, Point, Rotation, Size};
pub use bus_bar::drag_vertex;
pub use connection::{connect, cut_section_at, ConnectRequest};
pub use placement::{place, FollowUp, Placement};
pub use reference::{ReferenceResolver, SclSchemaOrder};
pub use removal::{remove_node, remove_terminal};
pub use reparent::{reparent, Reparent};
