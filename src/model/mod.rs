// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sld-designer and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! SCL document model.
//!
//! A [`Document`] is an arena of XML nodes with an incremental connectivity index. Geometry lives
//! in attributes of the SLD namespace; nothing outside the tree is persisted.

pub mod document;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod ids;
pub mod index;
pub mod node;

pub use document::{Document, DocumentError, NamespaceBinding, Position};
pub use ids::{ContainerNames, NodeId, PathName, PathNameError};
pub use index::ConnectivityIndex;
pub use node::{
    Attribute, Element, NodeData, QName, Tag, COORDS_PRIVATE, DEFAULT_SLD_PREFIX, GROUNDED,
    LAYOUT_PRIVATE, LINKED_IEDS_PRIVATE, SCL_NS, SLD_NS, XMLNS_NS,
};
