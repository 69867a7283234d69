// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sld-designer and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Read-only queries over SCL documents.
//!
//! Lookups the layout algorithms share: name paths, typed Private blocks, bus-bar sections and
//! the IED label records.

pub mod scl;

pub use scl::{
    bus_sections, child_private, containers_of, coords_of, element_path, find_by_name_path,
    ied_by_name, ied_text, is_bus_bar, is_bus_section, is_grounded, layout_private,
    section_vertices,
};
