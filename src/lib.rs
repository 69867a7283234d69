// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sld-designer and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! sld-designer: single-line diagram geometry and connectivity over SCL documents.
//!
//! Diagram geometry lives in namespaced attributes of the SCL tree itself. Every gesture is
//! computed as an [`ops::EditBatch`] and applied atomically, so hosts get undo for free.

pub mod designer;
pub mod format;
pub mod layout;
pub mod model;
pub mod ops;
pub mod query;
pub mod store;
