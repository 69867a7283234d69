// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sld-designer and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence for SCL documents on disk.
//!
//! Reads parse the whole file; writes go to a temp file next to the target and are renamed into
//! place.

pub mod document_file;

pub use document_file::{DocumentFile, StoreError, WriteDurability};
