// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sld-designer and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Document format parsing/export.
//!
//! SCL XML in (`roxmltree`), SCL XML out (`quick_xml`). Whitespace-only text and anything
//! outside the root element are not preserved.

pub mod scl;

pub use scl::{export_scl, parse_scl, SclExportError, SclParseError};
