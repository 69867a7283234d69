// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sld-designer and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Handle of a node inside a [`Document`](super::Document) arena.
///
/// Handles stay valid for the lifetime of the document: removed nodes are detached, never freed,
/// so undo batches can re-insert them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(u32::try_from(index).unwrap_or(u32::MAX))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hierarchical ConnectivityNode identifier: `substation/voltageLevel/bay/name`.
///
/// Only non-empty `/`-separated segments are enforced; a node that lives directly under a
/// voltage level simply has fewer segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathName {
    value: String,
}

impl PathName {
    pub fn new(value: impl Into<String>) -> Result<Self, PathNameError> {
        let value = value.into();
        validate_path_name(&value)?;
        Ok(Self { value })
    }

    pub fn from_segments<'a>(
        segments: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, PathNameError> {
        let value = segments.into_iter().collect::<Vec<_>>().join("/");
        Self::new(value)
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.value.split('/')
    }

    /// Last segment, i.e. the ConnectivityNode's own `name`.
    pub fn node_name(&self) -> &str {
        self.value.rsplit('/').next().unwrap_or(&self.value)
    }

    /// The three leading segments copied onto every Terminal referencing this node.
    pub fn containers(&self) -> ContainerNames {
        let mut segments = self.segments();
        ContainerNames {
            substation: segments.next().map(SmolStr::new),
            voltage_level: segments.next().map(SmolStr::new),
            bay: segments.next().map(SmolStr::new),
        }
    }

    pub fn into_string(self) -> String {
        self.value
    }
}

impl fmt::Display for PathName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl AsRef<str> for PathName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl FromStr for PathName {
    type Err = PathNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_owned())
    }
}

/// Substation/voltage level/bay names redundantly stored on Terminals and NeutralPoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerNames {
    pub substation: Option<SmolStr>,
    pub voltage_level: Option<SmolStr>,
    pub bay: Option<SmolStr>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathNameError {
    #[error("path name must not be empty")]
    Empty,
    #[error("path name segment {index} is empty")]
    EmptySegment { index: usize },
}

fn validate_path_name(value: &str) -> Result<(), PathNameError> {
    if value.is_empty() {
        return Err(PathNameError::Empty);
    }
    if let Some(index) = value.split('/').position(str::is_empty) {
        return Err(PathNameError::EmptySegment { index });
    }
    Ok(())
}
