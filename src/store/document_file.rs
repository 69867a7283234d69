// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sld-designer and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info};

use crate::format::{export_scl, parse_scl, SclExportError, SclParseError};
use crate::model::Document;

#[derive(Debug)]
pub enum StoreError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Parse {
        path: PathBuf,
        source: Box<SclParseError>,
    },
    Export {
        path: PathBuf,
        source: SclExportError,
    },
    SymlinkRefused {
        path: PathBuf,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at {path:?}: {source}"),
            Self::Parse { path, source } => {
                write!(f, "cannot parse SCL document from {path:?}: {source}")
            }
            Self::Export { path, source } => {
                write!(f, "cannot export SCL document to {path:?}: {source}")
            }
            Self::SymlinkRefused { path } => {
                write!(f, "refusing to write through symlink at {path:?}")
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Export { source, .. } => Some(source),
            Self::SymlinkRefused { .. } => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Writes a temp file and renames it into place without syncing.
    #[default]
    BestEffort,

    /// Also syncs the temp file before the rename and the parent directory after it. Exact
    /// guarantees are platform/filesystem-dependent.
    Durable,
}

/// One SCL document on disk.
#[derive(Debug, Clone)]
pub struct DocumentFile {
    path: PathBuf,
    durability: WriteDurability,
}

impl DocumentFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            durability: WriteDurability::default(),
        }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Document, StoreError> {
        let input = fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        let doc = parse_scl(&input).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source: Box::new(source),
        })?;
        info!(path:? = self.path, nodes = doc.len(); "loaded document");
        Ok(doc)
    }

    pub fn save(&self, doc: &Document) -> Result<(), StoreError> {
        let xml = export_scl(doc).map_err(|source| StoreError::Export {
            path: self.path.clone(),
            source,
        })?;
        write_atomic(&self.path, xml.as_bytes(), self.durability)?;
        info!(path:? = self.path, rev = doc.rev(), bytes = xml.len(); "saved document");
        Ok(())
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// A temp file beside the target, removed on drop unless it was renamed into place.
struct PendingWrite {
    tmp: PathBuf,
    committed: bool,
}

impl Drop for PendingWrite {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.tmp);
        }
    }
}

fn refuse_symlink(path: &Path) -> Result<(), StoreError> {
    match fs::symlink_metadata(path) {
        Ok(md) if md.file_type().is_symlink() => Err(StoreError::SymlinkRefused {
            path: path.to_path_buf(),
        }),
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(io_error(path)(err)),
        _ => Ok(()),
    }
}

fn sync_dir(dir: &Path) -> Result<(), StoreError> {
    #[cfg(unix)]
    fs::File::open(dir)
        .and_then(|handle| handle.sync_all())
        .map_err(io_error(dir))?;
    #[cfg(not(unix))]
    let _ = dir;
    Ok(())
}

fn write_atomic(path: &Path, contents: &[u8], durability: WriteDurability) -> Result<(), StoreError> {
    refuse_symlink(path)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| io_error(path)(io::Error::other("path has no file name")))?;

    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let tmp = dir.join(format!(
        ".{}.{}-{stamp}.tmp",
        file_name.to_string_lossy(),
        std::process::id()
    ));
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp)
        .map_err(io_error(&tmp))?;
    let mut pending = PendingWrite {
        tmp,
        committed: false,
    };
    debug!(tmp:? = pending.tmp, durability:?; "writing temp file");

    file.write_all(contents).map_err(io_error(&pending.tmp))?;
    if durability == WriteDurability::Durable {
        file.sync_all().map_err(io_error(&pending.tmp))?;
    }
    drop(file);

    fs::rename(&pending.tmp, path).map_err(io_error(path))?;
    pending.committed = true;

    if durability == WriteDurability::Durable {
        sync_dir(dir)?;
    }
    Ok(())
}
