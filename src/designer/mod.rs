// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sld-designer and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Interaction state machine.
//!
//! A [`Designer`] owns the single active [`Mode`] and turns committed gestures into edit
//! batches, which it hands to an [`EditEmitter`]. No edit is emitted before a gesture commits,
//! so any mode can be cancelled without touching the document.

pub mod templates;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use smol_str::SmolStr;

use crate::layout::attributes::{
    label_updates, position_updates, positioning_target, rotation, size_updates, Geometry, Point,
};
use crate::layout::{
    connect, place, remove_terminal, ConnectRequest, ReferenceResolver, SclSchemaOrder,
};
use crate::model::{Document, Element, NodeId, Tag};
use crate::ops::{ApplyError, AttrUpdate, EditBatch, EditEmitter};
use crate::query;

pub use templates::{instantiate, EquipmentType, Template, TransformerKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignerConfig {
    /// Pixels per grid cell.
    pub grid_size: u32,
    /// Prefix bound to the diagram namespace when the document has none.
    pub geometry_prefix: SmolStr,
    pub zoom_step: u32,
    pub min_grid_size: u32,
}

impl Default for DesignerConfig {
    fn default() -> Self {
        Self {
            grid_size: 32,
            geometry_prefix: SmolStr::new_static(crate::model::DEFAULT_SLD_PREFIX),
            zoom_step: 3,
            min_grid_size: 2,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DesignerError {
    #[error("failed to apply edits: {0}")]
    Apply(#[from] ApplyError),
    #[error("element {element} has no positioning target")]
    MissingTarget { element: NodeId },
    #[error("no connection is in progress")]
    NotConnecting,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Mode {
    #[default]
    Idle,
    Placing {
        element: NodeId,
        offset: Point,
    },
    PlacingLabel {
        element: NodeId,
        offset: Point,
    },
    ResizingTopLeft {
        element: NodeId,
    },
    ResizingBottomRight {
        element: NodeId,
    },
    Connecting {
        from: NodeId,
        from_terminal: SmolStr,
        path: SmallVec<[Point; 8]>,
    },
}

#[derive(Debug, Clone)]
pub struct Designer<R = SclSchemaOrder> {
    config: DesignerConfig,
    resolver: R,
    mode: Mode,
    grid_size: u32,
    observed_rev: Option<u64>,
}

impl Designer<SclSchemaOrder> {
    pub fn new(config: DesignerConfig) -> Self {
        Self::with_resolver(config, SclSchemaOrder)
    }
}

impl Default for Designer<SclSchemaOrder> {
    fn default() -> Self {
        Self::new(DesignerConfig::default())
    }
}

impl<R: ReferenceResolver> Designer<R> {
    pub fn with_resolver(config: DesignerConfig, resolver: R) -> Self {
        let grid_size = config.grid_size.max(config.min_grid_size);
        Self {
            config,
            resolver,
            mode: Mode::Idle,
            grid_size,
            observed_rev: None,
        }
    }

    pub fn config(&self) -> &DesignerConfig {
        &self.config
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn grid_size(&self) -> u32 {
        self.grid_size
    }

    /// Prepares `doc` for editing: binds the diagram namespace prefix (keeping an existing one)
    /// and forgets any gesture in progress.
    pub fn open(&mut self, doc: &mut Document) -> SmolStr {
        let prefix = doc.ensure_geometry_prefix(&self.config.geometry_prefix);
        self.mode = Mode::Idle;
        self.observed_rev = Some(doc.rev());
        info!(prefix = prefix.as_str(), rev = doc.rev(); "opened document");
        prefix
    }

    fn set_mode(&mut self, mode: Mode) {
        debug!(mode:?; "mode change");
        self.mode = mode;
    }

    pub fn cancel(&mut self) {
        self.set_mode(Mode::Idle);
    }

    pub fn start_placing(&mut self, element: NodeId, offset: Point) {
        self.set_mode(Mode::Placing { element, offset });
    }

    pub fn start_placing_label(&mut self, element: NodeId, offset: Point) {
        self.set_mode(Mode::PlacingLabel { element, offset });
    }

    pub fn start_resizing_top_left(&mut self, element: NodeId) {
        self.set_mode(Mode::ResizingTopLeft { element });
    }

    pub fn start_resizing_bottom_right(&mut self, element: NodeId) {
        self.set_mode(Mode::ResizingBottomRight { element });
    }

    pub fn start_connecting(
        &mut self,
        from: NodeId,
        from_terminal: impl Into<SmolStr>,
        path: SmallVec<[Point; 8]>,
    ) {
        self.set_mode(Mode::Connecting {
            from,
            from_terminal: from_terminal.into(),
            path,
        });
    }

    /// Reacts to document changes made elsewhere (other gestures, undo, redo).
    ///
    /// A changed revision drops an in-progress connection, and drops bottom-right resizing or
    /// label placement whose element is no longer in the document.
    pub fn observe_edit_count(&mut self, doc: &Document) {
        if self.observed_rev == Some(doc.rev()) {
            return;
        }
        self.observed_rev = Some(doc.rev());
        let stale = match &self.mode {
            Mode::Connecting { .. } => true,
            Mode::ResizingBottomRight { element } | Mode::PlacingLabel { element, .. } => {
                !doc.is_attached(*element)
            }
            _ => false,
        };
        if stale {
            self.set_mode(Mode::Idle);
        }
    }

    pub fn zoom_in(&mut self) -> u32 {
        self.grid_size = self.grid_size.saturating_add(self.config.zoom_step);
        self.grid_size
    }

    pub fn zoom_out(&mut self) -> u32 {
        self.grid_size = self
            .grid_size
            .saturating_sub(self.config.zoom_step)
            .max(self.config.min_grid_size);
        self.grid_size
    }

    /// Commits a placement and returns the emitted batches (geometry, then IEDName wrapping).
    ///
    /// A Bay or VoltageLevel still lacking `w` or `h` afterwards goes straight into bottom-right
    /// resizing.
    pub fn place<E: EditEmitter + ?Sized>(
        &mut self,
        doc: &mut Document,
        emitter: &mut E,
        element: NodeId,
        parent: NodeId,
        target: Point,
    ) -> Result<Vec<EditBatch>, DesignerError> {
        let placement = place(doc, &self.resolver, element, parent, target);
        let mut emitted = vec![self.emit(doc, emitter, placement.edits)?];
        if let Some(follow_up) = placement.follow_up {
            let wrap = follow_up.wrap_linked_ied(doc, &self.resolver);
            if !wrap.is_empty() {
                emitted.push(self.emit(doc, emitter, wrap)?);
            }
        }

        let needs_size = matches!(doc.tag(element), Tag::Bay | Tag::VoltageLevel)
            && (doc.geo(element, "w").is_none() || doc.geo(element, "h").is_none());
        if needs_size {
            self.set_mode(Mode::ResizingBottomRight { element });
        } else {
            self.set_mode(Mode::Idle);
        }
        Ok(emitted)
    }

    /// Request that finishes the connection started with [`Designer::start_connecting`].
    pub fn connecting_request(
        &self,
        to: NodeId,
        to_terminal: Option<SmolStr>,
    ) -> Result<ConnectRequest, DesignerError> {
        match &self.mode {
            Mode::Connecting {
                from,
                from_terminal,
                path,
            } => Ok(ConnectRequest {
                from: *from,
                from_terminal: from_terminal.clone(),
                to,
                to_terminal,
                path: path.clone(),
            }),
            _ => Err(DesignerError::NotConnecting),
        }
    }

    pub fn connect<E: EditEmitter + ?Sized>(
        &mut self,
        doc: &mut Document,
        emitter: &mut E,
        request: &ConnectRequest,
    ) -> Result<EditBatch, DesignerError> {
        let batch = connect(doc, &self.resolver, request);
        self.set_mode(Mode::Idle);
        self.emit(doc, emitter, batch)
    }

    /// Turns the element a quarter clockwise. Equipment loses its non-grounded pins.
    pub fn rotate<E: EditEmitter + ?Sized>(
        &mut self,
        doc: &mut Document,
        emitter: &mut E,
        element: NodeId,
    ) -> Result<EditBatch, DesignerError> {
        let target = positioning_target(doc, element)
            .ok_or(DesignerError::MissingTarget { element })?;
        let next = rotation(doc, target).next();
        let mut batch = EditBatch::new();
        batch.update(
            target,
            vec![AttrUpdate::geo("rot", next.quarter_turns().to_string())],
        );
        if doc.tag(element).is_equipment() {
            let pins = doc.descendants_tagged(element, &[Tag::Terminal, Tag::NeutralPoint]);
            for pin in pins {
                if !query::is_grounded(doc, pin) {
                    batch.extend(remove_terminal(doc, pin));
                }
            }
        }
        self.emit(doc, emitter, batch)
    }

    pub fn place_label<E: EditEmitter + ?Sized>(
        &mut self,
        doc: &mut Document,
        emitter: &mut E,
        element: NodeId,
        label: Point,
    ) -> Result<EditBatch, DesignerError> {
        let target = positioning_target(doc, element)
            .ok_or(DesignerError::MissingTarget { element })?;
        let mut batch = EditBatch::new();
        batch.update(target, label_updates(label));
        self.set_mode(Mode::Idle);
        self.emit(doc, emitter, batch)
    }

    pub fn resize<E: EditEmitter + ?Sized>(
        &mut self,
        doc: &mut Document,
        emitter: &mut E,
        element: NodeId,
        w: f64,
        h: f64,
    ) -> Result<EditBatch, DesignerError> {
        let mut batch = EditBatch::new();
        batch.update(element, size_updates(w, h));
        self.set_mode(Mode::Idle);
        self.emit(doc, emitter, batch)
    }

    /// Moves the top-left corner. A label sitting on the old corner moves along with it.
    pub fn resize_top_left<E: EditEmitter + ?Sized>(
        &mut self,
        doc: &mut Document,
        emitter: &mut E,
        element: NodeId,
        corner: Point,
        w: f64,
        h: f64,
    ) -> Result<EditBatch, DesignerError> {
        let geometry = Geometry::of(doc, element);
        let mut label = geometry.label;
        if label == geometry.pos {
            let (dx, dy) = corner.delta_from(geometry.pos);
            label = label.translate(dx, dy);
        }
        let mut updates = position_updates(corner);
        updates.extend(size_updates(w, h));
        updates.extend(label_updates(label));
        let mut batch = EditBatch::new();
        batch.update(element, updates);
        self.set_mode(Mode::Idle);
        self.emit(doc, emitter, batch)
    }

    /// Adds a sized Substation `S<n>` under the root.
    pub fn insert_substation<E: EditEmitter + ?Sized>(
        &mut self,
        doc: &mut Document,
        emitter: &mut E,
    ) -> Result<NodeId, DesignerError> {
        let root = doc.root();
        let taken = |doc: &Document, name: &str| {
            doc.child_elements(root)
                .any(|child| doc.tag(child) == Tag::Substation && doc.name(child) == Some(name))
        };
        let mut index = 1_u32;
        while taken(doc, &format!("S{index}")) {
            index += 1;
        }
        let substation = doc.alloc(
            Element::scl("Substation")
                .with_local("name", format!("S{index}"))
                .with_geo("w", "50")
                .with_geo("h", "25"),
        );
        let mut batch = EditBatch::new();
        batch.insert(
            substation,
            root,
            self.resolver.reference(doc, root, "Substation"),
        );
        self.emit(doc, emitter, batch)?;
        Ok(substation)
    }

    fn emit<E: EditEmitter + ?Sized>(
        &mut self,
        doc: &mut Document,
        emitter: &mut E,
        batch: EditBatch,
    ) -> Result<EditBatch, DesignerError> {
        let result = emitter.emit(doc, batch.clone())?;
        debug!(applied = result.applied, rev = result.new_rev; "emitted batch");
        self.observed_rev = Some(doc.rev());
        Ok(batch)
    }
}

/// The IEDName linking `name` anywhere in the document, or a new detached one.
pub fn insert_or_get_ied(doc: &mut Document, name: &str) -> NodeId {
    let root = doc.root();
    let existing = doc
        .descendants_tagged(root, &[Tag::IedName])
        .into_iter()
        .find(|linked| doc.geo(*linked, "name") == Some(name));
    match existing {
        Some(linked) => linked,
        None => doc.alloc(Element::sld("IEDName").with_geo("name", name)),
    }
}
