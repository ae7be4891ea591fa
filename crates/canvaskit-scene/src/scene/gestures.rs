//! Gesture lifecycles for the scene.
//!
//! Updates only mutate placements and flag stale connections; the document
//! is saved once per gesture, on end.

use canvaskit_core::{
    AppEvent, ConnectionEvent, ElementId, GestureError, GestureKind, Result, TransformEvent,
};
use chrono::Utc;

use super::Scene;
use crate::geometry::Point;
use crate::transform::ResizeDelta;

impl Scene {
    // Common checks before any gesture starts; aborts the running one.
    fn prepare_gesture(&mut self, kind: GestureKind) -> Result<()> {
        self.ensure_editing()?;
        if kind == GestureKind::Drag && self.selection.is_editing() {
            return Err(GestureError::EditModeActive.into());
        }
        self.abort_gesture();
        Ok(())
    }

    /// Abandons the active gesture without saving.
    pub fn abort_gesture(&mut self) -> Option<GestureKind> {
        let controls_were_enabled = self.transforms.controls_enabled();
        let kind = self.transforms.abort(&mut self.tree)?;
        if !controls_were_enabled && self.transforms.controls_enabled() {
            self.emit(AppEvent::Transform(TransformEvent::ControlsEnabled { enabled: true }));
        }
        Some(kind)
    }

    fn emit_started(&self, kind: GestureKind, targets: &[ElementId]) {
        self.emit(AppEvent::Transform(TransformEvent::Started {
            kind,
            targets: targets.to_vec(),
        }));
    }

    // One staleness notification per update, however many elements moved.
    fn flag_stale_connections(&self, moved: &[ElementId]) -> bool {
        if self.connections.is_empty() {
            return false;
        }
        let stale = moved.iter().any(|id| {
            self.tree
                .depth_first(*id)
                .into_iter()
                .any(|e| self.connections.connections_need_update(&self.tree, e))
        });
        if stale {
            self.emit(AppEvent::Connection(ConnectionEvent::NeedsUpdate {
                elements: moved.to_vec(),
            }));
        }
        stale
    }

    // Commits a finished gesture.
    fn finish_gesture(&mut self, kind: GestureKind, targets: Vec<ElementId>) -> Vec<ElementId> {
        self.emit(AppEvent::Transform(TransformEvent::Moved {
            kind,
            targets: targets.clone(),
            at: Utc::now().timestamp_millis(),
        }));
        self.save();
        targets
    }

    // ----- drag -----

    /// Starts dragging `targets`. Refused while editing is disabled or an
    /// element is in edit mode.
    pub fn begin_drag(&mut self, targets: &[ElementId]) -> Result<Vec<ElementId>> {
        self.prepare_gesture(GestureKind::Drag)?;
        let targets = self.transforms.begin_drag(&mut self.tree, targets)?;
        self.emit_started(GestureKind::Drag, &targets);
        Ok(targets)
    }

    /// Moves the dragged elements by `delta`. Returns whether connections
    /// became stale.
    pub fn update_drag(&mut self, delta: Point) -> Result<bool> {
        let moved = self.transforms.update_drag(&mut self.tree, delta)?;
        Ok(self.flag_stale_connections(&moved))
    }

    /// Finishes the drag, emits one moved event for all targets and saves.
    pub fn end_drag(&mut self) -> Result<Vec<ElementId>> {
        let moved = self.transforms.end_drag(&mut self.tree)?;
        Ok(self.finish_gesture(GestureKind::Drag, moved))
    }

    // ----- resize -----

    pub fn begin_resize(&mut self, targets: &[ElementId]) -> Result<Vec<ElementId>> {
        self.prepare_gesture(GestureKind::Resize)?;
        let targets = self.transforms.begin_resize(&mut self.tree, targets)?;
        self.emit_started(GestureKind::Resize, &targets);
        Ok(targets)
    }

    /// Applies a handle movement. Returns whether connections became stale.
    pub fn update_resize(&mut self, delta: ResizeDelta) -> Result<bool> {
        let moved = self.transforms.update_resize(&mut self.tree, delta)?;
        Ok(self.flag_stale_connections(&moved))
    }

    pub fn end_resize(&mut self) -> Result<Vec<ElementId>> {
        let moved = self.transforms.end_resize(&mut self.tree)?;
        Ok(self.finish_gesture(GestureKind::Resize, moved))
    }

    // ----- rotate -----

    /// Starts rotating `target`; peripheral controls are disabled until the
    /// rotation ends.
    pub fn begin_rotate(&mut self, target: ElementId) -> Result<ElementId> {
        self.prepare_gesture(GestureKind::Rotate)?;
        let target = self.transforms.begin_rotate(&mut self.tree, target)?;
        self.emit_started(GestureKind::Rotate, &[target]);
        self.emit(AppEvent::Transform(TransformEvent::ControlsEnabled { enabled: false }));
        Ok(target)
    }

    /// Rotates to `degrees`, rounded to the throttle step. Returns whether
    /// the rotation changed.
    pub fn update_rotate(&mut self, degrees: f64) -> Result<bool> {
        self.transforms.update_rotate(&mut self.tree, degrees)
    }

    pub fn end_rotate(&mut self) -> Result<Vec<ElementId>> {
        let rotated = self.transforms.end_rotate(&mut self.tree)?;
        self.emit(AppEvent::Transform(TransformEvent::ControlsEnabled { enabled: true }));
        Ok(self.finish_gesture(GestureKind::Rotate, rotated))
    }
}
