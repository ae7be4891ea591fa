//! # Transform Coordinator
//!
//! Drives drag, resize and rotate gestures against the element tree.
//!
//! Every gesture follows the same lifecycle: `begin_*` captures the targets
//! and takes them out of the snap guides, `update_*` mutates placements in
//! place, and `end_*` normalizes placements and puts the targets back into
//! the guides. Only one gesture is active at a time; beginning a new one
//! aborts the previous one, which puts its targets back where they started.
//!
//! The coordinator never serializes and never emits events. It reports which
//! elements moved and leaves persistence and notification to the scene.

mod gestures;
mod snap;

pub use gestures::*;
pub use snap::*;

use std::collections::HashSet;

use canvaskit_core::{ElementId, GestureError, GestureKind, Result};

use crate::constraint::Constraint;
use crate::geometry::{Point, Rect};
use crate::tree::ElementTree;

/// Tunables of the gesture pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSettings {
    /// Snap dragged boxes to guide edges and centres.
    pub snap_enabled: bool,
    /// Maximum snap distance in pixels.
    pub snap_threshold: f64,
    /// Rotation step in degrees.
    pub rotate_throttle: f64,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            snap_enabled: true,
            snap_threshold: 5.0,
            rotate_throttle: 5.0,
        }
    }
}

/// Owns the gesture state machines and the snap guide list.
#[derive(Debug, Clone)]
pub struct TransformCoordinator {
    drag: DragGesture,
    resize: ResizeGesture,
    rotate: RotateGesture,
    guides: Vec<ElementId>,
    controls_enabled: bool,
    last_snap: SnapResult,
    settings: GestureSettings,
}

impl TransformCoordinator {
    pub fn new(settings: GestureSettings) -> Self {
        Self {
            drag: DragGesture::Idle,
            resize: ResizeGesture::Idle,
            rotate: RotateGesture::Idle,
            guides: Vec::new(),
            controls_enabled: true,
            last_snap: SnapResult::default(),
            settings,
        }
    }

    pub fn settings(&self) -> &GestureSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: GestureSettings) {
        self.settings = settings;
    }

    /// Kind of the active gesture, if any.
    pub fn active(&self) -> Option<GestureKind> {
        active_kind(&self.drag, &self.resize, &self.rotate)
    }

    /// Elements under the active gesture.
    pub fn targets(&self) -> Vec<ElementId> {
        match self.active() {
            Some(GestureKind::Drag) => self.drag.targets(),
            Some(GestureKind::Resize) => self.resize.targets(),
            Some(GestureKind::Rotate) => self.rotate.targets(),
            None => Vec::new(),
        }
    }

    pub fn drag_state(&self) -> &DragGesture {
        &self.drag
    }

    pub fn resize_state(&self) -> &ResizeGesture {
        &self.resize
    }

    pub fn rotate_state(&self) -> &RotateGesture {
        &self.rotate
    }

    /// Elements a dragged box may snap to.
    pub fn guides(&self) -> &[ElementId] {
        &self.guides
    }

    /// Snap applied by the last drag update.
    pub fn last_snap(&self) -> SnapResult {
        self.last_snap
    }

    /// Whether the size/position/constraint controls are usable.
    pub fn controls_enabled(&self) -> bool {
        self.controls_enabled
    }

    /// Rebuilds the guide list: every element except the active targets and
    /// their descendants.
    pub fn refresh_guides(&mut self, tree: &ElementTree) {
        let targets = self.targets();
        let root = tree.root();
        self.guides = tree
            .depth_first(root)
            .into_iter()
            .filter(|id| *id != root)
            .filter(|id| {
                !targets
                    .iter()
                    .any(|t| t == id || tree.is_ancestor(*t, *id))
            })
            .collect();
    }

    /// Cancels the active gesture.
    ///
    /// Targets get back the placement and constraint they had when the
    /// gesture began, controls are re-enabled and guides are rebuilt. Returns
    /// the aborted gesture kind.
    pub fn abort(&mut self, tree: &mut ElementTree) -> Option<GestureKind> {
        let kind = self.active()?;
        let targets = match std::mem::take(&mut self.drag) {
            DragGesture::Active { targets, .. } => targets,
            DragGesture::Idle => Vec::new(),
        };
        let resized = match std::mem::take(&mut self.resize) {
            ResizeGesture::Active { targets } => targets,
            ResizeGesture::Idle => Vec::new(),
        };
        for target in targets.iter().chain(&resized) {
            if let Err(e) = target.restore(tree) {
                tracing::warn!("Could not restore {}: {}", target.id, e);
            }
        }
        if let RotateGesture::Active {
            target,
            start_rotation,
        } = std::mem::take(&mut self.rotate)
        {
            if let Some(element) = tree.get_mut(target) {
                element.placement.rotation = start_rotation;
            }
        }
        self.controls_enabled = true;
        self.last_snap = SnapResult::default();
        self.refresh_guides(tree);
        tracing::debug!("Aborted {} gesture", kind);
        Some(kind)
    }

    // Live, non-root targets with nested duplicates removed: an element whose
    // ancestor is also a target already moves with that ancestor.
    fn resolve_targets(tree: &ElementTree, ids: &[ElementId]) -> Vec<ElementId> {
        let root = tree.root();
        let live: Vec<ElementId> = ids
            .iter()
            .copied()
            .filter(|id| *id != root && tree.contains(*id))
            .collect();
        let mut seen = HashSet::new();
        live.iter()
            .copied()
            .filter(|id| !live.iter().any(|other| tree.is_ancestor(*other, *id)))
            .filter(|id| seen.insert(*id))
            .collect()
    }

    // ----- drag -----

    /// Starts dragging `targets`. Returns the resolved targets.
    pub fn begin_drag(
        &mut self,
        tree: &mut ElementTree,
        targets: &[ElementId],
    ) -> Result<Vec<ElementId>> {
        self.abort(tree);
        let ids = Self::resolve_targets(tree, targets);
        if ids.is_empty() {
            return Err(GestureError::NoTargets {
                kind: GestureKind::Drag,
            }
            .into());
        }

        let targets = ids
            .iter()
            .map(|id| GestureTarget::capture(tree, *id))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        self.drag = DragGesture::Active {
            targets,
            total: Point::default(),
            guides: Vec::new(),
        };
        self.refresh_guides(tree);

        // Guide boxes stay fixed for the whole drag
        let boxes: Vec<Rect> = self
            .guides
            .iter()
            .filter_map(|id| tree.bounds_of(*id).ok())
            .chain(std::iter::once(tree.root_bounds()))
            .collect();
        if let DragGesture::Active { guides, .. } = &mut self.drag {
            *guides = boxes;
        }
        tracing::debug!("Drag started on {} element(s)", ids.len());
        Ok(ids)
    }

    /// Moves the dragged elements by `delta` relative to the previous update.
    ///
    /// The group box is snapped as a whole so the targets keep their relative
    /// layout. Returns the elements that moved.
    pub fn update_drag(
        &mut self,
        tree: &mut ElementTree,
        delta: Point,
    ) -> Result<Vec<ElementId>> {
        let DragGesture::Active {
            targets,
            total,
            guides,
        } = &mut self.drag
        else {
            return Err(GestureError::NotActive {
                kind: GestureKind::Drag,
            }
            .into());
        };
        *total = total.offset(delta);
        let total = *total;

        let live: Vec<&GestureTarget> = targets.iter().filter(|t| tree.contains(t.id)).collect();
        let group = Rect::union_all(live.iter().map(|t| &t.start))
            .map(|r| r.translate(total.x, total.y));

        self.last_snap = match group {
            Some(group) if self.settings.snap_enabled => {
                snap_box(&group, guides, self.settings.snap_threshold)
            }
            _ => SnapResult::default(),
        };
        let offset = total.offset(self.last_snap.offset);

        let mut moved = Vec::with_capacity(live.len());
        for target in live {
            tree.set_bounds(target.id, target.start.translate(offset.x, offset.y))?;
            moved.push(target.id);
        }
        Ok(moved)
    }

    /// Finishes the drag and normalizes placements. Returns the moved elements.
    pub fn end_drag(&mut self, tree: &mut ElementTree) -> Result<Vec<ElementId>> {
        let DragGesture::Active { targets, .. } = std::mem::take(&mut self.drag) else {
            return Err(GestureError::NotActive {
                kind: GestureKind::Drag,
            }
            .into());
        };

        let moved = normalize(tree, targets.iter().map(|t| t.id))?;
        self.last_snap = SnapResult::default();
        self.refresh_guides(tree);
        tracing::debug!("Drag ended on {} element(s)", moved.len());
        Ok(moved)
    }

    // ----- resize -----

    /// Starts resizing `targets`.
    ///
    /// Each target is switched to a top-left constraint for the duration of
    /// the gesture, so edge movements map directly onto left/top/width/height.
    pub fn begin_resize(
        &mut self,
        tree: &mut ElementTree,
        targets: &[ElementId],
    ) -> Result<Vec<ElementId>> {
        self.abort(tree);
        let ids = Self::resolve_targets(tree, targets);
        if ids.is_empty() {
            return Err(GestureError::NoTargets {
                kind: GestureKind::Resize,
            }
            .into());
        }

        let saved = ids
            .iter()
            .map(|id| GestureTarget::capture(tree, *id))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        for id in &ids {
            tree.set_constraint(*id, Constraint::top_left())?;
        }
        self.resize = ResizeGesture::Active { targets: saved };
        self.refresh_guides(tree);
        tracing::debug!("Resize started on {} element(s)", ids.len());
        Ok(ids)
    }

    /// Applies one handle movement to every resized element.
    pub fn update_resize(
        &mut self,
        tree: &mut ElementTree,
        delta: ResizeDelta,
    ) -> Result<Vec<ElementId>> {
        let ResizeGesture::Active { targets } = &self.resize else {
            return Err(GestureError::NotActive {
                kind: GestureKind::Resize,
            }
            .into());
        };

        let moved: Vec<ElementId> = targets
            .iter()
            .map(|t| t.id)
            .filter(|id| tree.contains(*id))
            .collect();
        for id in &moved {
            let current = tree.bounds_of(*id)?;
            tree.set_bounds(*id, delta.handle.apply(&current, delta.dx, delta.dy))?;
        }
        Ok(moved)
    }

    /// Finishes the resize, restoring each element's original constraint
    /// with a placement derived from its final box.
    pub fn end_resize(&mut self, tree: &mut ElementTree) -> Result<Vec<ElementId>> {
        let ResizeGesture::Active { targets } = std::mem::take(&mut self.resize) else {
            return Err(GestureError::NotActive {
                kind: GestureKind::Resize,
            }
            .into());
        };

        restore_constraints(tree, &targets);
        let moved: Vec<ElementId> = targets
            .iter()
            .map(|t| t.id)
            .filter(|id| tree.contains(*id))
            .collect();
        self.refresh_guides(tree);
        tracing::debug!("Resize ended on {} element(s)", moved.len());
        Ok(moved)
    }

    // ----- rotate -----

    /// Starts rotating `target` and disables the peripheral controls.
    pub fn begin_rotate(
        &mut self,
        tree: &mut ElementTree,
        target: ElementId,
    ) -> Result<ElementId> {
        self.abort(tree);
        if Self::resolve_targets(tree, &[target]).is_empty() {
            return Err(GestureError::NoTargets {
                kind: GestureKind::Rotate,
            }
            .into());
        }

        let start_rotation = tree.element(target)?.placement.rotation;
        self.rotate = RotateGesture::Active {
            target,
            start_rotation,
        };
        self.controls_enabled = false;
        self.refresh_guides(tree);
        Ok(target)
    }

    /// Sets the rotation to `degrees`, rounded to the throttle step.
    ///
    /// Returns true if the stored rotation changed.
    pub fn update_rotate(&mut self, tree: &mut ElementTree, degrees: f64) -> Result<bool> {
        let RotateGesture::Active { target, .. } = &self.rotate else {
            return Err(GestureError::NotActive {
                kind: GestureKind::Rotate,
            }
            .into());
        };
        let target = *target;
        let Some(element) = tree.get(target) else {
            return Ok(false);
        };

        let rotation = throttle_rotation(degrees, self.settings.rotate_throttle);
        if (element.placement.rotation() - rotation).abs() < f64::EPSILON {
            return Ok(false);
        }
        tree.set_rotation(target, rotation)?;
        Ok(true)
    }

    /// Finishes the rotation and re-enables the peripheral controls.
    pub fn end_rotate(&mut self, tree: &mut ElementTree) -> Result<Vec<ElementId>> {
        let RotateGesture::Active {
            target,
            start_rotation,
        } = std::mem::take(&mut self.rotate)
        else {
            return Err(GestureError::NotActive {
                kind: GestureKind::Rotate,
            }
            .into());
        };

        self.controls_enabled = true;
        self.refresh_guides(tree);
        let Some(element) = tree.get(target) else {
            return Ok(Vec::new());
        };
        tracing::debug!(
            "Rotated {} from {} to {}",
            target,
            start_rotation.unwrap_or_default(),
            element.placement.rotation()
        );
        Ok(vec![target])
    }
}

impl Default for TransformCoordinator {
    fn default() -> Self {
        Self::new(GestureSettings::default())
    }
}

// Re-derives placements from the resolved boxes, skipping removed elements.
fn normalize(
    tree: &mut ElementTree,
    ids: impl Iterator<Item = ElementId>,
) -> Result<Vec<ElementId>> {
    let mut moved = Vec::new();
    for id in ids {
        if !tree.contains(id) {
            continue;
        }
        let bounds = tree.bounds_of(id)?;
        tree.set_bounds(id, bounds)?;
        moved.push(id);
    }
    Ok(moved)
}

fn restore_constraints(tree: &mut ElementTree, targets: &[GestureTarget]) {
    for target in targets.iter() {
        if !tree.contains(target.id) {
            continue;
        }
        if let Err(e) = tree.set_constraint(target.id, target.constraint) {
            tracing::warn!("Could not restore constraint of {}: {}", target.id, e);
        }
    }
}
