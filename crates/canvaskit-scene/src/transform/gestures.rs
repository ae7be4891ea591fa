//! Gesture state machines.
//!
//! Each gesture is either idle or active; an active gesture carries the data
//! captured at its start. Transitions happen only through
//! [`TransformCoordinator`](super::TransformCoordinator).

use canvaskit_core::{ElementId, GestureKind, SceneError};

use crate::constraint::{Constraint, Placement};
use crate::geometry::{Point, Rect};
use crate::tree::ElementTree;

/// An element under a gesture and its state when the gesture began.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureTarget {
    pub id: ElementId,
    pub parent: Option<ElementId>,
    pub start: Rect,
    pub placement: Placement,
    pub constraint: Constraint,
}

impl GestureTarget {
    pub fn capture(tree: &ElementTree, id: ElementId) -> Result<Self, SceneError> {
        let element = tree.element(id)?;
        Ok(Self {
            id,
            parent: element.parent,
            start: tree.bounds_of(id)?,
            placement: element.placement,
            constraint: element.constraint,
        })
    }

    /// Puts the element back where it was captured. Removed elements are
    /// skipped; an element moved to another frame keeps its captured box.
    pub fn restore(&self, tree: &mut ElementTree) -> Result<(), SceneError> {
        if !tree.contains(self.id) {
            return Ok(());
        }
        if tree.parent_of(self.id) == self.parent {
            if let Some(element) = tree.get_mut(self.id) {
                element.constraint = self.constraint;
                element.placement = self.placement;
            }
            return Ok(());
        }
        tree.set_constraint(self.id, self.constraint)?;
        tree.set_bounds(self.id, self.start)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragGesture {
    #[default]
    Idle,
    Active {
        targets: Vec<GestureTarget>,
        /// Accumulated pointer movement since the start.
        total: Point,
        /// Snap guide boxes, resolved when the drag began.
        guides: Vec<Rect>,
    },
}

/// Resize targets run under a top-left constraint; the captured constraint
/// comes back when the gesture ends.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResizeGesture {
    #[default]
    Idle,
    Active { targets: Vec<GestureTarget> },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum RotateGesture {
    #[default]
    Idle,
    Active {
        target: ElementId,
        /// Stored rotation at the start, `None` when unset.
        start_rotation: Option<f64>,
    },
}

impl DragGesture {
    pub fn is_active(&self) -> bool {
        matches!(self, DragGesture::Active { .. })
    }

    pub fn targets(&self) -> Vec<ElementId> {
        match self {
            DragGesture::Active { targets, .. } => targets.iter().map(|t| t.id).collect(),
            DragGesture::Idle => Vec::new(),
        }
    }
}

impl ResizeGesture {
    pub fn is_active(&self) -> bool {
        matches!(self, ResizeGesture::Active { .. })
    }

    pub fn targets(&self) -> Vec<ElementId> {
        match self {
            ResizeGesture::Active { targets } => targets.iter().map(|t| t.id).collect(),
            ResizeGesture::Idle => Vec::new(),
        }
    }
}

impl RotateGesture {
    pub fn is_active(&self) -> bool {
        matches!(self, RotateGesture::Active { .. })
    }

    pub fn targets(&self) -> Vec<ElementId> {
        match self {
            RotateGesture::Active { target, .. } => vec![*target],
            RotateGesture::Idle => Vec::new(),
        }
    }
}

/// The side or corner being dragged during a resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl ResizeHandle {
    fn moves_left(self) -> bool {
        matches!(
            self,
            ResizeHandle::West | ResizeHandle::NorthWest | ResizeHandle::SouthWest
        )
    }

    fn moves_right(self) -> bool {
        matches!(
            self,
            ResizeHandle::East | ResizeHandle::NorthEast | ResizeHandle::SouthEast
        )
    }

    fn moves_top(self) -> bool {
        matches!(
            self,
            ResizeHandle::North | ResizeHandle::NorthEast | ResizeHandle::NorthWest
        )
    }

    fn moves_bottom(self) -> bool {
        matches!(
            self,
            ResizeHandle::South | ResizeHandle::SouthEast | ResizeHandle::SouthWest
        )
    }

    /// Applies a pointer movement of `(dx, dy)` on this handle to `bounds`.
    ///
    /// The opposite edge stays fixed; an edge can be pushed up to, but not
    /// past, the fixed one.
    pub fn apply(self, bounds: &Rect, dx: f64, dy: f64) -> Rect {
        let mut left = bounds.left();
        let mut right = bounds.right();
        let mut top = bounds.top();
        let mut bottom = bounds.bottom();

        if self.moves_left() {
            left = (left + dx).min(right);
        }
        if self.moves_right() {
            right = (right + dx).max(left);
        }
        if self.moves_top() {
            top = (top + dy).min(bottom);
        }
        if self.moves_bottom() {
            bottom = (bottom + dy).max(top);
        }
        Rect::new(left, top, right - left, bottom - top)
    }
}

/// One resize pointer movement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeDelta {
    pub handle: ResizeHandle,
    pub dx: f64,
    pub dy: f64,
}

impl ResizeDelta {
    pub fn new(handle: ResizeHandle, dx: f64, dy: f64) -> Self {
        Self { handle, dx, dy }
    }
}

/// Snaps an angle to the nearest multiple of `step`, normalized to `0..360`.
pub fn throttle_rotation(degrees: f64, step: f64) -> f64 {
    let snapped = if step > 0.0 {
        (degrees / step).round() * step
    } else {
        degrees
    };
    let normalized = snapped.rem_euclid(360.0);
    // rem_euclid can land on 360.0 for tiny negative inputs
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// Kind of whichever gesture is active, if any.
pub(crate) fn active_kind(
    drag: &DragGesture,
    resize: &ResizeGesture,
    rotate: &RotateGesture,
) -> Option<GestureKind> {
    if drag.is_active() {
        Some(GestureKind::Drag)
    } else if resize.is_active() {
        Some(GestureKind::Resize)
    } else if rotate.is_active() {
        Some(GestureKind::Rotate)
    } else {
        None
    }
}
