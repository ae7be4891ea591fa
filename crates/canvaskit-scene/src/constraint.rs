//! Anchor constraints and placement resolution.
//!
//! An element stores its position as a [`Placement`] whose meaning depends on
//! the element's [`Constraint`]. Two conversions connect the stored form with
//! the resolved on-screen box:
//!
//! - [`resolve_bounds`]: placement + constraint + parent box → element box
//! - [`placement_from_bounds`]: element box + parent box + constraint → placement
//!
//! For every constraint the two are inverse to each other, which is what lets
//! an element keep its visual position when it is re-parented or when its
//! constraint changes.

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// How an element's horizontal placement follows its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalConstraint {
    /// Fixed distance from the parent's left edge.
    #[default]
    Left,
    /// Fixed distance from the parent's right edge.
    Right,
    /// Fixed distance from both edges; width stretches with the parent.
    LeftRight,
    /// Fixed offset from the parent's horizontal centre.
    Center,
    /// Left and right margins as percentages of the parent width.
    Scale,
}

/// How an element's vertical placement follows its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalConstraint {
    /// Fixed distance from the parent's top edge.
    #[default]
    Top,
    /// Fixed distance from the parent's bottom edge.
    Bottom,
    /// Fixed distance from both edges; height stretches with the parent.
    TopBottom,
    /// Fixed offset from the parent's vertical centre.
    Center,
    /// Top and bottom margins as percentages of the parent height.
    Scale,
}

/// Per-axis anchoring rule pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Constraint {
    #[serde(default)]
    pub horizontal: HorizontalConstraint,
    #[serde(default)]
    pub vertical: VerticalConstraint,
}

impl Constraint {
    pub const fn new(horizontal: HorizontalConstraint, vertical: VerticalConstraint) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// Anchored to the parent's top-left corner.
    pub const fn top_left() -> Self {
        Self::new(HorizontalConstraint::Left, VerticalConstraint::Top)
    }

    /// Stretches on both axes.
    pub const fn stretch() -> Self {
        Self::new(HorizontalConstraint::LeftRight, VerticalConstraint::TopBottom)
    }

    /// Whether the size on either axis is derived from the parent.
    pub fn is_stretch(&self) -> bool {
        matches!(
            self.horizontal,
            HorizontalConstraint::LeftRight | HorizontalConstraint::Scale
        ) || matches!(
            self.vertical,
            VerticalConstraint::TopBottom | VerticalConstraint::Scale
        )
    }
}

/// Stored placement of an element.
///
/// Which fields are meaningful depends on the constraint; unused fields are
/// `None` and are omitted from the serialized form. Values are pixels except
/// under `Scale`, where the margins are percentages of the parent size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Placement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Rotation in degrees around the element centre.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
}

impl Placement {
    /// Top-left anchored placement of the given box.
    pub fn at(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            top: Some(top),
            left: Some(left),
            width: Some(width),
            height: Some(height),
            ..Default::default()
        }
    }

    pub fn rotation(&self) -> f64 {
        self.rotation.unwrap_or(0.0)
    }

    /// Name of the first non-finite field, if any.
    pub fn invalid_field(&self) -> Option<&'static str> {
        [
            ("top", self.top),
            ("left", self.left),
            ("right", self.right),
            ("bottom", self.bottom),
            ("width", self.width),
            ("height", self.height),
            ("rotation", self.rotation),
        ]
        .into_iter()
        .find(|(_, v)| v.is_some_and(|v| !v.is_finite()))
        .map(|(name, _)| name)
    }
}

/// Resolves the on-screen box of an element inside `parent`.
pub fn resolve_bounds(placement: &Placement, constraint: &Constraint, parent: &Rect) -> Rect {
    let (x, width) = resolve_axis(
        AxisPlacement {
            start: placement.left,
            end: placement.right,
            size: placement.width,
        },
        horizontal_mode(constraint.horizontal),
        parent.x,
        parent.width,
    );
    let (y, height) = resolve_axis(
        AxisPlacement {
            start: placement.top,
            end: placement.bottom,
            size: placement.height,
        },
        vertical_mode(constraint.vertical),
        parent.y,
        parent.height,
    );
    Rect::new(x, y, width, height)
}

/// Derives the placement that keeps `element` at its current box inside
/// `parent` under `constraint`. Rotation is not part of the box and is
/// carried over by the caller.
pub fn placement_from_bounds(element: &Rect, parent: &Rect, constraint: &Constraint) -> Placement {
    let h = derive_axis(
        horizontal_mode(constraint.horizontal),
        element.x,
        element.width,
        parent.x,
        parent.width,
    );
    let v = derive_axis(
        vertical_mode(constraint.vertical),
        element.y,
        element.height,
        parent.y,
        parent.height,
    );
    Placement {
        left: h.start,
        right: h.end,
        width: h.size,
        top: v.start,
        bottom: v.end,
        height: v.size,
        rotation: None,
    }
}

// Both axes share the same arithmetic once the constraint is reduced to a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AxisMode {
    Start,
    End,
    Stretch,
    Center,
    Scale,
}

fn horizontal_mode(c: HorizontalConstraint) -> AxisMode {
    match c {
        HorizontalConstraint::Left => AxisMode::Start,
        HorizontalConstraint::Right => AxisMode::End,
        HorizontalConstraint::LeftRight => AxisMode::Stretch,
        HorizontalConstraint::Center => AxisMode::Center,
        HorizontalConstraint::Scale => AxisMode::Scale,
    }
}

fn vertical_mode(c: VerticalConstraint) -> AxisMode {
    match c {
        VerticalConstraint::Top => AxisMode::Start,
        VerticalConstraint::Bottom => AxisMode::End,
        VerticalConstraint::TopBottom => AxisMode::Stretch,
        VerticalConstraint::Center => AxisMode::Center,
        VerticalConstraint::Scale => AxisMode::Scale,
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct AxisPlacement {
    start: Option<f64>,
    end: Option<f64>,
    size: Option<f64>,
}

fn resolve_axis(p: AxisPlacement, mode: AxisMode, origin: f64, extent: f64) -> (f64, f64) {
    let start = p.start.unwrap_or(0.0);
    let end = p.end.unwrap_or(0.0);
    let size = p.size.unwrap_or(0.0);
    match mode {
        AxisMode::Start => (origin + start, size),
        AxisMode::End => (origin + extent - end - size, size),
        AxisMode::Stretch => (origin + start, (extent - start - end).max(0.0)),
        // `start` holds the distance from the parent centre to the element centre
        AxisMode::Center => (origin + extent / 2.0 - start - size / 2.0, size),
        AxisMode::Scale => (
            origin + start * extent / 100.0,
            (extent * (100.0 - start - end) / 100.0).max(0.0),
        ),
    }
}

fn derive_axis(mode: AxisMode, pos: f64, size: f64, origin: f64, extent: f64) -> AxisPlacement {
    let relative_start = pos - origin;
    let relative_end = origin + extent - (pos + size);
    match mode {
        AxisMode::Start => AxisPlacement {
            start: Some(relative_start),
            size: Some(size),
            ..Default::default()
        },
        AxisMode::End => AxisPlacement {
            end: Some(relative_end),
            size: Some(size),
            ..Default::default()
        },
        AxisMode::Stretch => AxisPlacement {
            start: Some(relative_start),
            end: Some(relative_end),
            ..Default::default()
        },
        AxisMode::Center => AxisPlacement {
            start: Some(extent / 2.0 - (relative_start + size / 2.0)),
            size: Some(size),
            ..Default::default()
        },
        AxisMode::Scale => {
            // A collapsed parent has no meaningful percentage; fall back to the
            // element's own size as the reference like an unsized container.
            let reference = if extent.abs() > f64::EPSILON {
                extent
            } else if size.abs() > f64::EPSILON {
                size
            } else {
                1.0
            };
            AxisPlacement {
                start: Some(relative_start / reference * 100.0),
                end: Some(relative_end / reference * 100.0),
                ..Default::default()
            }
        }
    }
}
