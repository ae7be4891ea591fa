//! Edge and centre snapping against guide boxes.

use crate::geometry::{Point, Rect};

/// Outcome of snapping a moving box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SnapResult {
    /// Correction to add to the moving box.
    pub offset: Point,
    /// X of the vertical guide line snapped to.
    pub vertical_guide: Option<f64>,
    /// Y of the horizontal guide line snapped to.
    pub horizontal_guide: Option<f64>,
}

impl SnapResult {
    pub fn is_snapped(&self) -> bool {
        self.vertical_guide.is_some() || self.horizontal_guide.is_some()
    }
}

/// Snaps `moving` to the closest guide line within `threshold` on each axis.
///
/// The left, centre and right lines of the moving box are matched against
/// the same three lines of every guide, and likewise top, middle and bottom.
pub fn snap_box(moving: &Rect, guides: &[Rect], threshold: f64) -> SnapResult {
    let vertical = closest(
        [moving.left(), moving.center_x(), moving.right()],
        guides
            .iter()
            .flat_map(|g| [g.left(), g.center_x(), g.right()]),
        threshold,
    );
    let horizontal = closest(
        [moving.top(), moving.center_y(), moving.bottom()],
        guides
            .iter()
            .flat_map(|g| [g.top(), g.center_y(), g.bottom()]),
        threshold,
    );

    SnapResult {
        offset: Point::new(
            vertical.map_or(0.0, |(_, delta)| delta),
            horizontal.map_or(0.0, |(_, delta)| delta),
        ),
        vertical_guide: vertical.map(|(line, _)| line),
        horizontal_guide: horizontal.map(|(line, _)| line),
    }
}

// Closest (guide line, delta) pair with |delta| <= threshold.
fn closest(
    edges: [f64; 3],
    lines: impl Iterator<Item = f64>,
    threshold: f64,
) -> Option<(f64, f64)> {
    let mut best: Option<(f64, f64)> = None;
    for line in lines {
        for edge in edges {
            let delta = line - edge;
            if delta.abs() <= threshold && best.map_or(true, |(_, d)| delta.abs() < d.abs()) {
                best = Some((line, delta));
            }
        }
    }
    best
}
