use canvaskit_core::{AppEvent, Error, GestureError, GestureKind, SceneError, TransformEvent};
use canvaskit_scene::{
    placement_from_bounds, Constraint, ElementConfig, Placement, Point, Rect, ResizeDelta,
    ResizeHandle, SelectionRequest,
};

use super::common::{add_rect, events, recording_scene};

fn moved_events(events: &[AppEvent]) -> Vec<(GestureKind, usize)> {
    events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Transform(TransformEvent::Moved { kind, targets, .. }) => {
                Some((*kind, targets.len()))
            }
            _ => None,
        })
        .collect()
}

fn placement_close(a: &Placement, b: &Placement) -> bool {
    let close = |x: Option<f64>, y: Option<f64>| match (x, y) {
        (Some(x), Some(y)) => (x - y).abs() < 1e-6,
        (None, None) => true,
        _ => false,
    };
    close(a.top, b.top)
        && close(a.left, b.left)
        && close(a.right, b.right)
        && close(a.bottom, b.bottom)
        && close(a.width, b.width)
        && close(a.height, b.height)
}

#[test]
fn test_group_drag_emits_single_moved_event() {
    let mut scene = recording_scene();
    let a = add_rect(&mut scene, "A", 100.0, 100.0);
    let b = add_rect(&mut scene, "B", 200.0, 100.0);
    let c = add_rect(&mut scene, "C", 300.0, 100.0);
    scene.bus().clear_log();

    scene.begin_drag(&[a, b, c]).unwrap();
    scene.update_drag(Point::new(13.0, 17.0)).unwrap();
    scene.update_drag(Point::new(13.0, 17.0)).unwrap();
    let moved = scene.end_drag().unwrap();

    assert_eq!(moved.len(), 3);
    assert_eq!(moved_events(&events(&scene)), vec![(GestureKind::Drag, 3)]);
    let bounds = scene.tree().bounds_of(a).unwrap();
    assert!(bounds.approx_eq(&Rect::new(126.0, 134.0, 50.0, 50.0)));
    // Relative layout is kept
    let bounds_b = scene.tree().bounds_of(b).unwrap();
    assert!((bounds_b.x - bounds.x - 100.0).abs() < 1e-9);
}

#[test]
fn test_drag_saves_once_on_end() {
    let mut scene = recording_scene();
    let a = add_rect(&mut scene, "A", 100.0, 100.0);
    let revision = scene.revision();

    scene.begin_drag(&[a]).unwrap();
    for _ in 0..10 {
        scene.update_drag(Point::new(3.0, 0.0)).unwrap();
    }
    assert_eq!(scene.revision(), revision);
    scene.end_drag().unwrap();
    assert_eq!(scene.revision(), revision + 1);
}

#[test]
fn test_gestures_refused_when_editing_disabled() {
    let mut scene = recording_scene();
    let a = add_rect(&mut scene, "A", 100.0, 100.0);
    scene.set_editing_enabled(false);

    for result in [
        scene.begin_drag(&[a]).map(|_| ()),
        scene.begin_resize(&[a]).map(|_| ()),
        scene.begin_rotate(a).map(|_| ()),
    ] {
        assert!(matches!(result, Err(Error::Scene(SceneError::EditingDisabled))));
    }
    assert_eq!(scene.transforms().active(), None);
}

#[test]
fn test_drag_refused_in_edit_mode() {
    let mut scene = recording_scene();
    let root = scene.tree().root();
    let text = scene
        .add_element(
            root,
            &ElementConfig::new("text").with_name("Label"),
            canvaskit_scene::Origin::User,
        )
        .unwrap();
    scene.select(SelectionRequest::single(text), canvaskit_scene::Origin::User);
    assert!(scene.handle_click(text, true));

    let err = scene.begin_drag(&[text]).unwrap_err();
    assert!(matches!(err, Error::Gesture(GestureError::EditModeActive)));

    // Resizing stays available while editing text
    assert!(scene.begin_resize(&[text]).is_ok());
}

#[test]
fn test_update_without_begin_is_an_error() {
    let mut scene = recording_scene();
    let err = scene.update_drag(Point::new(1.0, 1.0)).unwrap_err();
    assert!(err.is_gesture_error());
    assert!(scene.end_resize().is_err());
    assert!(scene.end_rotate().is_err());
}

#[test]
fn test_resize_restores_stretch_constraint() {
    let mut scene = recording_scene();
    let a = add_rect(&mut scene, "A", 100.0, 100.0);
    scene.set_constraint(a, Constraint::stretch()).unwrap();

    scene.begin_resize(&[a]).unwrap();
    assert_eq!(scene.tree().get(a).unwrap().constraint, Constraint::top_left());

    scene
        .update_resize(ResizeDelta::new(ResizeHandle::SouthEast, 40.0, 20.0))
        .unwrap();
    scene
        .update_resize(ResizeDelta::new(ResizeHandle::NorthWest, -10.0, -5.0))
        .unwrap();
    scene.end_resize().unwrap();

    let element = scene.tree().get(a).unwrap();
    assert_eq!(element.constraint, Constraint::stretch());

    let bounds = scene.tree().bounds_of(a).unwrap();
    assert!(bounds.approx_eq(&Rect::new(90.0, 95.0, 100.0, 75.0)));
    let expected = placement_from_bounds(
        &bounds,
        &scene.tree().root_bounds(),
        &Constraint::stretch(),
    );
    assert!(placement_close(&element.placement, &expected));
    assert_eq!(moved_events(&events(&scene)), vec![(GestureKind::Resize, 1)]);
}

#[test]
fn test_abort_resize_restores_constraint() {
    let mut scene = recording_scene();
    let a = add_rect(&mut scene, "A", 100.0, 100.0);
    scene.set_constraint(a, Constraint::stretch()).unwrap();

    scene.begin_resize(&[a]).unwrap();
    assert_eq!(scene.abort_gesture(), Some(GestureKind::Resize));
    assert_eq!(scene.tree().get(a).unwrap().constraint, Constraint::stretch());
}

#[test]
fn test_rotate_toggles_controls_and_throttles() {
    let mut scene = recording_scene();
    let a = add_rect(&mut scene, "A", 100.0, 100.0);
    scene.bus().clear_log();

    scene.begin_rotate(a).unwrap();
    assert!(!scene.transforms().controls_enabled());

    assert!(scene.update_rotate(12.0).unwrap());
    assert_eq!(scene.tree().get(a).unwrap().placement.rotation(), 10.0);
    // Same throttled value
    assert!(!scene.update_rotate(11.0).unwrap());
    assert!(scene.update_rotate(-3.0).unwrap());
    assert_eq!(scene.tree().get(a).unwrap().placement.rotation(), 355.0);

    scene.end_rotate().unwrap();
    assert!(scene.transforms().controls_enabled());

    let toggles: Vec<bool> = events(&scene)
        .iter()
        .filter_map(|e| match e {
            AppEvent::Transform(TransformEvent::ControlsEnabled { enabled }) => Some(*enabled),
            _ => None,
        })
        .collect();
    assert_eq!(toggles, vec![false, true]);
    assert_eq!(moved_events(&events(&scene)), vec![(GestureKind::Rotate, 1)]);
}

#[test]
fn test_drag_snaps_to_sibling_edge() {
    let mut scene = recording_scene();
    let a = add_rect(&mut scene, "A", 100.0, 100.0);
    add_rect(&mut scene, "B", 200.0, 300.0);

    scene.begin_drag(&[a]).unwrap();
    // Left edge lands at 197, within the threshold of B's left edge
    scene.update_drag(Point::new(97.0, 0.0)).unwrap();
    assert!(scene.transforms().last_snap().is_snapped());
    assert_eq!(scene.tree().bounds_of(a).unwrap().x, 200.0);
    scene.end_drag().unwrap();
    assert!(!scene.transforms().last_snap().is_snapped());
}

#[test]
fn test_removing_dragged_element_aborts_gesture() {
    let mut scene = recording_scene();
    let a = add_rect(&mut scene, "A", 100.0, 100.0);
    scene.begin_drag(&[a]).unwrap();
    scene
        .remove_element(a, canvaskit_scene::Origin::User)
        .unwrap();
    assert_eq!(scene.transforms().active(), None);
}

#[test]
fn test_moving_element_leaves_guides_during_gesture() {
    let mut scene = recording_scene();
    let a = add_rect(&mut scene, "A", 100.0, 100.0);
    let b = add_rect(&mut scene, "B", 200.0, 100.0);
    assert!(scene.transforms().guides().contains(&a));

    scene.begin_drag(&[a]).unwrap();
    assert!(!scene.transforms().guides().contains(&a));
    assert!(scene.transforms().guides().contains(&b));

    scene.end_drag().unwrap();
    assert!(scene.transforms().guides().contains(&a));
}

#[test]
fn test_new_gesture_ends_previous_bookkeeping() {
    let mut scene = recording_scene();
    let a = add_rect(&mut scene, "A", 100.0, 100.0);
    scene.set_constraint(a, Constraint::stretch()).unwrap();

    scene.begin_resize(&[a]).unwrap();
    scene.begin_drag(&[a]).unwrap();
    assert_eq!(scene.transforms().active(), Some(GestureKind::Drag));
    assert_eq!(scene.tree().get(a).unwrap().constraint, Constraint::stretch());
    assert!(scene.end_resize().is_err());
}

#[test]
fn test_disabling_editing_rolls_back_drag() {
    let mut scene = recording_scene();
    let a = add_rect(&mut scene, "A", 100.0, 100.0);
    let saved = scene.document();
    let revision = scene.revision();

    scene.begin_drag(&[a]).unwrap();
    scene.update_drag(Point::new(200.0, 200.0)).unwrap();
    scene.set_editing_enabled(false);

    assert_eq!(scene.transforms().active(), None);
    assert_eq!(scene.revision(), revision);
    assert_eq!(scene.document(), saved);
    assert!(scene
        .tree()
        .bounds_of(a)
        .unwrap()
        .approx_eq(&Rect::new(100.0, 100.0, 50.0, 50.0)));
}

#[test]
fn test_aborted_resize_restores_box_and_constraint() {
    let mut scene = recording_scene();
    let a = add_rect(&mut scene, "A", 100.0, 100.0);
    scene.set_constraint(a, Constraint::stretch()).unwrap();
    let saved = scene.document();

    scene.begin_resize(&[a]).unwrap();
    scene
        .update_resize(ResizeDelta::new(ResizeHandle::SouthEast, 40.0, 40.0))
        .unwrap();
    scene.abort_gesture();

    assert_eq!(scene.tree().get(a).unwrap().constraint, Constraint::stretch());
    assert_eq!(scene.document(), saved);
}

#[test]
fn test_resize_group_updates_every_target() {
    let mut scene = recording_scene();
    let a = add_rect(&mut scene, "A", 100.0, 100.0);
    let b = add_rect(&mut scene, "B", 300.0, 100.0);

    scene.begin_resize(&[a, b]).unwrap();
    scene
        .update_resize(ResizeDelta::new(ResizeHandle::East, 10.0, 0.0))
        .unwrap();
    scene.end_resize().unwrap();

    assert_eq!(scene.tree().bounds_of(a).unwrap().width, 60.0);
    assert_eq!(scene.tree().bounds_of(b).unwrap().width, 60.0);
}
