use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use canvaskit_core::{AppEvent, Error, Origin, SceneError, TreeEvent};
use canvaskit_scene::{DropPosition, ElementConfig, Rect, SelectionRequest};

use super::common::{add_rect, events, recording_scene, rect};

fn tree_events(events: &[AppEvent]) -> Vec<TreeEvent> {
    events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Tree(event) => Some(event.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_every_structural_change_saves() {
    let mut scene = recording_scene();
    let saves = Arc::new(AtomicUsize::new(0));
    let counter = saves.clone();
    scene.set_on_save(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let a = add_rect(&mut scene, "A", 100.0, 100.0);
    let b = add_rect(&mut scene, "B", 200.0, 100.0);
    scene.rename_element(a, "Renamed", Origin::User).unwrap();
    scene
        .reorder_elements(a, b, DropPosition::OntoNode, Origin::User)
        .unwrap();
    scene.remove_element(b, Origin::User).unwrap();

    assert_eq!(saves.load(Ordering::SeqCst), 5);
    assert_eq!(scene.revision(), 5);
}

#[test]
fn test_generated_names_are_unique() {
    let mut scene = recording_scene();
    let root = scene.tree().root();
    let first = scene
        .add_element(root, &ElementConfig::new("rectangle"), Origin::User)
        .unwrap();
    let second = scene
        .add_element(root, &ElementConfig::new("rectangle"), Origin::User)
        .unwrap();
    let frame = scene
        .add_element(root, &ElementConfig::frame(), Origin::User)
        .unwrap();

    let name = |id| scene.tree().get(id).unwrap().name().to_string();
    assert_eq!(name(first), "Element 2");
    assert_eq!(name(second), "Element 3");
    assert_eq!(name(frame), "Frame 4");
}

#[test]
fn test_rename_conflict_is_refused() {
    let mut scene = recording_scene();
    let a = add_rect(&mut scene, "A", 100.0, 100.0);
    add_rect(&mut scene, "B", 200.0, 100.0);
    let revision = scene.revision();

    let err = scene.rename_element(a, "B", Origin::User).unwrap_err();
    assert!(matches!(err, Error::Scene(SceneError::NameTaken { .. })));
    assert_eq!(scene.revision(), revision);

    let root = scene.tree().root();
    assert!(scene.rename_element(root, "Stage", Origin::User).is_err());
}

#[test]
fn test_rename_emits_old_and_new_name() {
    let mut scene = recording_scene();
    let a = add_rect(&mut scene, "A", 100.0, 100.0);
    scene.bus().clear_log();

    scene.rename_element(a, "Hero", Origin::User).unwrap();
    assert_eq!(scene.tree().find_by_name("Hero"), Some(a));
    assert_eq!(scene.tree().find_by_name("A"), None);

    match tree_events(&events(&scene)).as_slice() {
        [TreeEvent::ElementRenamed {
            old_name, new_name, ..
        }] => {
            assert_eq!(old_name, "A");
            assert_eq!(new_name, "Hero");
        }
        other => panic!("unexpected events: {:?}", other),
    }
}

#[test]
fn test_reorder_onto_sibling_takes_its_slot() {
    let mut scene = recording_scene();
    let a = add_rect(&mut scene, "A", 0.0, 0.0);
    let b = add_rect(&mut scene, "B", 0.0, 0.0);
    let c = add_rect(&mut scene, "C", 0.0, 0.0);
    let root = scene.tree().root();

    scene
        .reorder_elements(c, a, DropPosition::OntoNode, Origin::User)
        .unwrap();
    assert_eq!(scene.tree().children(root), &[c, a, b]);

    scene
        .reorder_elements(c, b, DropPosition::Gap { top_of_tree: true }, Origin::User)
        .unwrap();
    assert_eq!(scene.tree().children(root), &[a, b, c]);
}

#[test]
fn test_reorder_onto_frame_reparents_keeping_bounds() {
    let mut scene = recording_scene();
    let root = scene.tree().root();
    let frame = scene
        .add_element(
            root,
            &ElementConfig::frame()
                .with_placement(canvaskit_scene::Placement::at(300.0, 300.0, 200.0, 200.0)),
            Origin::User,
        )
        .unwrap();
    let a = add_rect(&mut scene, "A", 10.0, 20.0);

    scene
        .reorder_elements(a, frame, DropPosition::OntoNode, Origin::User)
        .unwrap();
    assert_eq!(scene.tree().parent_of(a), Some(frame));
    assert!(scene
        .tree()
        .bounds_of(a)
        .unwrap()
        .approx_eq(&Rect::new(10.0, 20.0, 50.0, 50.0)));
}

#[test]
fn test_move_into_descendant_is_refused() {
    let mut scene = recording_scene();
    let root = scene.tree().root();
    let outer = scene
        .add_element(root, &ElementConfig::frame(), Origin::User)
        .unwrap();
    let inner = scene
        .add_element(outer, &ElementConfig::frame(), Origin::User)
        .unwrap();

    let err = scene
        .move_element(outer, inner, None, Origin::User)
        .unwrap_err();
    assert!(matches!(err, Error::Scene(SceneError::CycleDetected { .. })));
    assert_eq!(scene.tree().parent_of(outer), Some(root));
}

#[test]
fn test_frame_selection_wraps_selected() {
    let mut scene = recording_scene();
    let a = add_rect(&mut scene, "A", 100.0, 100.0);
    let b = add_rect(&mut scene, "B", 200.0, 150.0);
    scene.select(SelectionRequest::Elements(vec![a, b]), Origin::User);
    scene.bus().clear_log();

    let frame = scene.frame_selection(Origin::User).unwrap();
    assert_eq!(scene.tree().children(frame), &[a, b]);
    assert!(scene
        .tree()
        .bounds_of(frame)
        .unwrap()
        .approx_eq(&Rect::new(100.0, 100.0, 150.0, 100.0)));
    assert!(scene
        .tree()
        .bounds_of(b)
        .unwrap()
        .approx_eq(&Rect::new(200.0, 150.0, 50.0, 50.0)));

    let events = tree_events(&events(&scene));
    assert!(matches!(events[0], TreeEvent::ElementAdded { id, .. } if id == frame));
    assert_eq!(events.len(), 3);
    assert!(scene.selection().is_empty());
}

#[test]
fn test_frame_selection_needs_selection() {
    let mut scene = recording_scene();
    assert!(scene.frame_selection(Origin::User).is_err());
}

#[test]
fn test_duplicate_offsets_copy() {
    let mut scene = recording_scene();
    let a = add_rect(&mut scene, "A", 100.0, 100.0);
    let copy = scene.duplicate_element(a, Origin::User).unwrap();

    assert_ne!(scene.tree().get(copy).unwrap().name(), "A");
    assert!(scene
        .tree()
        .bounds_of(copy)
        .unwrap()
        .approx_eq(&Rect::new(110.0, 110.0, 50.0, 50.0)));
}

#[test]
fn test_current_layer() {
    let mut scene = recording_scene();
    let root = scene.tree().root();
    let frame = scene
        .add_element(root, &ElementConfig::frame(), Origin::User)
        .unwrap();
    let a = add_rect(&mut scene, "A", 0.0, 0.0);
    scene.select_element(a, Origin::User);

    assert!(matches!(
        scene.update_current_layer(a, Origin::User),
        Err(Error::Scene(SceneError::NotAFrame { .. }))
    ));

    scene.update_current_layer(frame, Origin::User).unwrap();
    assert_eq!(scene.current_layer(), frame);
    assert!(scene.selection().is_empty());

    let added = scene
        .add_to_current_layer(&ElementConfig::new("rectangle"), Origin::User)
        .unwrap();
    assert_eq!(scene.tree().parent_of(added), Some(frame));

    // Removing the layer falls back to the root
    scene.remove_element(frame, Origin::User).unwrap();
    assert_eq!(scene.current_layer(), root);
    assert!(!scene.tree().contains(added));
}

#[test]
fn test_root_cannot_be_removed() {
    let mut scene = recording_scene();
    let root = scene.tree().root();
    assert!(matches!(
        scene.remove_element(root, Origin::User),
        Err(Error::Scene(SceneError::RootImmutable))
    ));
}

#[test]
fn test_update_size_clears_selection_with_system_origin() {
    let mut scene = recording_scene();
    let a = add_rect(&mut scene, "A", 0.0, 0.0);
    scene.select_element(a, Origin::User);
    scene.update_size(1024.0, 768.0);

    assert!(scene.selection().is_empty());
    assert_eq!(scene.tree().root_bounds(), Rect::new(0.0, 0.0, 1024.0, 768.0));
    let last_selection = events(&scene)
        .into_iter()
        .rev()
        .find_map(|e| match e {
            AppEvent::Selection(canvaskit_core::SelectionEvent::Changed { origin, .. }) => {
                Some(origin)
            }
            _ => None,
        });
    assert_eq!(last_selection, Some(Origin::System));
}

#[test]
fn test_failed_add_leaves_scene_untouched() {
    let mut scene = recording_scene();
    let root = scene.tree().root();
    scene.bus().clear_log();
    let frame = ElementConfig::frame()
        .with_name("F")
        .with_child(rect("Good", 0.0, 0.0, 10.0, 10.0))
        .with_child(rect("Bad", f64::NAN, 0.0, 10.0, 10.0));

    assert!(scene.add_element(root, &frame, Origin::User).is_err());
    assert!(scene.tree().is_empty());
    assert_eq!(scene.revision(), 0);
    assert!(tree_events(&events(&scene)).is_empty());
    assert!(scene.tree().verify_integrity().is_ok());
}
