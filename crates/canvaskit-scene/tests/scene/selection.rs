use std::sync::{Arc, Mutex};

use canvaskit_core::{AlertEvent, AppEvent, EventFilter, Origin, SelectionEvent};
use canvaskit_scene::scene::ADD_TO_SELECTION_FAILED;
use canvaskit_scene::{ElementConfig, SelectionRequest};

use super::common::{add_rect, events, recording_scene};

fn selection_changes(events: &[AppEvent]) -> Vec<(Vec<canvaskit_scene::ElementId>, Origin)> {
    events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Selection(SelectionEvent::Changed {
                selected, origin, ..
            }) => Some((selected.clone(), origin.clone())),
            _ => None,
        })
        .collect()
}

fn alerts(events: &[AppEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Alert(AlertEvent::Error { message }) => Some(message.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_reselect_emits_every_time_without_mutation() {
    let mut scene = recording_scene();
    let a = add_rect(&mut scene, "A", 100.0, 100.0);
    let before = scene.document();
    let revision = scene.revision();
    scene.bus().clear_log();

    scene.select_element(a, Origin::User);
    scene.select_element(a, Origin::User);

    let changes = selection_changes(&events(&scene));
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0].0, vec![a]);
    assert_eq!(changes[1].0, vec![a]);
    assert_eq!(scene.document(), before);
    assert_eq!(scene.revision(), revision);
}

#[test]
fn test_frame_selection_request() {
    let mut scene = recording_scene();
    let root = scene.tree().root();
    let frame = scene
        .add_element(root, &ElementConfig::frame(), Origin::Programmatic)
        .unwrap();

    scene.select(SelectionRequest::Frame(frame), Origin::User);
    assert_eq!(scene.selection().frame(), Some(frame));
    assert_eq!(scene.selection().selected(), &[frame]);
}

#[test]
fn test_unknown_targets_are_skipped() {
    let mut scene = recording_scene();
    let a = add_rect(&mut scene, "A", 100.0, 100.0);
    let ghost = canvaskit_scene::ElementId::new(999);

    let selected = scene.select(SelectionRequest::Elements(vec![ghost, a]), Origin::User);
    assert_eq!(selected, vec![a]);
}

#[test]
fn test_add_to_selection_batches_queued_targets() {
    let mut scene = recording_scene();
    let a = add_rect(&mut scene, "A", 100.0, 100.0);
    let b = add_rect(&mut scene, "B", 200.0, 100.0);

    scene.queue_selection_target(a);
    scene.queue_selection_target(b);
    assert!(scene.add_to_selection());
    assert_eq!(scene.selection().selected(), &[a, b]);
    assert!(scene.selection().pending().is_empty());
}

#[test]
fn test_add_to_selection_alerts_when_editing_disabled() {
    let mut scene = recording_scene();
    let a = add_rect(&mut scene, "A", 100.0, 100.0);
    scene.set_editing_enabled(false);
    scene.bus().clear_log();

    scene.queue_selection_target(a);
    assert!(!scene.add_to_selection());
    assert!(scene.selection().is_empty());
    assert_eq!(alerts(&events(&scene)), vec![ADD_TO_SELECTION_FAILED.to_string()]);
}

#[test]
fn test_add_to_selection_alerts_when_nothing_resolves() {
    let mut scene = recording_scene();
    scene.queue_selection_target(canvaskit_scene::ElementId::new(42));
    assert!(!scene.add_to_selection());
    assert_eq!(alerts(&events(&scene)).len(), 1);
}

#[test]
fn test_double_click_enters_edit_mode_for_text_only() {
    let mut scene = recording_scene();
    let root = scene.tree().root();
    let text = scene
        .add_element(root, &ElementConfig::new("text"), Origin::User)
        .unwrap();
    let a = add_rect(&mut scene, "A", 100.0, 100.0);

    // Must be selected first
    assert!(!scene.handle_click(text, true));
    scene.select_element(text, Origin::User);
    assert!(!scene.handle_click(text, false));
    assert!(scene.handle_click(text, true));
    assert_eq!(scene.selection().editing(), Some(text));

    // Any selection change leaves edit mode
    scene.select_element(a, Origin::User);
    assert!(!scene.selection().is_editing());
    assert!(!scene.handle_click(a, true));

    let toggles: Vec<bool> = events(&scene)
        .iter()
        .filter_map(|e| match e {
            AppEvent::Selection(SelectionEvent::EditModeChanged { enabled, .. }) => Some(*enabled),
            _ => None,
        })
        .collect();
    assert_eq!(toggles, vec![true, false]);
}

#[test]
fn test_observer_ignores_own_origin() {
    let mut scene = recording_scene();
    let a = add_rect(&mut scene, "A", 100.0, 100.0);
    let tree_panel = Origin::Sync("layers".to_string());

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    scene.bus().subscribe(
        EventFilter::AllOf(vec![
            EventFilter::Categories(vec![canvaskit_core::EventCategory::Selection]),
            EventFilter::ExcludeOrigin(tree_panel.clone()),
        ]),
        move |event| sink.lock().unwrap().push(event),
    );

    scene.select_element(a, tree_panel);
    scene.select_element(a, Origin::User);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].origin(), Some(&Origin::User));
}

#[test]
fn test_removal_clears_selection() {
    let mut scene = recording_scene();
    let a = add_rect(&mut scene, "A", 100.0, 100.0);
    scene.select_element(a, Origin::User);
    scene.remove_element(a, Origin::User).unwrap();
    assert!(scene.selection().is_empty());
}

#[test]
fn test_preserve_selection_prunes_removed() {
    let mut scene = canvaskit_scene::Scene::new(canvaskit_scene::SceneOptions {
        preserve_selection: true,
        ..Default::default()
    });
    let a = add_rect(&mut scene, "A", 100.0, 100.0);
    let b = add_rect(&mut scene, "B", 200.0, 100.0);
    scene.select(SelectionRequest::Elements(vec![a, b]), Origin::User);

    add_rect(&mut scene, "C", 300.0, 100.0);
    assert_eq!(scene.selection().selected(), &[a, b]);

    scene.remove_element(a, Origin::User).unwrap();
    assert_eq!(scene.selection().selected(), &[b]);
}
