use canvaskit_core::{AppEvent, ConnectionEvent, Origin};
use canvaskit_scene::{Point, Rect};
use serde_json::json;

use super::common::{add_rect, events, recording_scene};

fn needs_update_events(events: &[AppEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, AppEvent::Connection(ConnectionEvent::NeedsUpdate { .. })))
        .count()
}

#[test]
fn test_no_connections_never_need_update() {
    let mut scene = recording_scene();
    let a = add_rect(&mut scene, "A", 100.0, 100.0);
    assert!(!scene.connections_need_update(a));

    scene.begin_drag(&[a]).unwrap();
    assert!(!scene.update_drag(Point::new(10.0, 10.0)).unwrap());
    assert!(!scene.connections_need_update(a));
}

#[test]
fn test_drag_marks_connections_stale() {
    let mut scene = recording_scene();
    let a = add_rect(&mut scene, "A", 100.0, 100.0);
    let b = add_rect(&mut scene, "B", 300.0, 300.0);
    scene
        .connect(a, b, Point::new(1.0, 0.0), Point::new(-1.0, 0.0))
        .unwrap();
    assert!(!scene.connections_need_update(a));
    scene.bus().clear_log();

    scene.begin_drag(&[a]).unwrap();
    assert!(scene.update_drag(Point::new(10.0, 10.0)).unwrap());
    assert!(scene.connections_need_update(a));
    assert!(scene.connections_need_update(b));
    assert_eq!(needs_update_events(&events(&scene)), 1);

    scene.end_drag().unwrap();
    assert_eq!(scene.update_connections(), 0);
    assert!(!scene.connections_need_update(a));
}

#[test]
fn test_dragging_frame_marks_child_connections_stale() {
    let mut scene = recording_scene();
    let root = scene.tree().root();
    let frame = scene
        .add_element(
            root,
            &canvaskit_scene::ElementConfig::frame()
                .with_placement(canvaskit_scene::Placement::at(50.0, 50.0, 200.0, 200.0)),
            Origin::Programmatic,
        )
        .unwrap();
    let inner = scene
        .add_element(
            frame,
            &super::common::rect("Inner", 10.0, 10.0, 20.0, 20.0),
            Origin::Programmatic,
        )
        .unwrap();
    let outside = add_rect(&mut scene, "Outside", 500.0, 400.0);
    scene
        .connect(inner, outside, Point::default(), Point::default())
        .unwrap();

    scene.begin_drag(&[frame]).unwrap();
    assert!(scene.update_drag(Point::new(10.0, 10.0)).unwrap());
    scene.end_drag().unwrap();
}

#[test]
fn test_anchor_positions_in_rendered_path() {
    let mut scene = recording_scene();
    let a = add_rect(&mut scene, "A", 100.0, 100.0);
    let b = add_rect(&mut scene, "B", 300.0, 300.0);
    let id = scene
        .connect(a, b, Point::new(1.0, 0.0), Point::new(0.0, 1.0))
        .unwrap();

    let rendered = scene.render_connections();
    assert_eq!(rendered.len(), 1);
    assert_eq!(rendered[0].id, id);
    // Right-middle of A, top-centre of B
    assert!(rendered[0].path.start.approx_eq(&Point::new(150.0, 125.0)));
    assert!(rendered[0].path.end.approx_eq(&Point::new(325.0, 300.0)));
}

#[test]
fn test_removed_endpoint_hides_and_prunes_connection() {
    let mut scene = recording_scene();
    let a = add_rect(&mut scene, "A", 100.0, 100.0);
    let b = add_rect(&mut scene, "B", 300.0, 300.0);
    let c = add_rect(&mut scene, "C", 500.0, 100.0);
    scene.connect(a, b, Point::default(), Point::default()).unwrap();
    let kept = scene.connect(b, c, Point::default(), Point::default()).unwrap();

    scene.remove_element(a, Origin::User).unwrap();

    // Queries about the surviving endpoint keep working
    assert!(!scene.connections_need_update(b));
    let rendered = scene.render_connections();
    assert_eq!(rendered.len(), 1);
    assert_eq!(rendered[0].id, kept);
    assert_eq!(scene.connections().len(), 1);
    assert!(events(&scene)
        .iter()
        .any(|e| matches!(e, AppEvent::Connection(ConnectionEvent::Pruned { count: 1 }))));
}

#[test]
fn test_self_connection_rejected() {
    let mut scene = recording_scene();
    let a = add_rect(&mut scene, "A", 100.0, 100.0);
    assert!(scene.connect(a, a, Point::default(), Point::default()).is_err());
    assert!(scene.connections().is_empty());
}

#[test]
fn test_vertices_follow_endpoints() {
    let mut scene = recording_scene();
    let a = add_rect(&mut scene, "A", 0.0, 0.0);
    let b = add_rect(&mut scene, "B", 100.0, 100.0);
    let id = scene
        .connect(a, b, Point::new(-1.0, 1.0), Point::new(-1.0, 1.0))
        .unwrap();
    // Anchors resolve to (0,0) and (100,100); the vertex sits half way
    scene.add_vertex(id, None, Point::new(50.0, 50.0)).unwrap();
    let rendered = scene.render_connections();
    assert_eq!(rendered[0].path.vertices.len(), 1);
    assert!(rendered[0].path.vertices[0].approx_eq(&Point::new(50.0, 50.0)));

    scene.set_bounds(b, Rect::new(200.0, 200.0, 50.0, 50.0)).unwrap();
    let rendered = scene.render_connections();
    assert!(rendered[0].path.vertices[0].approx_eq(&Point::new(100.0, 100.0)));

    scene.move_vertex(id, 0, Point::new(20.0, 180.0)).unwrap();
    scene.remove_vertex(id, 0).unwrap();
    assert!(scene.render_connections()[0].path.vertices.is_empty());
    assert!(scene.remove_vertex(id, 0).is_err());
}

#[test]
fn test_connection_config_persists() {
    let mut scene = recording_scene();
    let a = add_rect(&mut scene, "A", 0.0, 0.0);
    let b = add_rect(&mut scene, "B", 100.0, 100.0);
    let id = scene.connect(a, b, Point::default(), Point::default()).unwrap();
    scene
        .set_connection_config(id, json!({ "stroke": "red" }))
        .unwrap();

    let document = scene.document();
    let source = document
        .root
        .elements
        .iter()
        .find(|e| e.name.as_deref() == Some("A"))
        .unwrap();
    assert_eq!(source.connections.len(), 1);
    assert_eq!(source.connections[0].target_name.as_deref(), Some("B"));
    assert_eq!(source.connections[0].config, json!({ "stroke": "red" }));

    assert!(scene.disconnect(id));
    assert!(!scene.disconnect(id));
}

#[test]
fn test_update_size_recomputes_root_connections() {
    let mut scene = recording_scene();
    let root = scene.tree().root();
    let a = add_rect(&mut scene, "A", 0.0, 0.0);
    scene
        .connect(a, root, Point::default(), Point::new(1.0, 1.0))
        .unwrap();

    scene.update_size(1000.0, 500.0);
    let rendered = scene.render_connections();
    assert!(rendered[0].path.end.approx_eq(&Point::new(1000.0, 0.0)));
    assert!(!scene.connections_need_update(a));
}
