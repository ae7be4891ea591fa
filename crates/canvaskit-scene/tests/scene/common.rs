#![allow(dead_code)]

use canvaskit_core::{AppEvent, EventBusConfig};
use canvaskit_scene::{ElementConfig, ElementId, Placement, Scene, SceneOptions};

/// Scene whose bus logs every event.
pub fn recording_scene() -> Scene {
    Scene::new(SceneOptions {
        event_bus: EventBusConfig {
            log_size: 10_000,
            ..Default::default()
        },
        ..Default::default()
    })
}

pub fn events(scene: &Scene) -> Vec<AppEvent> {
    scene.bus().recent()
}

pub fn rect(name: &str, left: f64, top: f64, width: f64, height: f64) -> ElementConfig {
    ElementConfig::new("rectangle")
        .with_name(name)
        .with_placement(Placement::at(left, top, width, height))
}

/// Adds a named rectangle to the root.
pub fn add_rect(scene: &mut Scene, name: &str, left: f64, top: f64) -> ElementId {
    let root = scene.tree().root();
    scene
        .add_element(
            root,
            &rect(name, left, top, 50.0, 50.0),
            canvaskit_scene::Origin::Programmatic,
        )
        .expect("add rectangle")
}
