//! Scene coordinator.
//!
//! `Scene` owns the element tree and the components that operate on it, and
//! is the single place where mutations are turned into events and saves.
//!
//! This module is split into submodules:
//! - `structure`: add, remove, move, reorder, rename, framing, layers
//! - `selection`: selection, batch add, inline edit mode
//! - `gestures`: drag, resize and rotate lifecycles
//! - `connections`: connection editing and recomputation
//! - `document`: serialization, save callback, load

mod connections;
mod document;
mod gestures;
mod selection;
mod structure;

pub use selection::ADD_TO_SELECTION_FAILED;

use canvaskit_core::{AppEvent, ElementId, EventBus, EventBusConfig, Origin, SceneError};

use crate::connections::ConnectionLayer;
use crate::geometry::Rect;
use crate::selection_manager::SelectionManager;
use crate::serialization::SceneDocument;
use crate::transform::{GestureSettings, TransformCoordinator};
use crate::tree::{ElementTree, DEFAULT_NAME_PROBE_LIMIT};

/// Callback receiving the serialized scene after every committed change.
pub type SaveCallback = Box<dyn FnMut(&SceneDocument) + Send>;

/// Viewport behaviour stored for the host's canvas controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewOptions {
    /// Offer element types hidden from the basic palette.
    pub show_advanced_types: bool,
    pub pan_zoom: bool,
    /// Panning past the viewport; only effective with `pan_zoom`.
    pub infinite_pan: bool,
}

/// Behaviour switches of a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneOptions {
    /// Whether gestures and batch selection are allowed.
    pub enable_editing: bool,
    /// Keep the selection across structural changes instead of clearing it.
    pub preserve_selection: bool,
    /// Initial viewport box of the root frame.
    pub root_bounds: Rect,
    pub gestures: GestureSettings,
    pub name_probe_limit: usize,
    /// Element types that support inline edit mode.
    pub inline_edit_types: Vec<String>,
    pub view: ViewOptions,
    pub event_bus: EventBusConfig,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            enable_editing: true,
            preserve_selection: false,
            root_bounds: Rect::new(0.0, 0.0, 800.0, 600.0),
            gestures: GestureSettings::default(),
            name_probe_limit: DEFAULT_NAME_PROBE_LIMIT,
            inline_edit_types: vec!["text".to_string()],
            view: ViewOptions::default(),
            event_bus: EventBusConfig::default(),
        }
    }
}

/// An editable canvas scene.
pub struct Scene {
    tree: ElementTree,
    selection: SelectionManager,
    transforms: TransformCoordinator,
    connections: ConnectionLayer,
    bus: EventBus,
    options: SceneOptions,
    on_save: Option<SaveCallback>,
    revision: u64,
    current_layer: ElementId,
}

impl Scene {
    /// Creates an empty scene.
    pub fn new(options: SceneOptions) -> Self {
        let mut tree = ElementTree::with_root_bounds(options.root_bounds);
        tree.set_name_probe_limit(options.name_probe_limit);
        let current_layer = tree.root();

        let mut transforms = TransformCoordinator::new(options.gestures);
        transforms.refresh_guides(&tree);

        Self {
            tree,
            selection: SelectionManager::new(),
            transforms,
            connections: ConnectionLayer::new(),
            bus: EventBus::with_config(options.event_bus.clone()),
            options,
            on_save: None,
            revision: 0,
            current_layer,
        }
    }

    pub fn tree(&self) -> &ElementTree {
        &self.tree
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    pub fn transforms(&self) -> &TransformCoordinator {
        &self.transforms
    }

    pub fn connections(&self) -> &ConnectionLayer {
        &self.connections
    }

    /// Event bus of this scene.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn options(&self) -> &SceneOptions {
        &self.options
    }

    /// Number of saves performed so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The frame the layer panel is editing.
    pub fn current_layer(&self) -> ElementId {
        self.current_layer
    }

    pub fn is_editing_enabled(&self) -> bool {
        self.options.enable_editing
    }

    /// Turns editing on or off. Disabling aborts the active gesture and
    /// leaves edit mode.
    pub fn set_editing_enabled(&mut self, enabled: bool) {
        if self.options.enable_editing == enabled {
            return;
        }
        self.options.enable_editing = enabled;
        if !enabled {
            self.abort_gesture();
            self.exit_edit_mode();
        }
        tracing::debug!("Editing {}", if enabled { "enabled" } else { "disabled" });
    }

    pub fn show_advanced_types(&self) -> bool {
        self.options.view.show_advanced_types
    }

    pub fn pan_zoom(&self) -> bool {
        self.options.view.pan_zoom
    }

    pub fn infinite_pan(&self) -> bool {
        self.options.view.pan_zoom && self.options.view.infinite_pan
    }

    pub fn set_view_options(&mut self, view: ViewOptions) {
        self.options.view = view;
    }

    /// Replaces the gesture tunables.
    pub fn set_gesture_settings(&mut self, settings: GestureSettings) {
        self.options.gestures = settings;
        self.transforms.set_settings(settings);
    }

    fn emit(&self, event: AppEvent) {
        // Nobody listening is not an error for the scene
        self.bus.publish(event).ok();
    }

    fn ensure_editing(&self) -> Result<(), SceneError> {
        if self.options.enable_editing {
            Ok(())
        } else {
            Err(SceneError::EditingDisabled)
        }
    }

    // Shared tail of every structural change.
    fn after_structure_change(&mut self, origin: &Origin) {
        self.transforms.refresh_guides(&self.tree);
        if self.options.preserve_selection {
            let stale: Vec<ElementId> = self
                .selection
                .selected()
                .iter()
                .copied()
                .filter(|id| !self.tree.contains(*id))
                .collect();
            if self.selection.prune(&stale) {
                self.emit_selection(origin.clone());
            }
        } else {
            self.clear_selection(origin.clone());
        }
        self.save();
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("elements", &self.tree.len())
            .field("selected", &self.selection.selected())
            .field("connections", &self.connections.len())
            .field("revision", &self.revision)
            .field("options", &self.options)
            .finish()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(SceneOptions::default())
    }
}
