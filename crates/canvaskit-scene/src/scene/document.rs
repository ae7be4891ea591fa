//! Save and load operations for the scene.

use canvaskit_core::{AlertEvent, AppEvent, DocumentEvent, Origin, Result};
use chrono::Utc;

use super::{SaveCallback, Scene, SceneOptions};
use crate::serialization::{deserialize, serialize, SceneDocument};

impl Scene {
    /// Builds a scene from a document.
    pub fn from_document(document: &SceneDocument, options: SceneOptions) -> Result<Self> {
        let mut scene = Scene::new(options);
        scene.load(document)?;
        Ok(scene)
    }

    /// Registers the host callback that receives every saved document.
    pub fn set_on_save<F>(&mut self, callback: F)
    where
        F: FnMut(&SceneDocument) + Send + 'static,
    {
        let callback: SaveCallback = Box::new(callback);
        self.on_save = Some(callback);
    }

    /// Serialized form of the current scene.
    pub fn document(&self) -> SceneDocument {
        serialize(&self.tree, &self.connections)
    }

    /// Serializes the scene and hands it to the save callback.
    pub fn save(&mut self) {
        let document = self.document();
        self.revision += 1;
        if let Some(callback) = self.on_save.as_mut() {
            callback(&document);
        }
        tracing::debug!("Saved revision {}", self.revision);
        self.emit(AppEvent::Document(DocumentEvent::Saved {
            revision: self.revision,
            at: Utc::now(),
        }));
    }

    /// Replaces the scene contents with `document`.
    ///
    /// The document is validated first; on error the scene is unchanged.
    /// The viewport size, save callback and subscribers are kept.
    pub fn load(&mut self, document: &SceneDocument) -> Result<()> {
        let loaded = deserialize(
            document,
            self.tree.root_bounds(),
            self.options.name_probe_limit,
        )?;

        self.abort_gesture();
        self.tree = loaded.tree;
        self.connections = loaded.connections;
        self.current_layer = self.tree.root();
        self.selection.take_pending();
        self.transforms.refresh_guides(&self.tree);

        for warning in loaded.warnings {
            self.emit(AppEvent::Alert(AlertEvent::Warning { message: warning }));
        }
        self.emit(AppEvent::Document(DocumentEvent::Loaded {
            elements: self.tree.len(),
        }));
        self.clear_selection(Origin::System);
        Ok(())
    }
}
