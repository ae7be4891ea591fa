//! Structural edits of the element tree.
//!
//! Every operation here either fails without touching the tree or commits:
//! it emits its tree event, refreshes the snap guides, clears (or prunes)
//! the selection and saves.

use canvaskit_core::{AppEvent, ConnectionEvent, ElementId, Origin, Result, SceneError, TreeEvent};
use serde_json::Value;

use super::Scene;
use crate::constraint::Constraint;
use crate::element::ElementConfig;
use crate::geometry::Rect;
use crate::tree::DropPosition;

impl Scene {
    /// Adds an element to `parent`.
    pub fn add_element(
        &mut self,
        parent: ElementId,
        config: &ElementConfig,
        origin: Origin,
    ) -> Result<ElementId> {
        let id = self.tree.add_element(parent, config)?;
        self.emit_added(id, parent, &origin);
        self.after_structure_change(&origin);
        Ok(id)
    }

    /// Adds an element to the current layer.
    pub fn add_to_current_layer(
        &mut self,
        config: &ElementConfig,
        origin: Origin,
    ) -> Result<ElementId> {
        self.add_element(self.current_layer, config, origin)
    }

    fn emit_added(&self, id: ElementId, parent: ElementId, origin: &Origin) {
        let name = self
            .tree
            .get(id)
            .map(|e| e.name().to_string())
            .unwrap_or_default();
        self.emit(AppEvent::Tree(TreeEvent::ElementAdded {
            id,
            name,
            parent,
            origin: origin.clone(),
        }));
    }

    /// Removes an element and its subtree, dropping their connections.
    pub fn remove_element(&mut self, id: ElementId, origin: Origin) -> Result<Vec<ElementId>> {
        let removed = self.tree.remove_element(id)?;

        let pruned: usize = removed
            .iter()
            .map(|rid| self.connections.prune_element(*rid))
            .sum();
        if pruned > 0 {
            self.emit(AppEvent::Connection(ConnectionEvent::Pruned { count: pruned }));
        }

        if self.selection.editing().is_some_and(|e| removed.contains(&e)) {
            self.exit_edit_mode();
        }
        if removed.contains(&self.current_layer) {
            self.current_layer = self.tree.root();
        }
        if self.transforms.targets().iter().any(|t| removed.contains(t)) {
            self.abort_gesture();
        }

        self.emit(AppEvent::Tree(TreeEvent::ElementsRemoved {
            ids: removed.clone(),
            origin: origin.clone(),
        }));
        self.after_structure_change(&origin);
        Ok(removed)
    }

    /// Re-parents an element, keeping its on-screen box.
    pub fn move_element(
        &mut self,
        src: ElementId,
        dest: ElementId,
        index: Option<usize>,
        origin: Origin,
    ) -> Result<usize> {
        let index = self.tree.move_element(src, dest, index)?;
        self.emit(AppEvent::Tree(TreeEvent::ElementMoved {
            id: src,
            parent: dest,
            index,
            origin: origin.clone(),
        }));
        self.after_structure_change(&origin);
        Ok(index)
    }

    /// Applies a layer-panel drop. See [`ElementTree::reorder`](crate::ElementTree::reorder).
    pub fn reorder_elements(
        &mut self,
        src: ElementId,
        dest: ElementId,
        drop: DropPosition,
        origin: Origin,
    ) -> Result<()> {
        self.tree.reorder(src, dest, drop)?;
        if let (Some(parent), Some(index)) =
            (self.tree.parent_of(src), self.tree.index_in_parent(src))
        {
            self.emit(AppEvent::Tree(TreeEvent::ElementMoved {
                id: src,
                parent,
                index,
                origin: origin.clone(),
            }));
        }
        self.after_structure_change(&origin);
        Ok(())
    }

    /// Renames an element. Fails if the name is taken.
    pub fn rename_element(&mut self, id: ElementId, name: &str, origin: Origin) -> Result<()> {
        let old_name = self.tree.rename(id, name)?;
        if old_name == name {
            return Ok(());
        }
        self.emit(AppEvent::Tree(TreeEvent::ElementRenamed {
            id,
            old_name,
            new_name: name.to_string(),
            origin,
        }));
        self.save();
        Ok(())
    }

    /// Wraps the current selection into a new frame.
    pub fn frame_selection(&mut self, origin: Origin) -> Result<ElementId> {
        let selected = self.selection.selected().to_vec();
        let frame = self.tree.frame_selection(&selected)?;
        let parent = self.tree.parent_of(frame).unwrap_or(self.tree.root());

        self.emit_added(frame, parent, &origin);
        for (index, id) in self.tree.children(frame).iter().enumerate() {
            self.emit(AppEvent::Tree(TreeEvent::ElementMoved {
                id: *id,
                parent: frame,
                index,
                origin: origin.clone(),
            }));
        }
        self.after_structure_change(&origin);
        Ok(frame)
    }

    /// Copies an element and its subtree, offset from the original.
    pub fn duplicate_element(&mut self, id: ElementId, origin: Origin) -> Result<ElementId> {
        let copy = self.tree.duplicate(id)?;
        let parent = self.tree.parent_of(copy).unwrap_or(self.tree.root());
        self.emit_added(copy, parent, &origin);
        self.after_structure_change(&origin);
        Ok(copy)
    }

    /// Changes an element's constraint without moving it.
    pub fn set_constraint(&mut self, id: ElementId, constraint: Constraint) -> Result<()> {
        self.tree.set_constraint(id, constraint)?;
        self.save();
        Ok(())
    }

    /// Moves and resizes an element to an absolute box.
    pub fn set_bounds(&mut self, id: ElementId, bounds: Rect) -> Result<()> {
        self.tree.set_bounds(id, bounds)?;
        self.save();
        Ok(())
    }

    /// Replaces an element's type-specific payload.
    pub fn set_element_config(&mut self, id: ElementId, config: Value) -> Result<()> {
        let element = self
            .tree
            .get_mut(id)
            .ok_or(SceneError::ElementNotFound { id })?;
        element.config = config;
        self.save();
        Ok(())
    }

    /// Switches the frame the layer panel edits. Clears the selection.
    pub fn update_current_layer(&mut self, frame: ElementId, origin: Origin) -> Result<()> {
        if !self.tree.element(frame)?.is_frame() {
            return Err(SceneError::NotAFrame { id: frame }.into());
        }
        self.current_layer = frame;
        self.emit(AppEvent::Tree(TreeEvent::LayerChanged {
            frame,
            origin: origin.clone(),
        }));
        self.clear_selection(origin);
        self.save();
        Ok(())
    }

    /// Resizes the viewport. Clears the selection and recomputes connections.
    pub fn update_size(&mut self, width: f64, height: f64) {
        let bounds = self.tree.root_bounds();
        self.tree
            .set_root_bounds(Rect::new(bounds.x, bounds.y, width.max(0.0), height.max(0.0)));
        self.options.root_bounds = self.tree.root_bounds();
        self.clear_selection(Origin::System);
        self.update_connections();
    }
}
