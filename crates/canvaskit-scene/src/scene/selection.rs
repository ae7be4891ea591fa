//! Selection operations and inline edit mode for the scene.

use canvaskit_core::{AlertEvent, AppEvent, ElementId, Origin, SelectionEvent};

use super::Scene;
use crate::selection_manager::{SelectionManager, SelectionRequest};

/// Message shown when a batch selection cannot be applied.
pub const ADD_TO_SELECTION_FAILED: &str = "Unable to add to selection";

impl Scene {
    /// Replaces the selection and notifies subscribers.
    ///
    /// Unresolvable targets are skipped. A change event is emitted on every
    /// call, even when the selection did not change, tagged with `origin` so
    /// observers can ignore their own requests. Any selection leaves edit
    /// mode.
    pub fn select(&mut self, request: SelectionRequest, origin: Origin) -> Vec<ElementId> {
        let selected = self.selection.select(&self.tree, &request);
        self.exit_edit_mode();
        self.emit_selection(origin);
        selected
    }

    /// Selects a single element.
    pub fn select_element(&mut self, id: ElementId, origin: Origin) -> Vec<ElementId> {
        self.select(SelectionRequest::single(id), origin)
    }

    /// Empties the selection and notifies subscribers.
    pub fn clear_selection(&mut self, origin: Origin) {
        self.select(SelectionRequest::none(), origin);
    }

    pub(super) fn emit_selection(&self, origin: Origin) {
        self.emit(AppEvent::Selection(SelectionEvent::Changed {
            selected: self.selection.selected().to_vec(),
            frame: self.selection.frame(),
            origin,
        }));
    }

    /// Queues an element for the next [`add_to_selection`](Self::add_to_selection).
    pub fn queue_selection_target(&mut self, id: ElementId) {
        self.selection.queue_target(id);
    }

    /// Selects the queued targets as one batch.
    ///
    /// When editing is disabled or none of the queued targets resolves, the
    /// selection is left untouched and an error alert is emitted instead.
    /// Returns whether the selection was applied.
    pub fn add_to_selection(&mut self) -> bool {
        let pending = self.selection.take_pending();
        let request = SelectionRequest::Elements(pending);
        let (resolved, _) = SelectionManager::resolve(&self.tree, &request);

        if !self.options.enable_editing || resolved.is_empty() {
            tracing::warn!("{}", ADD_TO_SELECTION_FAILED);
            self.emit(AppEvent::Alert(AlertEvent::Error {
                message: ADD_TO_SELECTION_FAILED.to_string(),
            }));
            return false;
        }

        self.select(request, Origin::Programmatic);
        true
    }

    /// Handles a click on an element.
    ///
    /// A double click on a selected element whose type supports inline
    /// editing enters edit mode. Returns whether edit mode was entered.
    pub fn handle_click(&mut self, id: ElementId, double: bool) -> bool {
        if !double || !self.options.enable_editing || self.selection.is_editing() {
            return false;
        }
        if !self.selection.is_selected(id) {
            return false;
        }
        let supports_editing = self.tree.get(id).is_some_and(|element| {
            self.options
                .inline_edit_types
                .iter()
                .any(|t| *t == element.element_type)
        });
        if !supports_editing {
            return false;
        }

        self.selection.enter_edit_mode(id);
        tracing::debug!("Entered edit mode on {}", id);
        self.emit(AppEvent::Selection(SelectionEvent::EditModeChanged {
            enabled: true,
            element: Some(id),
        }));
        true
    }

    /// Leaves inline edit mode, returning the element that was being edited.
    pub fn exit_edit_mode(&mut self) -> Option<ElementId> {
        let element = self.selection.exit_edit_mode()?;
        self.emit(AppEvent::Selection(SelectionEvent::EditModeChanged {
            enabled: false,
            element: Some(element),
        }));
        Some(element)
    }
}
