use std::collections::HashSet;

use canvaskit_core::ElementId;

use crate::tree::ElementTree;

/// What a selection request points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionRequest {
    /// A set of elements, in request order.
    Elements(Vec<ElementId>),
    /// A single frame selected as a whole.
    Frame(ElementId),
}

impl SelectionRequest {
    pub fn single(id: ElementId) -> Self {
        SelectionRequest::Elements(vec![id])
    }

    pub fn none() -> Self {
        SelectionRequest::Elements(Vec::new())
    }
}

/// Tracks the current selection and inline edit mode.
///
/// `SelectionManager` is responsible for:
/// - Resolving selection requests against the tree (unknown ids and the root
///   are dropped silently, duplicates collapse)
/// - Remembering whether the selection is a whole frame
/// - Tracking the element in inline edit mode
/// - Queueing targets for a later batch [`add_to_selection`]
///
/// It holds ids only and never touches the tree, so a stale selection is
/// harmless until [`prune`](Self::prune) drops removed ids.
///
/// [`add_to_selection`]: crate::Scene::add_to_selection
#[derive(Debug, Clone, Default)]
pub struct SelectionManager {
    selected: Vec<ElementId>,
    frame: Option<ElementId>,
    editing: Option<ElementId>,
    pending: Vec<ElementId>,
}

impl SelectionManager {
    /// Creates a new `SelectionManager` with nothing selected.
    ///
    /// # Examples
    ///
    /// ```
    /// use canvaskit_scene::selection_manager::SelectionManager;
    ///
    /// let manager = SelectionManager::new();
    /// assert!(manager.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves `request` and replaces the selection with the result.
    ///
    /// Returns the resolved ids, which may be empty.
    pub fn select(&mut self, tree: &ElementTree, request: &SelectionRequest) -> Vec<ElementId> {
        let (selected, frame) = Self::resolve(tree, request);
        self.selected = selected.clone();
        self.frame = frame;
        selected
    }

    /// Resolves a request without changing the selection.
    pub fn resolve(
        tree: &ElementTree,
        request: &SelectionRequest,
    ) -> (Vec<ElementId>, Option<ElementId>) {
        match request {
            SelectionRequest::Frame(id) if *id != tree.root() && tree.is_frame(*id) => {
                (vec![*id], Some(*id))
            }
            SelectionRequest::Frame(id) => Self::resolve_elements(tree, std::slice::from_ref(id)),
            SelectionRequest::Elements(ids) => Self::resolve_elements(tree, ids),
        }
    }

    fn resolve_elements(
        tree: &ElementTree,
        ids: &[ElementId],
    ) -> (Vec<ElementId>, Option<ElementId>) {
        let mut seen = HashSet::new();
        let resolved = ids
            .iter()
            .copied()
            .filter(|id| *id != tree.root() && tree.contains(*id))
            .filter(|id| seen.insert(*id))
            .collect();
        (resolved, None)
    }

    /// Empties the selection.
    pub fn clear(&mut self) {
        self.selected.clear();
        self.frame = None;
    }

    pub fn selected(&self) -> &[ElementId] {
        &self.selected
    }

    /// The frame selected as a whole, if any.
    pub fn frame(&self) -> Option<ElementId> {
        self.frame
    }

    pub fn is_selected(&self, id: ElementId) -> bool {
        self.selected.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Drops removed ids from the selection, edit mode and queue.
    ///
    /// Returns true if the selection itself changed.
    pub fn prune(&mut self, removed: &[ElementId]) -> bool {
        let removed: HashSet<ElementId> = removed.iter().copied().collect();
        let before = self.selected.len();
        self.selected.retain(|id| !removed.contains(id));
        if self.frame.is_some_and(|f| removed.contains(&f)) {
            self.frame = None;
        }
        if self.editing.is_some_and(|e| removed.contains(&e)) {
            self.editing = None;
        }
        self.pending.retain(|id| !removed.contains(id));
        before != self.selected.len()
    }

    // ----- edit mode -----

    /// The element in inline edit mode.
    pub fn editing(&self) -> Option<ElementId> {
        self.editing
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn enter_edit_mode(&mut self, id: ElementId) {
        self.editing = Some(id);
    }

    /// Leaves edit mode, returning the element that was being edited.
    pub fn exit_edit_mode(&mut self) -> Option<ElementId> {
        self.editing.take()
    }

    // ----- batch targets -----

    /// Queues an element for the next batch add.
    pub fn queue_target(&mut self, id: ElementId) {
        if !self.pending.contains(&id) {
            self.pending.push(id);
        }
    }

    pub fn pending(&self) -> &[ElementId] {
        &self.pending
    }

    /// Takes the queued targets, leaving the queue empty.
    pub fn take_pending(&mut self) -> Vec<ElementId> {
        std::mem::take(&mut self.pending)
    }
}
