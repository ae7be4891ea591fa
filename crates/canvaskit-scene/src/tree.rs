//! Arena-backed element tree.
//!
//! Elements live in a flat map keyed by [`ElementId`]; frames hold their
//! children as ordered id lists and every element records its parent id. The
//! tree keeps three invariants across every public operation:
//!
//! - exactly one parentless frame, the root
//! - no frame contains itself transitively
//! - names are unique across the whole tree
//!
//! Positions are stored as constraint-relative placements. Absolute boxes are
//! resolved on demand by walking down from the root bounds, so re-parenting an
//! element only has to re-derive that element's placement.

use std::collections::{HashMap, HashSet};

use canvaskit_core::{ElementId, SceneError};
use chrono::Utc;

use crate::constraint::{placement_from_bounds, resolve_bounds, Constraint, Placement};
use crate::element::{Element, ElementConfig, ElementKind, FRAME_TYPE};
use crate::geometry::Rect;

/// Name given to the root frame.
pub const ROOT_NAME: &str = "Root";

/// Number of consecutive generated names tried before falling back to a
/// timestamp suffix.
pub const DEFAULT_NAME_PROBE_LIMIT: usize = 100;

/// Offset applied to duplicated elements, in pixels on both axes.
pub const DUPLICATE_OFFSET: f64 = 10.0;

/// Where a layer-panel drop landed relative to its target node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropPosition {
    /// Dropped onto the node itself.
    OntoNode,
    /// Dropped into the gap next to the node. `top_of_tree` marks the gap
    /// above the topmost node.
    Gap { top_of_tree: bool },
}

type TreeResult<T> = std::result::Result<T, SceneError>;

/// The scene's element hierarchy.
#[derive(Debug, Clone)]
pub struct ElementTree {
    elements: HashMap<ElementId, Element>,
    by_name: HashMap<String, ElementId>,
    root: ElementId,
    next_id: u64,
    root_bounds: Rect,
    name_probe_limit: usize,
}

impl ElementTree {
    /// Creates a tree holding only the root frame, sized 800x600.
    pub fn new() -> Self {
        Self::with_root_bounds(Rect::new(0.0, 0.0, 800.0, 600.0))
    }

    /// Creates a tree whose root frame covers `bounds`.
    pub fn with_root_bounds(bounds: Rect) -> Self {
        let root = ElementId::new(0);
        let root_element = Element {
            id: root,
            name: ROOT_NAME.to_string(),
            parent: None,
            kind: ElementKind::Frame {
                children: Vec::new(),
            },
            element_type: FRAME_TYPE.to_string(),
            config: serde_json::Value::Null,
            placement: Placement::default(),
            constraint: Constraint::stretch(),
        };

        let mut elements = HashMap::new();
        elements.insert(root, root_element);
        let mut by_name = HashMap::new();
        by_name.insert(ROOT_NAME.to_string(), root);

        Self {
            elements,
            by_name,
            root,
            next_id: 1,
            root_bounds: bounds,
            name_probe_limit: DEFAULT_NAME_PROBE_LIMIT,
        }
    }

    pub fn set_name_probe_limit(&mut self, limit: usize) {
        self.name_probe_limit = limit.max(1);
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn root_bounds(&self) -> Rect {
        self.root_bounds
    }

    /// Resizes the root frame. Descendants follow through their constraints.
    pub fn set_root_bounds(&mut self, bounds: Rect) {
        self.root_bounds = bounds;
    }

    /// Number of elements, root excluded.
    pub fn len(&self) -> usize {
        self.elements.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    /// Mutable access for payload and placement edits. Structure and names
    /// stay under the tree's control.
    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(&id)
    }

    /// Like [`get`](Self::get) but reports a missing id as an error.
    pub fn element(&self, id: ElementId) -> TreeResult<&Element> {
        self.elements
            .get(&id)
            .ok_or(SceneError::ElementNotFound { id })
    }

    fn element_mut(&mut self, id: ElementId) -> TreeResult<&mut Element> {
        self.elements
            .get_mut(&id)
            .ok_or(SceneError::ElementNotFound { id })
    }

    pub fn find_by_name(&self, name: &str) -> Option<ElementId> {
        self.by_name.get(name).copied()
    }

    pub fn parent_of(&self, id: ElementId) -> Option<ElementId> {
        self.elements.get(&id).and_then(|e| e.parent)
    }

    /// Children of a frame, back to front. Empty for items and unknown ids.
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.elements.get(&id).map(|e| e.children()).unwrap_or(&[])
    }

    pub fn is_frame(&self, id: ElementId) -> bool {
        self.elements.get(&id).is_some_and(Element::is_frame)
    }

    /// Position of `id` within its parent's child list.
    pub fn index_in_parent(&self, id: ElementId) -> Option<usize> {
        let parent = self.parent_of(id)?;
        self.children(parent).iter().position(|c| *c == id)
    }

    /// Whether `ancestor` strictly contains `id`.
    pub fn is_ancestor(&self, ancestor: ElementId, id: ElementId) -> bool {
        let mut cursor = self.parent_of(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent_of(current);
        }
        false
    }

    /// Pre-order ids of the subtree rooted at `from`, `from` included.
    pub fn depth_first(&self, from: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        if !self.contains(from) {
            return out;
        }
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Every element in pre-order, root first.
    pub fn iter(&self) -> impl Iterator<Item = &Element> + '_ {
        self.depth_first(self.root)
            .into_iter()
            .filter_map(move |id| self.elements.get(&id))
    }

    // ----- naming -----

    /// Whether `name` is free.
    pub fn can_rename(&self, name: &str) -> bool {
        !self.by_name.contains_key(name)
    }

    /// Generates a free `"Element N"` / `"Frame N"` name.
    ///
    /// Probing starts at the number of named elements plus one; when the
    /// whole probe window is taken the current unix time in milliseconds is
    /// used as the suffix instead, with a `-N` counter if that is taken too.
    pub fn next_element_name(&self, is_frame: bool) -> String {
        self.next_element_name_excluding(is_frame, &HashSet::new())
    }

    /// Like [`next_element_name`](Self::next_element_name), also skipping
    /// `reserved` names that are not in the tree yet.
    pub fn next_element_name_excluding(
        &self,
        is_frame: bool,
        reserved: &HashSet<String>,
    ) -> String {
        let label = if is_frame { "Frame" } else { "Element" };
        let start = self.by_name.len() + 1;
        let free = |name: &String| self.can_rename(name) && !reserved.contains(name);

        (start..start + self.name_probe_limit)
            .map(|idx| format!("{} {}", label, idx))
            .find(free)
            .unwrap_or_else(|| {
                let stamped = format!("{} {}", label, Utc::now().timestamp_millis());
                std::iter::once(stamped.clone())
                    .chain((2..).map(|n| format!("{}-{}", stamped, n)))
                    .find(free)
                    .unwrap_or(stamped)
            })
    }

    fn unique_name(&self, requested: Option<&str>, is_frame: bool) -> String {
        match requested {
            Some(name) if !name.is_empty() && self.can_rename(name) => name.to_string(),
            _ => self.next_element_name(is_frame),
        }
    }

    /// Renames an element, returning its previous name.
    pub fn rename(&mut self, id: ElementId, name: &str) -> TreeResult<String> {
        if id == self.root {
            return Err(SceneError::RootImmutable);
        }
        let current = self.element(id)?.name.clone();
        if current == name {
            return Ok(current);
        }
        if name.is_empty() {
            return Err(SceneError::Other {
                message: "Name cannot be empty".to_string(),
            });
        }
        if !self.can_rename(name) {
            return Err(SceneError::NameTaken {
                name: name.to_string(),
            });
        }

        self.by_name.remove(&current);
        self.by_name.insert(name.to_string(), id);
        self.element_mut(id)?.name = name.to_string();
        tracing::debug!("Renamed {} '{}' -> '{}'", id, current, name);
        Ok(current)
    }

    // ----- structure -----

    /// Appends an element (and, for frames, its configured subtree) to `parent`.
    pub fn add_element(
        &mut self,
        parent: ElementId,
        config: &ElementConfig,
    ) -> TreeResult<ElementId> {
        self.insert_element(parent, None, config)
    }

    /// Inserts an element at `index` within `parent`, appending when `None`.
    ///
    /// A configured name that is empty or already used is replaced with a
    /// generated one. The whole configured subtree is checked first, so a
    /// failure leaves the tree untouched.
    pub fn insert_element(
        &mut self,
        parent: ElementId,
        index: Option<usize>,
        config: &ElementConfig,
    ) -> TreeResult<ElementId> {
        if !self.element(parent)?.is_frame() {
            return Err(SceneError::NotAFrame { id: parent });
        }
        check_placements(config)?;
        Ok(self.insert_checked(parent, index, config))
    }

    fn insert_checked(
        &mut self,
        parent: ElementId,
        index: Option<usize>,
        config: &ElementConfig,
    ) -> ElementId {
        let id = ElementId::new(self.next_id);
        self.next_id += 1;

        let is_frame = config.is_frame();
        let name = self.unique_name(config.name.as_deref(), is_frame);
        let kind = if is_frame {
            ElementKind::Frame {
                children: Vec::new(),
            }
        } else {
            ElementKind::Item
        };

        self.by_name.insert(name.clone(), id);
        self.elements.insert(
            id,
            Element {
                id,
                name,
                parent: Some(parent),
                kind,
                element_type: config.element_type.clone(),
                config: config.config.clone(),
                placement: config.placement,
                constraint: config.constraint,
            },
        );
        if let Some(children) = self
            .elements
            .get_mut(&parent)
            .and_then(Element::children_mut)
        {
            let at = index.map_or(children.len(), |i| i.min(children.len()));
            children.insert(at, id);
        }

        if is_frame {
            for child in &config.elements {
                self.insert_checked(id, None, child);
            }
        }

        tracing::debug!("Added {} to {}", id, parent);
        id
    }

    /// Removes an element and its subtree, returning every removed id.
    pub fn remove_element(&mut self, id: ElementId) -> TreeResult<Vec<ElementId>> {
        if id == self.root {
            return Err(SceneError::RootImmutable);
        }
        let parent = self.element(id)?.parent;

        let removed = self.depth_first(id);
        if let Some(siblings) = parent
            .and_then(|p| self.elements.get_mut(&p))
            .and_then(Element::children_mut)
        {
            siblings.retain(|c| *c != id);
        }
        for rid in &removed {
            if let Some(element) = self.elements.remove(rid) {
                self.by_name.remove(&element.name);
            }
        }

        tracing::debug!("Removed {} ({} element(s))", id, removed.len());
        Ok(removed)
    }

    /// Re-parents `src` into `dest` at `index` (appending when `None`),
    /// keeping its on-screen box. Returns the final index.
    pub fn move_element(
        &mut self,
        src: ElementId,
        dest: ElementId,
        index: Option<usize>,
    ) -> TreeResult<usize> {
        if src == self.root {
            return Err(SceneError::RootImmutable);
        }
        let old_parent = self.element(src)?.parent;
        if !self.element(dest)?.is_frame() {
            return Err(SceneError::NotAFrame { id: dest });
        }
        if src == dest || self.is_ancestor(src, dest) {
            return Err(SceneError::CycleDetected { src, dest });
        }

        let bounds = self.bounds_of(src)?;
        let dest_bounds = self.bounds_of(dest)?;

        if let Some(siblings) = old_parent
            .and_then(|p| self.elements.get_mut(&p))
            .and_then(Element::children_mut)
        {
            siblings.retain(|c| *c != src);
        }
        let at = match self.element_mut(dest)?.children_mut() {
            Some(children) => {
                let at = index.map_or(children.len(), |i| i.min(children.len()));
                children.insert(at, src);
                at
            }
            None => return Err(SceneError::NotAFrame { id: dest }),
        };

        let element = self.element_mut(src)?;
        element.parent = Some(dest);
        let rotation = element.placement.rotation;
        element.placement = placement_from_bounds(&bounds, &dest_bounds, &element.constraint);
        element.placement.rotation = rotation;

        tracing::debug!("Moved {} to {}[{}]", src, dest, at);
        Ok(at)
    }

    /// Applies a layer-panel drop of `src` onto or next to `dest`.
    ///
    /// - onto a frame: `src` enters the frame, or is brought to the top if
    ///   it already lives there
    /// - onto an item: `src` takes the item's slot, re-parenting when needed
    /// - into a gap: `src` is inserted at the gap in `dest`'s parent, or on
    ///   top of that parent for the topmost gap
    pub fn reorder(
        &mut self,
        src: ElementId,
        dest: ElementId,
        drop: DropPosition,
    ) -> TreeResult<()> {
        if src == self.root {
            return Err(SceneError::RootImmutable);
        }
        self.element(src)?;
        let dest_element = self.element(dest)?;
        if src == dest {
            return Ok(());
        }
        let src_parent = self.parent_of(src);
        let dest_parent = dest_element.parent;
        let dest_is_frame = dest_element.is_frame();

        match drop {
            DropPosition::Gap { top_of_tree: true } => {
                if let Some(parent) = dest_parent {
                    self.move_element(src, parent, None)?;
                }
            }
            DropPosition::Gap { top_of_tree: false } => {
                if let Some(parent) = dest_parent {
                    let at = self.index_in_parent(dest);
                    self.move_element(src, parent, at)?;
                }
            }
            DropPosition::OntoNode if dest_is_frame => {
                if src_parent == Some(dest) {
                    self.reorder_within(dest, src, None)?;
                } else {
                    let at = self.children(dest).len().saturating_sub(1);
                    self.move_element(src, dest, Some(at))?;
                }
            }
            DropPosition::OntoNode => match dest_parent {
                Some(parent) if src_parent == Some(parent) => {
                    self.reorder_within(parent, src, Some(dest))?;
                }
                Some(parent) => {
                    let at = self.children(parent).len().saturating_sub(1);
                    self.move_element(src, parent, Some(at))?;
                }
                None => {}
            },
        }
        Ok(())
    }

    // Moves `src` to the slot of `dest` inside `frame`, or to the last slot.
    fn reorder_within(
        &mut self,
        frame: ElementId,
        src: ElementId,
        dest: Option<ElementId>,
    ) -> TreeResult<()> {
        let children = self
            .element_mut(frame)?
            .children_mut()
            .ok_or(SceneError::NotAFrame { id: frame })?;
        let Some(from) = children.iter().position(|c| *c == src) else {
            return Err(SceneError::ElementNotFound { id: src });
        };
        let to = match dest {
            Some(dest) => children
                .iter()
                .position(|c| *c == dest)
                .ok_or(SceneError::ElementNotFound { id: dest })?,
            None => children.len() - 1,
        };
        let moved = children.remove(from);
        let to = to.min(children.len());
        children.insert(to, moved);
        tracing::debug!("Reordered {} in {} ({} -> {})", src, frame, from, to);
        Ok(())
    }

    /// Wraps `ids` into a new frame inside the first element's parent.
    ///
    /// The frame's box is the union of the wrapped boxes and every wrapped
    /// element keeps its on-screen position. Unknown ids, the root, elements
    /// that contain the target parent, and elements nested under another
    /// wrapped element are skipped.
    pub fn frame_selection(&mut self, ids: &[ElementId]) -> TreeResult<ElementId> {
        let first = ids
            .iter()
            .copied()
            .find(|id| *id != self.root && self.contains(*id))
            .ok_or(SceneError::Other {
                message: "Nothing to frame".to_string(),
            })?;
        let parent = self.parent_of(first).unwrap_or(self.root);

        let candidates: HashSet<ElementId> = ids.iter().copied().collect();
        let mut seen = HashSet::new();
        let members: Vec<ElementId> = ids
            .iter()
            .copied()
            .filter(|id| *id != self.root && self.contains(*id))
            .filter(|id| *id != parent && !self.is_ancestor(*id, parent))
            .filter(|id| !candidates.iter().any(|c| self.is_ancestor(*c, *id)))
            .filter(|id| seen.insert(*id))
            .collect();
        if members.is_empty() {
            return Err(SceneError::Other {
                message: "Nothing to frame".to_string(),
            });
        }

        let boxes = members
            .iter()
            .map(|id| self.bounds_of(*id))
            .collect::<TreeResult<Vec<_>>>()?;
        let union = Rect::union_all(&boxes).unwrap_or_default();
        let parent_bounds = self.bounds_of(parent)?;

        let frame_config = ElementConfig::frame()
            .with_name(self.next_element_name(true))
            .with_placement(placement_from_bounds(
                &union,
                &parent_bounds,
                &Constraint::default(),
            ));
        let frame = self.add_element(parent, &frame_config)?;

        for id in &members {
            self.move_element(*id, frame, None)?;
        }

        tracing::debug!("Framed {} element(s) into {}", members.len(), frame);
        Ok(frame)
    }

    /// Copies an element and its subtree next to it, offset by
    /// [`DUPLICATE_OFFSET`]. Copies receive generated names.
    pub fn duplicate(&mut self, id: ElementId) -> TreeResult<ElementId> {
        if id == self.root {
            return Err(SceneError::RootImmutable);
        }
        let parent = self.parent_of(id).unwrap_or(self.root);
        let mut config = self.to_config(id)?;
        strip_names(&mut config);

        let bounds = self.bounds_of(id)?;
        let copy = self.add_element(parent, &config)?;
        self.set_bounds(copy, bounds.translate(DUPLICATE_OFFSET, DUPLICATE_OFFSET))?;
        Ok(copy)
    }

    /// Configuration of an element and its subtree, without connections.
    pub fn to_config(&self, id: ElementId) -> TreeResult<ElementConfig> {
        let element = self.element(id)?;
        let elements = element
            .children()
            .iter()
            .map(|child| self.to_config(*child))
            .collect::<TreeResult<Vec<_>>>()?;

        Ok(ElementConfig {
            element_type: element.element_type.clone(),
            name: Some(element.name.clone()),
            placement: element.placement,
            constraint: element.constraint,
            config: element.config.clone(),
            connections: Vec::new(),
            elements,
        })
    }

    // ----- geometry -----

    /// Absolute box of an element, resolved from the root down.
    pub fn bounds_of(&self, id: ElementId) -> TreeResult<Rect> {
        let mut chain = Vec::new();
        let mut cursor = id;
        loop {
            let element = self.element(cursor)?;
            match element.parent {
                Some(parent) => {
                    chain.push(element);
                    cursor = parent;
                }
                None => break,
            }
        }

        Ok(chain.iter().rev().fold(self.root_bounds, |parent, element| {
            resolve_bounds(&element.placement, &element.constraint, &parent)
        }))
    }

    /// Re-derives an element's placement so that it resolves to `bounds`.
    pub fn set_bounds(&mut self, id: ElementId, bounds: Rect) -> TreeResult<()> {
        let parent = self.element(id)?.parent.ok_or(SceneError::RootImmutable)?;
        let parent_bounds = self.bounds_of(parent)?;

        let element = self.element_mut(id)?;
        let rotation = element.placement.rotation;
        element.placement = placement_from_bounds(&bounds, &parent_bounds, &element.constraint);
        element.placement.rotation = rotation;
        Ok(())
    }

    /// Changes an element's constraint without moving it on screen.
    pub fn set_constraint(&mut self, id: ElementId, constraint: Constraint) -> TreeResult<()> {
        if id == self.root {
            return Err(SceneError::RootImmutable);
        }
        let bounds = self.bounds_of(id)?;
        self.element_mut(id)?.constraint = constraint;
        self.set_bounds(id, bounds)
    }

    /// Sets an element's rotation in degrees.
    pub fn set_rotation(&mut self, id: ElementId, degrees: f64) -> TreeResult<()> {
        self.element_mut(id)?.placement.rotation = Some(degrees);
        Ok(())
    }

    /// Checks the structural invariants, reporting the first violation.
    pub fn verify_integrity(&self) -> TreeResult<()> {
        let broken = |message: String| SceneError::Other { message };

        let roots: Vec<_> = self
            .elements
            .values()
            .filter(|e| e.parent.is_none())
            .collect();
        if roots.len() != 1 || roots[0].id != self.root {
            return Err(broken(format!("expected one root, found {}", roots.len())));
        }

        let reachable = self.depth_first(self.root);
        if reachable.len() != self.elements.len() {
            return Err(broken(format!(
                "{} element(s) unreachable from the root",
                self.elements.len() - reachable.len()
            )));
        }
        let unique: HashSet<_> = reachable.iter().collect();
        if unique.len() != reachable.len() {
            return Err(broken("an element is listed twice".to_string()));
        }

        for element in self.elements.values() {
            for child in element.children() {
                if self.parent_of(*child) != Some(element.id) {
                    return Err(broken(format!("{} has a stale parent link", child)));
                }
            }
            if self.by_name.get(&element.name) != Some(&element.id) {
                return Err(broken(format!("name '{}' is not unique", element.name)));
            }
        }
        if self.by_name.len() != self.elements.len() {
            return Err(broken("name index out of sync".to_string()));
        }
        Ok(())
    }
}

impl Default for ElementTree {
    fn default() -> Self {
        Self::new()
    }
}

// Rejects a config whose own or nested placement is not finite.
fn check_placements(config: &ElementConfig) -> TreeResult<()> {
    if let Some(field) = config.placement.invalid_field() {
        return Err(SceneError::Other {
            message: format!("Placement field '{}' is not finite", field),
        });
    }
    if config.is_frame() {
        config.elements.iter().try_for_each(check_placements)?;
    }
    Ok(())
}

fn strip_names(config: &mut ElementConfig) {
    config.name = None;
    config.elements.iter_mut().for_each(strip_names);
}
