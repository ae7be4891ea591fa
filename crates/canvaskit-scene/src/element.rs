//! Scene elements and their persisted configuration.

use canvaskit_core::ElementId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::connections::ConnectionConfig;
use crate::constraint::{Constraint, Placement};

/// Element type of frames.
pub const FRAME_TYPE: &str = "frame";

/// Whether an element is a leaf or a container.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    /// A leaf element.
    Item,
    /// A container owning an ordered list of children, back to front.
    Frame { children: Vec<ElementId> },
}

/// A positionable node of the scene tree.
///
/// Identity, name and tree links are owned by [`ElementTree`](crate::ElementTree)
/// and exposed read-only; placement, constraint and the opaque payload may be
/// edited in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub(crate) id: ElementId,
    pub(crate) name: String,
    pub(crate) parent: Option<ElementId>,
    pub(crate) kind: ElementKind,
    /// Registry type of the element, e.g. `"rectangle"` or `"frame"`.
    pub element_type: String,
    /// Type-specific payload, passed through untouched.
    pub config: Value,
    pub placement: Placement,
    pub constraint: Constraint,
}

impl Element {
    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning frame, `None` for the root.
    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    pub fn is_frame(&self) -> bool {
        matches!(self.kind, ElementKind::Frame { .. })
    }

    /// Child ids, empty for items.
    pub fn children(&self) -> &[ElementId] {
        match &self.kind {
            ElementKind::Frame { children } => children,
            ElementKind::Item => &[],
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<ElementId>> {
        match &mut self.kind {
            ElementKind::Frame { children } => Some(children),
            ElementKind::Item => None,
        }
    }
}

/// Persisted form of an element and, for frames, its subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementConfig {
    #[serde(rename = "type")]
    pub element_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub placement: Placement,
    #[serde(default)]
    pub constraint: Constraint,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub config: Value,
    /// Outgoing connections; only meaningful when loading or saving.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub connections: Vec<ConnectionConfig>,
    /// Children, back to front. Only read for frames.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<ElementConfig>,
}

impl ElementConfig {
    /// A 100x100 element of the given type at the parent's top-left corner.
    pub fn new(element_type: impl Into<String>) -> Self {
        Self {
            element_type: element_type.into(),
            name: None,
            placement: Placement::at(0.0, 0.0, 100.0, 100.0),
            constraint: Constraint::default(),
            config: Value::Null,
            connections: Vec::new(),
            elements: Vec::new(),
        }
    }

    /// An empty frame.
    pub fn frame() -> Self {
        Self::new(FRAME_TYPE)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraint = constraint;
        self
    }

    pub fn with_config(mut self, config: Value) -> Self {
        self.config = config;
        self
    }

    pub fn with_child(mut self, child: ElementConfig) -> Self {
        self.elements.push(child);
        self
    }

    pub fn is_frame(&self) -> bool {
        self.element_type == FRAME_TYPE
    }
}
