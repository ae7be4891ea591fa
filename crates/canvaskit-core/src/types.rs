//! Identifier and tag types shared across the workspace.

use serde::{Deserialize, Serialize};

/// Stable identifier of an element in a scene tree.
///
/// Ids are allocated by the tree and never reused within its lifetime, so a
/// stale id simply fails to resolve instead of pointing at another element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(u64);

impl ElementId {
    /// Wraps a raw id value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw id value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The actor a mutation or emission originates from.
///
/// Observers compare the origin against their own tag to ignore echoes of
/// their own updates instead of relying on shared suppression flags.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Origin {
    /// Pointer or keyboard interaction on the canvas.
    User,
    /// A programmatic call from the host (tree panel, inspector).
    Programmatic,
    /// Synchronisation from a named collaborator (layer tree, inline editor).
    Sync(String),
    /// Internal bookkeeping of the scene itself.
    System,
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Origin::User => write!(f, "user"),
            Origin::Programmatic => write!(f, "programmatic"),
            Origin::Sync(name) => write!(f, "sync:{}", name),
            Origin::System => write!(f, "system"),
        }
    }
}

/// Kind of pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GestureKind {
    Drag,
    Resize,
    Rotate,
}

impl std::fmt::Display for GestureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GestureKind::Drag => write!(f, "drag"),
            GestureKind::Resize => write!(f, "resize"),
            GestureKind::Rotate => write!(f, "rotate"),
        }
    }
}
