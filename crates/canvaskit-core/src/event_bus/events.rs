//! Event type definitions for the event bus.
//!
//! This module defines all scene events organized by category.
//! Events are cloneable and serializable for logging/replay.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ElementId, GestureKind, Origin};

/// Root event enum for all scene events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AppEvent {
    /// Selection changes and edit mode
    Selection(SelectionEvent),
    /// Gesture lifecycle and completed transforms
    Transform(TransformEvent),
    /// Structural changes to the element tree
    Tree(TreeEvent),
    /// Connection geometry and pruning
    Connection(ConnectionEvent),
    /// Persistence of the scene document
    Document(DocumentEvent),
    /// User-visible notifications
    Alert(AlertEvent),
}

impl AppEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            AppEvent::Selection(_) => EventCategory::Selection,
            AppEvent::Transform(_) => EventCategory::Transform,
            AppEvent::Tree(_) => EventCategory::Tree,
            AppEvent::Connection(_) => EventCategory::Connection,
            AppEvent::Document(_) => EventCategory::Document,
            AppEvent::Alert(_) => EventCategory::Alert,
        }
    }

    /// The actor that caused this event, when the event records one
    pub fn origin(&self) -> Option<&Origin> {
        match self {
            AppEvent::Selection(SelectionEvent::Changed { origin, .. }) => Some(origin),
            AppEvent::Tree(e) => Some(e.origin()),
            _ => None,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            AppEvent::Selection(e) => e.description(),
            AppEvent::Transform(e) => e.description(),
            AppEvent::Tree(e) => e.description(),
            AppEvent::Connection(e) => e.description(),
            AppEvent::Document(e) => e.description(),
            AppEvent::Alert(e) => e.description(),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Selection events.
    Selection,
    /// Gesture and transform events.
    Transform,
    /// Element tree events.
    Tree,
    /// Connection events.
    Connection,
    /// Document persistence events.
    Document,
    /// Alert notifications.
    Alert,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Selection => write!(f, "Selection"),
            EventCategory::Transform => write!(f, "Transform"),
            EventCategory::Tree => write!(f, "Tree"),
            EventCategory::Connection => write!(f, "Connection"),
            EventCategory::Document => write!(f, "Document"),
            EventCategory::Alert => write!(f, "Alert"),
        }
    }
}

/// Selection events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SelectionEvent {
    /// The selection was replaced. Fired on every select call, even when the
    /// payload is identical to the previous one.
    Changed {
        /// Selected element ids, in request order.
        selected: Vec<ElementId>,
        /// Set when a single frame was selected as a whole.
        frame: Option<ElementId>,
        /// Who asked for the change.
        origin: Origin,
    },
    /// Inline edit mode toggled.
    EditModeChanged {
        /// Whether edit mode is now active.
        enabled: bool,
        /// The element being edited.
        element: Option<ElementId>,
    },
}

impl SelectionEvent {
    fn description(&self) -> String {
        match self {
            SelectionEvent::Changed {
                selected, origin, ..
            } => format!("Selection changed ({} selected, {})", selected.len(), origin),
            SelectionEvent::EditModeChanged { enabled, .. } => format!(
                "Edit mode {}",
                if *enabled { "entered" } else { "left" }
            ),
        }
    }
}

/// Gesture and transform events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TransformEvent {
    /// A gesture began.
    Started {
        /// The gesture kind.
        kind: GestureKind,
        /// Elements under the gesture.
        targets: Vec<ElementId>,
    },
    /// A gesture ended and placements were committed. Group gestures emit
    /// this once for all their targets.
    Moved {
        /// The gesture kind.
        kind: GestureKind,
        /// Elements that moved.
        targets: Vec<ElementId>,
        /// Unix timestamp in milliseconds.
        at: i64,
    },
    /// Peripheral size/position/constraint controls toggled.
    ControlsEnabled {
        /// Whether the controls are enabled.
        enabled: bool,
    },
}

impl TransformEvent {
    fn description(&self) -> String {
        match self {
            TransformEvent::Started { kind, targets } => {
                format!("{} started on {} element(s)", kind, targets.len())
            }
            TransformEvent::Moved { kind, targets, .. } => {
                format!("{} finished on {} element(s)", kind, targets.len())
            }
            TransformEvent::ControlsEnabled { enabled } => format!(
                "Controls {}",
                if *enabled { "enabled" } else { "disabled" }
            ),
        }
    }
}

/// Element tree events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeEvent {
    /// An element was created.
    ElementAdded {
        /// The new element.
        id: ElementId,
        /// Its tree-wide unique name.
        name: String,
        /// The frame it was added to.
        parent: ElementId,
        /// Who added it.
        origin: Origin,
    },
    /// An element and its subtree were removed.
    ElementsRemoved {
        /// Every removed id, subtree included.
        ids: Vec<ElementId>,
        /// Who removed them.
        origin: Origin,
    },
    /// An element was re-parented or reordered.
    ElementMoved {
        /// The moved element.
        id: ElementId,
        /// Its new parent frame.
        parent: ElementId,
        /// Its index within the new parent.
        index: usize,
        /// Who moved it.
        origin: Origin,
    },
    /// An element was renamed.
    ElementRenamed {
        /// The renamed element.
        id: ElementId,
        /// The previous name.
        old_name: String,
        /// The new name.
        new_name: String,
        /// Who renamed it.
        origin: Origin,
    },
    /// The frame edited by the layer panel changed.
    LayerChanged {
        /// The new current layer.
        frame: ElementId,
        /// Who changed it.
        origin: Origin,
    },
}

impl TreeEvent {
    /// The actor that caused the change
    pub fn origin(&self) -> &Origin {
        match self {
            TreeEvent::ElementAdded { origin, .. }
            | TreeEvent::ElementsRemoved { origin, .. }
            | TreeEvent::ElementMoved { origin, .. }
            | TreeEvent::ElementRenamed { origin, .. }
            | TreeEvent::LayerChanged { origin, .. } => origin,
        }
    }

    fn description(&self) -> String {
        match self {
            TreeEvent::ElementAdded { name, parent, .. } => {
                format!("Added '{}' to {}", name, parent)
            }
            TreeEvent::ElementsRemoved { ids, .. } => format!("Removed {} element(s)", ids.len()),
            TreeEvent::ElementMoved { id, parent, index, .. } => {
                format!("Moved {} to {}[{}]", id, parent, index)
            }
            TreeEvent::ElementRenamed {
                old_name, new_name, ..
            } => format!("Renamed '{}' to '{}'", old_name, new_name),
            TreeEvent::LayerChanged { frame, .. } => format!("Current layer is {}", frame),
        }
    }
}

/// Connection events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ConnectionEvent {
    /// Rendered connection paths are stale and must be recomputed.
    NeedsUpdate {
        /// Elements whose movement made paths stale.
        elements: Vec<ElementId>,
    },
    /// Connections with a missing endpoint were dropped.
    Pruned {
        /// Number of connections removed.
        count: usize,
    },
}

impl ConnectionEvent {
    fn description(&self) -> String {
        match self {
            ConnectionEvent::NeedsUpdate { elements } => {
                format!("Connections stale for {} element(s)", elements.len())
            }
            ConnectionEvent::Pruned { count } => format!("Pruned {} connection(s)", count),
        }
    }
}

/// Document persistence events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DocumentEvent {
    /// The scene was serialized and handed to the save callback.
    Saved {
        /// Monotonic save counter of the scene.
        revision: u64,
        /// When the save happened.
        at: DateTime<Utc>,
    },
    /// A document was loaded into the scene.
    Loaded {
        /// Number of elements in the loaded tree, root excluded.
        elements: usize,
    },
}

impl DocumentEvent {
    fn description(&self) -> String {
        match self {
            DocumentEvent::Saved { revision, .. } => format!("Saved revision {}", revision),
            DocumentEvent::Loaded { elements } => format!("Loaded {} element(s)", elements),
        }
    }
}

/// User-visible notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AlertEvent {
    /// An operation that affects user intent failed.
    Error {
        /// Message shown to the user.
        message: String,
    },
    /// Something was recovered but the user should know.
    Warning {
        /// Message shown to the user.
        message: String,
    },
}

impl AlertEvent {
    fn description(&self) -> String {
        match self {
            AlertEvent::Error { message } => format!("Error: {}", message),
            AlertEvent::Warning { message } => format!("Warning: {}", message),
        }
    }
}
