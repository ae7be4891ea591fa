//! Error handling for canvaskit
//!
//! Provides error types for each layer of the editor core:
//! - Scene errors (tree structure and element lookups)
//! - Gesture errors (transform state machine misuse)
//! - Document errors (persisted scene documents)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

use crate::types::{ElementId, GestureKind};

/// Scene error type
///
/// Represents violations of the element tree's structural rules.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// No element with this id exists in the tree
    #[error("Element {id} not found")]
    ElementNotFound {
        /// The id that failed to resolve.
        id: ElementId,
    },

    /// The element is not a frame and cannot hold children
    #[error("Element {id} is not a frame")]
    NotAFrame {
        /// The element that was used as a parent.
        id: ElementId,
    },

    /// The move would place a frame inside itself
    #[error("Cannot move {src} into {dest}: would create a cycle")]
    CycleDetected {
        /// The element being moved.
        src: ElementId,
        /// The requested destination frame.
        dest: ElementId,
    },

    /// The root frame cannot be removed, moved, or renamed
    #[error("Operation not permitted on the root frame")]
    RootImmutable,

    /// The requested name is already used somewhere in the tree
    #[error("Name already taken: {name}")]
    NameTaken {
        /// The conflicting name.
        name: String,
    },

    /// Editing is disabled for this scene
    #[error("Editing is disabled")]
    EditingDisabled,

    /// Generic scene error
    #[error("Scene error: {message}")]
    Other {
        /// The error message.
        message: String,
    },
}

/// Gesture error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GestureError {
    /// An update or end event arrived without a matching start
    #[error("No active {kind} gesture")]
    NotActive {
        /// The gesture kind the event belonged to.
        kind: GestureKind,
    },

    /// The gesture started without any resolvable target
    #[error("{kind} gesture has no targets")]
    NoTargets {
        /// The gesture kind that was started.
        kind: GestureKind,
    },

    /// Dragging is refused while an element is in inline edit mode
    #[error("Dragging is disabled while edit mode is active")]
    EditModeActive,
}

/// Document error type
///
/// Represents problems with persisted scene documents.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    /// The document format version is not understood
    #[error("Unsupported document version {version}")]
    UnsupportedVersion {
        /// The version found in the document.
        version: String,
    },

    /// The top level of the document is not a frame
    #[error("Document root must be a frame, found '{found}'")]
    RootNotFrame {
        /// The element type found at the root.
        found: String,
    },

    /// A placement value is not a finite number
    #[error("Invalid placement on '{name}': {reason}")]
    InvalidPlacement {
        /// The element carrying the bad placement.
        name: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Main error type for canvaskit
///
/// A unified error type that can represent any error from all layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Scene structure error
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// Gesture state error
    #[error(transparent)]
    Gesture(#[from] GestureError),

    /// Document error
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a missing-element error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Scene(SceneError::ElementNotFound { .. }))
    }

    /// Check if this is a scene structure error
    pub fn is_scene_error(&self) -> bool {
        matches!(self, Error::Scene(_))
    }

    /// Check if this is a gesture error
    pub fn is_gesture_error(&self) -> bool {
        matches!(self, Error::Gesture(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
