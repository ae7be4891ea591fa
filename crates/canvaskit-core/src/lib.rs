//! # canvaskit core
//!
//! Core types shared by every canvaskit crate: element identifiers, origin
//! tags carried through mutations, the error taxonomy, and the event bus the
//! scene publishes selection, transform, tree, and document events on.

pub mod error;
pub mod event_bus;
pub mod types;

pub use error::{DocumentError, Error, GestureError, Result, SceneError};

pub use event_bus::{
    AlertEvent, AppEvent, ConnectionEvent, DocumentEvent, EventBus, EventBusConfig,
    EventBusError, EventCategory, EventFilter, SelectionEvent, SubscriptionId, TransformEvent,
    TreeEvent,
};

pub use types::{ElementId, GestureKind, Origin};
