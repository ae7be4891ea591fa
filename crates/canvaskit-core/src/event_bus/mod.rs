//! # Event Bus Module
//!
//! Publish/subscribe channel between a scene and its observers.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use canvaskit_core::event_bus::{EventBus, EventCategory, EventFilter};
//! use canvaskit_core::Origin;
//!
//! let bus = EventBus::new();
//!
//! // Follow selection changes, ignoring the ones the layer panel caused itself
//! let subscription = bus.subscribe(
//!     EventFilter::AllOf(vec![
//!         EventFilter::Categories(vec![EventCategory::Selection]),
//!         EventFilter::ExcludeOrigin(Origin::Sync("layers".into())),
//!     ]),
//!     |event| println!("{}", event.description()),
//! );
//!
//! bus.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
