//! # canvaskit
//!
//! A headless scene graph editing core for canvas editors:
//! - Element tree of frames and elements with per-axis constraints
//! - Selection with origin-tagged change events
//! - Drag, resize and rotate gestures with edge snapping
//! - Connections between elements that follow their endpoints
//! - Scene documents handed to a host save callback
//!
//! ## Architecture
//!
//! canvaskit is organized as a workspace with multiple crates:
//!
//! 1. **canvaskit-core** - Ids, origin tags, errors, event bus
//! 2. **canvaskit-scene** - Element tree, selection, gestures, connections, persistence
//! 3. **canvaskit-settings** - Editor configuration file
//! 4. **canvaskit** - Logging setup and the `canvaskit` inspection binary

pub use canvaskit_core::{
    AlertEvent, AppEvent, ConnectionEvent, DocumentEvent, ElementId, Error, EventBus,
    EventBusConfig, EventCategory, EventFilter, GestureKind, Origin, Result, SceneError,
    SelectionEvent, TransformEvent, TreeEvent,
};

pub use canvaskit_scene::{
    Constraint, ElementConfig, ElementTree, HorizontalConstraint, Placement, Point, Rect,
    ResizeDelta, ResizeHandle, Scene, SceneDocument, SceneFile, SceneOptions, SelectionRequest,
    VerticalConstraint, ViewOptions,
};

pub use canvaskit_settings::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output on stderr
/// - RUST_LOG environment variable support, INFO otherwise
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
