//! # canvaskit Scene
//!
//! Headless scene graph editing core: an arena element tree with
//! constraint-based placement, selection, drag/resize/rotate gestures,
//! connections between elements and scene documents.
//!
//! [`Scene`] is the entry point; the other modules can be used on their own
//! for tooling that only needs part of the pipeline.

pub mod connections;
pub mod constraint;
pub mod element;
pub mod geometry;
pub mod scene;
pub mod selection_manager;
pub mod serialization;
pub mod transform;
pub mod tree;

pub use connections::{
    Connection, ConnectionConfig, ConnectionId, ConnectionLayer, ConnectionPath,
    RenderedConnection,
};
pub use constraint::{
    placement_from_bounds, resolve_bounds, Constraint, HorizontalConstraint, Placement,
    VerticalConstraint,
};
pub use element::{Element, ElementConfig, ElementKind, FRAME_TYPE};
pub use geometry::{Point, Rect};
pub use scene::{SaveCallback, Scene, SceneOptions, ViewOptions};
pub use selection_manager::{SelectionManager, SelectionRequest};
pub use serialization::{SceneDocument, SceneFile, SceneMetadata, DOCUMENT_VERSION};
pub use transform::{
    DragGesture, GestureSettings, ResizeDelta, ResizeGesture, ResizeHandle, RotateGesture,
    SnapResult, TransformCoordinator,
};
pub use tree::{DropPosition, ElementTree};

pub use canvaskit_core::{ElementId, GestureKind, Origin};
