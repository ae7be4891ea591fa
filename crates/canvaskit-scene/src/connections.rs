//! Directed connections between elements.
//!
//! A connection joins an anchor on its source element to an anchor on its
//! target element, optionally routed through intermediate vertices. Anchors
//! are normalized to the element box (`-1..=1` per axis, `(0, 0)` at the
//! centre, `y = 1` on the top edge); vertices are normalized to the box
//! spanned by the two endpoints, so a path follows its elements around
//! without being rewritten.
//!
//! Endpoints are plain element ids. Removing an element leaves its
//! connections dangling until the next [`ConnectionLayer::update_state`] or
//! [`ConnectionLayer::prune_element`]; dangling connections are never
//! rendered.

use canvaskit_core::{ElementId, SceneError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::geometry::{Point, Rect, EPSILON};
use crate::tree::ElementTree;

/// Identifier of a connection within its layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn#{}", self.0)
    }
}

/// Persisted connection, stored on its source element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionConfig {
    /// Anchor on the source element.
    pub source: Point,
    /// Anchor on the target element.
    pub target: Point,
    /// Name of the target element; the root frame when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vertices: Vec<Point>,
    /// Style payload (color, size, path kind), passed through untouched.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub config: Value,
}

/// Absolute geometry of a connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionPath {
    pub start: Point,
    pub end: Point,
    pub vertices: Vec<Point>,
}

impl ConnectionPath {
    pub fn approx_eq(&self, other: &ConnectionPath) -> bool {
        self.start.approx_eq(&other.start)
            && self.end.approx_eq(&other.end)
            && self.vertices.len() == other.vertices.len()
            && self
                .vertices
                .iter()
                .zip(&other.vertices)
                .all(|(a, b)| a.approx_eq(b))
    }
}

/// A live link between two elements.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub id: ConnectionId,
    pub source: ElementId,
    pub target: ElementId,
    pub source_anchor: Point,
    pub target_anchor: Point,
    pub vertices: Vec<Point>,
    pub config: Value,
    /// Geometry as of the last recomputation; `None` until first computed.
    pub path: Option<ConnectionPath>,
}

/// Render output for one connection.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedConnection {
    pub id: ConnectionId,
    pub source: ElementId,
    pub target: ElementId,
    pub path: ConnectionPath,
    pub config: Value,
}

/// Absolute position of a normalized anchor on `bounds`.
pub fn anchor_point(bounds: &Rect, anchor: Point) -> Point {
    Point::new(
        bounds.center_x() + anchor.x * bounds.width / 2.0,
        bounds.center_y() - anchor.y * bounds.height / 2.0,
    )
}

/// Normalized anchor of an absolute point on `bounds`, clamped to the box.
pub fn anchor_from_point(bounds: &Rect, point: Point) -> Point {
    let axis = |offset: f64, half: f64| {
        if half.abs() < EPSILON {
            0.0
        } else {
            (offset / half).clamp(-1.0, 1.0)
        }
    };
    Point::new(
        axis(point.x - bounds.center_x(), bounds.width / 2.0),
        axis(bounds.center_y() - point.y, bounds.height / 2.0),
    )
}

fn vertex_point(start: Point, end: Point, vertex: Point) -> Point {
    Point::new(
        start.x + vertex.x * (end.x - start.x),
        start.y + vertex.y * (end.y - start.y),
    )
}

fn vertex_from_point(start: Point, end: Point, point: Point) -> Point {
    let axis = |from: f64, to: f64, at: f64| {
        let span = to - from;
        if span.abs() < EPSILON {
            0.0
        } else {
            (at - from) / span
        }
    };
    Point::new(axis(start.x, end.x, point.x), axis(start.y, end.y, point.y))
}

fn clamp_anchor(anchor: Point) -> Point {
    Point::new(anchor.x.clamp(-1.0, 1.0), anchor.y.clamp(-1.0, 1.0))
}

/// All connections of a scene.
#[derive(Debug, Clone, Default)]
pub struct ConnectionLayer {
    connections: Vec<Connection>,
    next_id: u64,
}

impl ConnectionLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn get(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.iter().find(|c| c.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter()
    }

    pub fn clear(&mut self) {
        self.connections.clear();
    }

    /// Links two existing elements and computes the initial path.
    pub fn connect(
        &mut self,
        tree: &ElementTree,
        source: ElementId,
        target: ElementId,
        source_anchor: Point,
        target_anchor: Point,
    ) -> Result<ConnectionId, SceneError> {
        tree.element(source)?;
        tree.element(target)?;
        if source == target {
            return Err(SceneError::Other {
                message: format!("Cannot connect {} to itself", source),
            });
        }

        let id = self.insert(
            source,
            target,
            ConnectionConfig {
                source: source_anchor,
                target: target_anchor,
                target_name: None,
                vertices: Vec::new(),
                config: Value::Null,
            },
        );
        if let Some(index) = self.position(id) {
            let path = compute_path(tree, &self.connections[index]);
            self.connections[index].path = path;
        }
        tracing::debug!("Connected {} -> {} as {}", source, target, id);
        Ok(id)
    }

    /// Adds a connection without validating its endpoints. Used when loading.
    pub(crate) fn insert(
        &mut self,
        source: ElementId,
        target: ElementId,
        config: ConnectionConfig,
    ) -> ConnectionId {
        let id = ConnectionId(self.next_id);
        self.next_id += 1;
        self.connections.push(Connection {
            id,
            source,
            target,
            source_anchor: clamp_anchor(config.source),
            target_anchor: clamp_anchor(config.target),
            vertices: config.vertices,
            config: config.config,
            path: None,
        });
        id
    }

    pub fn disconnect(&mut self, id: ConnectionId) -> Option<Connection> {
        let index = self.position(id)?;
        tracing::debug!("Disconnected {}", id);
        Some(self.connections.remove(index))
    }

    /// Connections having `element` as source or target.
    pub fn connections_of(&self, element: ElementId) -> Vec<&Connection> {
        self.connections
            .iter()
            .filter(|c| c.source == element || c.target == element)
            .collect()
    }

    /// Replaces the style payload of a connection.
    pub fn set_config(&mut self, id: ConnectionId, config: Value) -> Result<(), SceneError> {
        self.connection_mut(id)?.config = config;
        Ok(())
    }

    /// Inserts a routing vertex, given in absolute coordinates, at `index`
    /// (appending when `None`).
    pub fn add_vertex(
        &mut self,
        tree: &ElementTree,
        id: ConnectionId,
        index: Option<usize>,
        point: Point,
    ) -> Result<(), SceneError> {
        let (start, end) = self.endpoints(tree, id)?;
        let vertex = vertex_from_point(start, end, point);
        let connection = self.connection_mut(id)?;
        let at = index.map_or(connection.vertices.len(), |i| i.min(connection.vertices.len()));
        connection.vertices.insert(at, vertex);
        Ok(())
    }

    /// Moves an existing vertex to an absolute position.
    pub fn move_vertex(
        &mut self,
        tree: &ElementTree,
        id: ConnectionId,
        index: usize,
        point: Point,
    ) -> Result<(), SceneError> {
        let (start, end) = self.endpoints(tree, id)?;
        let connection = self.connection_mut(id)?;
        let slot = connection
            .vertices
            .get_mut(index)
            .ok_or_else(|| SceneError::Other {
                message: format!("{} has no vertex {}", id, index),
            })?;
        *slot = vertex_from_point(start, end, point);
        Ok(())
    }

    pub fn remove_vertex(&mut self, id: ConnectionId, index: usize) -> Result<Point, SceneError> {
        let connection = self.connection_mut(id)?;
        if index >= connection.vertices.len() {
            return Err(SceneError::Other {
                message: format!("{} has no vertex {}", id, index),
            });
        }
        Ok(connection.vertices.remove(index))
    }

    /// Drops every connection touching `element`, returning how many.
    pub fn prune_element(&mut self, element: ElementId) -> usize {
        let before = self.connections.len();
        self.connections
            .retain(|c| c.source != element && c.target != element);
        before - self.connections.len()
    }

    /// Whether `element` is an endpoint of a live connection whose cached
    /// path no longer matches the current geometry.
    pub fn connections_need_update(&self, tree: &ElementTree, element: ElementId) -> bool {
        self.connections
            .iter()
            .filter(|c| c.source == element || c.target == element)
            .filter(|c| is_live(tree, c))
            .any(|c| match (&c.path, compute_path(tree, c)) {
                (Some(cached), Some(current)) => !cached.approx_eq(&current),
                (None, Some(_)) => true,
                (_, None) => false,
            })
    }

    /// Prunes dangling connections and recomputes every remaining path.
    /// Returns the number of pruned connections.
    pub fn update_state(&mut self, tree: &ElementTree) -> usize {
        let before = self.connections.len();
        self.connections.retain(|c| is_live(tree, c));
        let pruned = before - self.connections.len();

        for connection in &mut self.connections {
            connection.path = compute_path(tree, connection);
        }
        if pruned > 0 {
            tracing::debug!("Pruned {} dangling connection(s)", pruned);
        }
        pruned
    }

    /// Current geometry of every live connection.
    pub fn render(&self, tree: &ElementTree) -> Vec<RenderedConnection> {
        self.connections
            .iter()
            .filter_map(|c| {
                compute_path(tree, c).map(|path| RenderedConnection {
                    id: c.id,
                    source: c.source,
                    target: c.target,
                    path,
                    config: c.config.clone(),
                })
            })
            .collect()
    }

    /// Persisted form of the live connections leaving `source`.
    pub fn configs_for(&self, tree: &ElementTree, source: ElementId) -> Vec<ConnectionConfig> {
        self.connections
            .iter()
            .filter(|c| c.source == source && is_live(tree, c))
            .map(|c| ConnectionConfig {
                source: c.source_anchor,
                target: c.target_anchor,
                target_name: if c.target == tree.root() {
                    None
                } else {
                    tree.get(c.target).map(|t| t.name().to_string())
                },
                vertices: c.vertices.clone(),
                config: c.config.clone(),
            })
            .collect()
    }

    fn position(&self, id: ConnectionId) -> Option<usize> {
        self.connections.iter().position(|c| c.id == id)
    }

    fn connection_mut(&mut self, id: ConnectionId) -> Result<&mut Connection, SceneError> {
        self.connections
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| SceneError::Other {
                message: format!("{} not found", id),
            })
    }

    fn endpoints(
        &self,
        tree: &ElementTree,
        id: ConnectionId,
    ) -> Result<(Point, Point), SceneError> {
        let connection = self.get(id).ok_or_else(|| SceneError::Other {
            message: format!("{} not found", id),
        })?;
        let source = tree.bounds_of(connection.source)?;
        let target = tree.bounds_of(connection.target)?;
        Ok((
            anchor_point(&source, connection.source_anchor),
            anchor_point(&target, connection.target_anchor),
        ))
    }
}

fn is_live(tree: &ElementTree, connection: &Connection) -> bool {
    tree.contains(connection.source) && tree.contains(connection.target)
}

/// Geometry of a connection from current bounds, `None` when dangling.
pub fn compute_path(tree: &ElementTree, connection: &Connection) -> Option<ConnectionPath> {
    let source = tree.bounds_of(connection.source).ok()?;
    let target = tree.bounds_of(connection.target).ok()?;
    let start = anchor_point(&source, connection.source_anchor);
    let end = anchor_point(&target, connection.target_anchor);
    Some(ConnectionPath {
        start,
        end,
        vertices: connection
            .vertices
            .iter()
            .map(|v| vertex_point(start, end, *v))
            .collect(),
    })
}
