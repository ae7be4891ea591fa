//! Connection operations for the scene.

use canvaskit_core::{AppEvent, ConnectionEvent, ElementId, Result};
use serde_json::Value;

use super::Scene;
use crate::connections::{ConnectionId, RenderedConnection};
use crate::geometry::Point;

impl Scene {
    /// Connects two elements through normalized anchors.
    pub fn connect(
        &mut self,
        source: ElementId,
        target: ElementId,
        source_anchor: Point,
        target_anchor: Point,
    ) -> Result<ConnectionId> {
        let id = self
            .connections
            .connect(&self.tree, source, target, source_anchor, target_anchor)?;
        self.save();
        Ok(id)
    }

    /// Removes a connection. Returns false if it did not exist.
    pub fn disconnect(&mut self, id: ConnectionId) -> bool {
        let removed = self.connections.disconnect(id).is_some();
        if removed {
            self.save();
        }
        removed
    }

    pub fn set_connection_config(&mut self, id: ConnectionId, config: Value) -> Result<()> {
        self.connections.set_config(id, config)?;
        self.save();
        Ok(())
    }

    /// Adds a routing vertex at an absolute position.
    pub fn add_vertex(
        &mut self,
        id: ConnectionId,
        index: Option<usize>,
        point: Point,
    ) -> Result<()> {
        self.connections.add_vertex(&self.tree, id, index, point)?;
        self.save();
        Ok(())
    }

    pub fn move_vertex(&mut self, id: ConnectionId, index: usize, point: Point) -> Result<()> {
        self.connections.move_vertex(&self.tree, id, index, point)?;
        self.save();
        Ok(())
    }

    pub fn remove_vertex(&mut self, id: ConnectionId, index: usize) -> Result<()> {
        self.connections.remove_vertex(id, index)?;
        self.save();
        Ok(())
    }

    /// Whether connections of `element` need their paths recomputed.
    pub fn connections_need_update(&self, element: ElementId) -> bool {
        self.connections.connections_need_update(&self.tree, element)
    }

    /// Recomputes connection paths and prunes dangling connections.
    /// Returns the number pruned.
    pub fn update_connections(&mut self) -> usize {
        let pruned = self.connections.update_state(&self.tree);
        if pruned > 0 {
            self.emit(AppEvent::Connection(ConnectionEvent::Pruned { count: pruned }));
        }
        pruned
    }

    /// Geometry of every live connection.
    pub fn render_connections(&self) -> Vec<RenderedConnection> {
        self.connections.render(&self.tree)
    }
}
