//! The avoider: a routing graph of rectangular obstacles, port endpoints
//! attached to their boundaries, and edges routed between ports as
//! orthogonal, obstacle-avoiding polylines.
//!
//! Mutation (`add_node`, `move_node`, `add_port`, `add_edge`) is separate
//! from recomputation (`route`) so a caller can batch any number of
//! structural changes, e.g. a whole multi-select drag, into a single
//! routing pass per frame.

mod error;
mod grid;
mod occupancy;
mod route;

pub use error::GraphError;

use std::collections::HashMap;

use crate::config::RouterConfig;
use crate::geom::{Rect, Vec2};
use crate::id::{ComponentId, NetId, PortId};

use grid::RoutingGrid;
use occupancy::EdgeOccupancy;
use route::{RouteContext, Segment};

/// Which edge of its obstacle a port sits on. Routing leaves the port
/// perpendicular to this side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortSide {
    Left,
    Right,
    Top,
    Bottom,
}

#[derive(Debug, Clone)]
struct ObstacleNode {
    id: ComponentId,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    /// Slots into `Avoider::ports` for every port attached to this node.
    ports: Vec<usize>,
}

#[derive(Debug, Clone)]
struct PortEndpoint {
    id: PortId,
    owner: ComponentId,
    side: PortSide,
    x: f32,
    y: f32,
}

#[derive(Debug, Clone)]
struct EdgeRoute {
    id: NetId,
    from_slot: usize,
    to_slot: usize,
    path: Vec<(f32, f32)>,
}

/// Routing graph with cached per-edge paths. All collections are
/// insertion-ordered and all hash maps are lookup-only, so `route()` is
/// deterministic: the same graph always yields byte-identical paths.
#[derive(Debug)]
pub struct Avoider {
    config: RouterConfig,
    nodes: Vec<ObstacleNode>,
    node_index: HashMap<ComponentId, usize>,
    ports: Vec<PortEndpoint>,
    port_index: HashMap<PortId, usize>,
    edges: Vec<EdgeRoute>,
    edge_index: HashMap<NetId, usize>,
}

impl Avoider {
    pub fn new(config: RouterConfig) -> Self {
        Self {
            config,
            nodes: Vec::new(),
            node_index: HashMap::new(),
            ports: Vec::new(),
            port_index: HashMap::new(),
            edges: Vec::new(),
            edge_index: HashMap::new(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn port_count(&self) -> usize {
        self.ports.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Registers an obstacle with top-left `(x, y)` and the given size.
    pub fn add_node(
        &mut self,
        id: ComponentId,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Result<(), GraphError> {
        if self.node_index.contains_key(&id) {
            return Err(GraphError::DuplicateNode(id));
        }
        self.node_index.insert(id, self.nodes.len());
        self.nodes.push(ObstacleNode {
            id,
            x,
            y,
            width,
            height,
            ports: Vec::new(),
        });
        Ok(())
    }

    /// Translates an obstacle and every port attached to it. Does not
    /// recompute routes; call `route()` once all moves are applied.
    pub fn move_node(&mut self, id: ComponentId, dx: f32, dy: f32) -> Result<(), GraphError> {
        let index = *self
            .node_index
            .get(&id)
            .ok_or(GraphError::UnknownNode(id))?;
        self.nodes[index].x += dx;
        self.nodes[index].y += dy;
        for i in 0..self.nodes[index].ports.len() {
            let slot = self.nodes[index].ports[i];
            let port = &mut self.ports[slot];
            port.x += dx;
            port.y += dy;
        }
        Ok(())
    }

    /// Registers a port endpoint on `owner`'s `side` at world `(x, y)`.
    pub fn add_port(
        &mut self,
        id: PortId,
        owner: ComponentId,
        side: PortSide,
        x: f32,
        y: f32,
    ) -> Result<(), GraphError> {
        if self.port_index.contains_key(&id) {
            return Err(GraphError::DuplicatePort(id));
        }
        let node_index = *self
            .node_index
            .get(&owner)
            .ok_or(GraphError::UnknownNode(owner))?;
        let slot = self.ports.len();
        self.port_index.insert(id, slot);
        self.ports.push(PortEndpoint {
            id,
            owner,
            side,
            x,
            y,
        });
        self.nodes[node_index].ports.push(slot);
        Ok(())
    }

    /// Registers a connection between two ports. The declared owners must
    /// match the ports' registrations; a mismatch means the caller's view
    /// of the graph has drifted.
    pub fn add_edge(
        &mut self,
        id: NetId,
        from_owner: ComponentId,
        from_port: PortId,
        to_owner: ComponentId,
        to_port: PortId,
    ) -> Result<(), GraphError> {
        if self.edge_index.contains_key(&id) {
            return Err(GraphError::DuplicateEdge(id));
        }
        let from_slot = *self
            .port_index
            .get(&from_port)
            .ok_or(GraphError::UnknownPort(from_port))?;
        let to_slot = *self
            .port_index
            .get(&to_port)
            .ok_or(GraphError::UnknownPort(to_port))?;
        if self.ports[from_slot].owner != from_owner {
            return Err(GraphError::PortOwnerMismatch {
                port: from_port,
                owner: from_owner,
            });
        }
        if self.ports[to_slot].owner != to_owner {
            return Err(GraphError::PortOwnerMismatch {
                port: to_port,
                owner: to_owner,
            });
        }
        self.edge_index.insert(id, self.edges.len());
        self.edges.push(EdgeRoute {
            id,
            from_slot,
            to_slot,
            path: Vec::new(),
        });
        Ok(())
    }

    pub fn node_box(&self, id: ComponentId) -> Result<Rect, GraphError> {
        let index = *self
            .node_index
            .get(&id)
            .ok_or(GraphError::UnknownNode(id))?;
        let node = &self.nodes[index];
        Ok(Rect::new(node.x, node.y, node.width, node.height))
    }

    pub fn port_position(&self, id: PortId) -> Result<Vec2, GraphError> {
        let slot = *self
            .port_index
            .get(&id)
            .ok_or(GraphError::UnknownPort(id))?;
        let port = &self.ports[slot];
        Ok(Vec2::new(port.x, port.y))
    }

    pub fn port_owner(&self, id: PortId) -> Result<ComponentId, GraphError> {
        let slot = *self
            .port_index
            .get(&id)
            .ok_or(GraphError::UnknownPort(id))?;
        Ok(self.ports[slot].owner)
    }

    /// Iterates obstacle boxes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (ComponentId, Rect)> + '_ {
        self.nodes
            .iter()
            .map(|node| (node.id, Rect::new(node.x, node.y, node.width, node.height)))
    }

    /// Iterates port endpoints in insertion order.
    pub fn ports(&self) -> impl Iterator<Item = (PortId, Vec2)> + '_ {
        self.ports
            .iter()
            .map(|port| (port.id, Vec2::new(port.x, port.y)))
    }

    /// Iterates edges and their most recently computed paths in insertion
    /// order.
    pub fn edges(&self) -> impl Iterator<Item = (NetId, &[(f32, f32)])> + '_ {
        self.edges.iter().map(|edge| (edge.id, edge.path.as_slice()))
    }

    /// Recomputes every edge's path against the current obstacle set.
    /// Edges are routed in insertion order; each finished path becomes a
    /// soft cost (occupancy and crossing penalties) for the edges after
    /// it, which spreads wires apart without forbidding overlap.
    pub fn route(&mut self) {
        let obstacles: Vec<Rect> = self
            .nodes
            .iter()
            .map(|node| {
                let pad = self.config.obstacle_pad;
                Rect::new(
                    node.x - pad,
                    node.y - pad,
                    node.width + pad * 2.0,
                    node.height + pad * 2.0,
                )
            })
            .collect();
        let grid = if self.config.enable_grid_router {
            RoutingGrid::build(&obstacles, &self.config)
        } else {
            None
        };

        let mut occupancy = EdgeOccupancy::new(self.config.occupancy_cell);
        let mut existing: Vec<Segment> = Vec::new();
        let mut paths: Vec<Vec<(f32, f32)>> = Vec::with_capacity(self.edges.len());

        for edge in &self.edges {
            let from = &self.ports[edge.from_slot];
            let to = &self.ports[edge.to_slot];
            let ctx = RouteContext {
                start: (from.x, from.y),
                end: (to.x, to.y),
                start_side: from.side,
                end_side: to.side,
                obstacles: &obstacles,
                config: &self.config,
            };
            let points = route::route_edge(&ctx, grid.as_ref(), &occupancy, &existing);
            occupancy.add_path(&points);
            for pair in points.windows(2) {
                existing.push((pair[0], pair[1]));
            }
            paths.push(points);
        }

        for (edge, path) in self.edges.iter_mut().zip(paths) {
            edge.path = path;
        }
    }

    /// Borrowed view of the most recently computed path for `id`.
    pub fn edge_path(&self, id: NetId) -> Result<&[(f32, f32)], GraphError> {
        let index = *self
            .edge_index
            .get(&id)
            .ok_or(GraphError::UnknownEdge(id))?;
        Ok(&self.edges[index].path)
    }

    /// Writes the flattened `(x, y)` pairs of edge `id`'s path into `out`,
    /// truncating to whole points if the buffer is too small. Returns the
    /// number of values written (point count × 2). Never allocates.
    pub fn copy_edge_path(&self, id: NetId, out: &mut [f32]) -> Result<usize, GraphError> {
        let index = *self
            .edge_index
            .get(&id)
            .ok_or(GraphError::UnknownEdge(id))?;
        let path = &self.edges[index].path;
        let count = path.len().min(out.len() / 2);
        for (i, &(x, y)) in path.iter().take(count).enumerate() {
            out[i * 2] = x;
            out[i * 2 + 1] = y;
        }
        Ok(count * 2)
    }

    /// Releases every obstacle, port and edge.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.node_index.clear();
        self.ports.clear();
        self.port_index.clear();
        self.edges.clear();
        self.edge_index.clear();
    }
}
