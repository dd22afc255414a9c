//! Dataflow graph storage with name uniqueness enforced at construction.

use crate::arena::{Arena, ArenaId};
use crate::error::GraphError;
use crate::ids::{EdgeId, VertexId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tessera_common::{Ident, Interner};
use tessera_device::ResourceVector;

/// A module instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vertex {
    /// This vertex's ID.
    pub id: VertexId,
    /// Globally unique instance name.
    pub name: Ident,
    /// Resources the instance occupies.
    pub resources: ResourceVector,
    /// Edges whose destination is this vertex.
    pub inputs: Vec<EdgeId>,
    /// Edges whose source is this vertex.
    pub outputs: Vec<EdgeId>,
}

/// A buffered point-to-point channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// This edge's ID.
    pub id: EdgeId,
    /// Globally unique channel name.
    pub name: Ident,
    /// Producing vertex.
    pub src: VertexId,
    /// Consuming vertex.
    pub dst: VertexId,
    /// Data width in bits.
    pub width: u32,
    /// Buffer depth in entries.
    pub depth: u32,
}

impl Edge {
    /// Address width of the channel buffer, `floor(log2(depth)) + 1`.
    pub fn addr_width(&self) -> u32 {
        self.depth.ilog2() + 1
    }
}

/// The dataflow graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataflowGraph {
    vertices: Arena<VertexId, Vertex>,
    edges: Arena<EdgeId, Edge>,
    /// Auxiliary index (rebuilt on deserialization).
    #[serde(skip)]
    vertex_by_name: HashMap<Ident, VertexId>,
    /// Auxiliary index (rebuilt on deserialization).
    #[serde(skip)]
    edge_by_name: HashMap<Ident, EdgeId>,
}

impl DataflowGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a vertex.
    ///
    /// # Errors
    ///
    /// [`GraphError::DuplicateVertex`] if the name is already taken.
    pub fn add_vertex(
        &mut self,
        interner: &Interner,
        name: &str,
        resources: ResourceVector,
    ) -> Result<VertexId, GraphError> {
        let ident = interner.get_or_intern(name);
        if self.vertex_by_name.contains_key(&ident) {
            return Err(GraphError::DuplicateVertex(name.to_string()));
        }
        let id = VertexId::from_raw(self.vertices.len() as u32);
        self.vertices.alloc(Vertex {
            id,
            name: ident,
            resources,
            inputs: Vec::new(),
            outputs: Vec::new(),
        });
        self.vertex_by_name.insert(ident, id);
        Ok(id)
    }

    /// Adds an edge between two existing vertices.
    ///
    /// # Errors
    ///
    /// [`GraphError::DuplicateEdge`] if the name is taken,
    /// [`GraphError::UnknownVertex`] if an endpoint is not in the graph, and
    /// [`GraphError::InvalidEdge`] for a zero width or depth.
    pub fn add_edge(
        &mut self,
        interner: &Interner,
        name: &str,
        src: VertexId,
        dst: VertexId,
        width: u32,
        depth: u32,
    ) -> Result<EdgeId, GraphError> {
        let ident = interner.get_or_intern(name);
        if self.edge_by_name.contains_key(&ident) {
            return Err(GraphError::DuplicateEdge(name.to_string()));
        }
        for endpoint in [src, dst] {
            if self.vertices.try_get(endpoint).is_none() {
                return Err(GraphError::UnknownVertex {
                    edge: name.to_string(),
                    vertex: format!("#{endpoint}"),
                });
            }
        }
        if width == 0 || depth == 0 {
            return Err(GraphError::InvalidEdge {
                edge: name.to_string(),
                reason: format!("width {width}, depth {depth}"),
            });
        }
        let id = EdgeId::from_raw(self.edges.len() as u32);
        self.edges.alloc(Edge {
            id,
            name: ident,
            src,
            dst,
            width,
            depth,
        });
        self.vertices.get_mut(src).outputs.push(id);
        self.vertices.get_mut(dst).inputs.push(id);
        self.edge_by_name.insert(ident, id);
        Ok(id)
    }

    /// Adds an edge naming its endpoints by vertex name.
    pub fn add_edge_by_name(
        &mut self,
        interner: &Interner,
        name: &str,
        src: &str,
        dst: &str,
        width: u32,
        depth: u32,
    ) -> Result<EdgeId, GraphError> {
        let lookup = |vertex: &str| {
            interner
                .get(vertex)
                .and_then(|ident| self.vertex_by_name.get(&ident).copied())
                .ok_or_else(|| GraphError::UnknownVertex {
                    edge: name.to_string(),
                    vertex: vertex.to_string(),
                })
        };
        let src = lookup(src)?;
        let dst = lookup(dst)?;
        self.add_edge(interner, name, src, dst, width, depth)
    }

    /// The vertex with the given ID.
    pub fn vertex(&self, id: VertexId) -> &Vertex {
        self.vertices.get(id)
    }

    /// The edge with the given ID.
    pub fn edge(&self, id: EdgeId) -> &Edge {
        self.edges.get(id)
    }

    /// Looks a vertex up by name.
    pub fn vertex_by_name(&self, name: Ident) -> Option<VertexId> {
        self.vertex_by_name.get(&name).copied()
    }

    /// Looks an edge up by name.
    pub fn edge_by_name(&self, name: Ident) -> Option<EdgeId> {
        self.edge_by_name.get(&name).copied()
    }

    /// All vertices in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.iter().map(|(_, v)| v)
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().map(|(_, e)| e)
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Rebuilds the name indices after deserialization.
    pub fn rebuild_indices(&mut self) {
        self.vertex_by_name = self.vertices.iter().map(|(id, v)| (v.name, id)).collect();
        self.edge_by_name = self.edges.iter().map(|(id, e)| (e.name, id)).collect();
    }
}
