//! The dataflow graph handed to the physical backend.
//!
//! Vertices are module instances with a resource-usage vector; edges are
//! buffered point-to-point channels with a bit width and a depth. Both live
//! in append-only arenas indexed by [`VertexId`] and [`EdgeId`], and their
//! names are unique across the whole design.

#![warn(missing_docs)]

pub mod arena;
pub mod error;
pub mod graph;
pub mod ids;

pub use arena::{Arena, ArenaId};
pub use error::GraphError;
pub use graph::{DataflowGraph, Edge, Vertex};
pub use ids::{EdgeId, VertexId};
