//! Errors raised while building a dataflow graph.

/// A malformed dataflow graph. Always fatal for the run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Two vertices share a name.
    #[error("duplicate vertex name '{0}'")]
    DuplicateVertex(String),

    /// Two edges share a name.
    #[error("duplicate edge name '{0}'")]
    DuplicateEdge(String),

    /// An edge refers to a vertex that is not in the graph.
    #[error("edge '{edge}' refers to unknown vertex '{vertex}'")]
    UnknownVertex {
        /// The offending edge.
        edge: String,
        /// The missing endpoint.
        vertex: String,
    },

    /// An edge has a zero width or depth.
    #[error("edge '{edge}' is malformed: {reason}")]
    InvalidEdge {
        /// The offending edge.
        edge: String,
        /// What is wrong with it.
        reason: String,
    },
}
