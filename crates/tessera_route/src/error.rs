//! Errors raised by the global router.

/// A routing failure. Aborts the run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// The staircase walk from source to destination did not land on the
    /// destination slot.
    #[error("edge '{edge}' has no path from {from} to {to}: {reason}")]
    UnreachablePath {
        /// The edge being routed.
        edge: String,
        /// Source slot name.
        from: String,
        /// Destination slot name.
        to: String,
        /// Why the walk failed.
        reason: String,
    },

    /// The worker pool could not be created.
    #[error("failed to start routing workers: {0}")]
    ThreadPool(String),
}
