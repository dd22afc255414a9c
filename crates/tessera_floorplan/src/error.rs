//! Errors raised by the slot model. All of them abort the run.

use tessera_device::{Axis, GridRect};

/// A geometry or assignment error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FloorplanError {
    /// A rectangle is degenerate or leaves the grid.
    #[error("invalid slot geometry {rect}: {reason}")]
    InvalidGeometry {
        /// The rejected rectangle.
        rect: GridRect,
        /// Why it was rejected.
        reason: String,
    },

    /// A slot has extent 1 on the axis being split.
    #[error("slot {slot} cannot be split along {axis:?}")]
    NotSplittable {
        /// Name of the slot.
        slot: String,
        /// Axis whose extent is 1.
        axis: Axis,
    },

    /// A pblock string could not be parsed.
    #[error("malformed pblock '{0}'")]
    InvalidPblock(String),

    /// Two slots were paired but share no boundary.
    #[error("slots {0} and {1} are not adjacent")]
    NotAdjacent(String, String),

    /// A vertex has no slot.
    #[error("vertex '{0}' is not assigned to any slot")]
    UnassignedVertex(String),

    /// A vertex was assigned more than once.
    #[error("vertex '{0}' is assigned to more than one slot")]
    DuplicateAssignment(String),

    /// Two occupied slots overlap.
    #[error("slots {0} and {1} overlap")]
    OverlappingSlots(String, String),
}
