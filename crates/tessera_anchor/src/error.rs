//! Errors raised while placing the anchors of one slot pair.

use tessera_common::InternalError;

/// A per-pair placement failure.
///
/// Failures are isolated to the pair that raised them and listed in the
/// placement report. Only [`PlacementError::LinkPairingConflict`] is fatal
/// for the whole run.
#[derive(Debug, thiserror::Error)]
pub enum PlacementError {
    /// The buffer area cannot hold the pair's anchors.
    #[error("{pair}: buffer region too crowded: {reason}")]
    PlacementInfeasible {
        /// The slot pair.
        pair: String,
        /// Anchor count against available registers.
        reason: String,
    },

    /// The assignment solver found no feasible solution or ran out of time.
    #[error("{pair}: assignment solver failed: {reason}")]
    SolverFailed {
        /// The slot pair.
        pair: String,
        /// Solver status.
        reason: String,
    },

    /// A relaxed assignment value is too far from 0 or 1 to round.
    #[error("{pair}: anchor '{anchor}' has non-integral value {value} at bin {bin}")]
    NonIntegralSolution {
        /// The slot pair.
        pair: String,
        /// The anchor whose row is fractional.
        anchor: String,
        /// The bin origin.
        bin: String,
        /// The offending value.
        value: f64,
    },

    /// Two anchors occupy paired or identical link registers.
    #[error("{pair}: link register {first} conflicts with {second}")]
    LinkPairingConflict {
        /// The slot pair.
        pair: String,
        /// The register being checked.
        first: String,
        /// The register it collides with.
        second: String,
    },

    /// The placement worker pool could not be created.
    #[error("failed to start placement workers: {0}")]
    WorkerPool(String),

    /// A broken invariant of the placer itself.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl PlacementError {
    /// Returns `true` if this failure must abort the run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PlacementError::LinkPairingConflict { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pairing_conflicts_are_fatal() {
        let conflict = PlacementError::LinkPairingConflict {
            pair: "p".into(),
            first: "LINK_X0Y0/RX_REG0".into(),
            second: "LINK_X0Y120/TX_REG0".into(),
        };
        let crowded = PlacementError::PlacementInfeasible {
            pair: "p".into(),
            reason: "95 / 100".into(),
        };
        assert!(conflict.is_fatal());
        assert!(!crowded.is_fatal());
        assert!(!PlacementError::from(InternalError::new("x")).is_fatal());
    }

    #[test]
    fn display_names_the_pair() {
        let err = PlacementError::SolverFailed {
            pair: "CR_X0Y0_To_CR_X1Y1 <-> CR_X2Y0_To_CR_X3Y1".into(),
            reason: "time limit reached".into(),
        };
        let msg = format!("{err}");
        assert!(msg.starts_with("CR_X0Y0_To_CR_X1Y1"));
        assert!(msg.contains("time limit"));
    }
}
