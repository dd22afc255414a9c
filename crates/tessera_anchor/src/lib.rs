//! Anchor placement between adjacent slots.
//!
//! Every boundary crossing of a routed edge needs a pipeline register (an
//! anchor) in the buffer area between the two slots. For each slot pair the
//! placer quantizes that area into bins, scores every anchor-bin pairing by
//! the distance to the logic the anchor connects to, and solves the
//! resulting transportation problem exactly with a min-cost-flow solver.
//! Pairs on two sides of a die boundary are then remapped onto the
//! dedicated link registers, honoring their pairing rules.
//!
//! Pairs are placed independently on a worker pool; a failed pair is
//! reported without affecting the others.
//!
//! # Usage
//!
//! ```ignore
//! use tessera_anchor::{AnchorPlacer, PlacementInputs, PlacerOptions};
//!
//! let placer = AnchorPlacer::new(&*board, PlacerOptions::default());
//! let report = placer.place_all(&routing, &graph, &interner, &inputs, &sink)?;
//! if report.has_fatal() { /* abort */ }
//! ```

#![warn(missing_docs)]

pub mod anchor;
pub mod assign;
pub mod baseline;
pub mod bins;
pub mod cost;
pub mod die_crossing;
pub mod error;
pub mod flow;
pub mod placer;
pub mod quality;

pub use anchor::{anchor_name, collect_anchors, Anchor, ConnectionRecord, ConnectionReport, ConnectionRole};
pub use assign::{BinBudget, UtilizationPolicy};
pub use bins::{discretize, Bin};
pub use cost::CostModel;
pub use die_crossing::{LinkPolarity, LinkSite, Polarity};
pub use error::PlacementError;
pub use flow::{AssignmentProblem, AssignmentSolver, MinCostFlowSolver, SolveStatus};
pub use placer::{
    AnchorPlacement, AnchorPlacer, PairFailure, PairPlacement, PlacementInputs, PlacementMode, PlacementReport,
    PlacementSite, PlacerOptions,
};
pub use quality::{AnchorQuality, QualitySummary};
