//! Inter-slot global routing.
//!
//! For every edge whose endpoints sit in different slots the router plans a
//! staircase path across the slot grid, records on which side of each
//! endpoint slot the edge leaves or enters, and derives the edge's pipeline
//! depth from the distance between the endpoint centroids. The resulting
//! boundary crossings are what the anchor placer works on.
//!
//! # Usage
//!
//! ```ignore
//! use tessera_route::{GlobalRouter, RouterOptions};
//!
//! let router = GlobalRouter::new(&*board, RouterOptions::default());
//! let routing = router.route(&graph, &assignment, &interner, &sink)?;
//! for (pair, crossings) in routing.crossings_by_pair() { /* ... */ }
//! ```

#![warn(missing_docs)]

pub mod direction;
pub mod error;
pub mod path;
pub mod pipeline;
pub mod router;

pub use direction::{classify, classify_delta, Flow, SlotWiring};
pub use error::RouteError;
pub use path::plan_path;
pub use pipeline::{pipeline_depth, PipelineConvention, PipelineDepth};
pub use router::{Crossing, GlobalRouter, RoutedEdge, RouterOptions, RoutingResult};
