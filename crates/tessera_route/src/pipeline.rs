//! Pipeline depth derived from routed distance.

use serde::{Deserialize, Serialize};

/// How a routed distance becomes a pipeline level and a latency.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineConvention {
    /// `level = distance / spacing`; the edge's latency is `level + 1`.
    #[default]
    Refined,
    /// `level = max(distance / spacing, 1)`; the latency equals the level.
    Legacy,
}

/// Pipeline level and latency of one routed edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineDepth {
    /// Number of pipeline registers the edge needs.
    pub level: u32,
    /// Latency the edge contributes, in cycles.
    pub latency: u32,
}

/// Computes the pipeline depth of an edge spanning `manhattan` grid units
/// when one register covers `units_per_register` units.
pub fn pipeline_depth(manhattan: u32, units_per_register: u32, convention: PipelineConvention) -> PipelineDepth {
    let raw = manhattan / units_per_register.max(1);
    match convention {
        PipelineConvention::Refined => PipelineDepth {
            level: raw,
            latency: raw + 1,
        },
        PipelineConvention::Legacy => {
            let level = raw.max(1);
            PipelineDepth { level, latency: level }
        }
    }
}
