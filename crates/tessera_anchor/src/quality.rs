//! How close each anchor landed to its individually best bin.

use serde::{Deserialize, Serialize};

/// Costs tolerated as equal when ranking bins.
const RANK_EPSILON: f64 = 1e-9;

/// Placement quality of one anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorQuality {
    /// Cost of the chosen bin.
    pub chosen_cost: f64,
    /// Lowest cost over all bins.
    pub best_cost: f64,
    /// Highest cost over all bins.
    pub worst_cost: f64,
    /// Number of bins strictly cheaper than the chosen one.
    pub rank: usize,
    /// Bins considered.
    pub bins: usize,
}

impl AnchorQuality {
    /// Rates the choice of bin `chosen` in one cost row.
    pub fn of(row: &[f64], chosen: usize) -> Self {
        let chosen_cost = row[chosen];
        Self {
            chosen_cost,
            best_cost: row.iter().copied().fold(f64::INFINITY, f64::min),
            worst_cost: row.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            rank: row.iter().filter(|&&c| c < chosen_cost - RANK_EPSILON).count(),
            bins: row.len(),
        }
    }
}

/// Aggregate quality of one pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualitySummary {
    /// Mean rank over all anchors.
    pub average_rank: f64,
    /// Largest rank.
    pub worst_rank: usize,
    /// Sum of chosen costs.
    pub total_cost: f64,
}

impl QualitySummary {
    /// Summarizes per-anchor qualities.
    pub fn from_anchors<'a>(qualities: impl IntoIterator<Item = &'a AnchorQuality>) -> Self {
        let mut summary = QualitySummary::default();
        let mut count = 0usize;
        let mut rank_sum = 0usize;
        for q in qualities {
            count += 1;
            rank_sum += q.rank;
            summary.worst_rank = summary.worst_rank.max(q.rank);
            summary.total_cost += q.chosen_cost;
        }
        if count > 0 {
            summary.average_rank = rank_sum as f64 / count as f64;
        }
        summary
    }
}
