//! Bin budgets and rounding of the relaxed assignment.

use crate::bins::Bin;
use crate::error::PlacementError;
use crate::flow::{AssignmentProblem, AssignmentSolver};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Utilization limits applied to every bin.
#[derive(Debug, Clone)]
pub struct UtilizationPolicy {
    /// Fraction of each bin usable while the buffer is lightly used.
    pub base_utilization: f64,
    /// Density from which the per-bin limit follows the density.
    pub relax_threshold: f64,
    /// Headroom above the density once relaxed.
    pub relax_margin: f64,
    /// Density at or above which the pair is rejected.
    pub max_density: f64,
}

impl Default for UtilizationPolicy {
    fn default() -> Self {
        Self {
            base_utilization: 0.5,
            relax_threshold: 0.4,
            relax_margin: 0.1,
            max_density: 0.9,
        }
    }
}

/// The per-bin load limits derived for one pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinBudget {
    /// Anchors over total bin capacity.
    pub density: f64,
    /// Fraction of each bin's capacity that may be used.
    pub ratio: f64,
    /// Load limit per bin, in bin order.
    pub allowed: Vec<u32>,
}

impl UtilizationPolicy {
    /// Computes the load limit of every bin for `anchors` anchors.
    ///
    /// # Errors
    ///
    /// [`PlacementError::PlacementInfeasible`] if the density reaches
    /// `max_density` or there are anchors but no bins.
    pub fn budget(&self, pair: &str, anchors: usize, bins: &[Bin]) -> Result<BinBudget, PlacementError> {
        let capacity: u64 = bins.iter().map(|b| u64::from(b.capacity)).sum();
        if capacity == 0 {
            if anchors == 0 {
                return Ok(BinBudget {
                    density: 0.0,
                    ratio: self.base_utilization,
                    allowed: vec![0; bins.len()],
                });
            }
            return Err(PlacementError::PlacementInfeasible {
                pair: pair.to_string(),
                reason: format!("{anchors} anchors and no buffer registers"),
            });
        }
        let density = anchors as f64 / capacity as f64;
        if density >= self.max_density {
            return Err(PlacementError::PlacementInfeasible {
                pair: pair.to_string(),
                reason: format!("{anchors} / {capacity} = {density:.3}"),
            });
        }
        // a bin never takes more anchors than it has registers
        let ratio = if density < self.relax_threshold {
            self.base_utilization
        } else {
            density + self.relax_margin
        }
        .min(1.0);
        let allowed = bins
            .iter()
            .map(|b| (f64::from(b.capacity) * ratio).round() as u32)
            .collect();
        Ok(BinBudget { density, ratio, allowed })
    }
}

/// Solves the assignment and rounds it to one bin index per anchor.
///
/// `names` labels the anchors in errors.
///
/// # Errors
///
/// [`PlacementError::SolverFailed`] if the solver reports infeasibility or a
/// timeout, or hands back a malformed solution;
/// [`PlacementError::NonIntegralSolution`] if any value is further than
/// `tolerance` from 0 or 1.
pub fn solve_and_round(
    pair: &str,
    names: &[String],
    bins: &[Bin],
    problem: &AssignmentProblem,
    solver: &dyn AssignmentSolver,
    tolerance: f64,
    deadline: Option<Instant>,
) -> Result<Vec<usize>, PlacementError> {
    let failed = |reason: String| PlacementError::SolverFailed {
        pair: pair.to_string(),
        reason,
    };
    let values = solver
        .solve(problem, deadline)
        .map_err(|status| failed(status.to_string()))?;
    if values.len() != problem.anchors() {
        return Err(failed(format!(
            "{} solution rows for {} anchors",
            values.len(),
            problem.anchors()
        )));
    }

    let mut chosen = Vec::with_capacity(values.len());
    let mut load = vec![0u32; problem.bins()];
    for (a, row) in values.iter().enumerate() {
        let mut pick = None;
        for (b, &v) in row.iter().enumerate() {
            let r = v.round();
            if (v - r).abs() > tolerance {
                return Err(PlacementError::NonIntegralSolution {
                    pair: pair.to_string(),
                    anchor: names.get(a).cloned().unwrap_or_default(),
                    bin: bins.get(b).map(|bin| bin.origin.to_string()).unwrap_or_default(),
                    value: v,
                });
            }
            if r == 1.0 {
                if pick.is_some() {
                    return Err(failed(format!("anchor {a} assigned twice")));
                }
                pick = Some(b);
            }
        }
        let b = pick.ok_or_else(|| failed(format!("anchor {a} left unassigned")))?;
        load[b] += 1;
        chosen.push(b);
    }
    if let Some(b) = (0..load.len()).find(|&b| load[b] > problem.bin_limits[b]) {
        return Err(failed(format!("bin {b} holds {} of {}", load[b], problem.bin_limits[b])));
    }
    Ok(chosen)
}
