//! Relaxed anchor-to-bin assignment as a min-cost flow.
//!
//! The assignment is a transportation problem: every anchor ships one unit,
//! every bin accepts at most its allowed load. Its constraint matrix is
//! totally unimodular, so the relaxation has an integral optimum and a
//! network-flow solver finds it directly. Solvers still report relaxed
//! values; rounding and its tolerance check live with the caller.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Instant;

/// An `anchors x bins` transportation instance.
#[derive(Debug, Clone)]
pub struct AssignmentProblem {
    /// `costs[a][b]`: cost of anchor `a` in bin `b`. All rows have one entry per bin.
    pub costs: Vec<Vec<f64>>,
    /// Maximum load of each bin.
    pub bin_limits: Vec<u32>,
}

impl AssignmentProblem {
    /// Number of anchors.
    pub fn anchors(&self) -> usize {
        self.costs.len()
    }

    /// Number of bins.
    pub fn bins(&self) -> usize {
        self.bin_limits.len()
    }

    /// Total cost of an assignment given as one bin index per anchor.
    pub fn total_cost(&self, assignment: &[usize]) -> f64 {
        assignment
            .iter()
            .enumerate()
            .map(|(a, &b)| self.costs[a][b])
            .sum()
    }
}

/// Why a solver produced no values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveStatus {
    /// Not every anchor can be placed within the bin limits.
    Infeasible,
    /// The deadline passed before the solver finished.
    TimedOut,
}

impl std::fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveStatus::Infeasible => f.write_str("infeasible"),
            SolveStatus::TimedOut => f.write_str("time limit reached"),
        }
    }
}

/// A solver for the relaxed assignment.
///
/// Returns `x[a][b]` in `[0, 1]` with every row summing to one and every
/// column to at most the bin's limit.
pub trait AssignmentSolver: Send + Sync {
    /// Solves the instance, giving up once `deadline` has passed.
    fn solve(&self, problem: &AssignmentProblem, deadline: Option<Instant>) -> Result<Vec<Vec<f64>>, SolveStatus>;
}

/// Successive shortest paths with Dijkstra on reduced costs.
///
/// Each augmentation places one more anchor; ties are broken by node index,
/// so equal-cost instances always solve the same way.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinCostFlowSolver;

#[derive(Debug, Clone)]
struct Arc {
    to: usize,
    cap: u32,
    cost: f64,
}

struct Network {
    arcs: Vec<Arc>,
    out: Vec<Vec<usize>>,
}

impl Network {
    fn new(nodes: usize) -> Self {
        Self {
            arcs: Vec::new(),
            out: vec![Vec::new(); nodes],
        }
    }

    /// Adds an arc and its residual twin; returns the forward arc index.
    fn add(&mut self, from: usize, to: usize, cap: u32, cost: f64) -> usize {
        let id = self.arcs.len();
        self.arcs.push(Arc { to, cap, cost });
        self.arcs.push(Arc { to: from, cap: 0, cost: -cost });
        self.out[from].push(id);
        self.out[to].push(id + 1);
        id
    }
}

#[derive(PartialEq)]
struct Frontier {
    dist: f64,
    node: usize,
}

impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        // min-heap on (dist, node)
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl AssignmentSolver for MinCostFlowSolver {
    fn solve(&self, problem: &AssignmentProblem, deadline: Option<Instant>) -> Result<Vec<Vec<f64>>, SolveStatus> {
        let (na, nb) = (problem.anchors(), problem.bins());
        let source = 0;
        let anchor = |a: usize| 1 + a;
        let bin = |b: usize| 1 + na + b;
        let target = 1 + na + nb;
        let nodes = target + 1;

        let mut net = Network::new(nodes);
        for a in 0..na {
            net.add(source, anchor(a), 1, 0.0);
        }
        let mut assign_arcs = vec![Vec::with_capacity(nb); na];
        for (a, row) in problem.costs.iter().enumerate() {
            for (b, &cost) in row.iter().enumerate().take(nb) {
                assign_arcs[a].push(net.add(anchor(a), bin(b), 1, cost));
            }
        }
        for (b, &limit) in problem.bin_limits.iter().enumerate() {
            if limit > 0 {
                net.add(bin(b), target, limit, 0.0);
            }
        }

        let mut potential = vec![0.0f64; nodes];
        for _ in 0..na {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return Err(SolveStatus::TimedOut);
            }

            let mut dist = vec![f64::INFINITY; nodes];
            let mut via: Vec<Option<usize>> = vec![None; nodes];
            let mut heap = BinaryHeap::new();
            dist[source] = 0.0;
            heap.push(Frontier { dist: 0.0, node: source });
            while let Some(Frontier { dist: d, node: u }) = heap.pop() {
                if d > dist[u] {
                    continue;
                }
                for &id in &net.out[u] {
                    let arc = &net.arcs[id];
                    if arc.cap == 0 {
                        continue;
                    }
                    let reduced = (arc.cost + potential[u] - potential[arc.to]).max(0.0);
                    let next = d + reduced;
                    if next < dist[arc.to] {
                        dist[arc.to] = next;
                        via[arc.to] = Some(id);
                        heap.push(Frontier { dist: next, node: arc.to });
                    }
                }
            }
            if dist[target].is_infinite() {
                return Err(SolveStatus::Infeasible);
            }
            for (p, d) in potential.iter_mut().zip(&dist) {
                if d.is_finite() {
                    *p += d;
                }
            }

            // every augmenting path starts with a unit source arc
            let mut v = target;
            while let Some(id) = via[v] {
                net.arcs[id].cap -= 1;
                net.arcs[id ^ 1].cap += 1;
                v = net.arcs[id ^ 1].to;
            }
        }

        Ok(assign_arcs
            .iter()
            .map(|row| row.iter().map(|&id| f64::from(net.arcs[id ^ 1].cap)).collect())
            .collect())
    }
}
