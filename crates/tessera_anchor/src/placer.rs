//! The pairwise anchor placer.

use crate::anchor::{collect_anchors, Anchor, ConnectionReport};
use crate::assign::{solve_and_round, BinBudget, UtilizationPolicy};
use crate::baseline::shuffle_assignment;
use crate::bins::discretize;
use crate::cost::CostModel;
use crate::die_crossing::{
    check_pairing, cross_check_interface, link_direction, move_tx_to_rx, remap, LinkPolarity, LinkSite,
};
use crate::error::PlacementError;
use crate::flow::{AssignmentProblem, AssignmentSolver, MinCostFlowSolver};
use crate::quality::{AnchorQuality, QualitySummary};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};
use tessera_common::{Interner, InternalError};
use tessera_device::{BoardTopology, SiteCoord};
use tessera_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use tessera_floorplan::{Slot, SlotPair};
use tessera_graph::DataflowGraph;
use tessera_route::{Crossing, RoutingResult};

const PAIR_BUDGET: DiagnosticCode = DiagnosticCode::new(Category::Placement, 1);
const PAIR_QUALITY: DiagnosticCode = DiagnosticCode::new(Category::Placement, 5);
const PAIR_FAILED: DiagnosticCode = DiagnosticCode::new(Category::Placement, 6);
const EMPTY_PAIR: DiagnosticCode = DiagnosticCode::new(Category::Placement, 7);

/// How the final sites are chosen.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub enum PlacementMode {
    /// The cost-optimal assignment.
    #[default]
    Optimal,
    /// The optimal assignment's sites shuffled among the anchors. Only meant
    /// as a reference point for the optimizer.
    RandomBaseline {
        /// Shuffle seed.
        seed: u64,
    },
}

/// Placer settings.
#[derive(Clone, Debug)]
pub struct PlacerOptions {
    /// Bin width in sites.
    pub bin_width: u32,
    /// Bin height in sites.
    pub bin_height: u32,
    /// Per-bin utilization limits.
    pub utilization: UtilizationPolicy,
    /// Anchor-to-bin cost weights.
    pub cost: CostModel,
    /// Largest distance from 0 or 1 a relaxed value may have.
    pub integrality_tolerance: f64,
    /// Solve time allowed per pair.
    pub time_limit: Option<Duration>,
    /// Link registers usable at die boundaries.
    pub link_polarity: LinkPolarity,
    /// Optimal or baseline placement.
    pub mode: PlacementMode,
    /// Interface wire name fragments that never get a routed direction.
    pub excluded_signals: Vec<String>,
    /// Worker threads; all cores when `None`.
    pub threads: Option<usize>,
}

impl Default for PlacerOptions {
    fn default() -> Self {
        Self {
            bin_width: 1,
            bin_height: 1,
            utilization: UtilizationPolicy::default(),
            cost: CostModel::default(),
            integrality_tolerance: 1e-6,
            time_limit: None,
            link_polarity: LinkPolarity::Mixed,
            mode: PlacementMode::Optimal,
            excluded_signals: vec!["clk".to_string(), "_axi_".to_string()],
            threads: None,
        }
    }
}

/// Where an anchor ended up.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PlacementSite {
    /// A generic fabric site.
    Fabric {
        /// The site.
        site: SiteCoord,
    },
    /// A link register at a die boundary.
    Link(LinkSite),
}

impl fmt::Display for PlacementSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementSite::Fabric { site } => write!(f, "SITE_{site}"),
            PlacementSite::Link(link) => write!(f, "{link}"),
        }
    }
}

/// One placed anchor.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnchorPlacement {
    /// Edge and crossing index.
    pub anchor: Crossing,
    /// Register name.
    pub name: String,
    /// Origin of the bin the solver chose.
    pub bin: SiteCoord,
    /// Final site.
    pub site: PlacementSite,
    /// How good the bin is for this anchor alone.
    pub quality: AnchorQuality,
}

/// The result for one slot pair.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PairPlacement {
    /// The pair.
    pub pair: SlotPair,
    /// Whether the boundary crosses dies.
    pub die_crossing: bool,
    /// Per-bin limits used.
    pub budget: BinBudget,
    /// Placed anchors in crossing order.
    pub anchors: Vec<AnchorPlacement>,
    /// Aggregate quality.
    pub quality: QualitySummary,
}

/// A pair that could not be placed.
#[derive(Debug)]
pub struct PairFailure {
    /// The pair.
    pub pair: SlotPair,
    /// Why.
    pub error: PlacementError,
}

/// Placements of every pair that succeeded and the failures of the rest.
#[derive(Debug, Default)]
pub struct PlacementReport {
    /// Placed pairs in pair order.
    pub pairs: Vec<PairPlacement>,
    /// Failed pairs in pair order.
    pub failures: Vec<PairFailure>,
}

impl PlacementReport {
    /// Returns `true` if every pair was placed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Returns `true` if a failure invalidates the whole run.
    pub fn has_fatal(&self) -> bool {
        self.failures.iter().any(|f| f.error.is_fatal())
    }

    /// All placed anchors.
    pub fn anchors(&self) -> impl Iterator<Item = &AnchorPlacement> {
        self.pairs.iter().flat_map(|p| p.anchors.iter())
    }

    /// The site of a named anchor.
    pub fn site_of(&self, name: &str) -> Option<PlacementSite> {
        self.anchors().find(|a| a.name == name).map(|a| a.site)
    }
}

/// Per-slot inputs reported by the single-slot placements.
#[derive(Debug, Clone, Default)]
pub struct PlacementInputs {
    /// Anchor connections seen from each slot.
    pub connections: BTreeMap<Slot, ConnectionReport>,
    /// Full interface wire list of each slot, where known.
    pub interfaces: BTreeMap<Slot, Vec<String>>,
}

/// Places the anchors of every slot pair in the buffer between the slots.
pub struct AnchorPlacer<'a> {
    board: &'a dyn BoardTopology,
    options: PlacerOptions,
    solver: Box<dyn AssignmentSolver>,
}

impl<'a> AnchorPlacer<'a> {
    /// Creates a placer using the min-cost-flow solver.
    pub fn new(board: &'a dyn BoardTopology, options: PlacerOptions) -> Self {
        Self {
            board,
            options,
            solver: Box::new(MinCostFlowSolver),
        }
    }

    /// Replaces the assignment solver.
    pub fn with_solver(mut self, solver: Box<dyn AssignmentSolver>) -> Self {
        self.solver = solver;
        self
    }

    /// The active options.
    pub fn options(&self) -> &PlacerOptions {
        &self.options
    }

    /// Places every pair the routing crosses.
    ///
    /// Pairs run in parallel and independently; a failing pair is recorded
    /// in the report and does not stop the others.
    ///
    /// # Errors
    ///
    /// Only [`PlacementError::WorkerPool`]; per-pair errors go into the report.
    pub fn place_all(
        &self,
        routing: &RoutingResult,
        graph: &DataflowGraph,
        interner: &Interner,
        inputs: &PlacementInputs,
        sink: &DiagnosticSink,
    ) -> Result<PlacementReport, PlacementError> {
        let pairs: Vec<(SlotPair, Vec<Crossing>)> = routing.crossings_by_pair().into_iter().collect();

        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(n) = self.options.threads {
            builder = builder.num_threads(n);
        }
        let pool = builder
            .build()
            .map_err(|e| PlacementError::WorkerPool(e.to_string()))?;

        let results: Vec<(SlotPair, Result<PairPlacement, PlacementError>)> = pool.install(|| {
            pairs
                .par_iter()
                .map(|(pair, crossings)| {
                    let anchors = collect_anchors(pair, crossings, graph, interner, &inputs.connections, sink);
                    let result = self.place_pair(pair, &anchors, routing, graph, interner, inputs, sink);
                    (pair.clone(), result)
                })
                .collect()
        });

        let mut report = PlacementReport::default();
        for (pair, result) in results {
            match result {
                Ok(placement) => report.pairs.push(placement),
                Err(error) => {
                    let diag = if error.is_fatal() {
                        Diagnostic::error(PAIR_FAILED, error.to_string())
                    } else {
                        Diagnostic::warning(PAIR_FAILED, error.to_string())
                    };
                    sink.emit(diag.with_subject(pair.name()));
                    report.failures.push(PairFailure { pair, error });
                }
            }
        }
        Ok(report)
    }

    /// Places the anchors of one pair.
    #[allow(clippy::too_many_arguments)]
    pub fn place_pair(
        &self,
        pair: &SlotPair,
        anchors: &[Anchor],
        routing: &RoutingResult,
        graph: &DataflowGraph,
        interner: &Interner,
        inputs: &PlacementInputs,
        sink: &DiagnosticSink,
    ) -> Result<PairPlacement, PlacementError> {
        let name = pair.name();
        let (a, b) = pair.slots();
        let region = self
            .board
            .buffer_region_between(&a.rect(), &b.rect())
            .ok_or_else(|| InternalError::new(format!("{name}: no buffer between the slots")))?;
        let bins = discretize(
            &region,
            self.options.bin_width,
            self.options.bin_height,
            self.board.registers_per_site(),
        );
        let budget = self.options.utilization.budget(&name, anchors.len(), &bins)?;
        sink.emit(
            Diagnostic::note(
                PAIR_BUDGET,
                format!(
                    "{} anchors over {} bins, density {:.3}, usage ratio {:.2}",
                    anchors.len(),
                    bins.len(),
                    budget.density,
                    budget.ratio
                ),
            )
            .with_subject(name.clone()),
        );

        if anchors.is_empty() {
            sink.emit(Diagnostic::warning(EMPTY_PAIR, "no anchors between the pair").with_subject(name.clone()));
            return Ok(PairPlacement {
                pair: pair.clone(),
                die_crossing: region.die_crossing(),
                budget,
                anchors: Vec::new(),
                quality: QualitySummary::default(),
            });
        }

        let names: Vec<String> = anchors.iter().map(|a| a.name.clone()).collect();
        let problem = AssignmentProblem {
            costs: self.options.cost.matrix(anchors, &bins),
            bin_limits: budget.allowed.clone(),
        };
        // a limit past the end of the clock means no deadline
        let deadline = self.options.time_limit.and_then(|t| Instant::now().checked_add(t));
        let mut chosen = solve_and_round(
            &name,
            &names,
            &bins,
            &problem,
            self.solver.as_ref(),
            self.options.integrality_tolerance,
            deadline,
        )?;
        if let PlacementMode::RandomBaseline { seed } = self.options.mode {
            shuffle_assignment(&mut chosen, seed);
        }
        let origins: Vec<SiteCoord> = chosen.iter().map(|&b| bins[b].origin).collect();

        let sites: Vec<PlacementSite> = match &region.link {
            None => origins.iter().map(|&site| PlacementSite::Fabric { site }).collect(),
            Some(link) => {
                let upper = pair.upper();
                let wiring = routing.wiring_of(upper);
                if let Some(interface) = inputs.interfaces.get(upper) {
                    cross_check_interface(
                        upper,
                        wiring,
                        interface,
                        graph,
                        interner,
                        &self.options.excluded_signals,
                        sink,
                    );
                }
                let directions: Vec<_> = anchors
                    .iter()
                    .map(|a| link_direction(a.key, upper, wiring, routing.routed_edge(a.key.edge)))
                    .collect();
                let mut link_sites = remap(link, &origins, &directions)?;
                check_pairing(&name, link, &link_sites)?;
                if self.options.link_polarity == LinkPolarity::RxOnly {
                    move_tx_to_rx(link, &mut link_sites);
                    check_pairing(&name, link, &link_sites)?;
                }
                link_sites.into_iter().map(PlacementSite::Link).collect()
            }
        };

        let placed: Vec<AnchorPlacement> = anchors
            .iter()
            .zip(chosen.iter().zip(sites))
            .enumerate()
            .map(|(i, (anchor, (&bin, site)))| AnchorPlacement {
                anchor: anchor.key,
                name: anchor.name.clone(),
                bin: bins[bin].origin,
                site,
                quality: AnchorQuality::of(&problem.costs[i], bin),
            })
            .collect();
        let quality = QualitySummary::from_anchors(placed.iter().map(|p| &p.quality));
        sink.emit(
            Diagnostic::note(
                PAIR_QUALITY,
                format!(
                    "average rank of the placed bins {:.2}, worst rank {}",
                    quality.average_rank, quality.worst_rank
                ),
            )
            .with_subject(name),
        );

        Ok(PairPlacement {
            pair: pair.clone(),
            die_crossing: region.die_crossing(),
            budget,
            anchors: placed,
            quality,
        })
    }
}
