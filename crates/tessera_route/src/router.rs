//! The global router and its output.

use crate::direction::{classify, Flow, SlotWiring};
use crate::error::RouteError;
use crate::path::plan_path;
use crate::pipeline::{pipeline_depth, PipelineConvention, PipelineDepth};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tessera_common::Interner;
use tessera_device::BoardTopology;
use tessera_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use tessera_floorplan::{PartitionAssignment, Slot, SlotPair};
use tessera_graph::{DataflowGraph, Edge, EdgeId};

const EDGE_LATENCY: DiagnosticCode = DiagnosticCode::new(Category::Routing, 1);
const ROUTING_SUMMARY: DiagnosticCode = DiagnosticCode::new(Category::Routing, 2);

/// Router settings.
#[derive(Clone, Debug)]
pub struct RouterOptions {
    /// Pipeline-level convention.
    pub convention: PipelineConvention,
    /// Grid units covered by one pipeline register.
    pub grid_units_per_register: u32,
    /// Worker threads; all cores when `None`.
    pub threads: Option<usize>,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            convention: PipelineConvention::Refined,
            grid_units_per_register: 2,
            threads: None,
        }
    }
}

/// One boundary crossing of a routed edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Crossing {
    /// The crossing edge.
    pub edge: EdgeId,
    /// Position of the crossing along the edge's path, from the source.
    pub index: u32,
}

/// An inter-slot edge with its planned path and pipeline depth.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoutedEdge {
    /// The routed edge.
    pub edge: EdgeId,
    /// Slot holding the source vertex.
    pub src_slot: Slot,
    /// Slot holding the destination vertex.
    pub dst_slot: Slot,
    /// Slots passed through, in order, excluding both endpoints.
    pub intermediate: Vec<Slot>,
    /// Manhattan distance between the endpoint centroids.
    pub manhattan: u32,
    /// Pipeline level and latency.
    pub depth: PipelineDepth,
    /// Consecutive slot pairs along the full path.
    pub hops: Vec<SlotPair>,
}

impl RoutedEdge {
    /// The full path, source and destination included.
    pub fn path(&self) -> impl Iterator<Item = &Slot> {
        std::iter::once(&self.src_slot)
            .chain(self.intermediate.iter())
            .chain(std::iter::once(&self.dst_slot))
    }

    /// The slot the edge occupies just before crossing `index`.
    pub fn slot_before(&self, index: u32) -> Option<&Slot> {
        self.path().nth(index as usize)
    }

    /// Every slot boundary the edge crosses, in path order.
    pub fn boundary_crossings(&self) -> impl Iterator<Item = (Crossing, &SlotPair)> {
        self.hops.iter().enumerate().map(move |(index, pair)| {
            let crossing = Crossing {
                edge: self.edge,
                index: index as u32,
            };
            (crossing, pair)
        })
    }
}

/// Everything the router produces.
#[derive(Clone, Debug, Default)]
pub struct RoutingResult {
    /// Routed inter-slot edges in edge-ID order.
    pub routed: Vec<RoutedEdge>,
    /// Per-slot side/flow edge lists, keyed by slot.
    pub wiring: BTreeMap<Slot, SlotWiring>,
}

impl RoutingResult {
    /// The routed edge for `edge`, if it crosses slots.
    pub fn routed_edge(&self, edge: EdgeId) -> Option<&RoutedEdge> {
        self.routed
            .binary_search_by_key(&edge, |r| r.edge)
            .ok()
            .map(|i| &self.routed[i])
    }

    /// Wiring of a slot; empty when no inter-slot edge touches it.
    pub fn wiring_of(&self, slot: &Slot) -> Option<&SlotWiring> {
        self.wiring.get(slot)
    }

    /// Every boundary crossing grouped by the slot pair it crosses.
    pub fn crossings_by_pair(&self) -> BTreeMap<SlotPair, Vec<Crossing>> {
        let mut by_pair: BTreeMap<SlotPair, Vec<Crossing>> = BTreeMap::new();
        for routed in &self.routed {
            for (crossing, pair) in routed.boundary_crossings() {
                by_pair.entry(pair.clone()).or_default().push(crossing);
            }
        }
        by_pair
    }
}

/// Routes inter-slot edges across the slot grid.
pub struct GlobalRouter<'a> {
    board: &'a dyn BoardTopology,
    options: RouterOptions,
}

impl<'a> GlobalRouter<'a> {
    /// Creates a router for `board`.
    pub fn new(board: &'a dyn BoardTopology, options: RouterOptions) -> Self {
        Self { board, options }
    }

    /// Routes every inter-slot edge of `graph`.
    ///
    /// Edges are routed in parallel; the per-slot wiring is merged afterwards
    /// and sorted so the result does not depend on scheduling. The partition
    /// assignment is only read.
    pub fn route(
        &self,
        graph: &DataflowGraph,
        assignment: &PartitionAssignment,
        interner: &Interner,
        sink: &DiagnosticSink,
    ) -> Result<RoutingResult, RouteError> {
        let edges: Vec<&Edge> = graph.edges().filter(|e| assignment.is_inter_slot(e)).collect();

        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(n) = self.options.threads {
            builder = builder.num_threads(n);
        }
        let pool = builder
            .build()
            .map_err(|e| RouteError::ThreadPool(e.to_string()))?;

        let partials: Vec<(RoutedEdge, [(Slot, SlotWiring); 2])> = pool.install(|| {
            edges
                .par_iter()
                .map(|edge| self.route_edge(edge, assignment, interner))
                .collect::<Result<Vec<_>, RouteError>>()
        })?;

        let mut result = RoutingResult::default();
        for (routed, wiring) in partials {
            sink.emit(
                Diagnostic::note(
                    EDGE_LATENCY,
                    format!(
                        "pipeline level {} (latency {}) over distance {}",
                        routed.depth.level, routed.depth.latency, routed.manhattan
                    ),
                )
                .with_subject(interner.resolve(graph.edge(routed.edge).name)),
            );
            for (slot, partial) in wiring {
                result.wiring.entry(slot).or_default().merge(partial);
            }
            result.routed.push(routed);
        }
        for wiring in result.wiring.values_mut() {
            wiring.finalize();
        }
        result.routed.sort_by_key(|r| r.edge);

        let crossings: usize = result.routed.iter().map(|r| r.hops.len()).sum();
        sink.emit(Diagnostic::note(
            ROUTING_SUMMARY,
            format!(
                "routed {} inter-slot edges with {} boundary crossings",
                result.routed.len(),
                crossings
            ),
        ));
        Ok(result)
    }

    fn route_edge(
        &self,
        edge: &Edge,
        assignment: &PartitionAssignment,
        interner: &Interner,
    ) -> Result<(RoutedEdge, [(Slot, SlotWiring); 2]), RouteError> {
        let name = interner.resolve(edge.name);
        let src = assignment.slot_of(edge.src);
        let dst = assignment.slot_of(edge.dst);

        let intermediate = plan_path(self.board, name, src, dst)?;

        let mut hops = Vec::with_capacity(intermediate.len() + 1);
        let path: Vec<&Slot> = std::iter::once(src)
            .chain(intermediate.iter())
            .chain(std::iter::once(dst))
            .collect();
        for w in path.windows(2) {
            let pair = SlotPair::new(w[0].clone(), w[1].clone()).map_err(|e| {
                RouteError::UnreachablePath {
                    edge: name.to_string(),
                    from: src.name(),
                    to: dst.name(),
                    reason: e.to_string(),
                }
            })?;
            hops.push(pair);
        }

        let (sx, sy) = src.centroid();
        let (dx, dy) = dst.centroid();
        let manhattan = sx.abs_diff(dx) + sy.abs_diff(dy);
        let depth = pipeline_depth(
            manhattan,
            self.options.grid_units_per_register,
            self.options.convention,
        );

        let mut out_wiring = SlotWiring::default();
        out_wiring.push(classify(src.centroid(), dst.centroid()), Flow::Outbound, edge.id);
        let mut in_wiring = SlotWiring::default();
        in_wiring.push(classify(dst.centroid(), src.centroid()), Flow::Inbound, edge.id);

        Ok((
            RoutedEdge {
                edge: edge.id,
                src_slot: src.clone(),
                dst_slot: dst.clone(),
                intermediate,
                manhattan,
                depth,
                hops,
            },
            [(src.clone(), out_wiring), (dst.clone(), in_wiring)],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_device::{ResourceVector, UniformBoard, UniformBoardParams};
    use tessera_floorplan::Direction;
    use tessera_graph::VertexId;

    struct Design {
        board: UniformBoard,
        interner: Interner,
        graph: DataflowGraph,
        placement: Vec<(VertexId, (u32, u32))>,
    }

    /// 2x2 slots on an 8x8 grid; vertices named after the slot origin.
    fn design(edges: &[(&str, &str, &str)], vertices: &[(&str, (u32, u32))]) -> Design {
        let board = UniformBoard::new(UniformBoardParams {
            columns: 8,
            rows: 8,
            rows_per_die: 4,
            sites_per_region_x: 8,
            sites_per_region_y: 8,
            buffer_rows: 1,
            buffer_columns: 1,
            link_columns_per_region: 1,
            ..UniformBoardParams::default()
        })
        .unwrap();
        let interner = Interner::new();
        let mut graph = DataflowGraph::new();
        let mut placement = Vec::new();
        for (name, origin) in vertices {
            let v = graph
                .add_vertex(&interner, name, ResourceVector::default())
                .unwrap();
            placement.push((v, *origin));
        }
        for (name, src, dst) in edges {
            graph.add_edge_by_name(&interner, name, src, dst, 32, 2).unwrap();
        }
        Design { board, interner, graph, placement }
    }

    fn run(d: &Design, options: RouterOptions) -> (RoutingResult, DiagnosticSink) {
        let assignment = PartitionAssignment::new(
            &d.graph,
            &d.interner,
            d.placement.iter().map(|&(v, (x, y))| {
                (v, Slot::from_coordinates(&d.board, x, y, x + 2, y + 2).unwrap())
            }),
        )
        .unwrap();
        let sink = DiagnosticSink::new();
        let result = GlobalRouter::new(&d.board, options)
            .route(&d.graph, &assignment, &d.interner, &sink)
            .unwrap();
        (result, sink)
    }

    fn edge_id(d: &Design, name: &str) -> EdgeId {
        d.graph.edge_by_name(d.interner.get_or_intern(name)).unwrap()
    }

    #[test]
    fn intra_slot_edges_are_not_routed() {
        let d = design(&[("local", "a", "b")], &[("a", (0, 0)), ("b", (0, 0))]);
        let (result, _) = run(&d, RouterOptions::default());
        assert!(result.routed.is_empty());
        assert!(result.wiring.is_empty());
    }

    #[test]
    fn adjacent_edge_has_one_crossing() {
        let d = design(&[("ab", "a", "b")], &[("a", (0, 0)), ("b", (2, 0))]);
        let (result, sink) = run(&d, RouterOptions::default());
        let routed = &result.routed[0];
        assert!(routed.intermediate.is_empty());
        assert_eq!(routed.hops.len(), 1);
        assert_eq!(routed.manhattan, 2);
        assert_eq!(routed.depth, PipelineDepth { level: 1, latency: 2 });
        assert_eq!(sink.diagnostics().len(), 2);
        assert!(!sink.has_errors());
    }

    #[test]
    fn diagonal_edge_wiring() {
        let d = design(&[("diag", "a", "b")], &[("a", (0, 0)), ("b", (4, 2))]);
        let (result, _) = run(&d, RouterOptions::default());
        let e = edge_id(&d, "diag");
        let routed = result.routed_edge(e).unwrap();
        assert_eq!(routed.intermediate.len(), 2);
        assert_eq!(routed.hops.len(), 3);
        assert_eq!(routed.manhattan, 6);
        assert_eq!(routed.depth.level, 3);

        let src = &routed.src_slot;
        let dst = &routed.dst_slot;
        assert_eq!(result.wiring[src].edges(Direction::Right, Flow::Outbound), &[e]);
        assert_eq!(result.wiring[dst].edges(Direction::Left, Flow::Inbound), &[e]);
        // pass-through slots are not classified
        assert_eq!(result.wiring.len(), 2);
    }

    #[test]
    fn vertical_edge_classified_up_and_down() {
        let d = design(&[("up", "a", "b")], &[("a", (2, 0)), ("b", (2, 2))]);
        let (result, _) = run(&d, RouterOptions::default());
        let e = edge_id(&d, "up");
        let routed = result.routed_edge(e).unwrap();
        assert_eq!(result.wiring[&routed.src_slot].edges(Direction::Up, Flow::Outbound), &[e]);
        assert_eq!(result.wiring[&routed.dst_slot].edges(Direction::Down, Flow::Inbound), &[e]);
    }

    #[test]
    fn crossings_group_by_pair() {
        let d = design(
            &[("long", "a", "c"), ("short", "b", "c")],
            &[("a", (0, 0)), ("b", (2, 0)), ("c", (4, 0))],
        );
        let (result, _) = run(&d, RouterOptions::default());
        let by_pair = result.crossings_by_pair();
        assert_eq!(by_pair.len(), 2);
        let long = edge_id(&d, "long");
        let short = edge_id(&d, "short");
        let counts: Vec<usize> = by_pair.values().map(Vec::len).collect();
        assert_eq!(counts, vec![1, 2]);
        let last = by_pair.values().last().unwrap();
        assert!(last.contains(&Crossing { edge: long, index: 1 }));
        assert!(last.contains(&Crossing { edge: short, index: 0 }));
    }

    #[test]
    fn boundary_crossings_follow_the_path() {
        let d = design(&[("diag", "a", "b")], &[("a", (0, 0)), ("b", (4, 2))]);
        let (result, _) = run(&d, RouterOptions::default());
        let routed = &result.routed[0];
        let crossings: Vec<(Crossing, &SlotPair)> = routed.boundary_crossings().collect();
        assert_eq!(crossings.len(), 3);
        for (i, (crossing, pair)) in crossings.iter().enumerate() {
            assert_eq!(crossing.index, i as u32);
            assert!(pair.contains(routed.slot_before(crossing.index).unwrap()));
        }
    }

    #[test]
    fn legacy_convention_applies() {
        let d = design(&[("ab", "a", "b")], &[("a", (0, 0)), ("b", (2, 0))]);
        let options = RouterOptions {
            convention: PipelineConvention::Legacy,
            grid_units_per_register: 4,
            threads: Some(1),
        };
        let (result, _) = run(&d, options);
        assert_eq!(result.routed[0].depth, PipelineDepth { level: 1, latency: 1 });
    }

    #[test]
    fn routing_is_deterministic() {
        let d = design(
            &[("e0", "a", "d"), ("e1", "b", "c"), ("e2", "c", "a"), ("e3", "d", "b")],
            &[("a", (0, 0)), ("b", (2, 2)), ("c", (4, 0)), ("d", (0, 4))],
        );
        let (first, _) = run(&d, RouterOptions::default());
        for _ in 0..4 {
            let (again, _) = run(&d, RouterOptions::default());
            assert_eq!(first.wiring, again.wiring);
            let a: Vec<_> = first.routed.iter().map(|r| (r.edge, r.intermediate.clone())).collect();
            let b: Vec<_> = again.routed.iter().map(|r| (r.edge, r.intermediate.clone())).collect();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn misaligned_assignment_is_fatal() {
        let d = design(&[("ab", "a", "b")], &[("a", (0, 0)), ("b", (3, 0))]);
        let assignment = PartitionAssignment::new(
            &d.graph,
            &d.interner,
            d.placement.iter().map(|&(v, (x, y))| {
                (v, Slot::from_coordinates(&d.board, x, y, x + 2, y + 2).unwrap())
            }),
        )
        .unwrap();
        let err = GlobalRouter::new(&d.board, RouterOptions::default())
            .route(&d.graph, &assignment, &d.interner, &DiagnosticSink::new())
            .unwrap_err();
        assert!(matches!(err, RouteError::UnreachablePath { .. }));
    }

    #[test]
    fn routed_edge_serializes() {
        let d = design(&[("ab", "a", "b")], &[("a", (0, 0)), ("b", (0, 2))]);
        let (result, _) = run(&d, RouterOptions::default());
        let json = serde_json::to_value(&result.routed[0]).unwrap();
        assert_eq!(json["manhattan"], 2);
        assert_eq!(json["depth"]["latency"], 2);
        assert_eq!(json["hops"].as_array().unwrap().len(), 1);
    }
}
