//! The JSON design bundle read by `route` and `place`, and the JSON results
//! they write.
//!
//! A bundle names vertices and edges, maps every vertex to a pblock, and
//! optionally carries per-slot connection reports and interface wire lists
//! produced by the single-slot placements. Slots are keyed by pblock
//! (`CLOCKREGION_X0Y0:CLOCKREGION_X1Y3`) or slot name (`CR_X0Y0_To_CR_X1Y3`).

use std::collections::BTreeMap;
use std::error::Error;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tessera_anchor::{ConnectionReport, PlacementInputs, PlacementReport, PlacementSite};
use tessera_common::Interner;
use tessera_device::{BoardTopology, ResourceVector};
use tessera_floorplan::{Direction, PartitionAssignment, SlotManager};
use tessera_graph::{DataflowGraph, EdgeId};
use tessera_route::{Flow, RoutingResult};

fn default_depth() -> u32 {
    2
}

/// One vertex of the bundle.
#[derive(Debug, Clone, Deserialize)]
pub struct VertexEntry {
    /// Unique vertex name.
    pub name: String,
    /// Resources the vertex occupies.
    #[serde(default)]
    pub resources: ResourceVector,
}

/// One FIFO edge of the bundle.
#[derive(Debug, Clone, Deserialize)]
pub struct EdgeEntry {
    /// Unique edge name.
    pub name: String,
    /// Producer vertex.
    pub src: String,
    /// Consumer vertex.
    pub dst: String,
    /// Data width in bits.
    pub width: u32,
    /// FIFO depth.
    #[serde(default = "default_depth")]
    pub depth: u32,
}

/// A design as read from disk.
#[derive(Debug, Deserialize)]
pub struct DesignBundle {
    /// Vertices of the dataflow graph.
    pub vertices: Vec<VertexEntry>,
    /// Edges of the dataflow graph.
    pub edges: Vec<EdgeEntry>,
    /// Vertex name to pblock.
    pub floorplan: BTreeMap<String, String>,
    /// Per-slot anchor connection reports.
    #[serde(default)]
    pub connections: BTreeMap<String, ConnectionReport>,
    /// Per-slot interface wire names.
    #[serde(default)]
    pub interfaces: BTreeMap<String, Vec<String>>,
}

/// A bundle turned into the backend's own types.
pub struct LoadedDesign {
    /// Interner owning every vertex and edge name.
    pub interner: Interner,
    /// The dataflow graph.
    pub graph: DataflowGraph,
    /// Vertex to slot mapping.
    pub assignment: PartitionAssignment,
    /// Connection reports and interfaces keyed by slot.
    pub inputs: PlacementInputs,
}

impl DesignBundle {
    /// Reads and parses a bundle file.
    pub fn read(path: &Path) -> Result<Self, Box<dyn Error>> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read design bundle {}: {e}", path.display()))?;
        Self::parse(&content).map_err(|e| format!("{}: {e}", path.display()).into())
    }

    /// Parses a bundle from JSON text.
    pub fn parse(content: &str) -> Result<Self, Box<dyn Error>> {
        Ok(serde_json::from_str(content)?)
    }

    /// Builds the graph, the assignment, and the placement inputs.
    ///
    /// Fails on duplicate or dangling names, malformed pblocks, and
    /// incomplete or overlapping floorplans.
    pub fn load(&self, board: &dyn BoardTopology) -> Result<LoadedDesign, Box<dyn Error>> {
        let interner = Interner::new();
        let mut graph = DataflowGraph::new();
        for vertex in &self.vertices {
            graph.add_vertex(&interner, &vertex.name, vertex.resources)?;
        }
        for edge in &self.edges {
            graph.add_edge_by_name(&interner, &edge.name, &edge.src, &edge.dst, edge.width, edge.depth)?;
        }

        let mut slots = SlotManager::new(board);
        let mut entries = Vec::with_capacity(self.floorplan.len());
        for (vertex, pblock) in &self.floorplan {
            let id = interner
                .get(vertex)
                .and_then(|ident| graph.vertex_by_name(ident))
                .ok_or_else(|| format!("floorplan places unknown vertex '{vertex}'"))?;
            entries.push((id, slots.get_by_pblock(pblock)?));
        }
        let assignment = PartitionAssignment::new(&graph, &interner, entries)?;

        let mut inputs = PlacementInputs::default();
        for (pblock, report) in &self.connections {
            inputs.connections.insert(slots.get_by_pblock(pblock)?, report.clone());
        }
        for (pblock, wires) in &self.interfaces {
            inputs.interfaces.insert(slots.get_by_pblock(pblock)?, wires.clone());
        }

        Ok(LoadedDesign {
            interner,
            graph,
            assignment,
            inputs,
        })
    }
}

/// A routed edge as written out.
#[derive(Debug, Serialize)]
pub struct RoutedEdgeRecord {
    /// Edge name.
    pub name: String,
    /// Slot names from source to destination.
    pub path: Vec<String>,
    /// Slot boundaries crossed.
    pub manhattan: u32,
    /// Pipeline level.
    pub level: u32,
    /// Edge latency.
    pub latency: u32,
}

/// Edges leaving or entering one side of a slot.
#[derive(Debug, Serialize)]
pub struct WiringRecord {
    /// Side of the slot.
    pub side: Direction,
    /// Outbound or inbound.
    pub flow: Flow,
    /// Edge names.
    pub edges: Vec<String>,
}

/// Result of `tessera route`.
#[derive(Debug, Serialize)]
pub struct RouteOutput {
    /// Every inter-slot edge in edge order.
    pub edges: Vec<RoutedEdgeRecord>,
    /// Direction map keyed by slot name.
    pub wiring: BTreeMap<String, Vec<WiringRecord>>,
}

impl RouteOutput {
    /// Flattens a routing result into named records.
    pub fn new(routing: &RoutingResult, graph: &DataflowGraph, interner: &Interner) -> Self {
        let edge_name = |id: EdgeId| interner.resolve(graph.edge(id).name).to_string();
        let edges = routing
            .routed
            .iter()
            .map(|routed| RoutedEdgeRecord {
                name: edge_name(routed.edge),
                path: routed.path().map(|slot| slot.name()).collect(),
                manhattan: routed.manhattan,
                level: routed.depth.level,
                latency: routed.depth.latency,
            })
            .collect();
        let wiring = routing
            .wiring
            .iter()
            .map(|(slot, wiring)| {
                let records = wiring
                    .iter()
                    .map(|(side, flow, ids)| WiringRecord {
                        side,
                        flow,
                        edges: ids.iter().map(|&id| edge_name(id)).collect(),
                    })
                    .collect();
                (slot.name(), records)
            })
            .collect();
        Self { edges, wiring }
    }
}

/// One placed anchor as written out.
#[derive(Debug, Serialize)]
pub struct AnchorRecord {
    /// Register name.
    pub name: String,
    /// Site name, `SITE_X..Y..` or a link register.
    pub site: String,
    /// Structured form of the site.
    pub placement: PlacementSite,
    /// Cost of the chosen bin.
    pub cost: f64,
    /// Bins cheaper than the chosen one.
    pub rank: usize,
}

/// One placed slot pair.
#[derive(Debug, Serialize)]
pub struct PairRecord {
    /// Pair name.
    pub pair: String,
    /// Whether the boundary crosses dies.
    pub die_crossing: bool,
    /// Anchor density of the buffer.
    pub density: f64,
    /// Mean rank over the pair's anchors.
    pub average_rank: f64,
    /// Summed cost of the pair's anchors.
    pub total_cost: f64,
    /// Placed anchors.
    pub anchors: Vec<AnchorRecord>,
}

/// One pair that could not be placed.
#[derive(Debug, Serialize)]
pub struct FailureRecord {
    /// Pair name.
    pub pair: String,
    /// Failure message.
    pub error: String,
    /// Whether the failure invalidates the run.
    pub fatal: bool,
}

/// Result of `tessera place`.
#[derive(Debug, Serialize)]
pub struct PlaceOutput {
    /// Whether every pair was placed.
    pub complete: bool,
    /// The routing the placement is based on.
    pub routing: RouteOutput,
    /// Placed pairs.
    pub pairs: Vec<PairRecord>,
    /// Failed pairs.
    pub failures: Vec<FailureRecord>,
}

impl PlaceOutput {
    /// Flattens a routing result and a placement report.
    pub fn new(routing: RouteOutput, report: &PlacementReport) -> Self {
        let pairs = report
            .pairs
            .iter()
            .map(|pair| PairRecord {
                pair: pair.pair.name(),
                die_crossing: pair.die_crossing,
                density: pair.budget.density,
                average_rank: pair.quality.average_rank,
                total_cost: pair.quality.total_cost,
                anchors: pair
                    .anchors
                    .iter()
                    .map(|a| AnchorRecord {
                        name: a.name.clone(),
                        site: a.site.to_string(),
                        placement: a.site,
                        cost: a.quality.chosen_cost,
                        rank: a.quality.rank,
                    })
                    .collect(),
            })
            .collect();
        let failures = report
            .failures
            .iter()
            .map(|f| FailureRecord {
                pair: f.pair.name(),
                error: f.error.to_string(),
                fatal: f.error.is_fatal(),
            })
            .collect();
        Self {
            complete: report.is_complete(),
            routing,
            pairs,
            failures,
        }
    }
}
