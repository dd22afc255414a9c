//! Anchors and the connection reports they are built from.
//!
//! An anchor is the pipeline register an edge gets at one slot boundary.
//! After each slot has been placed on its own, the placement of the slot
//! reports, for every anchor it touches, the logic cells wired to it. The
//! anchors of a pair are collected from the router's crossings and the
//! reports of both slots.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tessera_common::Interner;
use tessera_device::SiteCoord;
use tessera_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use tessera_floorplan::{Slot, SlotPair};
use tessera_graph::DataflowGraph;
use tessera_route::Crossing;

const MISSING_FROM_REPORT: DiagnosticCode = DiagnosticCode::new(Category::Placement, 2);
const NO_CONNECTIONS: DiagnosticCode = DiagnosticCode::new(Category::Placement, 3);

/// Whether a connected cell drives the anchor or is driven by it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionRole {
    /// The cell drives the anchor.
    Source,
    /// The anchor drives the cell.
    Sink,
}

/// One logic cell connected to an anchor.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct ConnectionRecord {
    /// Direction of the connection.
    pub role: ConnectionRole,
    /// Physical site of the cell.
    pub site: SiteCoord,
    /// Combinational cells between the anchor and the endpoint.
    #[serde(default)]
    pub logic_hops: u32,
}

/// Connections of every anchor touching one slot, keyed by anchor name.
pub type ConnectionReport = BTreeMap<String, Vec<ConnectionRecord>>;

/// One pipeline register at a slot boundary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    /// The edge and crossing the register belongs to.
    pub key: Crossing,
    /// Register name, `{edge}_q{index}`.
    pub name: String,
    /// Bit width of the edge.
    pub width: u32,
    /// Cells wired to the register on either side of the boundary.
    pub connections: Vec<ConnectionRecord>,
}

/// Name of the register placed at crossing `index` of `edge`.
pub fn anchor_name(edge: &str, index: u32) -> String {
    format!("{edge}_q{index}")
}

/// Builds the anchors of one slot pair.
///
/// Connections from both slots' reports are concatenated. An anchor missing
/// from either report is kept with whatever the other side knows, and a
/// warning is emitted.
pub fn collect_anchors(
    pair: &SlotPair,
    crossings: &[Crossing],
    graph: &DataflowGraph,
    interner: &Interner,
    reports: &BTreeMap<Slot, ConnectionReport>,
    sink: &DiagnosticSink,
) -> Vec<Anchor> {
    let mut keys = crossings.to_vec();
    keys.sort();
    keys.dedup();

    let (a, b) = pair.slots();
    keys.into_iter()
        .map(|key| {
            let edge = graph.edge(key.edge);
            let name = anchor_name(interner.resolve(edge.name), key.index);
            let mut connections = Vec::new();
            for slot in [a, b] {
                match reports.get(slot).and_then(|r| r.get(&name)) {
                    Some(records) => connections.extend_from_slice(records),
                    None => sink.emit(
                        Diagnostic::warning(
                            MISSING_FROM_REPORT,
                            format!("anchor '{name}' not found in the connection report of {}", slot.name()),
                        )
                        .with_subject(pair.name()),
                    ),
                }
            }
            if connections.is_empty() {
                sink.emit(
                    Diagnostic::warning(NO_CONNECTIONS, format!("anchor '{name}' has no known connections"))
                        .with_subject(pair.name())
                        .with_note("every bin is equally good for it"),
                );
            }
            Anchor {
                key,
                name,
                width: edge.width,
                connections,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_device::{ResourceVector, UniformBoard, UniformBoardParams};

    fn record(role: ConnectionRole, x: u32, y: u32) -> ConnectionRecord {
        ConnectionRecord {
            role,
            site: SiteCoord::new(x, y),
            logic_hops: 0,
        }
    }

    struct Fixture {
        pair: SlotPair,
        graph: DataflowGraph,
        interner: Interner,
        crossing: Crossing,
    }

    fn fixture() -> Fixture {
        let board = UniformBoard::new(UniformBoardParams::default()).unwrap();
        let left = Slot::from_coordinates(&board, 0, 0, 2, 2).unwrap();
        let right = Slot::from_coordinates(&board, 2, 0, 4, 2).unwrap();
        let interner = Interner::new();
        let mut graph = DataflowGraph::new();
        graph.add_vertex(&interner, "prod", ResourceVector::default()).unwrap();
        graph.add_vertex(&interner, "cons", ResourceVector::default()).unwrap();
        let edge = graph.add_edge_by_name(&interner, "fifo_0", "prod", "cons", 64, 2).unwrap();
        Fixture {
            pair: SlotPair::new(left, right).unwrap(),
            graph,
            interner,
            crossing: Crossing { edge, index: 0 },
        }
    }

    #[test]
    fn merges_both_reports() {
        let f = fixture();
        let (a, b) = f.pair.slots();
        let mut reports = BTreeMap::new();
        reports.insert(
            a.clone(),
            ConnectionReport::from([("fifo_0_q0".to_string(), vec![record(ConnectionRole::Source, 50, 10)])]),
        );
        reports.insert(
            b.clone(),
            ConnectionReport::from([("fifo_0_q0".to_string(), vec![record(ConnectionRole::Sink, 70, 12)])]),
        );
        let sink = DiagnosticSink::new();
        let anchors = collect_anchors(&f.pair, &[f.crossing], &f.graph, &f.interner, &reports, &sink);
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].name, "fifo_0_q0");
        assert_eq!(anchors[0].width, 64);
        assert_eq!(anchors[0].connections.len(), 2);
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn missing_side_warns() {
        let f = fixture();
        let (a, _) = f.pair.slots();
        let mut reports = BTreeMap::new();
        reports.insert(
            a.clone(),
            ConnectionReport::from([("fifo_0_q0".to_string(), vec![record(ConnectionRole::Source, 50, 10)])]),
        );
        let sink = DiagnosticSink::new();
        let anchors = collect_anchors(&f.pair, &[f.crossing], &f.graph, &f.interner, &reports, &sink);
        assert_eq!(anchors[0].connections.len(), 1);
        let diags = sink.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, MISSING_FROM_REPORT);
        assert!(!sink.has_errors());
    }

    #[test]
    fn unreported_anchor_still_collected() {
        let f = fixture();
        let sink = DiagnosticSink::new();
        let anchors = collect_anchors(
            &f.pair,
            &[f.crossing, f.crossing],
            &f.graph,
            &f.interner,
            &BTreeMap::new(),
            &sink,
        );
        assert_eq!(anchors.len(), 1);
        assert!(anchors[0].connections.is_empty());
        assert_eq!(sink.diagnostics().len(), 3);
    }

    #[test]
    fn record_json_defaults_hops() {
        let r: ConnectionRecord =
            serde_json::from_str(r#"{"role":"sink","site":{"x":3,"y":4}}"#).unwrap();
        assert_eq!(r, record(ConnectionRole::Sink, 3, 4));
    }
}
