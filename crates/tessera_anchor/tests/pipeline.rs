//! Route and place a small four-slot design on the default uniform board.

use std::collections::BTreeMap;
use tessera_anchor::{
    anchor_name, AnchorPlacer, ConnectionRecord, ConnectionReport, ConnectionRole, PlacementInputs, PlacementSite,
    PlacerOptions, Polarity,
};
use tessera_common::Interner;
use tessera_device::{load_board, ResourceVector, SiteCoord, UniformBoardParams};
use tessera_diagnostics::DiagnosticSink;
use tessera_floorplan::{PartitionAssignment, Slot, SlotManager};
use tessera_graph::DataflowGraph;
use tessera_route::{GlobalRouter, RouterOptions, RoutingResult};

const CHANNELS: usize = 3;

fn center(slot: &Slot, params: &UniformBoardParams) -> SiteCoord {
    let r = slot.rect();
    SiteCoord::new(
        (r.x0 + r.x1) * params.sites_per_region_x / 2,
        (r.y0 + r.y1) * params.sites_per_region_y / 2,
    )
}

/// Every anchor connects to the centre of both slots it sits between.
fn reports(
    routing: &RoutingResult,
    graph: &DataflowGraph,
    interner: &Interner,
    params: &UniformBoardParams,
) -> BTreeMap<Slot, ConnectionReport> {
    let mut reports: BTreeMap<Slot, ConnectionReport> = BTreeMap::new();
    for (pair, crossings) in routing.crossings_by_pair() {
        for crossing in crossings {
            let routed = routing.routed_edge(crossing.edge).unwrap();
            let before = routed.slot_before(crossing.index).unwrap();
            let name = anchor_name(interner.resolve(graph.edge(crossing.edge).name), crossing.index);
            let (a, b) = pair.slots();
            for slot in [a, b] {
                let role = if slot == before { ConnectionRole::Source } else { ConnectionRole::Sink };
                reports.entry(slot.clone()).or_default().entry(name.clone()).or_default().push(
                    ConnectionRecord {
                        role,
                        site: center(slot, params),
                        logic_hops: 1,
                    },
                );
            }
        }
    }
    reports
}

#[test]
fn four_slot_design_places_every_anchor() {
    let params = UniformBoardParams::default();
    let board = load_board("uniform", params.clone()).unwrap();
    let mut manager = SlotManager::new(&*board);
    let a = manager.get_by_pblock("CLOCKREGION_X0Y2:CLOCKREGION_X1Y3").unwrap();
    let b = manager.get_by_pblock("CLOCKREGION_X2Y2:CLOCKREGION_X3Y3").unwrap();
    let c = manager.get_by_pblock("CLOCKREGION_X0Y4:CLOCKREGION_X1Y5").unwrap();
    let d = manager.get_by_pblock("CLOCKREGION_X2Y4:CLOCKREGION_X3Y5").unwrap();

    let interner = Interner::new();
    let mut graph = DataflowGraph::new();
    let mut entries = Vec::new();
    for (name, slot) in [("a", &a), ("b", &b), ("c", &c), ("d", &d)] {
        let v = graph
            .add_vertex(&interner, name, ResourceVector { lut: 1000, ..Default::default() })
            .unwrap();
        entries.push((v, slot.clone()));
    }
    let links = [("a", "b"), ("a", "c"), ("b", "c"), ("d", "a"), ("b", "d")];
    for (src, dst) in links {
        for i in 0..CHANNELS {
            graph
                .add_edge_by_name(&interner, &format!("{src}_{dst}_{i}"), src, dst, 32, 16)
                .unwrap();
        }
    }
    let assignment = PartitionAssignment::new(&graph, &interner, entries).unwrap();

    let sink = DiagnosticSink::new();
    let routing = GlobalRouter::new(&*board, RouterOptions::default())
        .route(&graph, &assignment, &interner, &sink)
        .unwrap();
    assert_eq!(routing.routed.len(), links.len() * CHANNELS);
    let crossings: usize = routing.routed.iter().map(|r| r.hops.len()).sum();
    // b->c and d->a each pass through one slot
    assert_eq!(crossings, (links.len() + 2) * CHANNELS);

    let inputs = PlacementInputs {
        connections: reports(&routing, &graph, &interner, &params),
        interfaces: BTreeMap::new(),
    };
    let placer = AnchorPlacer::new(&*board, PlacerOptions::default());
    let report = placer
        .place_all(&routing, &graph, &interner, &inputs, &sink)
        .unwrap();

    assert!(report.is_complete(), "{:?}", report.failures);
    assert!(!sink.has_errors());
    assert_eq!(report.anchors().count(), crossings);

    for pair in &report.pairs {
        let (s, t) = pair.pair.slots();
        assert_eq!(pair.die_crossing, board.is_die_crossing(&s.rect(), &t.rect()));
        for anchor in &pair.anchors {
            let on_link = matches!(anchor.site, PlacementSite::Link(_));
            assert_eq!(on_link, pair.die_crossing, "{}", anchor.name);
        }
    }

    // d -> c -> a passes down through c: transmit on top, receive below
    for i in 0..CHANNELS {
        let name = format!("d_a_{i}_q1");
        let placed = report.anchors().find(|p| p.name == name).unwrap();
        let PlacementSite::Link(link) = placed.site else {
            panic!("{name} not on a link register");
        };
        let top = placed.bin.y >= 4 * params.sites_per_region_y;
        assert_eq!(link.polarity, if top { Polarity::Tx } else { Polarity::Rx });
    }

    // b -> d goes up across the die boundary
    for i in 0..CHANNELS {
        let placed = report
            .anchors()
            .find(|p| p.name == format!("b_d_{i}_q0"))
            .unwrap();
        let PlacementSite::Link(link) = placed.site else {
            panic!("b_d_{i}_q0 not on a link register");
        };
        let top = placed.bin.y >= 4 * params.sites_per_region_y;
        assert_eq!(link.polarity, if top { Polarity::Rx } else { Polarity::Tx });
    }
}
