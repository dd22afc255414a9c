//! Remapping anchors of a die-crossing pair onto link registers.
//!
//! At a die boundary anchors do not stay on fabric sites. Every generic bin
//! is served by a block of link registers, and each register is wired to a
//! partner register `pair_row_offset` rows away on the other die. An anchor
//! takes a transmit or receive register depending on the direction its
//! signal crosses the boundary and on which die its bin lies. Two anchors
//! must never sit on partnered registers.

use crate::error::PlacementError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use tessera_common::{Interner, InternalError};
use tessera_device::{DieSide, LinkRegion, SiteCoord};
use tessera_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use tessera_floorplan::{Direction, Slot};
use tessera_graph::{DataflowGraph, EdgeId};
use tessera_route::{Crossing, Flow, RoutedEdge, SlotWiring};

const INTERFACE_MISMATCH: DiagnosticCode = DiagnosticCode::new(Category::Placement, 4);

/// Which end of a link wire a register is.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Polarity {
    /// Drives the link wire.
    Tx,
    /// Is driven by the link wire.
    Rx,
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarity::Tx => f.write_str("TX"),
            Polarity::Rx => f.write_str("RX"),
        }
    }
}

/// Which link registers anchors may end on.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub enum LinkPolarity {
    /// Transmit and receive registers, as the remap chooses.
    #[default]
    Mixed,
    /// Receive registers only; transmit picks move to their partner.
    RxOnly,
}

/// One link register.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct LinkSite {
    /// Link column.
    pub x: u32,
    /// Link row.
    pub y: u32,
    /// Register within the site.
    pub register: u32,
    /// Transmit or receive end.
    pub polarity: Polarity,
    /// Row of the partner register on the other die.
    pub partner_y: u32,
}

impl fmt::Display for LinkSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LINK_X{}Y{}/{}_REG{}", self.x, self.y, self.polarity, self.register)
    }
}

/// Register polarity for a signal travelling `direction` from a bin on `side`.
///
/// Upward signals leave the bottom die and arrive on the top die; downward
/// signals the reverse.
pub fn polarity(direction: Direction, side: DieSide) -> Polarity {
    match (direction, side) {
        (Direction::Up, DieSide::Bottom) | (Direction::Down, DieSide::Top) => Polarity::Tx,
        _ => Polarity::Rx,
    }
}

/// The direction an anchor's signal crosses the boundary below `upper`.
///
/// An edge the upper slot sends downwards goes `Down` and one it receives
/// from below goes `Up`. Edges the upper slot does not classify on its lower
/// side (pass-through or diagonal edges) fall back to the routed path: the
/// slot the edge occupies before the crossing tells which way it goes.
pub fn link_direction(key: Crossing, upper: &Slot, upper_wiring: Option<&SlotWiring>, routed: Option<&RoutedEdge>) -> Direction {
    if let Some(wiring) = upper_wiring {
        if wiring.edges(Direction::Down, Flow::Outbound).contains(&key.edge) {
            return Direction::Down;
        }
        if wiring.edges(Direction::Down, Flow::Inbound).contains(&key.edge) {
            return Direction::Up;
        }
    }
    match routed.and_then(|r| r.slot_before(key.index)) {
        Some(before) if before == upper => Direction::Down,
        _ => Direction::Up,
    }
}

/// Compares the upper slot's interface with the edges the router classified
/// for it and warns about any difference between the two sets.
///
/// Wires whose name contains one of `excluded` (clocks, memory-mapped
/// control) are expected to be missing from the classification. Returns the
/// interface wires without a routed direction; classified edges absent from
/// the interface are only reported.
pub fn cross_check_interface(
    upper: &Slot,
    wiring: Option<&SlotWiring>,
    interface: &[String],
    graph: &DataflowGraph,
    interner: &Interner,
    excluded: &[String],
    sink: &DiagnosticSink,
) -> Vec<String> {
    let classified: BTreeSet<&str> = wiring
        .map(|w| w.all_edges())
        .unwrap_or_default()
        .into_iter()
        .map(|e: EdgeId| interner.resolve(graph.edge(e).name))
        .collect();
    let leftovers: Vec<String> = interface
        .iter()
        .filter(|wire| !classified.contains(wire.as_str()))
        .filter(|wire| !excluded.iter().any(|x| wire.contains(x.as_str())))
        .cloned()
        .collect();
    if !leftovers.is_empty() {
        sink.emit(
            Diagnostic::warning(
                INTERFACE_MISMATCH,
                format!("{} interface wires have no routed direction", leftovers.len()),
            )
            .with_subject(upper.name())
            .with_note(format!("unclassified: {}", leftovers.join(", "))),
        );
    }

    let declared: BTreeSet<&str> = interface.iter().map(String::as_str).collect();
    let undeclared: Vec<&str> = classified.difference(&declared).copied().collect();
    if !undeclared.is_empty() {
        sink.emit(
            Diagnostic::warning(
                INTERFACE_MISMATCH,
                format!("{} routed edges are missing from the slot interface", undeclared.len()),
            )
            .with_subject(upper.name())
            .with_note(format!("undeclared: {}", undeclared.join(", "))),
        );
    }
    leftovers
}

/// Maps anchors onto link registers.
///
/// `bins[i]` is the bin origin chosen for anchor `i` and `directions[i]`
/// its crossing direction. Anchors sharing a bin form one block, in anchor
/// order: anchor `i` of the block takes register `i % wires` in row
/// `block_y + i / wires`. Top-die blocks use the first link column of the
/// pair and bottom-die blocks the second.
pub fn remap(link: &LinkRegion, bins: &[SiteCoord], directions: &[Direction]) -> Result<Vec<LinkSite>, PlacementError> {
    let mut blocks: BTreeMap<SiteCoord, Vec<usize>> = BTreeMap::new();
    for (anchor, &bin) in bins.iter().enumerate() {
        blocks.entry(bin).or_default().push(anchor);
    }

    let wires = link.wires_per_site.max(1);
    let mut sites: Vec<Option<LinkSite>> = vec![None; bins.len()];
    for (bin, members) in blocks {
        let block = link
            .block_of(bin)
            .ok_or_else(|| InternalError::new(format!("bin {bin} has no link block")))?;
        let side = link.side_of(bin);
        let x = match side {
            DieSide::Top => block.x,
            DieSide::Bottom => block.x + 1,
        };
        for (i, &anchor) in members.iter().enumerate() {
            let i = i as u32;
            let y = block.y + i / wires;
            sites[anchor] = Some(LinkSite {
                x,
                y,
                register: i % wires,
                polarity: polarity(directions[anchor], side),
                partner_y: link.paired_row(y),
            });
        }
    }
    sites
        .into_iter()
        .map(|s| s.ok_or_else(|| PlacementError::from(InternalError::new("anchor without link register"))))
        .collect()
}

/// Moves every transmit pick to the receive register it is wired to.
pub fn move_tx_to_rx(link: &LinkRegion, sites: &mut [LinkSite]) {
    for site in sites.iter_mut().filter(|s| s.polarity == Polarity::Tx) {
        site.y = site.partner_y;
        site.partner_y = link.paired_row(site.y);
        site.polarity = Polarity::Rx;
    }
}

/// Checks that no two anchors share a register and that no register's
/// partner, `pair_row_offset` rows up or down, is occupied.
///
/// # Errors
///
/// [`PlacementError::LinkPairingConflict`] naming the first colliding pair.
pub fn check_pairing(pair: &str, link: &LinkRegion, sites: &[LinkSite]) -> Result<(), PlacementError> {
    let conflict = |a: &LinkSite, b: &LinkSite| PlacementError::LinkPairingConflict {
        pair: pair.to_string(),
        first: a.to_string(),
        second: b.to_string(),
    };

    let mut occupied: HashMap<(u32, u32, u32), &LinkSite> = HashMap::new();
    for site in sites {
        if let Some(prev) = occupied.insert((site.x, site.y, site.register), site) {
            return Err(conflict(prev, site));
        }
    }
    let offset = link.pair_row_offset;
    for site in sites {
        let partners = [site.y.checked_add(offset), site.y.checked_sub(offset)];
        for y in partners.into_iter().flatten() {
            if let Some(other) = occupied.get(&(site.x, y, site.register)) {
                return Err(conflict(site, other));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_device::LinkColumn;

    /// Generic rows 4..12, boundary at 8, link rows 0..16.
    fn link() -> LinkRegion {
        LinkRegion {
            boundary_y: 8,
            generic_base_y: 4,
            link_base_y: 0,
            rows_per_site_row: 2,
            pair_row_offset: 8,
            wires_per_site: 6,
            columns: vec![
                LinkColumn { generic_x: 1, link_x: 0 },
                LinkColumn { generic_x: 5, link_x: 2 },
            ],
        }
    }

    #[test]
    fn polarity_table() {
        assert_eq!(polarity(Direction::Up, DieSide::Bottom), Polarity::Tx);
        assert_eq!(polarity(Direction::Up, DieSide::Top), Polarity::Rx);
        assert_eq!(polarity(Direction::Down, DieSide::Bottom), Polarity::Rx);
        assert_eq!(polarity(Direction::Down, DieSide::Top), Polarity::Tx);
    }

    #[test]
    fn block_fills_row_by_row() {
        let bins = vec![SiteCoord::new(1, 5); 8];
        let sites = remap(&link(), &bins, &[Direction::Up; 8]).unwrap();
        // bottom die: second column of the pair, block at link row 2
        assert!(sites.iter().all(|s| s.x == 1 && s.polarity == Polarity::Tx));
        assert_eq!((sites[0].y, sites[0].register), (2, 0));
        assert_eq!((sites[5].y, sites[5].register), (2, 5));
        assert_eq!((sites[6].y, sites[6].register), (3, 0));
        assert_eq!(sites[6].partner_y, 11);
        check_pairing("p", &link(), &sites).unwrap();
    }

    #[test]
    fn consistent_blocks_never_conflict() {
        let link = link();
        let mut bins = Vec::new();
        let mut dirs = Vec::new();
        for y in 4..12 {
            for x in [1, 5] {
                for k in 0..12 {
                    bins.push(SiteCoord::new(x, y));
                    dirs.push(if k % 3 == 0 { Direction::Down } else { Direction::Up });
                }
            }
        }
        let mut sites = remap(&link, &bins, &dirs).unwrap();
        check_pairing("p", &link, &sites).unwrap();
        move_tx_to_rx(&link, &mut sites);
        assert!(sites.iter().all(|s| s.polarity == Polarity::Rx));
        check_pairing("p", &link, &sites).unwrap();
    }

    #[test]
    fn partnered_registers_conflict() {
        let link = link();
        let a = LinkSite { x: 0, y: 3, register: 2, polarity: Polarity::Tx, partner_y: 11 };
        let b = LinkSite { x: 0, y: 11, register: 2, polarity: Polarity::Rx, partner_y: 3 };
        let err = check_pairing("p", &link, &[a, b]).unwrap_err();
        assert!(err.is_fatal());
        match err {
            PlacementError::LinkPairingConflict { first, second, .. } => {
                assert_eq!(first, "LINK_X0Y3/TX_REG2");
                assert_eq!(second, "LINK_X0Y11/RX_REG2");
            }
            other => panic!("unexpected {other:?}"),
        }
        let c = LinkSite { register: 3, ..b };
        check_pairing("p", &link, &[a, c]).unwrap();
    }

    #[test]
    fn overfull_block_collides_with_next_row() {
        // 13 anchors in generic row 4 spill into the block of row 5
        let link = link();
        let mut bins = vec![SiteCoord::new(1, 4); 13];
        bins.push(SiteCoord::new(1, 5));
        let sites = remap(&link, &bins, &[Direction::Up; 14]).unwrap();
        let err = check_pairing("p", &link, &sites).unwrap_err();
        assert!(matches!(err, PlacementError::LinkPairingConflict { .. }));
    }

    #[test]
    fn rx_only_moves_across_boundary() {
        let link = link();
        let mut sites = remap(&link, &[SiteCoord::new(5, 9), SiteCoord::new(5, 9)], &[Direction::Down, Direction::Up])
            .unwrap();
        assert_eq!(sites[0].polarity, Polarity::Tx);
        assert_eq!((sites[0].x, sites[0].y), (2, 10));
        move_tx_to_rx(&link, &mut sites);
        assert_eq!(sites[0].y, 2);
        assert_eq!(sites[0].partner_y, 10);
        assert_eq!(sites[1].polarity, Polarity::Rx);
        assert_eq!(sites[1].y, 10);
    }

    #[test]
    fn unserved_bin_is_internal_error() {
        let err = remap(&link(), &[SiteCoord::new(3, 5)], &[Direction::Up]).unwrap_err();
        assert!(matches!(err, PlacementError::Internal(_)));
    }

    mod routed {
        use super::*;
        use tessera_device::{ResourceVector, UniformBoard, UniformBoardParams};
        use tessera_floorplan::SlotPair;
        use tessera_graph::ArenaId;
        use tessera_route::PipelineDepth;

        fn board() -> UniformBoard {
            UniformBoard::new(UniformBoardParams::default()).unwrap()
        }

        fn slot(x: u32, y: u32) -> Slot {
            Slot::from_coordinates(&board(), x, y, x + 2, y + 2).unwrap()
        }

        fn routed(edge: EdgeId, path: &[Slot]) -> RoutedEdge {
            let hops = path
                .windows(2)
                .map(|w| SlotPair::new(w[0].clone(), w[1].clone()).unwrap())
                .collect();
            RoutedEdge {
                edge,
                src_slot: path[0].clone(),
                dst_slot: path[path.len() - 1].clone(),
                intermediate: path[1..path.len() - 1].to_vec(),
                manhattan: 0,
                depth: PipelineDepth { level: 0, latency: 1 },
                hops,
            }
        }

        #[test]
        fn wiring_decides_direction() {
            let upper = slot(0, 4);
            let e = EdgeId::from_raw(3);
            let mut wiring = SlotWiring::default();
            wiring.push(Direction::Down, Flow::Outbound, e);
            let key = Crossing { edge: e, index: 0 };
            assert_eq!(link_direction(key, &upper, Some(&wiring), None), Direction::Down);

            let mut wiring = SlotWiring::default();
            wiring.push(Direction::Down, Flow::Inbound, e);
            assert_eq!(link_direction(key, &upper, Some(&wiring), None), Direction::Up);
        }

        #[test]
        fn pass_through_uses_path() {
            let e = EdgeId::from_raw(0);
            let down = routed(e, &[slot(0, 6), slot(0, 4), slot(0, 2)]);
            let key = Crossing { edge: e, index: 1 };
            assert_eq!(link_direction(key, &slot(0, 4), None, Some(&down)), Direction::Down);

            let up = routed(e, &[slot(0, 2), slot(0, 4), slot(0, 6)]);
            let key = Crossing { edge: e, index: 0 };
            assert_eq!(link_direction(key, &slot(0, 4), None, Some(&up)), Direction::Up);
        }

        #[test]
        fn interface_leftovers_warn() {
            let interner = Interner::new();
            let mut graph = DataflowGraph::new();
            graph.add_vertex(&interner, "a", ResourceVector::default()).unwrap();
            graph.add_vertex(&interner, "b", ResourceVector::default()).unwrap();
            let e = graph.add_edge_by_name(&interner, "data_0", "a", "b", 32, 2).unwrap();
            let mut wiring = SlotWiring::default();
            wiring.push(Direction::Down, Flow::Outbound, e);
            let excluded = vec!["clk".to_string(), "_axi_".to_string()];
            let upper = slot(0, 4);

            let clean: Vec<String> = ["data_0", "ap_clk", "m_axi_gmem_AWADDR"].map(String::from).to_vec();
            let sink = DiagnosticSink::new();
            assert!(cross_check_interface(&upper, Some(&wiring), &clean, &graph, &interner, &excluded, &sink)
                .is_empty());
            assert!(sink.diagnostics().is_empty());

            let stray: Vec<String> = ["data_0", "data_1"].map(String::from).to_vec();
            let left = cross_check_interface(&upper, Some(&wiring), &stray, &graph, &interner, &excluded, &sink);
            assert_eq!(left, vec!["data_1".to_string()]);
            assert_eq!(sink.diagnostics().len(), 1);
            assert!(!sink.has_errors());
        }

        #[test]
        fn undeclared_routed_edge_warns() {
            let interner = Interner::new();
            let mut graph = DataflowGraph::new();
            graph.add_vertex(&interner, "a", ResourceVector::default()).unwrap();
            graph.add_vertex(&interner, "b", ResourceVector::default()).unwrap();
            let e = graph.add_edge_by_name(&interner, "data_0", "a", "b", 32, 2).unwrap();
            let mut wiring = SlotWiring::default();
            wiring.push(Direction::Up, Flow::Inbound, e);

            let interface: Vec<String> = vec!["ap_clk".to_string()];
            let excluded = vec!["clk".to_string()];
            let sink = DiagnosticSink::new();
            let left =
                cross_check_interface(&slot(0, 4), Some(&wiring), &interface, &graph, &interner, &excluded, &sink);
            assert!(left.is_empty());
            let diags = sink.diagnostics();
            assert_eq!(diags.len(), 1);
            assert!(diags[0].message.contains("missing from the slot interface"));
            assert!(diags[0].notes[0].contains("data_0"));
            assert!(!sink.has_errors());
        }
    }
}
