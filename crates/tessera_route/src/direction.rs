//! Direction classification and the per-slot wiring map.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tessera_floorplan::Direction;
use tessera_graph::EdgeId;

/// Whether an edge leaves or enters a slot.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Flow {
    /// The slot holds the edge's source.
    Outbound,
    /// The slot holds the edge's destination.
    Inbound,
}

/// Direction from a slot with centroid `from` towards one with centroid `to`.
///
/// Horizontal displacement dominates: any non-zero `dx` yields `Left` or
/// `Right` regardless of `dy`.
pub fn classify(from: (u32, u32), to: (u32, u32)) -> Direction {
    let dx = i64::from(to.0) - i64::from(from.0);
    let dy = i64::from(to.1) - i64::from(from.1);
    classify_delta(dx, dy)
}

/// [`classify`] on a raw displacement.
pub fn classify_delta(dx: i64, dy: i64) -> Direction {
    if dx == 0 {
        if dy > 0 {
            Direction::Up
        } else {
            Direction::Down
        }
    } else if dx > 0 {
        Direction::Right
    } else {
        Direction::Left
    }
}

/// Edges crossing each side of one slot, split by flow.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotWiring {
    lists: BTreeMap<(Direction, Flow), Vec<EdgeId>>,
}

impl SlotWiring {
    /// Records an edge on one side.
    pub fn push(&mut self, side: Direction, flow: Flow, edge: EdgeId) {
        self.lists.entry((side, flow)).or_default().push(edge);
    }

    /// Edges on one side with the given flow, in ID order once finalized.
    pub fn edges(&self, side: Direction, flow: Flow) -> &[EdgeId] {
        self.lists
            .get(&(side, flow))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every classified edge of the slot.
    pub fn all_edges(&self) -> BTreeSet<EdgeId> {
        self.lists.values().flatten().copied().collect()
    }

    /// Non-empty `(side, flow)` lists.
    pub fn iter(&self) -> impl Iterator<Item = (Direction, Flow, &[EdgeId])> {
        self.lists
            .iter()
            .map(|(&(side, flow), edges)| (side, flow, edges.as_slice()))
    }

    /// Merges another partial map for the same slot.
    pub fn merge(&mut self, other: SlotWiring) {
        for (key, edges) in other.lists {
            self.lists.entry(key).or_default().extend(edges);
        }
    }

    /// Sorts and deduplicates every list.
    pub fn finalize(&mut self) {
        for edges in self.lists.values_mut() {
            edges.sort();
            edges.dedup();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_graph::ArenaId;

    #[test]
    fn classification_examples() {
        assert_eq!(classify_delta(0, 5), Direction::Up);
        assert_eq!(classify_delta(3, -2), Direction::Right);
        assert_eq!(classify_delta(-3, 0), Direction::Left);
        assert_eq!(classify_delta(0, -1), Direction::Down);
        assert_eq!(classify_delta(-1, 7), Direction::Left);
    }

    #[test]
    fn classification_is_total_and_antisymmetric_on_axes() {
        for dx in -4i64..=4 {
            for dy in -4i64..=4 {
                let d = classify_delta(dx, dy);
                assert_eq!(d, classify_delta(dx, dy));
                if (dx == 0) != (dy == 0) {
                    assert_eq!(classify_delta(-dx, -dy), d.opposite());
                }
            }
        }
    }

    #[test]
    fn classify_from_centroids() {
        assert_eq!(classify((1, 1), (1, 3)), Direction::Up);
        assert_eq!(classify((3, 1), (1, 5)), Direction::Left);
    }

    #[test]
    fn wiring_merge_and_finalize() {
        let e = EdgeId::from_raw;
        let mut a = SlotWiring::default();
        a.push(Direction::Up, Flow::Outbound, e(4));
        let mut b = SlotWiring::default();
        b.push(Direction::Up, Flow::Outbound, e(1));
        b.push(Direction::Up, Flow::Outbound, e(4));
        b.push(Direction::Left, Flow::Inbound, e(2));
        a.merge(b);
        a.finalize();
        assert_eq!(a.edges(Direction::Up, Flow::Outbound), &[e(1), e(4)]);
        assert_eq!(a.edges(Direction::Left, Flow::Inbound), &[e(2)]);
        assert!(a.edges(Direction::Down, Flow::Inbound).is_empty());
        assert_eq!(a.all_edges().len(), 3);
    }
}
