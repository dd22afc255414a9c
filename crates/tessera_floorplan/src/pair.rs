//! Unordered pairs of adjacent slots.

use crate::error::FloorplanError;
use crate::slot::Slot;
use serde::{Deserialize, Serialize};
use std::fmt;
use tessera_device::Axis;

/// Two slots sharing a boundary, stored in canonical order.
///
/// `SlotPair::new(a, b)` and `SlotPair::new(b, a)` produce equal values.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotPair {
    first: Slot,
    second: Slot,
    axis: Axis,
}

impl SlotPair {
    /// Pairs two slots.
    ///
    /// # Errors
    ///
    /// [`FloorplanError::NotAdjacent`] if the slots do not share a boundary.
    pub fn new(a: Slot, b: Slot) -> Result<SlotPair, FloorplanError> {
        let axis = a
            .rect()
            .adjacency_axis(&b.rect())
            .ok_or_else(|| FloorplanError::NotAdjacent(a.name(), b.name()))?;
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Ok(SlotPair { first, second, axis })
    }

    /// The axis across which the slots meet: `X` for side-by-side slots,
    /// `Y` for stacked ones.
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Both slots in canonical order.
    pub fn slots(&self) -> (&Slot, &Slot) {
        (&self.first, &self.second)
    }

    /// Returns `true` if `slot` is one of the pair.
    pub fn contains(&self, slot: &Slot) -> bool {
        &self.first == slot || &self.second == slot
    }

    /// The slot with the larger coordinate on the pair's axis: the upper
    /// slot of a stacked pair, the right slot of a side-by-side pair.
    pub fn upper(&self) -> &Slot {
        let (a0, _) = self.first.rect().span(self.axis);
        let (b0, _) = self.second.rect().span(self.axis);
        if a0 > b0 {
            &self.first
        } else {
            &self.second
        }
    }

    /// The slot with the smaller coordinate on the pair's axis.
    pub fn lower(&self) -> &Slot {
        if self.upper() == &self.first {
            &self.second
        } else {
            &self.first
        }
    }

    /// Display name used as a diagnostic subject.
    pub fn name(&self) -> String {
        format!("{} <-> {}", self.first.name(), self.second.name())
    }
}

impl fmt::Display for SlotPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}
