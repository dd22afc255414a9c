//! Registry of the slots currently in play.

use crate::error::FloorplanError;
use crate::slot::{Direction, Slot};
use std::collections::BTreeMap;
use tessera_device::{Axis, BoardTopology, GridRect};

/// Hands out one canonical [`Slot`] per rectangle and tracks which slots
/// form the current partition of the board.
#[derive(Debug)]
pub struct SlotManager<'b> {
    board: &'b dyn BoardTopology,
    slots: BTreeMap<GridRect, Slot>,
}

impl<'b> SlotManager<'b> {
    /// Creates an empty registry for `board`.
    pub fn new(board: &'b dyn BoardTopology) -> Self {
        Self {
            board,
            slots: BTreeMap::new(),
        }
    }

    /// The board this registry builds slots for.
    pub fn board(&self) -> &'b dyn BoardTopology {
        self.board
    }

    /// Registers and returns the slot covering the whole grid.
    pub fn initial_slot(&mut self) -> Result<Slot, FloorplanError> {
        let (cols, rows) = self.board.grid_size();
        self.get_or_create(GridRect::new(0, 0, cols, rows))
    }

    /// Returns the registered slot for `rect`, creating it if needed.
    pub fn get_or_create(&mut self, rect: GridRect) -> Result<Slot, FloorplanError> {
        if let Some(slot) = self.slots.get(&rect) {
            return Ok(slot.clone());
        }
        let slot = Slot::from_rect(self.board, rect)?;
        self.slots.insert(rect, slot.clone());
        Ok(slot)
    }

    /// Parses and registers a slot from its pblock or name.
    pub fn get_by_pblock(&mut self, pblock: &str) -> Result<Slot, FloorplanError> {
        let slot = Slot::from_pblock(self.board, pblock)?;
        self.get_or_create(slot.rect())
    }

    /// Splits `slot` in half, replacing it in the registry with the two
    /// children. `Axis::Y` cuts horizontally (bottom, top); `Axis::X` cuts
    /// vertically (left, right).
    pub fn partition_by_half(&mut self, slot: &Slot, axis: Axis) -> Result<(Slot, Slot), FloorplanError> {
        let (a, b) = match axis {
            Axis::Y => slot.split_horizontal(self.board)?,
            Axis::X => slot.split_vertical(self.board)?,
        };
        self.slots.remove(&slot.rect());
        self.slots.insert(a.rect(), a.clone());
        self.slots.insert(b.rect(), b.clone());
        Ok((a, b))
    }

    /// Registered slots touching `slot` on the given side.
    pub fn neighbors(&self, slot: &Slot, side: Direction) -> Vec<Slot> {
        self.slots
            .values()
            .filter(|other| slot.is_neighbor_on(other, side))
            .cloned()
            .collect()
    }

    /// All registered slots in coordinate order.
    pub fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.slots.values()
    }

    /// Number of registered slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if no slot is registered.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
