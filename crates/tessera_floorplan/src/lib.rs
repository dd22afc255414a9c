//! The slot model: rectangular regions of the fabric and their relations.
//!
//! A [`Slot`] is an immutable half-open rectangle of the region grid that
//! carries its resource capacity. Slots are split in halves by the coarse
//! partitioner, paired across shared boundaries ([`SlotPair`]), kept
//! canonical by a [`SlotManager`], and bound to vertices by a
//! [`PartitionAssignment`].

#![warn(missing_docs)]

pub mod assignment;
pub mod error;
pub mod manager;
pub mod pair;
pub mod slot;

pub use assignment::{PartitionAssignment, SlotUsage};
pub use error::FloorplanError;
pub use manager::SlotManager;
pub use pair::SlotPair;
pub use slot::{Direction, Slot};
