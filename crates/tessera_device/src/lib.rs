//! Board topology models for the Tessera backend.
//!
//! This crate provides the [`BoardTopology`] trait through which the rest of
//! the backend queries the physical fabric: region capacities, the buffer
//! geometry between two adjacent regions, and whether a boundary crosses
//! between dies. A parametric [`UniformBoard`] implements the trait for a
//! regular grid of identical regions stacked into dies.
//!
//! # Usage
//!
//! ```
//! use tessera_device::{load_board, GridRect, UniformBoardParams};
//!
//! let board = load_board("uniform", UniformBoardParams::default()).unwrap();
//! let cap = board.capacity_of(&GridRect::new(0, 0, 2, 2));
//! assert_eq!(cap.lut, 4 * UniformBoardParams::default().region_capacity.lut);
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod link;
pub mod topology;
pub mod types;
pub mod uniform;

pub use error::DeviceError;
pub use link::{LinkColumn, LinkRegion};
pub use topology::BoardTopology;
pub use types::{Axis, BufferRegion, DieSide, GridRect, ResourceKind, ResourceVector, SiteCoord, SiteRange};
pub use uniform::{UniformBoard, UniformBoardParams};

/// Loads a board model for the given family.
///
/// Only the `"uniform"` family is built in; its geometry comes entirely from
/// `params`.
///
/// # Errors
///
/// Returns [`DeviceError::UnknownFamily`] if the family name is not recognized.
pub fn load_board(
    family: &str,
    params: UniformBoardParams,
) -> Result<Box<dyn BoardTopology>, DeviceError> {
    match family.to_ascii_lowercase().as_str() {
        "uniform" | "uniform-grid" | "uniform_grid" => Ok(Box::new(UniformBoard::new(params)?)),
        _ => Err(DeviceError::UnknownFamily(family.to_string())),
    }
}
