//! The board topology service queried by the floorplan, router, and placer.

use crate::types::{BufferRegion, GridRect, ResourceVector};

/// The physical fabric as seen by the backend.
///
/// Implementations answer purely geometric questions about the region grid
/// and must be shareable between placement worker threads.
pub trait BoardTopology: std::fmt::Debug + Send + Sync {
    /// Returns the canonical family name (e.g., `"uniform"`).
    fn family_name(&self) -> &str;

    /// Returns the region grid dimensions as `(columns, rows)`.
    fn grid_size(&self) -> (u32, u32);

    /// Total resources inside a grid rectangle.
    fn capacity_of(&self, rect: &GridRect) -> ResourceVector;

    /// Registers available in one physical site.
    fn registers_per_site(&self) -> u32;

    /// Returns `true` if the boundary between `a` and `b` crosses between dies.
    fn is_die_crossing(&self, a: &GridRect, b: &GridRect) -> bool;

    /// The buffer area between two adjacent rectangles, `None` if they do not abut.
    fn buffer_region_between(&self, a: &GridRect, b: &GridRect) -> Option<BufferRegion>;

    /// Returns `true` if `a` and `b` share a boundary.
    ///
    /// The default is purely geometric: the rectangles touch along one axis
    /// and strictly overlap on the other.
    fn is_adjacent(&self, a: &GridRect, b: &GridRect) -> bool {
        a.adjacency_axis(b).is_some()
    }
}
