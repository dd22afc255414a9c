//! Immutable rectangular regions of the fabric.

use crate::error::FloorplanError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use tessera_device::{Axis, BoardTopology, GridRect, ResourceVector};

/// One of the four sides of a slot, also used as a routing direction.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Direction {
    /// Towards larger Y.
    Up,
    /// Towards smaller Y.
    Down,
    /// Towards smaller X.
    Left,
    /// Towards larger X.
    Right,
}

impl Direction {
    /// All four directions.
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// The opposite side.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// The axis this direction moves along.
    pub fn axis(self) -> Axis {
        match self {
            Direction::Up | Direction::Down => Axis::Y,
            Direction::Left | Direction::Right => Axis::X,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
            Direction::Left => "LEFT",
            Direction::Right => "RIGHT",
        };
        f.write_str(s)
    }
}

/// A half-open rectangle `[x0, x1) x [y0, y1)` of the region grid.
///
/// Identity, ordering, and hashing use the coordinates only; the capacity is
/// derived from them once at construction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Slot {
    rect: GridRect,
    capacity: ResourceVector,
}

impl Slot {
    /// Creates a slot, rejecting degenerate rectangles and rectangles that
    /// leave the board's grid.
    pub fn from_coordinates(
        board: &dyn BoardTopology,
        x0: u32,
        y0: u32,
        x1: u32,
        y1: u32,
    ) -> Result<Slot, FloorplanError> {
        Slot::from_rect(board, GridRect::new(x0, y0, x1, y1))
    }

    /// Creates a slot from a rectangle.
    pub fn from_rect(board: &dyn BoardTopology, rect: GridRect) -> Result<Slot, FloorplanError> {
        let invalid = |reason: String| FloorplanError::InvalidGeometry { rect, reason };
        if rect.x0 >= rect.x1 || rect.y0 >= rect.y1 {
            return Err(invalid("empty extent".to_string()));
        }
        let (cols, rows) = board.grid_size();
        if rect.x1 > cols || rect.y1 > rows {
            return Err(invalid(format!("outside the {cols}x{rows} grid")));
        }
        Ok(Slot {
            rect,
            capacity: board.capacity_of(&rect),
        })
    }

    /// Parses a clock-region pblock (`CLOCKREGION_X0Y0:CLOCKREGION_X1Y3`) or
    /// a slot name (`CR_X0Y0_To_CR_X1Y3`). Both corners are inclusive.
    pub fn from_pblock(board: &dyn BoardTopology, pblock: &str) -> Result<Slot, FloorplanError> {
        let malformed = || FloorplanError::InvalidPblock(pblock.to_string());
        let (low, high) = pblock
            .split_once(':')
            .map(|(l, h)| (l.strip_prefix("CLOCKREGION_"), h.strip_prefix("CLOCKREGION_")))
            .or_else(|| {
                pblock
                    .split_once("_To_")
                    .map(|(l, h)| (l.strip_prefix("CR_"), h.strip_prefix("CR_")))
            })
            .ok_or_else(malformed)?;
        let (x0, y0) = low.and_then(parse_corner).ok_or_else(malformed)?;
        let (xh, yh) = high.and_then(parse_corner).ok_or_else(malformed)?;
        Slot::from_coordinates(board, x0, y0, xh + 1, yh + 1)
    }

    /// The slot's rectangle.
    pub fn rect(&self) -> GridRect {
        self.rect
    }

    /// The resources inside the slot.
    pub fn resource_capacity(&self) -> &ResourceVector {
        &self.capacity
    }

    /// Splits at the middle row into `(bottom, top)`.
    pub fn split_horizontal(&self, board: &dyn BoardTopology) -> Result<(Slot, Slot), FloorplanError> {
        if self.rect.height() < 2 {
            return Err(FloorplanError::NotSplittable {
                slot: self.name(),
                axis: Axis::Y,
            });
        }
        let r = self.rect;
        let mid = (r.y0 + r.y1) / 2;
        Ok((
            Slot::from_coordinates(board, r.x0, r.y0, r.x1, mid)?,
            Slot::from_coordinates(board, r.x0, mid, r.x1, r.y1)?,
        ))
    }

    /// Splits at the middle column into `(left, right)`.
    pub fn split_vertical(&self, board: &dyn BoardTopology) -> Result<(Slot, Slot), FloorplanError> {
        if self.rect.width() < 2 {
            return Err(FloorplanError::NotSplittable {
                slot: self.name(),
                axis: Axis::X,
            });
        }
        let r = self.rect;
        let mid = (r.x0 + r.x1) / 2;
        Ok((
            Slot::from_coordinates(board, r.x0, r.y0, mid, r.y1)?,
            Slot::from_coordinates(board, mid, r.y0, r.x1, r.y1)?,
        ))
    }

    /// The midpoint on each axis.
    ///
    /// Slot grids are built from even extents so this is exact; for an odd
    /// extent the midpoint is rounded down.
    pub fn centroid(&self) -> (u32, u32) {
        ((self.rect.x0 + self.rect.x1) / 2, (self.rect.y0 + self.rect.y1) / 2)
    }

    /// Returns `true` if `other` shares a boundary with `self` perpendicular
    /// to `axis` and the two strictly overlap on the other axis.
    pub fn is_neighbor(&self, other: &Slot, axis: Axis) -> bool {
        self.rect.abuts(&other.rect, axis)
    }

    /// Returns `true` if `other` lies on the given side of `self` and shares
    /// a boundary with it.
    pub fn is_neighbor_on(&self, other: &Slot, side: Direction) -> bool {
        let (a, b) = (self.rect, other.rect);
        let touches = match side {
            Direction::Up => a.y1 == b.y0,
            Direction::Down => b.y1 == a.y0,
            Direction::Left => b.x1 == a.x0,
            Direction::Right => a.x1 == b.x0,
        };
        touches && a.overlap(&b, side.axis().other()) > 0
    }

    /// Returns `true` if `other` lies entirely inside `self`.
    pub fn contains(&self, other: &Slot) -> bool {
        self.rect.contains(&other.rect)
    }

    /// Module-style name, `CR_X{x0}Y{y0}_To_CR_X{x1-1}Y{y1-1}`.
    pub fn name(&self) -> String {
        let r = self.rect;
        format!("CR_X{}Y{}_To_CR_X{}Y{}", r.x0, r.y0, r.x1 - 1, r.y1 - 1)
    }

    /// Clock-region pblock, `CLOCKREGION_X{x0}Y{y0}:CLOCKREGION_X{x1-1}Y{y1-1}`.
    pub fn pblock(&self) -> String {
        let r = self.rect;
        format!(
            "CLOCKREGION_X{}Y{}:CLOCKREGION_X{}Y{}",
            r.x0,
            r.y0,
            r.x1 - 1,
            r.y1 - 1
        )
    }
}

fn parse_corner(s: &str) -> Option<(u32, u32)> {
    let (x, y) = s.strip_prefix('X')?.split_once('Y')?;
    Some((x.parse().ok()?, y.parse().ok()?))
}

impl PartialEq for Slot {
    fn eq(&self, other: &Self) -> bool {
        self.rect == other.rect
    }
}

impl Eq for Slot {}

impl Hash for Slot {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rect.hash(state);
    }
}

impl PartialOrd for Slot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Slot {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rect.cmp(&other.rect)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tessera_device::{UniformBoard, UniformBoardParams};

    pub(crate) fn board() -> UniformBoard {
        UniformBoard::new(UniformBoardParams {
            columns: 4,
            rows: 8,
            rows_per_die: 4,
            sites_per_region_x: 8,
            sites_per_region_y: 8,
            buffer_rows: 2,
            buffer_columns: 2,
            link_columns_per_region: 1,
            ..UniformBoardParams::default()
        })
        .unwrap()
    }

    fn slot(x0: u32, y0: u32, x1: u32, y1: u32) -> Slot {
        Slot::from_coordinates(&board(), x0, y0, x1, y1).unwrap()
    }

    #[test]
    fn rejects_degenerate_and_out_of_grid() {
        let b = board();
        assert!(matches!(
            Slot::from_coordinates(&b, 2, 0, 2, 4),
            Err(FloorplanError::InvalidGeometry { .. })
        ));
        assert!(matches!(
            Slot::from_coordinates(&b, 0, 0, 5, 4),
            Err(FloorplanError::InvalidGeometry { .. })
        ));
    }

    #[test]
    fn capacity_precomputed_from_board() {
        let s = slot(0, 0, 2, 2);
        let per_region = UniformBoardParams::default().region_capacity;
        assert_eq!(s.resource_capacity().lut, 4 * per_region.lut);
    }

    #[test]
    fn split_reconstructs_parent_without_overlap() {
        let b = board();
        for parent in [slot(0, 0, 4, 8), slot(1, 2, 4, 5), slot(0, 3, 3, 6)] {
            let (bottom, top) = parent.split_horizontal(&b).unwrap();
            let (left, right) = parent.split_vertical(&b).unwrap();
            for (p, q) in [(&bottom, &top), (&left, &right)] {
                assert!(!p.rect().intersects(&q.rect()));
                assert_eq!(p.rect().area() + q.rect().area(), parent.rect().area());
                assert!(parent.contains(p) && parent.contains(q));
            }
            assert_eq!(bottom.rect().y1, top.rect().y0);
            assert_eq!(left.rect().x1, right.rect().x0);
        }
    }

    #[test]
    fn split_at_integer_midpoint() {
        let (bottom, top) = slot(0, 0, 2, 4).split_horizontal(&board()).unwrap();
        assert_eq!(bottom.rect(), GridRect::new(0, 0, 2, 2));
        assert_eq!(top.rect(), GridRect::new(0, 2, 2, 4));
        let (left, right) = slot(0, 0, 3, 1).split_vertical(&board()).unwrap();
        assert_eq!(left.rect(), GridRect::new(0, 0, 1, 1));
        assert_eq!(right.rect(), GridRect::new(1, 0, 3, 1));
    }

    #[test]
    fn unit_extent_not_splittable() {
        let err = slot(0, 0, 2, 1).split_horizontal(&board()).unwrap_err();
        assert!(matches!(err, FloorplanError::NotSplittable { axis: Axis::Y, .. }));
        let err = slot(0, 0, 1, 2).split_vertical(&board()).unwrap_err();
        assert!(matches!(err, FloorplanError::NotSplittable { axis: Axis::X, .. }));
    }

    #[test]
    fn neighbor_relation_is_symmetric() {
        let slots = [
            slot(0, 0, 2, 2),
            slot(2, 0, 4, 2),
            slot(0, 2, 2, 4),
            slot(2, 2, 4, 4),
            slot(1, 4, 3, 6),
            slot(0, 0, 1, 1),
        ];
        for a in &slots {
            for b in &slots {
                for axis in [Axis::X, Axis::Y] {
                    assert_eq!(a.is_neighbor(b, axis), b.is_neighbor(a, axis));
                }
            }
        }
        assert!(slots[0].is_neighbor(&slots[1], Axis::X));
        assert!(slots[0].is_neighbor(&slots[2], Axis::Y));
        assert!(!slots[0].is_neighbor(&slots[3], Axis::X));
        assert!(!slots[0].is_neighbor(&slots[3], Axis::Y));
        assert!(slots[2].is_neighbor(&slots[4], Axis::Y));
    }

    #[test]
    fn touching_corners_are_not_neighbors() {
        let a = slot(0, 0, 1, 1);
        let b = slot(1, 1, 2, 2);
        assert!(!a.is_neighbor(&b, Axis::X));
        assert!(!a.is_neighbor(&b, Axis::Y));
    }

    #[test]
    fn sided_neighbors() {
        let a = slot(0, 0, 2, 2);
        let up = slot(0, 2, 2, 4);
        let right = slot(2, 0, 4, 2);
        assert!(a.is_neighbor_on(&up, Direction::Up));
        assert!(up.is_neighbor_on(&a, Direction::Down));
        assert!(a.is_neighbor_on(&right, Direction::Right));
        assert!(right.is_neighbor_on(&a, Direction::Left));
        assert!(!a.is_neighbor_on(&up, Direction::Down));
    }

    #[test]
    fn centroid_is_midpoint() {
        assert_eq!(slot(0, 0, 2, 2).centroid(), (1, 1));
        assert_eq!(slot(2, 4, 4, 8).centroid(), (3, 6));
    }

    #[test]
    fn names_and_pblocks_roundtrip() {
        let b = board();
        let s = slot(0, 4, 2, 8);
        assert_eq!(s.name(), "CR_X0Y4_To_CR_X1Y7");
        assert_eq!(s.pblock(), "CLOCKREGION_X0Y4:CLOCKREGION_X1Y7");
        assert_eq!(Slot::from_pblock(&b, &s.pblock()).unwrap(), s);
        assert_eq!(Slot::from_pblock(&b, &s.name()).unwrap(), s);
    }

    #[test]
    fn malformed_pblock() {
        let b = board();
        for bad in ["", "CLOCKREGION_X0Y0", "CLOCKREGION_XaY0:CLOCKREGION_X1Y1", "CR_X0_To_CR_X1Y1"] {
            assert!(matches!(
                Slot::from_pblock(&b, bad),
                Err(FloorplanError::InvalidPblock(_))
            ));
        }
    }

    #[test]
    fn slots_hash_by_coordinates() {
        let a = slot(0, 0, 1, 1);
        let b = slot(0, 0, 1, 1);
        let mut set = std::collections::HashSet::new();
        set.insert(a.clone());
        assert!(set.contains(&b));
    }
}
