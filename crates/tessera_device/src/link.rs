//! Dedicated link fabric at a die boundary.
//!
//! Link sites come in column pairs: for every generic site column used as
//! anchor bins there is a pair of link columns `(link_x, link_x + 1)`. Each
//! generic site row maps onto `rows_per_site_row` consecutive link rows, and
//! a link register at row `y` is wired to its partner `pair_row_offset` rows
//! away on the other die.

use crate::types::{DieSide, SiteCoord};
use serde::{Deserialize, Serialize};

/// A generic bin column and the first link column of the pair serving it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct LinkColumn {
    /// Generic site column holding anchor bins.
    pub generic_x: u32,
    /// First link column of the pair (top-die anchors); the bottom die uses `link_x + 1`.
    pub link_x: u32,
}

/// The link fabric between two dies, as seen from one slot pair.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct LinkRegion {
    /// First generic site row of the upper die.
    pub boundary_y: u32,
    /// Lowest generic site row covered by the link fabric.
    pub generic_base_y: u32,
    /// Link row corresponding to `generic_base_y`.
    pub link_base_y: u32,
    /// Link rows per generic site row.
    pub rows_per_site_row: u32,
    /// Row distance between a link register and its partner.
    pub pair_row_offset: u32,
    /// Registers per link site.
    pub wires_per_site: u32,
    /// Served generic columns.
    pub columns: Vec<LinkColumn>,
}

impl LinkRegion {
    /// The die a generic site belongs to.
    pub fn side_of(&self, site: SiteCoord) -> DieSide {
        if site.y >= self.boundary_y {
            DieSide::Top
        } else {
            DieSide::Bottom
        }
    }

    /// Origin of the link block serving the generic site, or `None` if the
    /// site is outside the served columns or rows.
    pub fn block_of(&self, site: SiteCoord) -> Option<SiteCoord> {
        if site.y < self.generic_base_y {
            return None;
        }
        let column = self.columns.iter().find(|c| c.generic_x == site.x)?;
        let y = self.link_base_y + (site.y - self.generic_base_y) * self.rows_per_site_row;
        Some(SiteCoord::new(column.link_x, y))
    }

    /// The partner row of a link row across the die boundary.
    pub fn paired_row(&self, link_y: u32) -> u32 {
        if link_y < self.link_base_y + self.pair_row_offset {
            link_y + self.pair_row_offset
        } else {
            link_y - self.pair_row_offset
        }
    }
}
