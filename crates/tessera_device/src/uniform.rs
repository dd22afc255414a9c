//! A regular board: identical regions on a grid, stacked into dies.

use crate::error::DeviceError;
use crate::link::{LinkColumn, LinkRegion};
use crate::topology::BoardTopology;
use crate::types::{Axis, BufferRegion, GridRect, ResourceVector, SiteCoord, SiteRange};

/// Link rows per generic site row at a die boundary.
const LINK_ROWS_PER_SITE_ROW: u32 = 2;

/// Parameters of a [`UniformBoard`].
#[derive(Clone, Debug)]
pub struct UniformBoardParams {
    /// Number of region columns.
    pub columns: u32,
    /// Number of region rows.
    pub rows: u32,
    /// Region rows per die.
    pub rows_per_die: u32,
    /// Physical site columns per region.
    pub sites_per_region_x: u32,
    /// Physical site rows per region.
    pub sites_per_region_y: u32,
    /// Registers in one site.
    pub registers_per_site: u32,
    /// Buffer depth in site rows on each side of a horizontal boundary.
    pub buffer_rows: u32,
    /// Buffer depth in site columns on each side of a vertical boundary.
    pub buffer_columns: u32,
    /// Link column pairs per region column at a die boundary.
    pub link_columns_per_region: u32,
    /// Registers per link site.
    pub link_wires_per_site: u32,
    /// Resources of one region (the `link` field is ignored).
    pub region_capacity: ResourceVector,
}

impl Default for UniformBoardParams {
    fn default() -> Self {
        Self {
            columns: 8,
            rows: 16,
            rows_per_die: 4,
            sites_per_region_x: 30,
            sites_per_region_y: 60,
            registers_per_site: 16,
            buffer_rows: 5,
            buffer_columns: 4,
            link_columns_per_region: 2,
            link_wires_per_site: 6,
            region_capacity: ResourceVector {
                lut: 27_840,
                ff: 55_680,
                bram: 48,
                dsp: 120,
                uram: 16,
                link: 0,
            },
        }
    }
}

/// A board of identical regions.
///
/// Region `(c, r)` covers sites `[c*sx, (c+1)*sx) x [r*sy, (r+1)*sy)`. Every
/// `rows_per_die` region rows form a die; the boundary between two dies
/// carries link column pairs whose fabric covers one region on each side.
#[derive(Debug)]
pub struct UniformBoard {
    params: UniformBoardParams,
}

impl UniformBoard {
    /// Creates a board after checking the geometry is consistent.
    pub fn new(params: UniformBoardParams) -> Result<Self, DeviceError> {
        let p = &params;
        if p.columns == 0 || p.rows == 0 || p.rows_per_die == 0 {
            return Err(DeviceError::InvalidParams("empty region grid".into()));
        }
        if p.sites_per_region_x == 0 || p.sites_per_region_y == 0 || p.registers_per_site == 0 {
            return Err(DeviceError::InvalidParams("empty region".into()));
        }
        if p.rows % p.rows_per_die != 0 {
            return Err(DeviceError::InvalidParams(format!(
                "{} rows do not divide into dies of {}",
                p.rows, p.rows_per_die
            )));
        }
        if p.buffer_rows * 2 > p.sites_per_region_y || p.buffer_columns * 2 > p.sites_per_region_x {
            return Err(DeviceError::InvalidParams("buffer deeper than half a region".into()));
        }
        if p.link_columns_per_region == 0 || p.link_columns_per_region * 2 > p.sites_per_region_x {
            return Err(DeviceError::InvalidParams(
                "link columns need a generic column beside each".into(),
            ));
        }
        if p.link_wires_per_site == 0 {
            return Err(DeviceError::InvalidParams("link sites without registers".into()));
        }
        Ok(Self { params })
    }

    /// The parameters this board was built from.
    pub fn params(&self) -> &UniformBoardParams {
        &self.params
    }

    fn die_boundaries_inside(&self, rect: &GridRect) -> u32 {
        let rpd = self.params.rows_per_die;
        (rect.y0 + 1..rect.y1).filter(|y| y % rpd == 0).count() as u32
    }

    fn link_registers_per_column(&self) -> u64 {
        let p = &self.params;
        let rows = 2 * LINK_ROWS_PER_SITE_ROW * p.sites_per_region_y;
        u64::from(p.link_columns_per_region) * 2 * u64::from(rows) * u64::from(p.link_wires_per_site)
    }

    fn link_region(&self, boundary_row: u32, x0: u32, x1: u32) -> (Vec<SiteRange>, LinkRegion) {
        let p = &self.params;
        let sy = p.sites_per_region_y;
        let boundary_y = boundary_row * sy;
        let die_boundary_index = boundary_row / p.rows_per_die;
        let pitch = p.sites_per_region_x / p.link_columns_per_region;

        let mut sites = Vec::new();
        let mut columns = Vec::new();
        for c in x0..x1 {
            for j in 0..p.link_columns_per_region {
                let link_site_x = c * p.sites_per_region_x + j * pitch;
                let generic_x = link_site_x + 1;
                columns.push(LinkColumn {
                    generic_x,
                    link_x: 2 * (c * p.link_columns_per_region + j),
                });
                sites.push(SiteRange::new(
                    SiteCoord::new(generic_x, boundary_y - sy),
                    SiteCoord::new(generic_x, boundary_y + sy - 1),
                ));
            }
        }
        let link = LinkRegion {
            boundary_y,
            generic_base_y: boundary_y - sy,
            link_base_y: (die_boundary_index - 1) * 2 * LINK_ROWS_PER_SITE_ROW * sy,
            rows_per_site_row: LINK_ROWS_PER_SITE_ROW,
            pair_row_offset: LINK_ROWS_PER_SITE_ROW * sy,
            wires_per_site: p.link_wires_per_site,
            columns,
        };
        (sites, link)
    }
}

impl BoardTopology for UniformBoard {
    fn family_name(&self) -> &str {
        "uniform"
    }

    fn grid_size(&self) -> (u32, u32) {
        (self.params.columns, self.params.rows)
    }

    fn capacity_of(&self, rect: &GridRect) -> ResourceVector {
        let mut cap = self.params.region_capacity.scaled(rect.area());
        cap.link = u64::from(self.die_boundaries_inside(rect))
            * u64::from(rect.width())
            * self.link_registers_per_column();
        cap
    }

    fn registers_per_site(&self) -> u32 {
        self.params.registers_per_site
    }

    fn is_die_crossing(&self, a: &GridRect, b: &GridRect) -> bool {
        a.abuts(b, Axis::Y) && a.y0.max(b.y0) % self.params.rows_per_die == 0
    }

    fn buffer_region_between(&self, a: &GridRect, b: &GridRect) -> Option<BufferRegion> {
        let p = &self.params;
        let axis = a.adjacency_axis(b)?;
        match axis {
            Axis::X => {
                let boundary = a.x0.max(b.x0) * p.sites_per_region_x;
                let lo_y = a.y0.max(b.y0) * p.sites_per_region_y;
                let hi_y = a.y1.min(b.y1) * p.sites_per_region_y - 1;
                let mut sites = Vec::new();
                if p.buffer_columns > 0 {
                    sites.push(SiteRange::new(
                        SiteCoord::new(boundary - p.buffer_columns, lo_y),
                        SiteCoord::new(boundary + p.buffer_columns - 1, hi_y),
                    ));
                }
                Some(BufferRegion { sites, link: None })
            }
            Axis::Y => {
                let boundary_row = a.y0.max(b.y0);
                let x0 = a.x0.max(b.x0);
                let x1 = a.x1.min(b.x1);
                if self.is_die_crossing(a, b) {
                    let (sites, link) = self.link_region(boundary_row, x0, x1);
                    return Some(BufferRegion { sites, link: Some(link) });
                }
                let boundary = boundary_row * p.sites_per_region_y;
                let mut sites = Vec::new();
                if p.buffer_rows > 0 {
                    sites.push(SiteRange::new(
                        SiteCoord::new(x0 * p.sites_per_region_x, boundary - p.buffer_rows),
                        SiteCoord::new(x1 * p.sites_per_region_x - 1, boundary + p.buffer_rows - 1),
                    ));
                }
                Some(BufferRegion { sites, link: None })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DieSide;

    fn small() -> UniformBoard {
        UniformBoard::new(UniformBoardParams {
            columns: 2,
            rows: 4,
            rows_per_die: 2,
            sites_per_region_x: 4,
            sites_per_region_y: 4,
            registers_per_site: 16,
            buffer_rows: 1,
            buffer_columns: 1,
            link_columns_per_region: 1,
            link_wires_per_site: 6,
            region_capacity: ResourceVector { lut: 100, ff: 200, ..Default::default() },
        })
        .unwrap()
    }

    #[test]
    fn rejects_uneven_dies() {
        let err = UniformBoard::new(UniformBoardParams {
            rows: 6,
            rows_per_die: 4,
            ..UniformBoardParams::default()
        })
        .unwrap_err();
        assert!(matches!(err, DeviceError::InvalidParams(_)));
    }

    #[test]
    fn capacity_scales_with_area() {
        let board = small();
        let cap = board.capacity_of(&GridRect::new(0, 0, 2, 1));
        assert_eq!(cap.lut, 200);
        assert_eq!(cap.ff, 400);
        assert_eq!(cap.link, 0);
    }

    #[test]
    fn capacity_counts_inner_die_boundary() {
        let board = small();
        let cap = board.capacity_of(&GridRect::new(0, 0, 1, 4));
        // one boundary, one column, one link pair, 16 link rows, 6 wires
        assert_eq!(cap.link, 2 * 16 * 6);
    }

    #[test]
    fn die_crossing_only_at_die_rows() {
        let board = small();
        let a = GridRect::new(0, 0, 1, 1);
        let b = GridRect::new(0, 1, 1, 2);
        let c = GridRect::new(0, 2, 1, 3);
        assert!(!board.is_die_crossing(&a, &b));
        assert!(board.is_die_crossing(&b, &c));
        assert!(board.is_die_crossing(&c, &b));
        assert!(!board.is_die_crossing(&a, &c));
    }

    #[test]
    fn vertical_boundary_buffer() {
        let board = small();
        let region = board
            .buffer_region_between(&GridRect::new(0, 0, 1, 2), &GridRect::new(1, 0, 2, 2))
            .unwrap();
        assert!(!region.die_crossing());
        assert_eq!(
            region.sites,
            vec![SiteRange::new(SiteCoord::new(3, 0), SiteCoord::new(4, 7))]
        );
    }

    #[test]
    fn horizontal_boundary_buffer() {
        let board = small();
        let region = board
            .buffer_region_between(&GridRect::new(0, 0, 2, 1), &GridRect::new(0, 1, 2, 2))
            .unwrap();
        assert_eq!(
            region.sites,
            vec![SiteRange::new(SiteCoord::new(0, 3), SiteCoord::new(7, 4))]
        );
        assert_eq!(region.site_count(), 16);
    }

    #[test]
    fn die_boundary_buffer_excludes_link_sites() {
        let board = small();
        let region = board
            .buffer_region_between(&GridRect::new(0, 1, 2, 2), &GridRect::new(0, 2, 2, 3))
            .unwrap();
        let link = region.link.as_ref().unwrap();
        assert_eq!(link.boundary_y, 8);
        assert_eq!(link.generic_base_y, 4);
        assert_eq!(link.link_base_y, 0);
        assert_eq!(link.pair_row_offset, 8);
        assert_eq!(
            link.columns,
            vec![
                LinkColumn { generic_x: 1, link_x: 0 },
                LinkColumn { generic_x: 5, link_x: 2 },
            ]
        );
        assert_eq!(region.sites.len(), 2);
        assert_eq!(region.site_count(), 16);
        assert_eq!(link.side_of(SiteCoord::new(1, 7)), DieSide::Bottom);
        assert_eq!(link.block_of(SiteCoord::new(5, 11)), Some(SiteCoord::new(2, 14)));
    }

    #[test]
    fn no_buffer_for_non_adjacent() {
        let board = small();
        assert!(board
            .buffer_region_between(&GridRect::new(0, 0, 1, 1), &GridRect::new(1, 1, 2, 2))
            .is_none());
    }
}
