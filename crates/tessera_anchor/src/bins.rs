//! Quantization of a buffer area into bins.

use serde::{Deserialize, Serialize};
use tessera_device::{BufferRegion, SiteCoord, SiteRange};

/// A group of adjacent sites treated as one placement target.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Bin {
    /// Lower-left site; anchors assigned to the bin are reported here.
    pub origin: SiteCoord,
    /// Sites covered.
    pub sites: u32,
    /// Registers available in the bin.
    pub capacity: u32,
}

/// Splits the buffer area into disjoint bins of `width` x `height` sites.
///
/// Bins never span two site ranges and are clipped at a range's edge. At a
/// die boundary the ranges are additionally split at the boundary row so
/// that every bin lies on one die, and a bin's capacity is the link
/// registers its sites feed rather than their fabric registers.
pub fn discretize(region: &BufferRegion, width: u32, height: u32, registers_per_site: u32) -> Vec<Bin> {
    let (width, height) = (width.max(1), height.max(1));
    let (ranges, per_site) = match &region.link {
        Some(link) => {
            let split = region
                .sites
                .iter()
                .flat_map(|r| split_at_row(*r, link.boundary_y))
                .collect::<Vec<_>>();
            (split, link.rows_per_site_row * link.wires_per_site)
        }
        None => (region.sites.clone(), registers_per_site),
    };

    let mut bins = Vec::new();
    for range in ranges {
        for x in (range.low.x..=range.high.x).step_by(width as usize) {
            let w = width.min(range.high.x - x + 1);
            for y in (range.low.y..=range.high.y).step_by(height as usize) {
                let h = height.min(range.high.y - y + 1);
                bins.push(Bin {
                    origin: SiteCoord::new(x, y),
                    sites: w * h,
                    capacity: w * h * per_site,
                });
            }
        }
    }
    bins
}

fn split_at_row(range: SiteRange, y: u32) -> Vec<SiteRange> {
    if range.low.y < y && y <= range.high.y {
        vec![
            SiteRange::new(range.low, SiteCoord::new(range.high.x, y - 1)),
            SiteRange::new(SiteCoord::new(range.low.x, y), range.high),
        ]
    } else {
        vec![range]
    }
}
