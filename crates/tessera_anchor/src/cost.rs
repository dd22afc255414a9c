//! The cost of placing an anchor in a bin.

use crate::anchor::{Anchor, ConnectionRecord};
use crate::bins::Bin;
use tessera_device::SiteCoord;

/// Weights of the anchor-to-bin cost.
#[derive(Debug, Clone)]
pub struct CostModel {
    /// Extra distance weight per combinational cell on a connection.
    pub logic_hop_penalty: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            logic_hop_penalty: 0.3,
        }
    }
}

impl CostModel {
    /// Cost of putting an anchor with `connections` at `loc`.
    ///
    /// Each connection contributes its Manhattan distance to `loc`, scaled
    /// by `1 + penalty * logic_hops`. The cost is the mean of these plus
    /// their spread (max - min), which pulls the anchor towards the middle
    /// of its endpoints. Outside the endpoints' bounding box the mean counts
    /// twice. An anchor without connections costs nothing anywhere.
    pub fn cost(&self, connections: &[ConnectionRecord], loc: SiteCoord) -> f64 {
        if connections.is_empty() {
            return 0.0;
        }
        let dists: Vec<f64> = connections
            .iter()
            .map(|c| f64::from(c.site.manhattan(&loc)) * (1.0 + self.logic_hop_penalty * f64::from(c.logic_hops)))
            .collect();
        let mean = dists.iter().sum::<f64>() / dists.len() as f64;
        let max = dists.iter().copied().fold(f64::MIN, f64::max);
        let min = dists.iter().copied().fold(f64::MAX, f64::min);
        let unbalance = max - min;

        if in_bounding_box(connections, loc) {
            mean + unbalance
        } else {
            2.0 * mean + unbalance
        }
    }

    /// The `anchors x bins` cost matrix.
    pub fn matrix(&self, anchors: &[Anchor], bins: &[Bin]) -> Vec<Vec<f64>> {
        anchors
            .iter()
            .map(|a| bins.iter().map(|b| self.cost(&a.connections, b.origin)).collect())
            .collect()
    }
}

fn in_bounding_box(connections: &[ConnectionRecord], loc: SiteCoord) -> bool {
    let xs = connections.iter().map(|c| c.site.x);
    let ys = connections.iter().map(|c| c.site.y);
    let (x_lo, x_hi) = (xs.clone().min(), xs.max());
    let (y_lo, y_hi) = (ys.clone().min(), ys.max());
    match (x_lo, x_hi, y_lo, y_hi) {
        (Some(x0), Some(x1), Some(y0), Some(y1)) => (x0..=x1).contains(&loc.x) && (y0..=y1).contains(&loc.y),
        _ => false,
    }
}
