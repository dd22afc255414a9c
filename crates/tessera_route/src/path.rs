//! Staircase path planning across a uniform slot grid.

use crate::error::RouteError;
use tessera_device::{BoardTopology, GridRect};
use tessera_floorplan::Slot;

/// Plans the slots an edge passes through between `src` and `dst`.
///
/// Starting at the source, the walk moves one slot extent at a time, first
/// along X and then along Y. Returns the intermediate slots in walk order,
/// excluding both endpoints. The walk assumes every slot on the way has the
/// source's extent; if the destination does not sit on that lattice the edge
/// is unreachable.
pub fn plan_path(
    board: &dyn BoardTopology,
    edge: &str,
    src: &Slot,
    dst: &Slot,
) -> Result<Vec<Slot>, RouteError> {
    let unreachable = |reason: String| RouteError::UnreachablePath {
        edge: edge.to_string(),
        from: src.name(),
        to: dst.name(),
        reason,
    };

    let (s, d) = (src.rect(), dst.rect());
    if (s.width(), s.height()) != (d.width(), d.height()) {
        return Err(unreachable(format!(
            "slot extents differ ({}x{} vs {}x{})",
            s.width(),
            s.height(),
            d.width(),
            d.height()
        )));
    }
    let (w, h) = (i64::from(s.width()), i64::from(s.height()));
    let dx = i64::from(d.x0) - i64::from(s.x0);
    let dy = i64::from(d.y0) - i64::from(s.y0);
    if dx % w != 0 || dy % h != 0 {
        return Err(unreachable(format!(
            "destination is offset ({dx}, {dy}) from the source lattice"
        )));
    }

    let mut cur = s;
    let mut walked = Vec::new();
    let steps = [(dx.signum() * w, 0, (dx / w).abs()), (0, dy.signum() * h, (dy / h).abs())];
    for (step_x, step_y, count) in steps {
        for _ in 0..count {
            cur = shift(cur, step_x, step_y).ok_or_else(|| unreachable("walk left the grid".into()))?;
            let slot = Slot::from_rect(board, cur).map_err(|e| unreachable(e.to_string()))?;
            walked.push(slot);
        }
    }

    match walked.pop() {
        Some(last) if last == *dst => Ok(walked),
        None if src == dst => Ok(walked),
        _ => Err(unreachable(format!("walk ended at {cur}"))),
    }
}

fn shift(r: GridRect, dx: i64, dy: i64) -> Option<GridRect> {
    let mv = |v: u32, d: i64| u32::try_from(i64::from(v) + d).ok();
    Some(GridRect::new(mv(r.x0, dx)?, mv(r.y0, dy)?, mv(r.x1, dx)?, mv(r.y1, dy)?))
}
