//! `tessera check-config`: validates `tessera.toml` and the board it describes.

use std::error::Error;

use crate::pipeline::{board_from_config, resolve_config};
use crate::GlobalArgs;

/// Runs the `tessera check-config` command.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn Error>> {
    let config = resolve_config(global)?;
    let board = board_from_config(&config.board)?;

    if !global.quiet {
        let (columns, rows) = board.grid_size();
        eprintln!(
            "   Config OK: {} on a {columns}x{rows} {} board",
            config.project.name,
            board.family_name()
        );
    }
    Ok(0)
}
