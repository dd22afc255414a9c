//! `tessera route`: global routing of a floorplanned design.
//!
//! 1. Load `tessera.toml` and build the board model
//! 2. Read the design bundle into a graph and a partition assignment
//! 3. Route every inter-slot edge
//! 4. Render diagnostics and write the routed edges and direction map

use std::error::Error;
use std::path::Path;

use tessera_diagnostics::DiagnosticSink;
use tessera_route::GlobalRouter;

use crate::bundle::{DesignBundle, RouteOutput};
use crate::pipeline::{board_from_config, render_diagnostics, resolve_config, router_options, write_output};
use crate::{GlobalArgs, RouteArgs};

/// Runs the `tessera route` command.
///
/// Returns exit code 0 if no errors were reported, 1 otherwise.
pub fn run(args: &RouteArgs, global: &GlobalArgs) -> Result<i32, Box<dyn Error>> {
    let config = resolve_config(global)?;
    let board = board_from_config(&config.board)?;

    if !global.quiet {
        eprintln!("    Routing {} ({})", config.project.name, args.design);
    }

    let design = DesignBundle::read(Path::new(&args.design))?.load(&*board)?;

    let sink = DiagnosticSink::new();
    let router = GlobalRouter::new(&*board, router_options(&config.routing));
    let routing = router.route(&design.graph, &design.assignment, &design.interner, &sink)?;

    let output = RouteOutput::new(&routing, &design.graph, &design.interner);
    let errors = render_diagnostics(&sink, global, args.format);
    write_output(args.output.as_deref(), &serde_json::to_string_pretty(&output)?)?;

    Ok(if errors > 0 { 1 } else { 0 })
}
