//! `tessera place`: routing followed by pairwise anchor placement.
//!
//! 1. Load `tessera.toml` and build the board model
//! 2. Read the design bundle, including per-slot connection reports
//! 3. Route every inter-slot edge
//! 4. Place the anchors of every slot pair
//! 5. Render diagnostics and write the anchor map, unless a failure
//!    invalidated the whole run

use std::error::Error;
use std::path::Path;

use tessera_anchor::{AnchorPlacer, PlacementMode};
use tessera_diagnostics::DiagnosticSink;
use tessera_route::GlobalRouter;

use crate::bundle::{DesignBundle, PlaceOutput, RouteOutput};
use crate::pipeline::{
    board_from_config, placer_options, render_diagnostics, resolve_config, router_options, write_output,
};
use crate::{GlobalArgs, ModeChoice, PlaceArgs, ReportFormat};

/// Runs the `tessera place` command.
///
/// Returns exit code 0 when every pair was placed. A partial map is still
/// written when some pairs failed, with exit code 1. A fatal failure writes
/// no map at all.
pub fn run(args: &PlaceArgs, global: &GlobalArgs) -> Result<i32, Box<dyn Error>> {
    let config = resolve_config(global)?;
    let board = board_from_config(&config.board)?;

    let mut options = placer_options(&config.placement);
    let seed = args.seed.unwrap_or(config.placement.seed);
    match args.mode {
        Some(ModeChoice::Optimal) => options.mode = PlacementMode::Optimal,
        Some(ModeChoice::RandomBaseline) => options.mode = PlacementMode::RandomBaseline { seed },
        None => {
            if let PlacementMode::RandomBaseline { seed: ref mut s } = options.mode {
                *s = seed;
            }
        }
    }

    if !global.quiet {
        eprintln!("    Placing {} ({})", config.project.name, args.design);
        if let PlacementMode::RandomBaseline { seed } = options.mode {
            eprintln!("    warning: random baseline placement (seed {seed}), not for implementation");
        }
    }

    let design = DesignBundle::read(Path::new(&args.design))?.load(&*board)?;

    let sink = DiagnosticSink::new();
    let routing = GlobalRouter::new(&*board, router_options(&config.routing)).route(
        &design.graph,
        &design.assignment,
        &design.interner,
        &sink,
    )?;
    let report = AnchorPlacer::new(&*board, options).place_all(
        &routing,
        &design.graph,
        &design.interner,
        &design.inputs,
        &sink,
    )?;

    let errors = render_diagnostics(&sink, global, args.format);

    if report.has_fatal() {
        eprintln!("error: placement is invalid, no anchor map written");
        return Ok(1);
    }

    let output = PlaceOutput::new(RouteOutput::new(&routing, &design.graph, &design.interner), &report);
    write_output(args.output.as_deref(), &serde_json::to_string_pretty(&output)?)?;

    if !global.quiet && args.format == ReportFormat::Text {
        eprintln!(
            "     Placed {} anchor(s) in {} pair(s), {} pair(s) failed",
            report.anchors().count(),
            report.pairs.len(),
            report.failures.len()
        );
    }

    Ok(if errors > 0 || !report.is_complete() { 1 } else { 0 })
}
