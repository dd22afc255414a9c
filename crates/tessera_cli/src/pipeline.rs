//! Shared pipeline helpers for CLI commands.
//!
//! Contains the steps common to `route`, `place`, and `check-config`:
//! configuration lookup, turning the configuration into a board model and
//! component options, diagnostic rendering, and writing results.

use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tessera_anchor::{CostModel, LinkPolarity, PlacementMode, PlacerOptions, UtilizationPolicy};
use tessera_config::{
    BoardConfig, PlacementConfig, ProjectConfig, RoutingConfig, CONFIG_FILE_NAME,
};
use tessera_device::{load_board, BoardTopology, DeviceError, ResourceVector, UniformBoardParams};
use tessera_diagnostics::{
    Diagnostic, DiagnosticRenderer, DiagnosticSink, JsonRenderer, Severity, TerminalRenderer,
};
use tessera_route::{PipelineConvention, RouterOptions};

use crate::{GlobalArgs, ReportFormat};

/// Walks up from `start` looking for the nearest directory containing `tessera.toml`.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE_NAME).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {CONFIG_FILE_NAME} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Loads the configuration named by `--config`, or the nearest `tessera.toml`.
///
/// `--config` may name the file itself or the directory holding it.
pub fn resolve_config(global: &GlobalArgs) -> Result<ProjectConfig, Box<dyn Error>> {
    match global.config {
        Some(ref config_path) => {
            let p = PathBuf::from(config_path);
            if p.is_file() {
                let content = std::fs::read_to_string(&p)?;
                Ok(tessera_config::load_config_from_str(&content)?)
            } else {
                Ok(tessera_config::load_config(&p)?)
            }
        }
        None => {
            let root = find_project_root(&std::env::current_dir()?)?;
            Ok(tessera_config::load_config(&root)?)
        }
    }
}

/// Builds the board model described by `[board]`.
pub fn board_from_config(board: &BoardConfig) -> Result<Box<dyn BoardTopology>, DeviceError> {
    let cap = &board.region_capacity;
    let params = UniformBoardParams {
        columns: board.columns,
        rows: board.rows,
        rows_per_die: board.rows_per_die,
        sites_per_region_x: board.sites_per_region_x,
        sites_per_region_y: board.sites_per_region_y,
        registers_per_site: board.registers_per_site,
        buffer_rows: board.buffer_rows,
        buffer_columns: board.buffer_columns,
        link_columns_per_region: board.link_columns_per_region,
        link_wires_per_site: board.link_wires_per_site,
        region_capacity: ResourceVector {
            lut: cap.lut,
            ff: cap.ff,
            bram: cap.bram,
            dsp: cap.dsp,
            uram: cap.uram,
            link: 0,
        },
    };
    load_board(&board.family, params)
}

/// Router options from `[routing]`.
pub fn router_options(routing: &RoutingConfig) -> RouterOptions {
    RouterOptions {
        convention: match routing.convention {
            tessera_config::PipelineConvention::Refined => PipelineConvention::Refined,
            tessera_config::PipelineConvention::Legacy => PipelineConvention::Legacy,
        },
        grid_units_per_register: routing.grid_units_per_register,
        threads: routing.threads,
    }
}

/// Placer options from `[placement]`.
pub fn placer_options(placement: &PlacementConfig) -> PlacerOptions {
    PlacerOptions {
        bin_width: placement.bin_width,
        bin_height: placement.bin_height,
        utilization: UtilizationPolicy {
            base_utilization: placement.base_utilization,
            relax_threshold: placement.relax_threshold,
            relax_margin: placement.relax_margin,
            max_density: placement.max_density,
        },
        cost: CostModel {
            logic_hop_penalty: placement.logic_hop_penalty,
        },
        integrality_tolerance: placement.integrality_tolerance,
        time_limit: placement.time_limit_secs.and_then(|s| Duration::try_from_secs_f64(s).ok()),
        link_polarity: match placement.link_polarity {
            tessera_config::LinkPolarity::Mixed => LinkPolarity::Mixed,
            tessera_config::LinkPolarity::RxOnly => LinkPolarity::RxOnly,
        },
        mode: match placement.mode {
            tessera_config::PlacementMode::Optimal => PlacementMode::Optimal,
            tessera_config::PlacementMode::RandomBaseline => PlacementMode::RandomBaseline {
                seed: placement.seed,
            },
        },
        excluded_signals: placement.excluded_signals.clone(),
        threads: placement.threads,
    }
}

/// Whether a diagnostic passes the `--quiet` / `--verbose` filter.
///
/// Errors always show; warnings unless quiet; notes and help only when verbose.
pub fn is_shown(diag: &Diagnostic, global: &GlobalArgs) -> bool {
    match diag.severity {
        Severity::Error => true,
        Severity::Warning => !global.quiet,
        Severity::Note | Severity::Help => global.verbose && !global.quiet,
    }
}

/// Renders the sink's diagnostics to stderr and prints a summary line.
///
/// Returns the number of errors.
pub fn render_diagnostics(sink: &DiagnosticSink, global: &GlobalArgs, format: ReportFormat) -> usize {
    let diagnostics = sink.diagnostics();
    let renderer: Box<dyn DiagnosticRenderer> = match format {
        ReportFormat::Text => Box::new(TerminalRenderer::new(global.color, 100)),
        ReportFormat::Json => Box::new(JsonRenderer),
    };
    for diag in diagnostics.iter().filter(|d| is_shown(d, global)) {
        eprint!("{}", renderer.render(diag));
    }

    let error_count = diagnostics.iter().filter(|d| d.severity == Severity::Error).count();
    let warning_count = diagnostics.iter().filter(|d| d.severity == Severity::Warning).count();
    if !global.quiet && format == ReportFormat::Text {
        eprintln!("   Result: {error_count} error(s), {warning_count} warning(s)");
    }
    error_count
}

/// Writes a JSON result to `output`, or to stdout when `None`.
pub fn write_output(output: Option<&str>, json: &str) -> Result<(), Box<dyn Error>> {
    match output {
        Some(path) => {
            std::fs::write(path, format!("{json}\n"))
                .map_err(|e| format!("cannot write {path}: {e}"))?;
        }
        None => println!("{json}"),
    }
    Ok(())
}
