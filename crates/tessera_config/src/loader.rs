//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::{BoardConfig, PlacementConfig, ProjectConfig, RoutingConfig};
use std::path::Path;
use std::time::Duration;

/// File name looked up inside a project directory.
pub const CONFIG_FILE_NAME: &str = "tessera.toml";

/// Loads and validates `tessera.toml` from a project directory.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE_NAME);
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `tessera.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField("project.name".to_string()));
    }
    validate_board(&config.board)?;
    validate_routing(&config.routing)?;
    validate_placement(&config.placement)?;
    Ok(())
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(msg.into())
}

fn validate_board(board: &BoardConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("columns", board.columns),
        ("rows", board.rows),
        ("rows_per_die", board.rows_per_die),
        ("sites_per_region_x", board.sites_per_region_x),
        ("sites_per_region_y", board.sites_per_region_y),
        ("registers_per_site", board.registers_per_site),
        ("link_wires_per_site", board.link_wires_per_site),
    ] {
        if value == 0 {
            return Err(invalid(format!("board.{name} must be positive")));
        }
    }
    if board.rows % board.rows_per_die != 0 {
        return Err(invalid(format!(
            "board.rows ({}) is not a multiple of board.rows_per_die ({})",
            board.rows, board.rows_per_die
        )));
    }
    if board.buffer_rows * 2 > board.sites_per_region_y {
        return Err(invalid("board.buffer_rows exceeds half a region"));
    }
    if board.buffer_columns * 2 > board.sites_per_region_x {
        return Err(invalid("board.buffer_columns exceeds half a region"));
    }
    if board.link_columns_per_region == 0
        || board.link_columns_per_region * 2 > board.sites_per_region_x
    {
        return Err(invalid(
            "board.link_columns_per_region must leave a generic column beside every link column",
        ));
    }
    Ok(())
}

fn validate_routing(routing: &RoutingConfig) -> Result<(), ConfigError> {
    if routing.grid_units_per_register == 0 {
        return Err(invalid("routing.grid_units_per_register must be positive"));
    }
    if routing.threads == Some(0) {
        return Err(invalid("routing.threads must be positive"));
    }
    Ok(())
}

fn validate_placement(placement: &PlacementConfig) -> Result<(), ConfigError> {
    if placement.bin_width == 0 || placement.bin_height == 0 {
        return Err(invalid("placement bin dimensions must be positive"));
    }
    let unit = |v: f64| v > 0.0 && v <= 1.0;
    if !unit(placement.base_utilization) {
        return Err(invalid("placement.base_utilization must be in (0, 1]"));
    }
    if !unit(placement.max_density) {
        return Err(invalid("placement.max_density must be in (0, 1]"));
    }
    if !(0.0..placement.max_density).contains(&placement.relax_threshold) {
        return Err(invalid(
            "placement.relax_threshold must be in [0, placement.max_density)",
        ));
    }
    if placement.relax_margin < 0.0 {
        return Err(invalid("placement.relax_margin must not be negative"));
    }
    if placement.logic_hop_penalty < 0.0 {
        return Err(invalid("placement.logic_hop_penalty must not be negative"));
    }
    if !(placement.integrality_tolerance > 0.0 && placement.integrality_tolerance < 0.5) {
        return Err(invalid("placement.integrality_tolerance must be in (0, 0.5)"));
    }
    if let Some(limit) = placement.time_limit_secs {
        if !(limit > 0.0 && Duration::try_from_secs_f64(limit).is_ok()) {
            return Err(invalid("placement.time_limit_secs must be a positive number"));
        }
    }
    if placement.threads == Some(0) {
        return Err(invalid("placement.threads must be positive"));
    }
    Ok(())
}
