//! Parsing and validation of `tessera.toml` backend configuration files.
//!
//! This crate reads the configuration file and produces a strongly-typed
//! [`ProjectConfig`] describing the board model, the router's pipeline
//! convention, and the anchor placer's utilization and solver settings.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
