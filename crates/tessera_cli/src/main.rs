//! The command-line front end of the Tessera physical backend.
//!
//! Provides `tessera route` to globally route a floorplanned dataflow design,
//! `tessera place` to route it and place the pipeline anchors between every
//! pair of slots, and `tessera check-config` to validate `tessera.toml`.

#![warn(missing_docs)]

mod bundle;
mod check;
mod pipeline;
mod place;
mod route;

use std::io::IsTerminal;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// Global routing and anchor placement for floorplanned HLS designs.
#[derive(Parser, Debug)]
#[command(name = "tessera", version, about = "Tessera physical backend")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Also print per-edge and per-pair notes.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a `tessera.toml` file or the directory holding it.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Route every inter-slot edge of a design.
    Route(RouteArgs),
    /// Route a design and place the anchors of every slot pair.
    Place(PlaceArgs),
    /// Validate the configuration and the board it describes.
    CheckConfig,
}

/// Arguments for the `tessera route` subcommand.
#[derive(Parser, Debug)]
pub struct RouteArgs {
    /// JSON design bundle (vertices, edges, floorplan).
    pub design: String,

    /// Where to write the routing result; stdout when omitted.
    #[arg(short, long)]
    pub output: Option<String>,

    /// Output format for diagnostics.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for the `tessera place` subcommand.
#[derive(Parser, Debug)]
pub struct PlaceArgs {
    /// JSON design bundle with connection reports.
    pub design: String,

    /// Where to write the placement result; stdout when omitted.
    #[arg(short, long)]
    pub output: Option<String>,

    /// Output format for diagnostics.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Override the placement mode from the configuration.
    #[arg(long, value_enum)]
    pub mode: Option<ModeChoice>,

    /// Seed for `--mode random-baseline`.
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Diagnostic output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// One JSON object per diagnostic.
    Json,
}

/// Placement mode selected on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeChoice {
    /// Minimum-cost assignment.
    Optimal,
    /// Minimum-cost bins shuffled among the anchors.
    RandomBaseline,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print notes.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a config file or its directory.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::io::stderr().is_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };
    colored::control::set_override(color);

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Route(ref args) => route::run(args, &global),
        Command::Place(ref args) => place::run(args, &global),
        Command::CheckConfig => check::run(&global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
