//! Configuration types deserialized from `tessera.toml`.

use serde::Deserialize;

/// The top-level configuration parsed from `tessera.toml`.
#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    /// Project metadata.
    pub project: ProjectMeta,
    /// Board model used for slot capacities and buffer geometry.
    #[serde(default)]
    pub board: BoardConfig,
    /// Global router settings.
    #[serde(default)]
    pub routing: RoutingConfig,
    /// Anchor placement settings.
    #[serde(default)]
    pub placement: PlacementConfig,
}

/// Project metadata.
#[derive(Debug, Deserialize)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
    /// A brief description of the design.
    #[serde(default)]
    pub description: String,
}

/// Parameters of the board model.
///
/// The region grid is `columns` x `rows` regions; each region spans
/// `sites_per_region_x` x `sites_per_region_y` physical sites. Every
/// `rows_per_die` region rows form one die.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Board family; only `"uniform"` is built in.
    pub family: String,
    /// Number of region columns.
    pub columns: u32,
    /// Number of region rows.
    pub rows: u32,
    /// Region rows per die.
    pub rows_per_die: u32,
    /// Physical site columns per region.
    pub sites_per_region_x: u32,
    /// Physical site rows per region.
    pub sites_per_region_y: u32,
    /// Registers available in one site.
    pub registers_per_site: u32,
    /// Site rows on each side of a horizontal boundary that form the buffer.
    pub buffer_rows: u32,
    /// Site columns on each side of a vertical boundary that form the buffer.
    pub buffer_columns: u32,
    /// Dedicated link columns per region at die boundaries.
    pub link_columns_per_region: u32,
    /// Link registers per link site.
    pub link_wires_per_site: u32,
    /// Resources of a single region.
    pub region_capacity: CapacityConfig,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            family: "uniform".to_string(),
            columns: 8,
            rows: 16,
            rows_per_die: 4,
            sites_per_region_x: 30,
            sites_per_region_y: 60,
            registers_per_site: 16,
            buffer_rows: 5,
            buffer_columns: 4,
            link_columns_per_region: 2,
            link_wires_per_site: 6,
            region_capacity: CapacityConfig::default(),
        }
    }
}

/// Resources available in one region of the board.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CapacityConfig {
    /// Lookup tables.
    pub lut: u64,
    /// Flip-flops.
    pub ff: u64,
    /// Block RAMs.
    pub bram: u64,
    /// DSP slices.
    pub dsp: u64,
    /// UltraRAMs.
    pub uram: u64,
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            lut: 27_840,
            ff: 55_680,
            bram: 48,
            dsp: 120,
            uram: 16,
        }
    }
}

/// Global router settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// How a routed distance is turned into a pipeline level.
    pub convention: PipelineConvention,
    /// Grid units covered by one pipeline register.
    pub grid_units_per_register: u32,
    /// Worker threads for per-edge routing; all cores when unset.
    pub threads: Option<usize>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            convention: PipelineConvention::default(),
            grid_units_per_register: 2,
            threads: None,
        }
    }
}

/// Pipeline-level convention.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PipelineConvention {
    /// `level = distance / 2`, latency `level + 1`.
    #[default]
    Refined,
    /// `level = max(distance / 2, 1)`, latency equal to the level.
    Legacy,
}

/// Anchor placement settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Bin width in sites.
    pub bin_width: u32,
    /// Bin height in sites.
    pub bin_height: u32,
    /// Fraction of each bin usable at low density.
    pub base_utilization: f64,
    /// Density at which the usable fraction starts tracking the density.
    pub relax_threshold: f64,
    /// Headroom added to the density once relaxed.
    pub relax_margin: f64,
    /// Density at or above which a pair is rejected before solving.
    pub max_density: f64,
    /// Penalty per logic hop in the distance term.
    pub logic_hop_penalty: f64,
    /// Allowed distance of a relaxed value from 0 or 1.
    pub integrality_tolerance: f64,
    /// Per-pair solve time limit in seconds.
    pub time_limit_secs: Option<f64>,
    /// Link register polarity policy for die-crossing pairs.
    pub link_polarity: LinkPolarity,
    /// Optimal placement or the labeled random baseline.
    pub mode: PlacementMode,
    /// Seed for the random baseline.
    pub seed: u64,
    /// Interface wires matching any of these substrings are exempt from the
    /// die-crossing direction cross-check.
    pub excluded_signals: Vec<String>,
    /// Worker threads for per-pair placement; all cores when unset.
    pub threads: Option<usize>,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            bin_width: 1,
            bin_height: 1,
            base_utilization: 0.5,
            relax_threshold: 0.4,
            relax_margin: 0.1,
            max_density: 0.9,
            logic_hop_penalty: 0.3,
            integrality_tolerance: 1e-6,
            time_limit_secs: None,
            link_polarity: LinkPolarity::default(),
            mode: PlacementMode::default(),
            seed: 0,
            excluded_signals: vec!["clk".to_string(), "_axi_".to_string()],
            threads: None,
        }
    }
}

/// Link register polarity policy.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LinkPolarity {
    /// Keep the TX/RX polarity given by direction and die side.
    #[default]
    Mixed,
    /// Move every TX register to its paired RX register.
    RxOnly,
}

/// Placement mode.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PlacementMode {
    /// Minimum-cost assignment.
    #[default]
    Optimal,
    /// Minimum-cost assignment with the chosen sites shuffled among anchors.
    RandomBaseline,
}
