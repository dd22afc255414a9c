//! Geometry and resource types shared by board models and their users.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// An axis of the region grid.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Axis {
    /// The horizontal axis; slots adjacent along X sit side by side.
    X,
    /// The vertical axis; slots adjacent along Y are stacked.
    Y,
}

impl Axis {
    /// Returns the other axis.
    pub fn other(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

/// A half-open rectangle `[x0, x1) x [y0, y1)` in region-grid units.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct GridRect {
    /// Inclusive lower X bound.
    pub x0: u32,
    /// Inclusive lower Y bound.
    pub y0: u32,
    /// Exclusive upper X bound.
    pub x1: u32,
    /// Exclusive upper Y bound.
    pub y1: u32,
}

impl GridRect {
    /// Creates a rectangle without validating it.
    pub const fn new(x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Width in grid units.
    pub fn width(&self) -> u32 {
        self.x1.saturating_sub(self.x0)
    }

    /// Height in grid units.
    pub fn height(&self) -> u32 {
        self.y1.saturating_sub(self.y0)
    }

    /// Number of grid cells covered.
    pub fn area(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }

    /// Lower and upper bound on `axis`.
    pub fn span(&self, axis: Axis) -> (u32, u32) {
        match axis {
            Axis::X => (self.x0, self.x1),
            Axis::Y => (self.y0, self.y1),
        }
    }

    /// Length of the shared open interval on `axis`, zero if they only touch.
    pub fn overlap(&self, other: &GridRect, axis: Axis) -> u32 {
        let (a0, a1) = self.span(axis);
        let (b0, b1) = other.span(axis);
        a1.min(b1).saturating_sub(a0.max(b0))
    }

    /// Returns `true` if the two rectangles share at least one grid cell.
    pub fn intersects(&self, other: &GridRect) -> bool {
        self.overlap(other, Axis::X) > 0 && self.overlap(other, Axis::Y) > 0
    }

    /// Returns `true` if `other` lies entirely inside `self`.
    pub fn contains(&self, other: &GridRect) -> bool {
        self.x0 <= other.x0 && self.y0 <= other.y0 && other.x1 <= self.x1 && other.y1 <= self.y1
    }

    /// Returns `true` if the two rectangles touch across a boundary
    /// perpendicular to `axis` and strictly overlap on the other axis.
    pub fn abuts(&self, other: &GridRect, axis: Axis) -> bool {
        let (a0, a1) = self.span(axis);
        let (b0, b1) = other.span(axis);
        (a1 == b0 || b1 == a0) && self.overlap(other, axis.other()) > 0
    }

    /// The axis along which the two rectangles abut, if any.
    pub fn adjacency_axis(&self, other: &GridRect) -> Option<Axis> {
        [Axis::X, Axis::Y].into_iter().find(|&axis| self.abuts(other, axis))
    }
}

impl fmt::Display for GridRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{})x[{},{})", self.x0, self.x1, self.y0, self.y1)
    }
}

/// A kind of fabric resource.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Lookup tables.
    Lut,
    /// Flip-flops.
    Ff,
    /// Block RAMs.
    Bram,
    /// DSP slices.
    Dsp,
    /// UltraRAMs.
    Uram,
    /// Dedicated die-crossing link registers.
    Link,
}

impl ResourceKind {
    /// All resource kinds in a fixed order.
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::Lut,
        ResourceKind::Ff,
        ResourceKind::Bram,
        ResourceKind::Dsp,
        ResourceKind::Uram,
        ResourceKind::Link,
    ];
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResourceKind::Lut => "LUT",
            ResourceKind::Ff => "FF",
            ResourceKind::Bram => "BRAM",
            ResourceKind::Dsp => "DSP",
            ResourceKind::Uram => "URAM",
            ResourceKind::Link => "LINK",
        };
        f.write_str(s)
    }
}

/// A count per resource kind, used both for capacities and for usage.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceVector {
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
    /// Link registers.
    pub link: u64,
}

impl ResourceVector {
    /// Returns the count of one resource kind.
    pub fn get(&self, kind: ResourceKind) -> u64 {
        match kind {
            ResourceKind::Lut => self.lut,
            ResourceKind::Ff => self.ff,
            ResourceKind::Bram => self.bram,
            ResourceKind::Dsp => self.dsp,
            ResourceKind::Uram => self.uram,
            ResourceKind::Link => self.link,
        }
    }

    /// Multiplies every count by `factor`.
    pub fn scaled(&self, factor: u64) -> ResourceVector {
        ResourceVector {
            lut: self.lut * factor,
            ff: self.ff * factor,
            bram: self.bram * factor,
            dsp: self.dsp * factor,
            uram: self.uram * factor,
            link: self.link * factor,
        }
    }

    /// Resource kinds for which `self` (as usage) exceeds `capacity`.
    pub fn exceeding(&self, capacity: &ResourceVector) -> Vec<ResourceKind> {
        ResourceKind::ALL
            .into_iter()
            .filter(|&k| self.get(k) > capacity.get(k))
            .collect()
    }
}

impl Add for ResourceVector {
    type Output = ResourceVector;

    fn add(self, rhs: ResourceVector) -> ResourceVector {
        ResourceVector {
            lut: self.lut + rhs.lut,
            ff: self.ff + rhs.ff,
            bram: self.bram + rhs.bram,
            dsp: self.dsp + rhs.dsp,
            uram: self.uram + rhs.uram,
            link: self.link + rhs.link,
        }
    }
}

impl AddAssign for ResourceVector {
    fn add_assign(&mut self, rhs: ResourceVector) {
        *self = *self + rhs;
    }
}

impl Sum for ResourceVector {
    fn sum<I: Iterator<Item = ResourceVector>>(iter: I) -> Self {
        iter.fold(ResourceVector::default(), Add::add)
    }
}

/// A physical site coordinate.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct SiteCoord {
    /// Site column.
    pub x: u32,
    /// Site row.
    pub y: u32,
}

impl SiteCoord {
    /// Creates a site coordinate.
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance between two sites.
    pub fn manhattan(&self, other: &SiteCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for SiteCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X{}Y{}", self.x, self.y)
    }
}

/// An inclusive rectangle of physical sites.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct SiteRange {
    /// Lower-left site.
    pub low: SiteCoord,
    /// Upper-right site (inclusive).
    pub high: SiteCoord,
}

impl SiteRange {
    /// Creates a range spanning `low` to `high` inclusive.
    pub fn new(low: SiteCoord, high: SiteCoord) -> Self {
        Self { low, high }
    }

    /// Number of site columns.
    pub fn width(&self) -> u32 {
        self.high.x - self.low.x + 1
    }

    /// Number of site rows.
    pub fn height(&self) -> u32 {
        self.high.y - self.low.y + 1
    }

    /// Returns `true` if `site` lies inside the range.
    pub fn contains(&self, site: SiteCoord) -> bool {
        (self.low.x..=self.high.x).contains(&site.x) && (self.low.y..=self.high.y).contains(&site.y)
    }
}

/// Which die of a die-crossing pair a site belongs to.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum DieSide {
    /// The upper die.
    Top,
    /// The lower die.
    Bottom,
}

impl fmt::Display for DieSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DieSide::Top => f.write_str("top"),
            DieSide::Bottom => f.write_str("bottom"),
        }
    }
}

/// The physical buffer area between two adjacent slots.
///
/// `sites` are the generic fabric sites anchors may occupy. For a
/// die-crossing boundary `link` describes the dedicated link registers, which
/// are never part of `sites`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BufferRegion {
    /// Generic site ranges, disjoint.
    pub sites: Vec<SiteRange>,
    /// Link fabric of a die-crossing boundary.
    pub link: Option<crate::link::LinkRegion>,
}

impl BufferRegion {
    /// Returns `true` if this boundary crosses between dies.
    pub fn die_crossing(&self) -> bool {
        self.link.is_some()
    }

    /// Total number of generic sites.
    pub fn site_count(&self) -> u64 {
        self.sites
            .iter()
            .map(|r| u64::from(r.width()) * u64::from(r.height()))
            .sum()
    }
}
