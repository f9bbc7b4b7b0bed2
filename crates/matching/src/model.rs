use serde::{Deserialize, Serialize};

use crate::config::MatchConfig;
use crate::weight::CellKind;

/// Dense index of a cluster within its own population.
pub type ClusterIndex = usize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One detector cell as delivered by the loader. Tags are the raw cluster
/// indices of each run; negative means "not clustered".
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct RawCell {
    pub snr: f64,
    pub energy: f64,
    pub ref_tag: i64,
    pub test_tag: i64,
}

/// A sanitized cell: absolute SNR, in-range cluster memberships only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub snr: f64,
    pub energy: f64,
    pub ref_cluster: Option<ClusterIndex>,
    pub test_cluster: Option<ClusterIndex>,
}

/// Reconstructed cluster quantities, energies in GeV.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct ClusterKinematics {
    pub energy: f64,
    pub transverse_energy: f64,
    pub eta: f64,
    pub phi: f64,
}

/// Everything needed to match one event. Population sizes are the lengths
/// of `reference` and `test`.
#[derive(Debug, Clone, Default)]
pub struct EventInput {
    pub cells: Vec<RawCell>,
    pub reference: Vec<ClusterKinematics>,
    pub test: Vec<ClusterKinematics>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Reference,
    Test,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reference => write!(f, "reference"),
            Self::Test => write!(f, "test"),
        }
    }
}

/// A cluster tag that pointed past its population and was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagAnomaly {
    pub cell: usize,
    pub side: Side,
    pub tag: i64,
    pub population: usize,
}

impl std::fmt::Display for TagAnomaly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "cell {}: {} tag {} outside population of {} clusters",
            self.cell, self.side, self.tag, self.population
        )
    }
}

// ---------------------------------------------------------------------------
// Pair comparison
// ---------------------------------------------------------------------------

/// Pseudorapidity region of a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Central,
    EndCap,
    Forward,
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Central => write!(f, "central"),
            Self::EndCap => write!(f, "end_cap"),
            Self::Forward => write!(f, "forward"),
        }
    }
}

/// One value for the whole detector plus one per region. Clusters past the
/// forward edge only land in `all`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ByRegion<T> {
    pub all: T,
    pub central: T,
    pub end_cap: T,
    pub forward: T,
}

impl<T> ByRegion<T> {
    /// Apply `f` to `all` and to the slot of the region containing `eta`.
    pub fn apply(&mut self, eta: f64, mut f: impl FnMut(&mut T)) {
        f(&mut self.all);
        match Region::classify(eta) {
            Some(Region::Central) => f(&mut self.central),
            Some(Region::EndCap) => f(&mut self.end_cap),
            Some(Region::Forward) => f(&mut self.forward),
            None => {}
        }
    }

    pub fn each_mut(&mut self, mut f: impl FnMut(&mut T)) {
        for slot in [&mut self.all, &mut self.central, &mut self.end_cap, &mut self.forward] {
            f(slot);
        }
    }
}

/// Cluster populations of one region, by the cluster's own eta.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegionCounts {
    pub ref_clusters: usize,
    pub test_clusters: usize,
    pub max_clusters: usize,
    pub min_clusters: usize,
    /// Test minus reference.
    pub cluster_diff: i64,
    pub test_has_more: bool,
    pub unmatched_ref: usize,
    pub unmatched_test: usize,
    pub max_unmatched: usize,
    pub min_unmatched: usize,
}

/// Test-minus-reference differences of a matched pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairDelta {
    pub delta_energy: f64,
    pub delta_energy_rel: Option<f64>,
    pub delta_et: f64,
    pub delta_et_rel: Option<f64>,
    pub delta_eta: f64,
    pub delta_phi: f64,
    pub delta_r: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedPair {
    pub reference: ClusterIndex,
    pub test: ClusterIndex,
    /// Shared weight over the reference cluster's total weight.
    pub similarity_ref: f64,
    /// Shared weight over the test cluster's total weight.
    pub similarity_test: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
    pub delta: PairDelta,
}

// ---------------------------------------------------------------------------
// Cell comparison
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CellCount {
    pub total: usize,
    pub differing: usize,
    pub diff_fraction: f64,
}

/// Per cell-kind breakdown along the threshold ladder. `above_terminal`
/// holds every cell over the terminal threshold, seed and grow included.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ByKind<T> {
    pub seed: T,
    pub grow: T,
    pub above_terminal: T,
}

impl<T> ByKind<T> {
    pub fn splat(value: T) -> Self
    where
        T: Clone,
    {
        Self { seed: value.clone(), grow: value.clone(), above_terminal: value }
    }

    /// Apply `f` to every bucket a cell of `kind` falls into.
    pub fn apply(&mut self, kind: CellKind, mut f: impl FnMut(&mut T)) {
        match kind {
            CellKind::Seed => f(&mut self.seed),
            CellKind::Grow => f(&mut self.grow),
            CellKind::Terminal | CellKind::Below => {}
        }
        if kind != CellKind::Below {
            f(&mut self.above_terminal);
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> ByKind<U> {
        ByKind {
            seed: f(self.seed),
            grow: f(self.grow),
            above_terminal: f(self.above_terminal),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CellComparison {
    /// Cells clustered in at least one run.
    pub overall: CellCount,
    pub by_kind: ByKind<CellCount>,
    /// Indexed by reference cluster.
    pub same_cells: Vec<bool>,
    /// `same_cells` looking only at cells of each kind.
    pub same_cells_by_kind: ByKind<Vec<bool>>,
    pub ref_cluster_sizes: Vec<usize>,
    pub test_cluster_sizes: Vec<usize>,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventSummary {
    pub reference_clusters: usize,
    pub test_clusters: usize,
    pub matched: usize,
    pub unmatched_ref: usize,
    pub unmatched_test: usize,
    pub rounds: usize,
    pub max_iterations: usize,
    pub converged: bool,
    pub tag_anomalies: usize,
    pub cell_diff_fraction: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventMeta {
    pub engine_version: String,
    pub run_at: String,
    pub config: MatchConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventReport {
    pub meta: EventMeta,
    pub summary: EventSummary,
    pub pairs: Vec<MatchedPair>,
    pub ref_to_test: Vec<Option<ClusterIndex>>,
    pub test_to_ref: Vec<Option<ClusterIndex>>,
    pub unmatched_ref: Vec<ClusterIndex>,
    pub unmatched_test: Vec<ClusterIndex>,
    pub regions: ByRegion<RegionCounts>,
    pub cells: CellComparison,
    pub anomalies: Vec<TagAnomaly>,
}
