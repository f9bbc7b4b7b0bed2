use std::f64::consts::PI;

use crate::matcher::MatchOutcome;
use crate::model::{
    ByKind, ByRegion, Cell, CellComparison, CellCount, ClusterKinematics, PairDelta, Region,
    RegionCounts,
};
use crate::residual::Residuals;
use crate::weight::CellWeighting;

/// |eta| upper edges of the central, end-cap and forward regions.
const REGION_EDGES: [f64; 3] = [1.5, 3.2, 5.0];

impl Region {
    pub fn classify(eta: f64) -> Option<Self> {
        let abs_eta = eta.abs();
        if abs_eta < REGION_EDGES[0] {
            Some(Self::Central)
        } else if abs_eta < REGION_EDGES[1] {
            Some(Self::EndCap)
        } else if abs_eta < REGION_EDGES[2] {
            Some(Self::Forward)
        } else {
            None
        }
    }
}

/// Wrap an angle difference into (-pi, pi].
pub fn wrap_phi(phi: f64) -> f64 {
    let mut wrapped = phi % (2.0 * PI);
    if wrapped > PI {
        wrapped -= 2.0 * PI;
    } else if wrapped <= -PI {
        wrapped += 2.0 * PI;
    }
    wrapped
}

impl PairDelta {
    /// Differences of `test` relative to `reference`.
    pub fn between(reference: &ClusterKinematics, test: &ClusterKinematics) -> Self {
        let delta_energy = test.energy - reference.energy;
        let delta_et = test.transverse_energy - reference.transverse_energy;
        let delta_eta = test.eta - reference.eta;
        let delta_phi = wrap_phi(test.phi - reference.phi);

        Self {
            delta_energy,
            delta_energy_rel: ratio(delta_energy, reference.energy).map(f64::abs),
            delta_et,
            delta_et_rel: ratio(delta_et, reference.transverse_energy),
            delta_eta,
            delta_phi,
            delta_r: delta_eta.hypot(delta_phi),
        }
    }
}

fn ratio(num: f64, denom: f64) -> Option<f64> {
    (denom != 0.0).then(|| num / denom)
}

#[derive(Debug, Default)]
struct Tally {
    total: usize,
    differing: usize,
}

impl Tally {
    fn count(&mut self, differs: bool) {
        self.total += 1;
        if differs {
            self.differing += 1;
        }
    }

    fn finish(&self) -> CellCount {
        let diff_fraction = if self.total > 0 {
            self.differing as f64 / self.total as f64
        } else {
            0.0
        };
        CellCount {
            total: self.total,
            differing: self.differing,
            diff_fraction,
        }
    }
}

/// Compare cell memberships of the two runs under the final assignment.
///
/// A clustered cell differs when it is unclustered in the other run or when
/// its two clusters are not matched to each other. A reference cluster keeps
/// `same_cells` only if neither it nor its matched test cluster owns a
/// differing cell. Cells at or below the terminal threshold only count
/// toward `overall` and `same_cells`.
pub fn compare_cells(
    cells: &[Cell],
    outcome: &MatchOutcome,
    weighting: &CellWeighting,
) -> CellComparison {
    let n_ref = outcome.ref_to_test.len();
    let n_test = outcome.test_to_ref.len();

    let mut overall = Tally::default();
    let mut by_kind = ByKind::<Tally>::default();
    let mut same_cells = vec![true; n_ref];
    let mut same_cells_by_kind = ByKind::splat(vec![true; n_ref]);
    let mut ref_cluster_sizes = vec![0; n_ref];
    let mut test_cluster_sizes = vec![0; n_test];

    for cell in cells {
        let r = cell.ref_cluster.filter(|&r| r < n_ref);
        let t = cell.test_cluster.filter(|&t| t < n_test);
        if r.is_none() && t.is_none() {
            continue;
        }

        let differs = match (r, t) {
            (Some(r), Some(t)) => outcome.ref_to_test[r] != Some(t),
            _ => true,
        };
        let kind = weighting.kind(cell.snr);

        if let Some(r) = r {
            ref_cluster_sizes[r] += 1;
        }
        if let Some(t) = t {
            test_cluster_sizes[t] += 1;
        }

        if differs {
            let partner = t.and_then(|t| outcome.test_to_ref[t]);
            for owner in [r, partner].into_iter().flatten().filter(|&o| o < n_ref) {
                same_cells[owner] = false;
                same_cells_by_kind.apply(kind, |same| same[owner] = false);
            }
        }

        overall.count(differs);
        by_kind.apply(kind, |tally| tally.count(differs));
    }

    CellComparison {
        overall: overall.finish(),
        by_kind: by_kind.map(|tally| tally.finish()),
        same_cells,
        same_cells_by_kind,
        ref_cluster_sizes,
        test_cluster_sizes,
    }
}

/// Count clusters and unmatched clusters of each run by region. Each
/// cluster is placed by its own eta.
pub fn count_regions(
    reference: &[ClusterKinematics],
    test: &[ClusterKinematics],
    residuals: &Residuals,
) -> ByRegion<RegionCounts> {
    let mut counts = ByRegion::<RegionCounts>::default();

    for cluster in reference {
        counts.apply(cluster.eta, |c| c.ref_clusters += 1);
    }
    for cluster in test {
        counts.apply(cluster.eta, |c| c.test_clusters += 1);
    }
    for cluster in residuals.unmatched_ref.iter().filter_map(|&r| reference.get(r)) {
        counts.apply(cluster.eta, |c| c.unmatched_ref += 1);
    }
    for cluster in residuals.unmatched_test.iter().filter_map(|&t| test.get(t)) {
        counts.apply(cluster.eta, |c| c.unmatched_test += 1);
    }

    counts.each_mut(|c| {
        c.max_clusters = c.ref_clusters.max(c.test_clusters);
        c.min_clusters = c.ref_clusters.min(c.test_clusters);
        c.cluster_diff = c.test_clusters as i64 - c.ref_clusters as i64;
        c.test_has_more = c.test_clusters > c.ref_clusters;
        c.max_unmatched = c.unmatched_ref.max(c.unmatched_test);
        c.min_unmatched = c.unmatched_ref.min(c.unmatched_test);
    });
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kin(energy: f64, et: f64, eta: f64, phi: f64) -> ClusterKinematics {
        ClusterKinematics { energy, transverse_energy: et, eta, phi }
    }

    fn cell(snr: f64, r: Option<usize>, t: Option<usize>) -> Cell {
        Cell { snr, energy: 0.0, ref_cluster: r, test_cluster: t }
    }

    fn outcome(ref_to_test: Vec<Option<usize>>, test_to_ref: Vec<Option<usize>>) -> MatchOutcome {
        let held_similarity = ref_to_test.iter().map(|m| m.map(|_| 1.0)).collect();
        MatchOutcome { ref_to_test, test_to_ref, held_similarity, rounds: 1, converged: true }
    }

    #[test]
    fn region_edges() {
        assert_eq!(Region::classify(0.0), Some(Region::Central));
        assert_eq!(Region::classify(-1.49), Some(Region::Central));
        assert_eq!(Region::classify(1.5), Some(Region::EndCap));
        assert_eq!(Region::classify(-3.2), Some(Region::Forward));
        assert_eq!(Region::classify(4.9), Some(Region::Forward));
        assert_eq!(Region::classify(5.0), None);
    }

    #[test]
    fn phi_wraps_across_the_seam() {
        let d = wrap_phi(3.1 - (-3.1));
        assert!((d - (6.2 - 2.0 * PI)).abs() < 1e-12);
        assert!(d < 0.0);
        assert_eq!(wrap_phi(PI), PI);
        assert_eq!(wrap_phi(-PI), PI);
        assert_eq!(wrap_phi(0.25), 0.25);
    }

    #[test]
    fn pair_delta_values() {
        let d = PairDelta::between(&kin(10.0, 5.0, 0.5, 1.0), &kin(11.0, 4.0, 0.8, 1.4));
        assert!((d.delta_energy - 1.0).abs() < 1e-12);
        assert!((d.delta_energy_rel.unwrap() - 0.1).abs() < 1e-12);
        assert!((d.delta_et + 1.0).abs() < 1e-12);
        assert!((d.delta_et_rel.unwrap() + 0.2).abs() < 1e-12);
        assert!((d.delta_r - 0.5).abs() < 1e-12);
    }

    #[test]
    fn pair_delta_relative_energy_is_absolute() {
        let d = PairDelta::between(&kin(10.0, 5.0, 0.0, 0.0), &kin(8.0, 4.0, 0.0, 0.0));
        assert!((d.delta_energy_rel.unwrap() - 0.2).abs() < 1e-12);
        assert!((d.delta_et_rel.unwrap() + 0.2).abs() < 1e-12);
    }

    #[test]
    fn zero_reference_energy_has_no_relative_delta() {
        let d = PairDelta::between(&kin(0.0, 0.0, 0.0, 0.0), &kin(1.0, 1.0, 0.0, 0.0));
        assert_eq!(d.delta_energy_rel, None);
        assert_eq!(d.delta_et_rel, None);
    }

    #[test]
    fn identical_clusterings_have_no_differences() {
        let cells = vec![
            cell(5.0, Some(0), Some(1)),
            cell(3.0, Some(0), Some(1)),
            cell(1.0, Some(1), Some(0)),
            cell(1.0, None, None),
        ];
        let out = outcome(vec![Some(1), Some(0)], vec![Some(1), Some(0)]);
        let cmp = compare_cells(&cells, &out, &CellWeighting::default());
        assert_eq!(cmp.overall.total, 3);
        assert_eq!(cmp.overall.differing, 0);
        assert_eq!(cmp.overall.diff_fraction, 0.0);
        assert_eq!(cmp.same_cells, vec![true, true]);
        assert_eq!(cmp.ref_cluster_sizes, vec![2, 1]);
        assert_eq!(cmp.test_cluster_sizes, vec![1, 2]);
    }

    #[test]
    fn differences_by_kind_and_cluster() {
        let cells = vec![
            cell(5.0, Some(0), Some(0)),
            // grow cell only in the test run, attached to test 0
            cell(3.0, None, Some(0)),
            // terminal cell of reference 1 sits in test 0
            cell(1.0, Some(1), Some(0)),
            cell(1.0, Some(1), None),
        ];
        let out = outcome(vec![Some(0), None], vec![Some(0)]);
        let cmp = compare_cells(&cells, &out, &CellWeighting::default());
        assert_eq!(cmp.overall.total, 4);
        assert_eq!(cmp.overall.differing, 3);
        assert_eq!(cmp.by_kind.seed.total, 1);
        assert_eq!(cmp.by_kind.seed.differing, 0);
        assert_eq!(cmp.by_kind.grow.total, 1);
        assert_eq!(cmp.by_kind.grow.differing, 1);
        assert_eq!(cmp.by_kind.above_terminal.total, 4);
        assert_eq!(cmp.by_kind.above_terminal.differing, 3);
        assert_eq!(cmp.by_kind.above_terminal.diff_fraction, 0.75);
        assert_eq!(cmp.same_cells, vec![false, false]);
        assert_eq!(cmp.same_cells_by_kind.seed, vec![true, true]);
        assert_eq!(cmp.same_cells_by_kind.grow, vec![false, true]);
        assert_eq!(cmp.same_cells_by_kind.above_terminal, vec![false, false]);
    }

    #[test]
    fn seed_cells_count_above_terminal() {
        let cells = vec![
            // seed cell of reference 0, unclustered in the test run
            cell(10.0, Some(0), None),
            // at the terminal threshold: overall only
            cell(0.0, Some(0), None),
        ];
        let out = outcome(vec![None], vec![]);
        let cmp = compare_cells(&cells, &out, &CellWeighting::default());
        assert_eq!(cmp.overall.total, 2);
        assert_eq!(cmp.overall.differing, 2);
        assert_eq!(cmp.by_kind.seed.total, 1);
        assert_eq!(cmp.by_kind.seed.differing, 1);
        assert_eq!(cmp.by_kind.grow.total, 0);
        assert_eq!(cmp.by_kind.grow.diff_fraction, 0.0);
        assert_eq!(cmp.by_kind.above_terminal.total, 1);
        assert_eq!(cmp.by_kind.above_terminal.differing, 1);
        assert_eq!(cmp.same_cells, vec![false]);
        assert_eq!(cmp.same_cells_by_kind.seed, vec![false]);
        assert_eq!(cmp.same_cells_by_kind.grow, vec![true]);
        assert_eq!(cmp.same_cells_by_kind.above_terminal, vec![false]);
    }

    #[test]
    fn region_counts_place_clusters_by_own_eta() {
        let reference = vec![
            kin(1.0, 1.0, 0.2, 0.0),
            kin(1.0, 1.0, 2.0, 0.0),
            kin(1.0, 1.0, -4.0, 0.0),
        ];
        // the second test cluster lies past the forward edge
        let test = vec![kin(1.0, 1.0, 0.1, 0.0), kin(1.0, 1.0, 6.0, 0.0)];
        let residuals = Residuals { unmatched_ref: vec![1, 2], unmatched_test: vec![1] };

        let regions = count_regions(&reference, &test, &residuals);

        assert_eq!(
            regions.all,
            RegionCounts {
                ref_clusters: 3,
                test_clusters: 2,
                max_clusters: 3,
                min_clusters: 2,
                cluster_diff: -1,
                test_has_more: false,
                unmatched_ref: 2,
                unmatched_test: 1,
                max_unmatched: 2,
                min_unmatched: 1,
            }
        );
        assert_eq!(regions.central.ref_clusters, 1);
        assert_eq!(regions.central.test_clusters, 1);
        assert_eq!(regions.central.cluster_diff, 0);
        assert_eq!(regions.central.max_unmatched, 0);
        assert_eq!(regions.end_cap.unmatched_ref, 1);
        assert_eq!(regions.end_cap.cluster_diff, -1);
        assert_eq!(regions.forward.ref_clusters, 1);
        assert_eq!(regions.forward.test_clusters, 0);
        assert_eq!(regions.forward.min_unmatched, 0);
    }

    #[test]
    fn region_counts_flag_more_test_clusters() {
        let reference = vec![kin(1.0, 1.0, 3.5, 0.0)];
        let test = vec![kin(1.0, 1.0, 3.6, 0.0), kin(1.0, 1.0, -3.4, 0.0)];
        let residuals = Residuals { unmatched_ref: vec![], unmatched_test: vec![1] };

        let regions = count_regions(&reference, &test, &residuals);
        assert!(regions.forward.test_has_more);
        assert_eq!(regions.forward.cluster_diff, 1);
        assert_eq!(regions.forward.max_clusters, 2);
        assert_eq!(regions.forward.unmatched_test, 1);
        assert!(!regions.central.test_has_more);
        assert_eq!(regions.all, regions.forward);
    }
}
