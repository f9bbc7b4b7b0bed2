use crate::error::MatchError;
use crate::model::{Cell, ClusterIndex};
use crate::weight::CellWeighting;

/// Dense `n_test x n_ref` table of shared cell weight, stored row-major by
/// test cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    n_test: usize,
    n_ref: usize,
    weights: Vec<f64>,
}

impl SimilarityMatrix {
    pub fn zeros(n_test: usize, n_ref: usize) -> Self {
        Self {
            n_test,
            n_ref,
            weights: vec![0.0; n_test * n_ref],
        }
    }

    /// Build from one row per test cluster. Every row must have `n_ref` entries.
    pub fn from_rows(n_ref: usize, rows: &[Vec<f64>]) -> Result<Self, MatchError> {
        let mut matrix = Self::zeros(rows.len(), n_ref);
        for (t, row) in rows.iter().enumerate() {
            if row.len() != n_ref {
                return Err(MatchError::LengthMismatch {
                    what: format!("similarity row {t}"),
                    expected: n_ref,
                    found: row.len(),
                });
            }
            matrix.weights[t * n_ref..(t + 1) * n_ref].copy_from_slice(row);
        }
        Ok(matrix)
    }

    pub fn n_test(&self) -> usize {
        self.n_test
    }

    pub fn n_ref(&self) -> usize {
        self.n_ref
    }

    pub fn get(&self, test: ClusterIndex, reference: ClusterIndex) -> f64 {
        self.weights[test * self.n_ref + reference]
    }

    pub fn row(&self, test: ClusterIndex) -> &[f64] {
        &self.weights[test * self.n_ref..(test + 1) * self.n_ref]
    }

    fn add(&mut self, test: ClusterIndex, reference: ClusterIndex, weight: f64) {
        self.weights[test * self.n_ref + reference] += weight;
    }
}

/// Shared-weight matrix plus the per-cluster totals used to normalise it.
#[derive(Debug, Clone, PartialEq)]
pub struct Similarity {
    pub matrix: SimilarityMatrix,
    pub ref_norm: Vec<f64>,
    pub test_norm: Vec<f64>,
}

impl Similarity {
    /// One pass over all cells. A cell adds its weight to the matrix entry of
    /// its (test, reference) pair when clustered in both runs, and to each
    /// side's total independently.
    pub fn accumulate(
        cells: &[Cell],
        n_ref: usize,
        n_test: usize,
        weighting: &CellWeighting,
    ) -> Self {
        let mut matrix = SimilarityMatrix::zeros(n_test, n_ref);
        let mut ref_norm = vec![0.0; n_ref];
        let mut test_norm = vec![0.0; n_test];

        for cell in cells {
            let ref_cluster = cell.ref_cluster.filter(|&r| r < n_ref);
            let test_cluster = cell.test_cluster.filter(|&t| t < n_test);
            if ref_cluster.is_none() && test_cluster.is_none() {
                continue;
            }

            let weight = weighting.weight(cell.snr);
            if let (Some(r), Some(t)) = (ref_cluster, test_cluster) {
                matrix.add(t, r, weight);
            }
            if let Some(r) = ref_cluster {
                ref_norm[r] += weight;
            }
            if let Some(t) = test_cluster {
                test_norm[t] += weight;
            }
        }

        log::debug!(
            "accumulated similarity over {} cells ({} reference x {} test clusters)",
            cells.len(),
            n_ref,
            n_test
        );

        Self { matrix, ref_norm, test_norm }
    }

    /// Assemble from precomputed parts, checking that the dimensions agree.
    pub fn from_parts(
        matrix: SimilarityMatrix,
        ref_norm: Vec<f64>,
        test_norm: Vec<f64>,
    ) -> Result<Self, MatchError> {
        if ref_norm.len() != matrix.n_ref() {
            return Err(MatchError::LengthMismatch {
                what: "reference normalisation".into(),
                expected: matrix.n_ref(),
                found: ref_norm.len(),
            });
        }
        if test_norm.len() != matrix.n_test() {
            return Err(MatchError::LengthMismatch {
                what: "test normalisation".into(),
                expected: matrix.n_test(),
                found: test_norm.len(),
            });
        }
        Ok(Self { matrix, ref_norm, test_norm })
    }

    pub fn n_ref(&self) -> usize {
        self.matrix.n_ref()
    }

    pub fn n_test(&self) -> usize {
        self.matrix.n_test()
    }

    /// Shared weight relative to the reference cluster's total.
    pub fn ref_similarity(&self, test: ClusterIndex, reference: ClusterIndex) -> f64 {
        relative(self.matrix.get(test, reference), self.ref_norm[reference])
    }

    /// Shared weight relative to the test cluster's total.
    pub fn test_similarity(&self, test: ClusterIndex, reference: ClusterIndex) -> f64 {
        relative(self.matrix.get(test, reference), self.test_norm[test])
    }
}

/// A cluster that gathered no weight is similar to nothing.
fn relative(shared: f64, total: f64) -> f64 {
    if total > 0.0 {
        shared / total
    } else {
        0.0
    }
}
