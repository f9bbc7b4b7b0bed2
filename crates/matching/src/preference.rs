use std::cmp::Reverse;

use ordered_float::OrderedFloat;

use crate::model::ClusterIndex;
use crate::similarity::Similarity;

/// Ranked reference candidates for every test cluster.
///
/// Stored as one flat candidate array plus an offset table: the candidates of
/// test cluster `t` are `candidates[offsets[t]..offsets[t + 1]]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceLists {
    candidates: Vec<ClusterIndex>,
    offsets: Vec<usize>,
}

impl PreferenceLists {
    /// Rank each test cluster's overlapping reference clusters by shared
    /// weight (descending, ties by ascending index), keeping the prefix whose
    /// test-side similarity stays at or above `min_similarity`.
    pub fn build(similarity: &Similarity, min_similarity: f64) -> Self {
        let n_test = similarity.n_test();
        let mut candidates = Vec::new();
        let mut offsets = Vec::with_capacity(n_test + 1);
        offsets.push(0);

        let mut ranked: Vec<ClusterIndex> = Vec::new();
        for t in 0..n_test {
            let row = similarity.matrix.row(t);
            ranked.clear();
            ranked.extend((0..row.len()).filter(|&r| row[r] > 0.0));
            ranked.sort_by_key(|&r| (Reverse(OrderedFloat(row[r])), r));

            candidates.extend(
                ranked
                    .iter()
                    .copied()
                    .take_while(|&r| similarity.test_similarity(t, r) >= min_similarity),
            );
            offsets.push(candidates.len());
        }

        Self { candidates, offsets }
    }

    /// Number of test clusters.
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn candidates(&self, test: ClusterIndex) -> &[ClusterIndex] {
        &self.candidates[self.offsets[test]..self.offsets[test + 1]]
    }

    pub fn total_candidates(&self) -> usize {
        self.candidates.len()
    }
}
