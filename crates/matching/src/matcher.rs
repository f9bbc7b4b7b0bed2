use crate::error::MatchError;
use crate::model::ClusterIndex;
use crate::preference::PreferenceLists;
use crate::similarity::Similarity;

/// Final assignment of a matching run.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    pub ref_to_test: Vec<Option<ClusterIndex>>,
    pub test_to_ref: Vec<Option<ClusterIndex>>,
    /// Reference-side similarity of the held proposal, per reference cluster.
    pub held_similarity: Vec<Option<f64>>,
    /// Proposal rounds actually run.
    pub rounds: usize,
    /// False when the round cap stopped the run with proposals still pending.
    pub converged: bool,
}

impl MatchOutcome {
    /// Matched `(reference, test)` pairs in ascending reference order.
    pub fn pairs(&self) -> impl Iterator<Item = (ClusterIndex, ClusterIndex)> + '_ {
        self.ref_to_test
            .iter()
            .enumerate()
            .filter_map(|(r, t)| t.map(|t| (r, t)))
    }

    pub fn matched(&self) -> usize {
        self.ref_to_test.iter().filter(|t| t.is_some()).count()
    }
}

/// Test clusters propose down their ranked candidate lists; reference
/// clusters hold the strongest proposal seen so far.
///
/// A held proposal is only displaced by a strictly larger reference-side
/// similarity, so ties stay with the incumbent. The displaced test cluster
/// moves past that candidate and proposes again in the next round.
#[derive(Debug)]
pub struct DeferredAcceptance<'a> {
    similarity: &'a Similarity,
    preferences: &'a PreferenceLists,
    min_similarity: f64,
    ref_to_test: Vec<Option<ClusterIndex>>,
    best_weight: Vec<f64>,
    next_candidate: Vec<usize>,
    holding: Vec<bool>,
}

impl<'a> DeferredAcceptance<'a> {
    /// `preferences` must be built from `similarity`: one list per test
    /// cluster, every candidate a valid reference index.
    pub fn new(
        similarity: &'a Similarity,
        preferences: &'a PreferenceLists,
        min_similarity: f64,
    ) -> Result<Self, MatchError> {
        let n_ref = similarity.n_ref();
        let n_test = similarity.n_test();
        if preferences.len() != n_test {
            return Err(MatchError::LengthMismatch {
                what: "preference lists".to_string(),
                expected: n_test,
                found: preferences.len(),
            });
        }
        if let Some(max) = (0..n_test)
            .flat_map(|t| preferences.candidates(t).iter().copied())
            .max()
            .filter(|&r| r >= n_ref)
        {
            return Err(MatchError::LengthMismatch {
                what: "reference clusters named by preference lists".to_string(),
                expected: n_ref,
                found: max + 1,
            });
        }

        Ok(Self {
            similarity,
            preferences,
            min_similarity,
            ref_to_test: vec![None; n_ref],
            best_weight: vec![-1.0; n_ref],
            next_candidate: vec![0; n_test],
            holding: vec![false; n_test],
        })
    }

    /// Run rounds until no test cluster has a proposal left to make, or until
    /// `max_iterations` rounds have run.
    pub fn run(mut self, max_iterations: usize) -> MatchOutcome {
        let mut rounds = 0;
        while rounds < max_iterations && self.has_pending() {
            self.round();
            rounds += 1;
        }
        let converged = !self.has_pending();

        log::debug!(
            "deferred acceptance: {rounds} round(s), cap {max_iterations}, converged={converged}"
        );

        self.finish(rounds, converged)
    }

    /// A test cluster is pending when it holds nothing and still has
    /// candidates to try.
    fn is_pending(&self, test: ClusterIndex) -> bool {
        !self.holding[test]
            && self.next_candidate[test] < self.preferences.candidates(test).len()
    }

    fn has_pending(&self) -> bool {
        (0..self.holding.len()).any(|t| self.is_pending(t))
    }

    /// Every cluster pending at the start of the round proposes once.
    /// Clusters displaced during the round wait for the next one.
    fn round(&mut self) {
        let proposers: Vec<ClusterIndex> =
            (0..self.holding.len()).filter(|&t| self.is_pending(t)).collect();

        for t in proposers {
            let r = self.preferences.candidates(t)[self.next_candidate[t]];
            let s = self.similarity.ref_similarity(t, r);

            if s >= self.min_similarity && s > self.best_weight[r] {
                if let Some(previous) = self.ref_to_test[r] {
                    self.next_candidate[previous] += 1;
                    self.holding[previous] = false;
                }
                self.ref_to_test[r] = Some(t);
                self.best_weight[r] = s;
                self.holding[t] = true;
            } else {
                self.next_candidate[t] += 1;
            }
        }
    }

    fn finish(self, rounds: usize, converged: bool) -> MatchOutcome {
        let mut test_to_ref = vec![None; self.holding.len()];
        for (r, t) in self.ref_to_test.iter().enumerate() {
            if let Some(t) = *t {
                test_to_ref[t] = Some(r);
            }
        }

        let held_similarity = self
            .ref_to_test
            .iter()
            .zip(&self.best_weight)
            .map(|(t, &w)| t.map(|_| w))
            .collect();

        MatchOutcome {
            ref_to_test: self.ref_to_test,
            test_to_ref,
            held_similarity,
            rounds,
            converged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::SimilarityMatrix;

    fn similarity(rows: &[Vec<f64>], ref_norm: Vec<f64>, test_norm: Vec<f64>) -> Similarity {
        let matrix = SimilarityMatrix::from_rows(ref_norm.len(), rows).unwrap();
        Similarity::from_parts(matrix, ref_norm, test_norm).unwrap()
    }

    fn run(sim: &Similarity, min_similarity: f64, max_iterations: usize) -> MatchOutcome {
        let prefs = PreferenceLists::build(sim, min_similarity);
        DeferredAcceptance::new(sim, &prefs, min_similarity)
            .unwrap()
            .run(max_iterations)
    }

    #[test]
    fn diagonal_matches_in_one_round() {
        let sim = similarity(
            &[vec![10.0, 0.0], vec![0.0, 10.0]],
            vec![10.0, 10.0],
            vec![10.0, 10.0],
        );
        let out = run(&sim, 0.9, 32);
        assert_eq!(out.ref_to_test, vec![Some(0), Some(1)]);
        assert_eq!(out.test_to_ref, vec![Some(0), Some(1)]);
        assert_eq!(out.rounds, 1);
        assert!(out.converged);
        assert_eq!(out.held_similarity, vec![Some(1.0), Some(1.0)]);
    }

    #[test]
    fn weak_secondary_overlap_does_not_disturb_diagonal() {
        let sim = similarity(
            &[vec![10.0, 9.5], vec![0.0, 10.0]],
            vec![10.0, 10.0],
            vec![10.0, 10.0],
        );
        let out = run(&sim, 0.9, 32);
        assert_eq!(out.ref_to_test, vec![Some(0), Some(1)]);
        assert_eq!(out.test_to_ref, vec![Some(0), Some(1)]);
    }

    #[test]
    fn stronger_proposal_displaces_holder() {
        // Reference 1 is split 4/6 between test 0 and test 1; test 0 also
        // covers most of reference 0.
        let sim = similarity(
            &[vec![3.0, 4.0], vec![0.0, 6.0]],
            vec![5.0, 10.0],
            vec![7.0, 6.0],
        );
        let out = run(&sim, 0.3, 32);
        assert_eq!(out.ref_to_test, vec![Some(0), Some(1)]);
        assert_eq!(out.test_to_ref, vec![Some(0), Some(1)]);
        assert_eq!(out.rounds, 2);
        assert!(out.converged);
    }

    #[test]
    fn tie_keeps_incumbent() {
        let sim = similarity(
            &[vec![5.0], vec![5.0]],
            vec![10.0],
            vec![5.0, 5.0],
        );
        let out = run(&sim, 0.5, 32);
        assert_eq!(out.ref_to_test, vec![Some(0)]);
        assert_eq!(out.test_to_ref, vec![Some(0), None]);
    }

    #[test]
    fn reference_side_threshold_blocks_match() {
        // Test 0 lies fully inside reference 0, but covers only 40% of it.
        let sim = similarity(&[vec![4.0]], vec![10.0], vec![4.0]);
        let out = run(&sim, 0.9, 32);
        assert_eq!(out.ref_to_test, vec![None]);
        assert_eq!(out.test_to_ref, vec![None]);
        assert!(out.converged);
    }

    #[test]
    fn round_cap_stops_early() {
        let sim = similarity(
            &[vec![3.0, 4.0], vec![0.0, 6.0]],
            vec![5.0, 10.0],
            vec![7.0, 6.0],
        );
        let out = run(&sim, 0.3, 1);
        assert_eq!(out.rounds, 1);
        assert!(!out.converged);
        assert_eq!(out.ref_to_test, vec![None, Some(1)]);
        assert_eq!(out.test_to_ref, vec![None, Some(1)]);
    }

    #[test]
    fn empty_populations() {
        let sim = similarity(&[], vec![1.0], vec![]);
        let out = run(&sim, 0.9, 32);
        assert_eq!(out.ref_to_test, vec![None]);
        assert!(out.test_to_ref.is_empty());
        assert_eq!(out.rounds, 0);
        assert!(out.converged);

        let sim = similarity(&[vec![], vec![]], vec![], vec![1.0, 1.0]);
        let out = run(&sim, 0.9, 32);
        assert!(out.ref_to_test.is_empty());
        assert_eq!(out.test_to_ref, vec![None, None]);
    }

    #[test]
    fn all_zero_matrix_matches_nothing() {
        let sim = similarity(
            &[vec![0.0, 0.0], vec![0.0, 0.0]],
            vec![3.0, 0.0],
            vec![0.0, 2.0],
        );
        let out = run(&sim, 0.0, 32);
        assert_eq!(out.matched(), 0);
        assert_eq!(out.rounds, 0);
    }

    #[test]
    fn preferences_from_another_event_are_rejected() {
        let three = similarity(
            &[vec![1.0], vec![1.0], vec![1.0]],
            vec![3.0],
            vec![1.0, 1.0, 1.0],
        );
        let one = similarity(&[vec![1.0]], vec![1.0], vec![1.0]);
        let prefs = PreferenceLists::build(&three, 0.5);

        let err = DeferredAcceptance::new(&one, &prefs, 0.5).unwrap_err();
        assert!(matches!(
            err,
            MatchError::LengthMismatch { expected: 1, found: 3, .. }
        ));
    }

    #[test]
    fn candidates_past_the_reference_population_are_rejected() {
        let wide = similarity(&[vec![0.0, 4.0]], vec![1.0, 4.0], vec![4.0]);
        let narrow = similarity(&[vec![4.0]], vec![4.0], vec![4.0]);
        let prefs = PreferenceLists::build(&wide, 0.5);
        assert_eq!(prefs.candidates(0), &[1]);

        let err = DeferredAcceptance::new(&narrow, &prefs, 0.5).unwrap_err();
        assert!(matches!(
            err,
            MatchError::LengthMismatch { expected: 1, found: 2, .. }
        ));
    }
}
