use crate::matcher::MatchOutcome;
use crate::model::ClusterIndex;

/// Clusters left without a counterpart, in ascending index order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Residuals {
    pub unmatched_ref: Vec<ClusterIndex>,
    pub unmatched_test: Vec<ClusterIndex>,
}

impl Residuals {
    pub fn extract(outcome: &MatchOutcome) -> Self {
        Self {
            unmatched_ref: unmatched(&outcome.ref_to_test),
            unmatched_test: unmatched(&outcome.test_to_ref),
        }
    }
}

fn unmatched(assignment: &[Option<ClusterIndex>]) -> Vec<ClusterIndex> {
    assignment
        .iter()
        .enumerate()
        .filter(|(_, m)| m.is_none())
        .map(|(i, _)| i)
        .collect()
}
