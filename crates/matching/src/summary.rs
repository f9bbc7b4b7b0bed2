use crate::matcher::MatchOutcome;
use crate::model::{CellComparison, EventSummary};
use crate::residual::Residuals;

/// Compute summary statistics for one matched event.
pub fn compute_summary(
    outcome: &MatchOutcome,
    residuals: &Residuals,
    cells: &CellComparison,
    max_iterations: usize,
    tag_anomalies: usize,
) -> EventSummary {
    EventSummary {
        reference_clusters: outcome.ref_to_test.len(),
        test_clusters: outcome.test_to_ref.len(),
        matched: outcome.matched(),
        unmatched_ref: residuals.unmatched_ref.len(),
        unmatched_test: residuals.unmatched_test.len(),
        rounds: outcome.rounds,
        max_iterations,
        converged: outcome.converged,
        tag_anomalies,
        cell_diff_fraction: cells.overall.diff_fraction,
    }
}

impl EventSummary {
    /// True when every cluster on both sides found a counterpart.
    pub fn fully_matched(&self) -> bool {
        self.unmatched_ref == 0 && self.unmatched_test == 0
    }
}
