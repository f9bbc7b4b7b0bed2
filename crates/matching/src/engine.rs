use crate::cells::sanitize_cells;
use crate::compare::{compare_cells, count_regions};
use crate::config::MatchConfig;
use crate::error::MatchError;
use crate::matcher::{DeferredAcceptance, MatchOutcome};
use crate::model::{
    Cell, EventInput, EventMeta, EventReport, MatchedPair, PairDelta, Region,
};
use crate::preference::PreferenceLists;
use crate::residual::Residuals;
use crate::similarity::Similarity;
use crate::summary::compute_summary;
use crate::weight::CellWeighting;

/// Intermediate and final products of matching one event. The similarity
/// matrix and normalisations are kept for diagnostics.
#[derive(Debug, Clone)]
pub struct ClusterMatching {
    pub similarity: Similarity,
    pub preferences: PreferenceLists,
    pub outcome: MatchOutcome,
    pub residuals: Residuals,
}

/// Match reference and test clusters over sanitized cells.
pub fn match_clusters(
    config: &MatchConfig,
    cells: &[Cell],
    n_ref: usize,
    n_test: usize,
) -> Result<ClusterMatching, MatchError> {
    config.validate()?;

    let weighting = CellWeighting::from_config(config);
    let similarity = Similarity::accumulate(cells, n_ref, n_test, &weighting);
    let preferences = PreferenceLists::build(&similarity, config.min_similarity);
    log::debug!(
        "{} candidate(s) across {} test clusters",
        preferences.total_candidates(),
        preferences.len()
    );

    let outcome = DeferredAcceptance::new(&similarity, &preferences, config.min_similarity)?
        .run(config.max_iterations);
    let residuals = Residuals::extract(&outcome);

    Ok(ClusterMatching {
        similarity,
        preferences,
        outcome,
        residuals,
    })
}

/// Run matching and comparison for one event.
pub fn match_event(config: &MatchConfig, input: &EventInput) -> Result<EventReport, MatchError> {
    let n_ref = input.reference.len();
    let n_test = input.test.len();

    let sanitized = sanitize_cells(&input.cells, n_ref, n_test)?;
    let matching = match_clusters(config, &sanitized.cells, n_ref, n_test)?;
    let ClusterMatching {
        similarity,
        outcome,
        residuals,
        ..
    } = matching;

    let pairs: Vec<MatchedPair> = outcome
        .pairs()
        .map(|(r, t)| {
            let reference = &input.reference[r];
            MatchedPair {
                reference: r,
                test: t,
                similarity_ref: similarity.ref_similarity(t, r),
                similarity_test: similarity.test_similarity(t, r),
                region: Region::classify(reference.eta),
                delta: PairDelta::between(reference, &input.test[t]),
            }
        })
        .collect();

    let regions = count_regions(&input.reference, &input.test, &residuals);
    let weighting = CellWeighting::from_config(config);
    let cells = compare_cells(&sanitized.cells, &outcome, &weighting);
    let summary = compute_summary(
        &outcome,
        &residuals,
        &cells,
        config.max_iterations,
        sanitized.anomalies.len(),
    );

    Ok(EventReport {
        meta: EventMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            config: config.clone(),
        },
        summary,
        pairs,
        ref_to_test: outcome.ref_to_test,
        test_to_ref: outcome.test_to_ref,
        unmatched_ref: residuals.unmatched_ref,
        unmatched_test: residuals.unmatched_test,
        regions,
        cells,
        anomalies: sanitized.anomalies,
    })
}
