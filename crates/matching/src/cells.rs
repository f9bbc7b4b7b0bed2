use crate::error::MatchError;
use crate::model::{Cell, ClusterIndex, RawCell, Side, TagAnomaly};

/// Sanitized cells plus the tags that had to be dropped on the way.
#[derive(Debug, Clone, Default)]
pub struct SanitizedCells {
    pub cells: Vec<Cell>,
    pub anomalies: Vec<TagAnomaly>,
}

/// Turn loader rows into matcher input.
///
/// Negative tags mean "unclustered". Tags at or past the population size are
/// cleared and reported as [`TagAnomaly`]; reporting them is up to the caller.
/// A NaN or infinite SNR is rejected: it cannot be placed on the threshold
/// ladder and would poison the cluster normalisations.
pub fn sanitize_cells(
    raw: &[RawCell],
    n_ref: usize,
    n_test: usize,
) -> Result<SanitizedCells, MatchError> {
    let mut out = SanitizedCells {
        cells: Vec::with_capacity(raw.len()),
        anomalies: Vec::new(),
    };

    for (i, row) in raw.iter().enumerate() {
        if !row.snr.is_finite() {
            return Err(MatchError::InvalidSnr { cell: i, value: row.snr });
        }
        let ref_cluster = resolve_tag(i, row.ref_tag, n_ref, Side::Reference, &mut out.anomalies);
        let test_cluster = resolve_tag(i, row.test_tag, n_test, Side::Test, &mut out.anomalies);
        out.cells.push(Cell {
            snr: row.snr.abs(),
            energy: row.energy,
            ref_cluster,
            test_cluster,
        });
    }

    Ok(out)
}

fn resolve_tag(
    cell: usize,
    tag: i64,
    population: usize,
    side: Side,
    anomalies: &mut Vec<TagAnomaly>,
) -> Option<ClusterIndex> {
    if tag < 0 {
        return None;
    }
    match usize::try_from(tag) {
        Ok(index) if index < population => Some(index),
        _ => {
            anomalies.push(TagAnomaly { cell, side, tag, population });
            None
        }
    }
}
