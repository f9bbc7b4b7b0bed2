//! CSV loading for cells and cluster tables.

use std::path::Path;

use serde::de::DeserializeOwned;

use clustercmp_match::model::{ClusterKinematics, EventInput, RawCell};
use clustercmp_match::MatchError;

/// Parse a cell table: header `snr,energy,ref_tag,test_tag`, one row per
/// detector cell in cell-index order. Extra columns are ignored.
pub fn parse_cells(data: &str) -> Result<Vec<RawCell>, MatchError> {
    parse_rows(data)
}

/// Parse a cluster table: header `energy,transverse_energy,eta,phi`, one row
/// per cluster in cluster-index order.
pub fn parse_clusters(data: &str) -> Result<Vec<ClusterKinematics>, MatchError> {
    parse_rows(data)
}

fn parse_rows<T: DeserializeOwned>(data: &str) -> Result<Vec<T>, MatchError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data.as_bytes());

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: T = result.map_err(csv_error)?;
        rows.push(row);
    }
    Ok(rows)
}

fn csv_error(err: csv::Error) -> MatchError {
    let line = err.position().map(|p| p.line() as usize).unwrap_or(0);
    let message = match err.kind() {
        csv::ErrorKind::Deserialize { err, .. } => err.to_string(),
        _ => err.to_string(),
    };
    MatchError::Csv { line, message }
}

fn read(path: &Path) -> Result<String, MatchError> {
    std::fs::read_to_string(path)
        .map_err(|e| MatchError::Io(format!("cannot read {}: {e}", path.display())))
}

/// Load one event from its three tables.
pub fn load_event(cells: &Path, reference: &Path, test: &Path) -> Result<EventInput, MatchError> {
    let with_path = |path: &Path, err: MatchError| match err {
        MatchError::Csv { line, message } => MatchError::Csv {
            line,
            message: format!("{}: {message}", path.display()),
        },
        other => other,
    };

    let cell_rows = parse_cells(&read(cells)?).map_err(|e| with_path(cells, e))?;
    let ref_rows = parse_clusters(&read(reference)?).map_err(|e| with_path(reference, e))?;
    let test_rows = parse_clusters(&read(test)?).map_err(|e| with_path(test, e))?;

    log::info!(
        "loaded {} cells, {} reference clusters, {} test clusters",
        cell_rows.len(),
        ref_rows.len(),
        test_rows.len()
    );

    Ok(EventInput {
        cells: cell_rows,
        reference: ref_rows,
        test: test_rows,
    })
}
