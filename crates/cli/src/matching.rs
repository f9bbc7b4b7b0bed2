//! `clustercmp match` / `clustercmp validate`.

use std::path::{Path, PathBuf};

use clap::Args;

use clustercmp_match::{match_event, EventReport, MatchConfig, MatchError};

use crate::exit_codes::EXIT_UNMATCHED;
use crate::load::load_event;
use crate::CliError;

#[derive(Args)]
pub struct MatchArgs {
    /// Cell table: snr,energy,ref_tag,test_tag (row = cell index)
    #[arg(long)]
    pub cells: PathBuf,

    /// Reference cluster table: energy,transverse_energy,eta,phi
    #[arg(long)]
    pub reference: PathBuf,

    /// Test cluster table: energy,transverse_energy,eta,phi
    #[arg(long)]
    pub test: PathBuf,

    /// Match config (TOML); defaults apply when omitted
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override min_similarity
    #[arg(long, short = 's')]
    pub min_similarity: Option<f64>,

    /// Override the terminal, growing and seed cell weights
    #[arg(long, short = 'w', num_args = 3, value_names = ["TERM", "GROW", "SEED"])]
    pub weights: Option<Vec<f64>>,

    /// Override max_iterations
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Output JSON to stdout instead of only the human summary
    #[arg(long)]
    pub json: bool,

    /// Write JSON output to file
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Exit with a distinct code when any cluster is left unmatched
    #[arg(long)]
    pub strict: bool,
}

fn input_err(err: MatchError) -> CliError {
    CliError::input(err.to_string())
}

fn read_config(path: &Path) -> Result<MatchConfig, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::input(format!("cannot read config {}: {e}", path.display())))?;
    MatchConfig::from_toml(&text).map_err(|e| CliError::config(e.to_string()))
}

/// Resolve the effective config: file (or defaults), then flag overrides.
fn effective_config(args: &MatchArgs) -> Result<MatchConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => read_config(path)?,
        None => MatchConfig::default(),
    };

    if let Some(min_similarity) = args.min_similarity {
        config.min_similarity = min_similarity;
    }
    if let Some(weights) = &args.weights {
        match weights.as_slice() {
            [term, grow, seed] => {
                config.weights.term = *term;
                config.weights.grow = *grow;
                config.weights.seed = *seed;
            }
            _ => return Err(CliError::args("--weights takes exactly three values")),
        }
    }
    if let Some(max_iterations) = args.max_iterations {
        config.max_iterations = max_iterations;
    }

    config.validate().map_err(|e| {
        CliError::config(e.to_string()).with_hint("check --min-similarity, --weights and --max-iterations")
    })?;
    Ok(config)
}

pub fn cmd_match(args: MatchArgs) -> Result<(), CliError> {
    let config = effective_config(&args)?;
    let input = load_event(&args.cells, &args.reference, &args.test).map_err(input_err)?;

    let report = match_event(&config, &input).map_err(input_err)?;
    log_diagnostics(&report);

    let json_str = serde_json::to_string_pretty(&report)
        .map_err(|e| CliError::other(format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::other(format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if args.json {
        println!("{json_str}");
    }

    // Human summary to stderr
    let s = &report.summary;
    eprintln!(
        "matched {} of {} reference / {} test clusters in {} round(s), {} unmatched reference, {} unmatched test, {:.2}% cells differ",
        s.matched,
        s.reference_clusters,
        s.test_clusters,
        s.rounds,
        s.unmatched_ref,
        s.unmatched_test,
        s.cell_diff_fraction * 100.0,
    );

    if args.strict && !s.fully_matched() {
        return Err(CliError::new(EXIT_UNMATCHED, "unmatched clusters found"));
    }

    Ok(())
}

fn log_diagnostics(report: &EventReport) {
    for anomaly in &report.anomalies {
        log::warn!("invalid cluster tag cleared: {anomaly}");
    }

    let regions = &report.regions;
    log::info!(
        "clusters by region (reference/test): central {}/{}, end-cap {}/{}, forward {}/{}",
        regions.central.ref_clusters,
        regions.central.test_clusters,
        regions.end_cap.ref_clusters,
        regions.end_cap.test_clusters,
        regions.forward.ref_clusters,
        regions.forward.test_clusters,
    );

    let s = &report.summary;
    if s.converged {
        log::info!("matching converged after {} of {} rounds", s.rounds, s.max_iterations);
    } else {
        log::warn!(
            "matching stopped at the round cap ({}) with proposals pending; assignment is partial",
            s.max_iterations
        );
    }
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = read_config(&config_path)?;
    eprintln!(
        "config OK: min_similarity={}, weights={}/{}/{}, snr_thresholds={}/{}/{}, max_iterations={}",
        config.min_similarity,
        config.weights.term,
        config.weights.grow,
        config.weights.seed,
        config.snr_thresholds.terminal,
        config.snr_thresholds.grow,
        config.snr_thresholds.seed,
        config.max_iterations,
    );
    Ok(())
}
