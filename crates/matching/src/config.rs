use serde::{Deserialize, Serialize};

use crate::error::MatchError;

pub const DEFAULT_MIN_SIMILARITY: f64 = 0.9;
pub const DEFAULT_TERM_WEIGHT: f64 = 1.0;
pub const DEFAULT_GROW_WEIGHT: f64 = 250.0;
pub const DEFAULT_SEED_WEIGHT: f64 = 5000.0;
pub const DEFAULT_MAX_ITERATIONS: usize = 32;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MatchConfig {
    /// Minimum relative similarity, applied on the test side when building
    /// candidate lists and on the reference side when accepting proposals.
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f64,
    /// Hard cap on proposal rounds.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default)]
    pub weights: WeightConfig,
    #[serde(default)]
    pub snr_thresholds: SnrThresholds,
}

fn default_min_similarity() -> f64 {
    DEFAULT_MIN_SIMILARITY
}

fn default_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            min_similarity: DEFAULT_MIN_SIMILARITY,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            weights: WeightConfig::default(),
            snr_thresholds: SnrThresholds::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Weights + thresholds
// ---------------------------------------------------------------------------

/// Multipliers applied to a cell's SNR depending on its tier.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WeightConfig {
    #[serde(default = "default_term")]
    pub term: f64,
    #[serde(default = "default_grow")]
    pub grow: f64,
    #[serde(default = "default_seed")]
    pub seed: f64,
}

fn default_term() -> f64 {
    DEFAULT_TERM_WEIGHT
}

fn default_grow() -> f64 {
    DEFAULT_GROW_WEIGHT
}

fn default_seed() -> f64 {
    DEFAULT_SEED_WEIGHT
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            term: DEFAULT_TERM_WEIGHT,
            grow: DEFAULT_GROW_WEIGHT,
            seed: DEFAULT_SEED_WEIGHT,
        }
    }
}

/// Lower (exclusive) SNR bounds of the terminal, growing and seed tiers.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SnrThresholds {
    #[serde(default)]
    pub terminal: f64,
    #[serde(default = "default_grow_threshold")]
    pub grow: f64,
    #[serde(default = "default_seed_threshold")]
    pub seed: f64,
}

fn default_grow_threshold() -> f64 {
    2.0
}

fn default_seed_threshold() -> f64 {
    4.0
}

impl Default for SnrThresholds {
    fn default() -> Self {
        Self {
            terminal: 0.0,
            grow: default_grow_threshold(),
            seed: default_seed_threshold(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl MatchConfig {
    pub fn from_toml(input: &str) -> Result<Self, MatchError> {
        let config: MatchConfig =
            toml::from_str(input).map_err(|e| MatchError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        if !self.min_similarity.is_finite() || !(0.0..=1.0).contains(&self.min_similarity) {
            return Err(MatchError::ConfigValidation(format!(
                "min_similarity must be within [0, 1], got {}",
                self.min_similarity
            )));
        }

        if self.max_iterations == 0 {
            return Err(MatchError::ConfigValidation(
                "max_iterations must be at least 1".into(),
            ));
        }

        let w = &self.weights;
        for (name, value) in [("term", w.term), ("grow", w.grow), ("seed", w.seed)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(MatchError::ConfigValidation(format!(
                    "weights.{name} must be positive, got {value}"
                )));
            }
        }

        let t = &self.snr_thresholds;
        if ![t.terminal, t.grow, t.seed].iter().all(|v| v.is_finite()) {
            return Err(MatchError::ConfigValidation(
                "snr_thresholds must be finite".into(),
            ));
        }
        if !(t.terminal < t.grow && t.grow < t.seed) {
            return Err(MatchError::ConfigValidation(format!(
                "snr_thresholds must be strictly ascending, got terminal={} grow={} seed={}",
                t.terminal, t.grow, t.seed
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
min_similarity = 0.75
max_iterations = 8

[weights]
term = 2.0
grow = 100.0
seed = 1000.0

[snr_thresholds]
terminal = 0.5
grow = 3.0
seed = 6.0
"#;

    #[test]
    fn parse_full() {
        let config = MatchConfig::from_toml(FULL).unwrap();
        assert_eq!(config.min_similarity, 0.75);
        assert_eq!(config.max_iterations, 8);
        assert_eq!(config.weights.grow, 100.0);
        assert_eq!(config.snr_thresholds.seed, 6.0);
    }

    #[test]
    fn empty_document_gives_reference_configuration() {
        let config = MatchConfig::from_toml("").unwrap();
        assert_eq!(config, MatchConfig::default());
        assert_eq!(config.min_similarity, 0.9);
        assert_eq!(config.weights.term, 1.0);
        assert_eq!(config.weights.grow, 250.0);
        assert_eq!(config.weights.seed, 5000.0);
        assert_eq!(config.snr_thresholds.terminal, 0.0);
        assert_eq!(config.snr_thresholds.grow, 2.0);
        assert_eq!(config.snr_thresholds.seed, 4.0);
        assert_eq!(config.max_iterations, 32);
    }

    #[test]
    fn partial_table_keeps_other_defaults() {
        let config = MatchConfig::from_toml("[weights]\nseed = 10000.0\n").unwrap();
        assert_eq!(config.weights.seed, 10000.0);
        assert_eq!(config.weights.grow, 250.0);
    }

    #[test]
    fn reject_unknown_key() {
        let err = MatchConfig::from_toml("min_similarty = 0.5\n").unwrap_err();
        assert!(matches!(err, MatchError::ConfigParse(_)));
    }

    #[test]
    fn reject_similarity_out_of_range() {
        let err = MatchConfig::from_toml("min_similarity = 1.5\n").unwrap_err();
        assert!(err.to_string().contains("min_similarity"));
    }

    #[test]
    fn reject_non_positive_weight() {
        let err = MatchConfig::from_toml("[weights]\ngrow = 0.0\n").unwrap_err();
        assert!(err.to_string().contains("weights.grow"));
    }

    #[test]
    fn reject_unordered_thresholds() {
        let err = MatchConfig::from_toml("[snr_thresholds]\ngrow = 5.0\n").unwrap_err();
        assert!(err.to_string().contains("strictly ascending"));
    }

    #[test]
    fn reject_zero_iterations() {
        let err = MatchConfig::from_toml("max_iterations = 0\n").unwrap_err();
        assert!(err.to_string().contains("max_iterations"));
    }
}
