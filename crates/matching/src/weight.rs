use serde::Serialize;

use crate::config::{MatchConfig, SnrThresholds, WeightConfig};

/// Tier of a cell in the clustering threshold ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    Seed,
    Grow,
    Terminal,
    /// At or below the terminal threshold; carries no weight.
    Below,
}

impl CellKind {
    /// Thresholds are exclusive lower bounds: an SNR equal to a threshold
    /// belongs to the lower tier.
    pub fn classify(snr: f64, thresholds: &SnrThresholds) -> Self {
        if snr > thresholds.seed {
            Self::Seed
        } else if snr > thresholds.grow {
            Self::Grow
        } else if snr > thresholds.terminal {
            Self::Terminal
        } else {
            Self::Below
        }
    }
}

impl std::fmt::Display for CellKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Seed => write!(f, "seed"),
            Self::Grow => write!(f, "grow"),
            Self::Terminal => write!(f, "terminal"),
            Self::Below => write!(f, "below"),
        }
    }
}

/// Converts a cell's absolute SNR into its matching weight.
#[derive(Debug, Clone, Copy)]
pub struct CellWeighting {
    pub thresholds: SnrThresholds,
    pub weights: WeightConfig,
}

impl CellWeighting {
    pub fn new(thresholds: SnrThresholds, weights: WeightConfig) -> Self {
        Self { thresholds, weights }
    }

    pub fn from_config(config: &MatchConfig) -> Self {
        Self::new(config.snr_thresholds, config.weights)
    }

    pub fn kind(&self, snr: f64) -> CellKind {
        CellKind::classify(snr, &self.thresholds)
    }

    pub fn weight(&self, snr: f64) -> f64 {
        match self.kind(snr) {
            CellKind::Seed => snr * self.weights.seed,
            CellKind::Grow => snr * self.weights.grow,
            CellKind::Terminal => snr * self.weights.term,
            CellKind::Below => 0.0,
        }
    }
}

impl Default for CellWeighting {
    fn default() -> Self {
        Self::new(SnrThresholds::default(), WeightConfig::default())
    }
}
