//! `clustercmp-match` — reference/test calorimeter cluster matching engine.
//!
//! Pure engine crate: receives per-cell cluster tags and SNR for two
//! clustering runs of the same event, returns a one-to-one cluster
//! correspondence plus comparison figures. No CLI or IO dependencies.

pub mod cells;
pub mod compare;
pub mod config;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod model;
pub mod preference;
pub mod residual;
pub mod similarity;
pub mod summary;
pub mod weight;

pub use config::MatchConfig;
pub use engine::{match_clusters, match_event, ClusterMatching};
pub use error::MatchError;
pub use matcher::{DeferredAcceptance, MatchOutcome};
pub use model::{ClusterKinematics, EventInput, EventReport, RawCell};
pub use preference::PreferenceLists;
pub use residual::Residuals;
pub use similarity::{Similarity, SimilarityMatrix};
pub use weight::{CellKind, CellWeighting};
