//! Offline diagnostics over the metrics artifacts.
//!
//! Two snapshots describe the same logical run from different vantage
//! points: the agent activation pipeline's `uap-metrics.json` and the
//! engine's `hook-metrics.json`. The collectors here read both after the
//! fact and report drift; they never run inside the prompt hot path and
//! never fail — missing or corrupt artifacts degrade the report.

pub mod consistency;
pub mod relevance;

pub use consistency::{
    collect_consistency_metrics, CheckStatus, ConsistencyCheck, ConsistencyReport,
    MAX_TIMESTAMP_GAP_MS,
};
pub use relevance::{
    agent_overrides, collect_relevance_matrix, default_relevance, Importance, MatrixRow,
    RelevanceReport,
};
