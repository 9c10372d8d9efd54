//! Hook metrics writer — persists the engine's view of a run.
//!
//! This is one of two independent producers: the agent activation
//! pipeline writes its own snapshot separately, and the diagnostics
//! crate reconciles the two. The writers must stay separate so drift
//! between them remains observable.

use crate::engine::EngineMetrics;
use chrono::Utc;
use std::io;
use std::path::Path;
use synapse_core::metrics::{HookLayerStatus, HookMetrics};
use synapse_core::{paths, Bracket};
use tracing::debug;

/// Write `.synapse/metrics/hook-metrics.json` under the project root.
pub fn write_hook_metrics(
    root: &Path,
    bracket: Bracket,
    metrics: &EngineMetrics,
) -> io::Result<()> {
    let snapshot = HookMetrics {
        total_duration: metrics.total_ms,
        bracket: bracket.to_string(),
        layers_loaded: metrics.layers_loaded,
        per_layer: metrics
            .per_layer
            .iter()
            .map(|(name, layer)| {
                (
                    name.clone(),
                    HookLayerStatus {
                        duration: layer.duration_ms,
                        status: layer.status.clone(),
                        rules: layer.rules,
                    },
                )
            })
            .collect(),
        timestamp: Utc::now(),
    };

    let dir = paths::metrics_dir(root);
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_vec_pretty(&snapshot).map_err(io::Error::other)?;
    let path = paths::hook_metrics_path(root);
    std::fs::write(&path, json)?;
    debug!(path = %path.display(), "Metrics: wrote hook snapshot");
    Ok(())
}
