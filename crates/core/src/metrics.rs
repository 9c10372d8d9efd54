//! Metrics artifact model — the two independently produced JSON snapshots.
//!
//! Two subsystems measure the same logical pipeline run without talking to
//! each other: the agent activation pipeline writes `uap-metrics.json` and
//! the engine's hook writes `hook-metrics.json`. Keeping the producers
//! separate is the point — the diagnostics crate reconciles them and flags
//! drift between the two views.
//!
//! Field names are camelCase on disk; these structs are the single schema
//! definition both the writer and the readers use.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Snapshot written by the agent activation pipeline (UAP).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UapMetrics {
    pub agent_id: String,

    /// "full" when every loader completed; anything else is degraded.
    pub quality: String,

    /// Wall-clock total, milliseconds.
    pub total_duration: f64,

    /// Per-loader timing and status.
    #[serde(default)]
    pub loaders: BTreeMap<String, LoaderStatus>,

    pub timestamp: DateTime<Utc>,
}

/// One loader's outcome inside the UAP snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderStatus {
    #[serde(default)]
    pub duration: f64,
    pub status: String,
}

/// Snapshot written by the engine's hook after a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookMetrics {
    /// Wall-clock total, milliseconds.
    pub total_duration: f64,

    /// Bracket name ("FRESH" .. "CRITICAL").
    pub bracket: String,

    pub layers_loaded: u32,

    /// Per-layer timing, status and rule count.
    #[serde(default)]
    pub per_layer: BTreeMap<String, HookLayerStatus>,

    pub timestamp: DateTime<Utc>,
}

/// One layer's outcome inside the hook snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookLayerStatus {
    #[serde(default)]
    pub duration: f64,
    pub status: String,
    #[serde(default)]
    pub rules: u32,
}

/// The active-agent pointer file maintained by the session bridge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveAgentPointer {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uap_metrics_round_trip_uses_camel_case() {
        let metrics = UapMetrics {
            agent_id: "dev".into(),
            quality: "full".into(),
            total_duration: 100.0,
            loaders: BTreeMap::from([(
                "agentConfig".into(),
                LoaderStatus {
                    duration: 10.0,
                    status: "ok".into(),
                },
            )]),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&metrics).unwrap();
        assert!(json.contains("\"agentId\""));
        assert!(json.contains("\"totalDuration\""));
        let back: UapMetrics = serde_json::from_str(&json).unwrap();
        assert_eq!(back.agent_id, "dev");
        assert_eq!(back.loaders["agentConfig"].status, "ok");
    }

    #[test]
    fn hook_metrics_round_trip() {
        let metrics = HookMetrics {
            total_duration: 42.0,
            bracket: "MODERATE".into(),
            layers_loaded: 3,
            per_layer: BTreeMap::from([(
                "constitution".into(),
                HookLayerStatus {
                    duration: 5.0,
                    status: "ok".into(),
                    rules: 3,
                },
            )]),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&metrics).unwrap();
        assert!(json.contains("\"layersLoaded\""));
        assert!(json.contains("\"perLayer\""));
        let back: HookMetrics = serde_json::from_str(&json).unwrap();
        assert_eq!(back.bracket, "MODERATE");
        assert_eq!(back.per_layer["constitution"].rules, 3);
    }

    #[test]
    fn tolerates_missing_optional_maps() {
        let uap: UapMetrics = serde_json::from_str(
            r#"{"agentId":"qa","quality":"full","totalDuration":1.0,
                "timestamp":"2026-02-11T10:00:00Z"}"#,
        )
        .unwrap();
        assert!(uap.loaders.is_empty());
    }
}
