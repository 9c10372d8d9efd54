//! Relevance matrix — grades observed component status against what the
//! active agent actually needs.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use synapse_core::metrics::{ActiveAgentPointer, HookMetrics, UapMetrics};
use synapse_core::paths;
use tracing::debug;

/// How much an agent depends on a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Critical,
    Important,
    Useful,
    Irrelevant,
}

/// One row of the matrix: a component with its graded importance and the
/// status the metrics actually observed.
#[derive(Debug, Clone, Serialize)]
pub struct MatrixRow {
    pub component: String,
    pub importance: Importance,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RelevanceReport {
    /// False when no metrics artifact identifies an agent.
    pub available: bool,
    pub agent_id: Option<String>,
    pub matrix: Vec<MatrixRow>,
    /// Critical components whose observed status is not "ok".
    pub gaps: Vec<String>,
    /// 100 when gap-free, else the rounded percentage of gap-free
    /// components.
    pub score: u32,
}

/// The baseline importance of each pipeline component.
pub fn default_relevance() -> BTreeMap<&'static str, Importance> {
    BTreeMap::from([
        ("constitution", Importance::Critical),
        ("global", Importance::Important),
        ("agent", Importance::Critical),
        ("workflow", Importance::Useful),
        ("task", Importance::Useful),
        ("squad", Importance::Useful),
        ("keyword", Importance::Useful),
        ("star_command", Importance::Useful),
        ("memory", Importance::Irrelevant),
    ])
}

/// Per-agent adjustments layered over [`default_relevance`].
pub fn agent_overrides(agent_id: &str) -> BTreeMap<&'static str, Importance> {
    match agent_id {
        // Implementation agents lean on task and workflow context.
        "dev" => BTreeMap::from([
            ("task", Importance::Critical),
            ("workflow", Importance::Important),
            ("memory", Importance::Useful),
        ]),
        // Operations agents live off commands and recall.
        "devops" => BTreeMap::from([
            ("star_command", Importance::Critical),
            ("keyword", Importance::Important),
        ]),
        _ => BTreeMap::new(),
    }
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Option<T> {
    let raw = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Diagnostics: unreadable artifact");
            None
        }
    }
}

/// Build the relevance report for a project root.
pub fn collect_relevance_matrix(root: &Path) -> RelevanceReport {
    let uap: Option<UapMetrics> = load_json(&paths::uap_metrics_path(root));
    let hook: Option<HookMetrics> = load_json(&paths::hook_metrics_path(root));
    let pointer: Option<ActiveAgentPointer> = load_json(&paths::active_agent_path(root));

    let agent_id = uap
        .as_ref()
        .map(|u| u.agent_id.clone())
        .or_else(|| pointer.map(|p| p.id));
    let Some(agent_id) = agent_id else {
        return RelevanceReport {
            available: false,
            agent_id: None,
            matrix: Vec::new(),
            gaps: Vec::new(),
            score: 0,
        };
    };

    let mut table = default_relevance();
    for (component, importance) in agent_overrides(&agent_id) {
        table.insert(component, importance);
    }

    let mut matrix = Vec::with_capacity(table.len());
    let mut gaps = Vec::new();
    for (component, importance) in &table {
        let status = uap
            .as_ref()
            .and_then(|u| u.loaders.get(*component))
            .map(|l| l.status.clone())
            .or_else(|| {
                hook.as_ref()
                    .and_then(|h| h.per_layer.get(*component))
                    .map(|l| l.status.clone())
            })
            .unwrap_or_else(|| "missing".to_string());

        if *importance == Importance::Critical && status != "ok" {
            gaps.push(component.to_string());
        }
        matrix.push(MatrixRow {
            component: component.to_string(),
            importance: *importance,
            status,
        });
    }

    let score = if gaps.is_empty() {
        100
    } else {
        let total = matrix.len() as f64;
        let gap_free = total - gaps.len() as f64;
        (gap_free / total * 100.0).round() as u32
    };

    RelevanceReport {
        available: true,
        agent_id: Some(agent_id),
        matrix,
        gaps,
        score,
    }
}
