//! Consistency collector — cross-checks the two metrics snapshots.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use synapse_core::metrics::{ActiveAgentPointer, HookMetrics, UapMetrics};
use synapse_core::{paths, Bracket};
use tracing::debug;

/// Maximum tolerated gap between the two snapshots' timestamps,
/// inclusive: a gap of exactly ten minutes still passes.
pub const MAX_TIMESTAMP_GAP_MS: i64 = 600_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// One named cross-check.
#[derive(Debug, Clone, Serialize)]
pub struct ConsistencyCheck {
    pub name: String,
    pub status: CheckStatus,
    pub detail: String,
}

/// The collector's verdict over one pair of snapshots.
#[derive(Debug, Clone, Serialize)]
pub struct ConsistencyReport {
    /// False when neither snapshot could be read.
    pub available: bool,
    pub checks: Vec<ConsistencyCheck>,
    /// Number of checks that passed.
    pub score: u32,
    /// Number of checks evaluated.
    pub max_score: u32,
}

/// Read a JSON artifact, treating unreadable or corrupt files as absent.
fn load_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let raw = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Diagnostics: unreadable artifact");
            None
        }
    }
}

fn check(name: &str, status: CheckStatus, detail: impl Into<String>) -> ConsistencyCheck {
    ConsistencyCheck {
        name: name.into(),
        status,
        detail: detail.into(),
    }
}

/// Collect the consistency report for a project root.
pub fn collect_consistency_metrics(root: &Path) -> ConsistencyReport {
    let uap: Option<UapMetrics> = load_json(&paths::uap_metrics_path(root));
    let hook: Option<HookMetrics> = load_json(&paths::hook_metrics_path(root));
    let pointer: Option<ActiveAgentPointer> = load_json(&paths::active_agent_path(root));

    let (uap, hook) = match (uap, hook) {
        (None, None) => {
            return ConsistencyReport {
                available: false,
                checks: Vec::new(),
                score: 0,
                max_score: 0,
            };
        }
        (Some(_), None) => {
            return single_warn("Hook metrics missing");
        }
        (None, Some(_)) => {
            return single_warn("UAP metrics missing");
        }
        (Some(u), Some(h)) => (u, h),
    };

    let mut checks = Vec::with_capacity(4);

    checks.push(if hook.bracket.parse::<Bracket>().is_ok() {
        check("bracket", CheckStatus::Pass, format!("bracket {}", hook.bracket))
    } else {
        check(
            "bracket",
            CheckStatus::Fail,
            format!("unrecognized bracket {:?}", hook.bracket),
        )
    });

    checks.push(match &pointer {
        Some(pointer) if pointer.id == uap.agent_id => {
            check("agent", CheckStatus::Pass, format!("agent {}", uap.agent_id))
        }
        Some(pointer) => check(
            "agent",
            CheckStatus::Fail,
            format!("UAP agent {} but pointer {}", uap.agent_id, pointer.id),
        ),
        None => check("agent", CheckStatus::Warn, "active-agent pointer missing"),
    });

    let gap_ms = (uap.timestamp - hook.timestamp).num_milliseconds().abs();
    checks.push(if gap_ms <= MAX_TIMESTAMP_GAP_MS {
        check("timestamp", CheckStatus::Pass, format!("gap {gap_ms}ms"))
    } else {
        check(
            "timestamp",
            CheckStatus::Fail,
            format!("snapshots {gap_ms}ms apart"),
        )
    });

    checks.push(if uap.quality == "full" && hook.layers_loaded >= 1 {
        check("quality", CheckStatus::Pass, "full activation, layers loaded")
    } else {
        check(
            "quality",
            CheckStatus::Fail,
            format!(
                "quality {:?}, {} layers loaded",
                uap.quality, hook.layers_loaded
            ),
        )
    });

    let score = checks
        .iter()
        .filter(|c| c.status == CheckStatus::Pass)
        .count() as u32;
    let max_score = checks.len() as u32;
    ConsistencyReport {
        available: true,
        checks,
        score,
        max_score,
    }
}

fn single_warn(detail: &str) -> ConsistencyReport {
    ConsistencyReport {
        available: true,
        checks: vec![check("presence", CheckStatus::Warn, detail)],
        score: 0,
        max_score: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    fn uap(agent: &str, quality: &str, ts: chrono::DateTime<Utc>) -> UapMetrics {
        UapMetrics {
            agent_id: agent.into(),
            quality: quality.into(),
            total_duration: 10.0,
            loaders: BTreeMap::new(),
            timestamp: ts,
        }
    }

    fn hook(bracket: &str, layers: u32, ts: chrono::DateTime<Utc>) -> HookMetrics {
        HookMetrics {
            total_duration: 5.0,
            bracket: bracket.into(),
            layers_loaded: layers,
            per_layer: BTreeMap::new(),
            timestamp: ts,
        }
    }

    fn write_artifacts(
        root: &Path,
        uap: Option<&UapMetrics>,
        hook: Option<&HookMetrics>,
        pointer: Option<&str>,
    ) {
        std::fs::create_dir_all(paths::metrics_dir(root)).unwrap();
        std::fs::create_dir_all(paths::sessions_dir(root)).unwrap();
        if let Some(uap) = uap {
            let json = serde_json::to_string(uap).unwrap();
            std::fs::write(paths::uap_metrics_path(root), json).unwrap();
        }
        if let Some(hook) = hook {
            let json = serde_json::to_string(hook).unwrap();
            std::fs::write(paths::hook_metrics_path(root), json).unwrap();
        }
        if let Some(id) = pointer {
            let json = format!("{{\"id\":\"{id}\"}}");
            std::fs::write(paths::active_agent_path(root), json).unwrap();
        }
    }

    #[test]
    fn unavailable_when_both_snapshots_missing() {
        let root = tempdir().unwrap();
        let report = collect_consistency_metrics(root.path());
        assert!(!report.available);
        assert!(report.checks.is_empty());
        assert_eq!(report.max_score, 0);
    }

    #[test]
    fn single_snapshot_warns_about_the_other() {
        let root = tempdir().unwrap();
        let now = Utc::now();
        write_artifacts(root.path(), Some(&uap("dev", "full", now)), None, None);
        let report = collect_consistency_metrics(root.path());
        assert!(report.available);
        assert_eq!(report.checks.len(), 1);
        assert_eq!(report.checks[0].status, CheckStatus::Warn);
        assert_eq!(report.checks[0].detail, "Hook metrics missing");

        let root = tempdir().unwrap();
        write_artifacts(root.path(), None, Some(&hook("FRESH", 3, now)), None);
        let report = collect_consistency_metrics(root.path());
        assert_eq!(report.checks[0].detail, "UAP metrics missing");
    }

    #[test]
    fn all_four_checks_pass_on_healthy_artifacts() {
        let root = tempdir().unwrap();
        let now = Utc::now();
        write_artifacts(
            root.path(),
            Some(&uap("dev", "full", now)),
            Some(&hook("MODERATE", 4, now)),
            Some("dev"),
        );
        let report = collect_consistency_metrics(root.path());
        assert!(report.available);
        assert_eq!(report.score, 4);
        assert_eq!(report.max_score, 4);
    }

    #[test]
    fn bad_bracket_fails_the_bracket_check() {
        let root = tempdir().unwrap();
        let now = Utc::now();
        write_artifacts(
            root.path(),
            Some(&uap("dev", "full", now)),
            Some(&hook("TIGHT", 4, now)),
            Some("dev"),
        );
        let report = collect_consistency_metrics(root.path());
        let bracket = report.checks.iter().find(|c| c.name == "bracket").unwrap();
        assert_eq!(bracket.status, CheckStatus::Fail);
        assert_eq!(report.score, 3);
    }

    #[test]
    fn agent_mismatch_fails_missing_pointer_warns() {
        let root = tempdir().unwrap();
        let now = Utc::now();
        write_artifacts(
            root.path(),
            Some(&uap("dev", "full", now)),
            Some(&hook("FRESH", 4, now)),
            Some("qa"),
        );
        let report = collect_consistency_metrics(root.path());
        let agent = report.checks.iter().find(|c| c.name == "agent").unwrap();
        assert_eq!(agent.status, CheckStatus::Fail);

        let root = tempdir().unwrap();
        write_artifacts(
            root.path(),
            Some(&uap("dev", "full", now)),
            Some(&hook("FRESH", 4, now)),
            None,
        );
        let report = collect_consistency_metrics(root.path());
        let agent = report.checks.iter().find(|c| c.name == "agent").unwrap();
        assert_eq!(agent.status, CheckStatus::Warn);
    }

    #[test]
    fn timestamp_gap_boundary_is_inclusive() {
        let now = Utc::now();

        let root = tempdir().unwrap();
        write_artifacts(
            root.path(),
            Some(&uap("dev", "full", now)),
            Some(&hook("FRESH", 1, now - Duration::milliseconds(MAX_TIMESTAMP_GAP_MS))),
            Some("dev"),
        );
        let report = collect_consistency_metrics(root.path());
        let ts = report.checks.iter().find(|c| c.name == "timestamp").unwrap();
        assert_eq!(ts.status, CheckStatus::Pass);

        let root = tempdir().unwrap();
        write_artifacts(
            root.path(),
            Some(&uap("dev", "full", now)),
            Some(&hook(
                "FRESH",
                1,
                now - Duration::milliseconds(MAX_TIMESTAMP_GAP_MS + 1),
            )),
            Some("dev"),
        );
        let report = collect_consistency_metrics(root.path());
        let ts = report.checks.iter().find(|c| c.name == "timestamp").unwrap();
        assert_eq!(ts.status, CheckStatus::Fail);
    }

    #[test]
    fn degraded_quality_or_zero_layers_fails_quality() {
        let now = Utc::now();

        let root = tempdir().unwrap();
        write_artifacts(
            root.path(),
            Some(&uap("dev", "degraded", now)),
            Some(&hook("FRESH", 3, now)),
            Some("dev"),
        );
        let report = collect_consistency_metrics(root.path());
        let quality = report.checks.iter().find(|c| c.name == "quality").unwrap();
        assert_eq!(quality.status, CheckStatus::Fail);

        let root = tempdir().unwrap();
        write_artifacts(
            root.path(),
            Some(&uap("dev", "full", now)),
            Some(&hook("FRESH", 0, now)),
            Some("dev"),
        );
        let report = collect_consistency_metrics(root.path());
        let quality = report.checks.iter().find(|c| c.name == "quality").unwrap();
        assert_eq!(quality.status, CheckStatus::Fail);
    }

    #[test]
    fn corrupt_artifact_treated_as_absent() {
        let root = tempdir().unwrap();
        std::fs::create_dir_all(paths::metrics_dir(root.path())).unwrap();
        std::fs::write(paths::uap_metrics_path(root.path()), "{ not json").unwrap();
        let report = collect_consistency_metrics(root.path());
        assert!(!report.available);
    }
}
