//! `.synapse/` directory conventions.
//!
//! Everything the pipeline reads or writes lives under a `.synapse/`
//! directory at the project root:
//!
//! ```text
//! .synapse/manifest                      domain manifest
//! .synapse/<file>                        domain rule files
//! .synapse/commands                      star-command definitions
//! .synapse/metrics/uap-metrics.json      UAP snapshot (external producer)
//! .synapse/metrics/hook-metrics.json     engine hook snapshot
//! .synapse/sessions/_active-agent.json   active-agent pointer
//! squads/<id>/.synapse/                  per-squad manifest + rule files
//! ```

use std::path::{Path, PathBuf};

pub const SYNAPSE_DIR: &str = ".synapse";
pub const MANIFEST_FILE: &str = "manifest";
pub const COMMANDS_FILE: &str = "commands";
pub const UAP_METRICS_FILE: &str = "uap-metrics.json";
pub const HOOK_METRICS_FILE: &str = "hook-metrics.json";
pub const ACTIVE_AGENT_FILE: &str = "_active-agent.json";

/// `.synapse/` under a project root.
pub fn synapse_dir(root: &Path) -> PathBuf {
    root.join(SYNAPSE_DIR)
}

/// The manifest inside a `.synapse/` directory.
pub fn manifest_path(synapse: &Path) -> PathBuf {
    synapse.join(MANIFEST_FILE)
}

/// The star-command definitions file.
pub fn commands_path(synapse: &Path) -> PathBuf {
    synapse.join(COMMANDS_FILE)
}

pub fn metrics_dir(root: &Path) -> PathBuf {
    synapse_dir(root).join("metrics")
}

pub fn uap_metrics_path(root: &Path) -> PathBuf {
    metrics_dir(root).join(UAP_METRICS_FILE)
}

pub fn hook_metrics_path(root: &Path) -> PathBuf {
    metrics_dir(root).join(HOOK_METRICS_FILE)
}

pub fn sessions_dir(root: &Path) -> PathBuf {
    synapse_dir(root).join("sessions")
}

pub fn active_agent_path(root: &Path) -> PathBuf {
    sessions_dir(root).join(ACTIVE_AGENT_FILE)
}

/// The squads directory next to `.synapse/`.
pub fn squads_dir(root: &Path) -> PathBuf {
    root.join("squads")
}

/// One squad's own `.synapse/` directory.
pub fn squad_synapse_dir(root: &Path, squad_id: &str) -> PathBuf {
    squads_dir(root).join(squad_id).join(SYNAPSE_DIR)
}
