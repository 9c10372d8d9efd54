//! Manifest parser.
//!
//! The manifest is a line-oriented `KEY=value` file. Keys are either
//! global flags or `<DOMAIN>_<SUFFIX>` pairs:
//!
//! ```text
//! # comment
//! DEVMODE=false
//! GLOBAL_EXCLUDE=skip,ignore
//! CONSTITUTION_STATE=active
//! CONSTITUTION_ALWAYS_ON=true
//! CONSTITUTION_NON_NEGOTIABLE=true
//! AGENT_DEV_STATE=active
//! AGENT_DEV_AGENT_TRIGGER=dev
//! SECURITY_RECALL=security,vulnerability
//! ```
//!
//! Values split on the **first** `=` only, so values may themselves
//! contain `=`. Unknown suffixes are ignored for forward compatibility;
//! repeated attributes for the same domain overwrite (last write wins),
//! which lets manifests be composed from multiple sources.
//!
//! A missing or unreadable manifest is fatal: the pipeline cannot be
//! constructed without one. So is a non-comment line with no `=` at all.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use synapse_core::error::ManifestError;

/// Recognized domain attribute suffixes, longest-match-first where a
/// shorter suffix is a tail of a longer one (`_AGENT_TRIGGER` before
/// `_STATE` is irrelevant, but `_WORKFLOW_TRIGGER` must beat nothing).
pub const KNOWN_SUFFIXES: [&str; 7] = [
    "_AGENT_TRIGGER",
    "_WORKFLOW_TRIGGER",
    "_NON_NEGOTIABLE",
    "_ALWAYS_ON",
    "_STATE",
    "_RECALL",
    "_EXCLUDE",
];

/// Keys that configure the manifest as a whole rather than one domain.
pub const GLOBAL_KEYS: [&str; 2] = ["DEVMODE", "GLOBAL_EXCLUDE"];

/// Whether a domain is eligible to contribute at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainState {
    #[default]
    Active,
    Inactive,
}

/// One domain's declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainSpec {
    pub state: DomainState,

    /// Rule file name relative to the `.synapse/` directory. Defaults to
    /// the domain name lowercased with `_` → `-`.
    pub file: String,

    pub always_on: bool,
    pub non_negotiable: bool,

    /// Activates this domain when it equals the session's agent id.
    pub agent_trigger: Option<String>,

    /// Activates this domain when it equals the session's workflow id.
    pub workflow_trigger: Option<String>,

    /// Keywords that recall this domain from the prompt text.
    pub recall: Vec<String>,

    /// Keywords that suppress this domain even when recalled.
    pub exclude: Vec<String>,
}

/// The parsed manifest: global flags plus the domain table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub devmode: bool,
    pub global_exclude: Vec<String>,
    pub domains: HashMap<String, DomainSpec>,
}

impl Manifest {
    /// The domain whose `agent_trigger` equals `agent_id`, if any.
    pub fn domain_for_agent(&self, agent_id: &str) -> Option<(&str, &DomainSpec)> {
        self.domains
            .iter()
            .find(|(_, spec)| spec.agent_trigger.as_deref() == Some(agent_id))
            .map(|(name, spec)| (name.as_str(), spec))
    }

    /// The domain whose `workflow_trigger` equals `workflow_id`, if any.
    pub fn domain_for_workflow(&self, workflow_id: &str) -> Option<(&str, &DomainSpec)> {
        self.domains
            .iter()
            .find(|(_, spec)| spec.workflow_trigger.as_deref() == Some(workflow_id))
            .map(|(name, spec)| (name.as_str(), spec))
    }
}

/// Convert a domain name to its conventional file name:
/// `AGENT_DEV` → `agent-dev`.
pub fn domain_name_to_file(name: &str) -> String {
    name.to_lowercase().replace('_', "-")
}

/// Split a manifest key into `(domain_name, suffix)` when the key ends in
/// a known suffix with a non-empty prefix.
pub fn extract_domain_info(key: &str) -> Option<(&str, &'static str)> {
    for suffix in KNOWN_SUFFIXES {
        if let Some(prefix) = key.strip_suffix(suffix) {
            if !prefix.is_empty() {
                return Some((prefix, suffix));
            }
            return None;
        }
    }
    None
}

fn parse_comma_separated(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_bool(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

/// Parse a manifest file. See the module docs for the format.
pub fn parse_manifest(path: &Path) -> Result<Manifest, ManifestError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ManifestError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ManifestError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    parse_manifest_str(&content, path)
}

/// Parse manifest text. `path` is only used for error reporting.
pub fn parse_manifest_str(content: &str, path: &Path) -> Result<Manifest, ManifestError> {
    let mut manifest = Manifest::default();

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim_end_matches('\r').trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (key, value) = line.split_once('=').ok_or_else(|| ManifestError::Malformed {
            path: path.to_path_buf(),
            line_no: idx + 1,
            line: line.to_string(),
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(ManifestError::Malformed {
                path: path.to_path_buf(),
                line_no: idx + 1,
                line: line.to_string(),
            });
        }

        match key {
            "DEVMODE" => manifest.devmode = parse_bool(value),
            "GLOBAL_EXCLUDE" => manifest.global_exclude = parse_comma_separated(value),
            _ => {
                let Some((domain_name, suffix)) = extract_domain_info(key) else {
                    // Unknown key shape: tolerated for forward compatibility.
                    tracing::debug!(key, "Skipping manifest key with no known suffix");
                    continue;
                };

                let spec = manifest
                    .domains
                    .entry(domain_name.to_string())
                    .or_insert_with(|| DomainSpec {
                        file: domain_name_to_file(domain_name),
                        ..DomainSpec::default()
                    });

                match suffix {
                    "_STATE" => {
                        spec.state = if value.trim().eq_ignore_ascii_case("inactive") {
                            DomainState::Inactive
                        } else {
                            DomainState::Active
                        };
                    }
                    "_ALWAYS_ON" => spec.always_on = parse_bool(value),
                    "_NON_NEGOTIABLE" => spec.non_negotiable = parse_bool(value),
                    "_AGENT_TRIGGER" => spec.agent_trigger = Some(value.trim().to_string()),
                    "_WORKFLOW_TRIGGER" => spec.workflow_trigger = Some(value.trim().to_string()),
                    "_RECALL" => spec.recall = parse_comma_separated(value),
                    "_EXCLUDE" => spec.exclude = parse_comma_separated(value),
                    _ => unreachable!("suffix came from KNOWN_SUFFIXES"),
                }
            }
        }
    }

    Ok(manifest)
}
