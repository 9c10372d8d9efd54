//! Session state — the caller-supplied snapshot of what is active.
//!
//! The session is owned exclusively by the caller; the pipeline only reads
//! it. Every activation field is optional — a fresh session with nothing
//! active is valid and simply yields fewer layer contributions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Transient session state for one pipeline invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    /// Currently activated agent persona, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_agent: Option<ActiveAgent>,

    /// Workflow in flight, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_workflow: Option<ActiveWorkflow>,

    /// Task in flight, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_task: Option<ActiveTask>,

    /// Activated squad, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_squad: Option<ActiveSquad>,

    /// Context-budget signals carried over from the previous turn.
    #[serde(default)]
    pub context: SessionContext,

    /// Number of prompts processed so far in this session.
    #[serde(default)]
    pub prompt_count: u32,
}

/// The active agent persona.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveAgent {
    /// Agent id matched against manifest `agentTrigger` values.
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activated_at: Option<DateTime<Utc>>,

    /// "full" when the agent activation pipeline completed every loader.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activation_quality: Option<String>,
}

/// The active workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveWorkflow {
    /// Workflow id matched against manifest `workflowTrigger` values.
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_step: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_phase: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
}

/// The active task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveTask {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executor_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
}

/// The active squad.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveSquad {
    /// Squad id; also the directory name under `squads/`.
    pub id: String,
}

/// Context-budget signals from the previous turn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_bracket: Option<String>,

    #[serde(default)]
    pub last_tokens_used: u64,

    /// Percent of the context window still free, when the host reported it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_context_percent: Option<f64>,
}

impl Session {
    /// Convenience accessor: the active agent id, if one is set.
    pub fn agent_id(&self) -> Option<&str> {
        self.active_agent.as_ref().map(|a| a.id.as_str())
    }

    /// Convenience accessor: the active workflow id, if one is set.
    pub fn workflow_id(&self) -> Option<&str> {
        self.active_workflow.as_ref().map(|w| w.id.as_str())
    }
}
