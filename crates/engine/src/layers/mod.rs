//! The fixed layer roster, L0 through L7.

mod l0_constitution;
mod l1_global;
mod l2_agent;
mod l3_workflow;
mod l4_task;
mod l5_squad;
mod l6_keyword;
mod l7_star_command;

pub use l0_constitution::ConstitutionLayer;
pub use l1_global::GlobalLayer;
pub use l2_agent::AgentLayer;
pub use l3_workflow::WorkflowLayer;
pub use l4_task::TaskLayer;
pub use l5_squad::SquadLayer;
pub use l6_keyword::KeywordLayer;
pub use l7_star_command::StarCommandLayer;

use crate::layer::LayerProcessor;
use std::path::Path;
use std::sync::Arc;
use synapse_domain::parse_rule_lines;

/// Read a rule file through the runtime's async I/O so the orchestrator's
/// per-layer timeout can fire while the read is still in flight. Missing,
/// unreadable, or empty files yield an empty vector.
pub(crate) async fn read_rules(path: &Path) -> Vec<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => parse_rule_lines(&content),
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read rule file");
            }
            Vec::new()
        }
    }
}

/// The full roster in index order.
pub fn default_roster() -> Vec<Arc<dyn LayerProcessor>> {
    vec![
        Arc::new(ConstitutionLayer),
        Arc::new(GlobalLayer),
        Arc::new(AgentLayer),
        Arc::new(WorkflowLayer),
        Arc::new(TaskLayer),
        Arc::new(SquadLayer),
        Arc::new(KeywordLayer),
        Arc::new(StarCommandLayer),
    ]
}
