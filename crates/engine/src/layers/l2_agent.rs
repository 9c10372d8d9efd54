//! L2 — active-agent rules, keyed on the manifest's `agentTrigger`.

use crate::layer::{LayerContext, LayerProcessor, LayerResult};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use synapse_core::error::LayerError;
use tracing::debug;

pub struct AgentLayer;

#[async_trait]
impl LayerProcessor for AgentLayer {
    fn name(&self) -> &'static str {
        "agent"
    }

    fn layer_index(&self) -> u8 {
        2
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(15)
    }

    async fn process(&self, ctx: &LayerContext<'_>) -> Result<Option<LayerResult>, LayerError> {
        let Some(agent_id) = ctx.session.agent_id() else {
            return Ok(None);
        };
        let Some((_, spec)) = ctx.config.manifest.domain_for_agent(agent_id) else {
            // An active agent nothing in the manifest recognizes stays
            // headerless downstream.
            debug!(agent_id, "Agent: no manifest domain with matching trigger");
            return Ok(None);
        };

        let rules = super::read_rules(&ctx.config.synapse_dir.join(&spec.file)).await;
        if rules.is_empty() {
            return Ok(None);
        }

        let has_authority = rules.iter().any(|r| r.contains("AUTH"));
        let mut result = LayerResult::for_layer(self.layer_index());
        result
            .metadata
            .insert("agent_id".into(), Value::String(agent_id.into()));
        result
            .metadata
            .insert("source".into(), Value::String(spec.file.clone()));
        result
            .metadata
            .insert("has_authority".into(), Value::Bool(has_authority));
        result.rules = rules;
        Ok(Some(result))
    }
}
