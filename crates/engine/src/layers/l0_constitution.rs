//! L0 — constitution. Always-on foundational rules.

use crate::layer::{LayerContext, LayerProcessor, LayerResult};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use synapse_core::error::LayerError;

const DOMAIN: &str = "CONSTITUTION";
const DEFAULT_FILE: &str = "constitution";

pub struct ConstitutionLayer;

#[async_trait]
impl LayerProcessor for ConstitutionLayer {
    fn name(&self) -> &'static str {
        "constitution"
    }

    fn layer_index(&self) -> u8 {
        0
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(5)
    }

    async fn process(&self, ctx: &LayerContext<'_>) -> Result<Option<LayerResult>, LayerError> {
        let spec = ctx.config.manifest.domains.get(DOMAIN);
        let file = spec
            .map(|s| s.file.as_str())
            .unwrap_or(DEFAULT_FILE)
            .to_string();

        let rules = super::read_rules(&ctx.config.synapse_dir.join(&file)).await;
        if rules.is_empty() {
            return Ok(None);
        }

        let mut result = LayerResult::for_layer(self.layer_index());
        result.metadata.insert(
            "non_negotiable".into(),
            Value::Bool(spec.map(|s| s.non_negotiable).unwrap_or(false)),
        );
        result.metadata.insert("source".into(), Value::String(file));
        result.rules = rules;
        Ok(Some(result))
    }
}
