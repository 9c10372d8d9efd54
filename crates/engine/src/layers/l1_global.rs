//! L1 — global project rules plus ambient context, in that order.

use crate::layer::{LayerContext, LayerProcessor, LayerResult};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use synapse_core::error::LayerError;

const SOURCES: [(&str, &str); 2] = [("GLOBAL", "global"), ("CONTEXT", "context")];

pub struct GlobalLayer;

#[async_trait]
impl LayerProcessor for GlobalLayer {
    fn name(&self) -> &'static str {
        "global"
    }

    fn layer_index(&self) -> u8 {
        1
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(10)
    }

    async fn process(&self, ctx: &LayerContext<'_>) -> Result<Option<LayerResult>, LayerError> {
        let mut rules = Vec::new();
        let mut sources = Vec::new();

        // Global lines strictly precede context lines.
        for (domain, default_file) in SOURCES {
            let file = ctx
                .config
                .manifest
                .domains
                .get(domain)
                .map(|s| s.file.as_str())
                .unwrap_or(default_file)
                .to_string();
            let loaded = super::read_rules(&ctx.config.synapse_dir.join(&file)).await;
            if !loaded.is_empty() {
                rules.extend(loaded);
                sources.push(Value::String(file));
            }
        }

        if rules.is_empty() {
            return Ok(None);
        }

        let mut result = LayerResult::for_layer(self.layer_index());
        result.metadata.insert("sources".into(), Value::Array(sources));
        result.rules = rules;
        Ok(Some(result))
    }
}
