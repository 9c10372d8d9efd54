//! L6 — keyword recall. Matches manifest `recall` keywords against the
//! prompt and loads the domains that fire, skipping anything an earlier
//! layer already brought in.

use crate::layer::{LayerContext, LayerProcessor, LayerResult};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;
use synapse_core::error::LayerError;
use synapse_domain::{is_excluded, match_keywords, DomainState};

pub struct KeywordLayer;

/// File names and domain names already contributed by earlier layers.
fn already_loaded(completed: &[crate::layer::LayerRun]) -> HashSet<String> {
    let mut seen = HashSet::new();
    for run in completed {
        if let Some(Value::String(source)) = run.metadata("source") {
            seen.insert(source.clone());
        }
        for key in ["sources", "domains_loaded"] {
            if let Some(Value::Array(items)) = run.metadata(key) {
                for item in items {
                    if let Value::String(s) = item {
                        seen.insert(s.clone());
                    }
                }
            }
        }
    }
    seen
}

#[async_trait]
impl LayerProcessor for KeywordLayer {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn layer_index(&self) -> u8 {
        6
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(15)
    }

    async fn process(&self, ctx: &LayerContext<'_>) -> Result<Option<LayerResult>, LayerError> {
        let manifest = &ctx.config.manifest;
        let seen = already_loaded(ctx.completed);

        let mut domain_names: Vec<&String> = manifest.domains.keys().collect();
        domain_names.sort();

        let mut rules = Vec::new();
        let mut matched = Vec::new();
        let mut skipped = Vec::new();

        for name in domain_names {
            let spec = &manifest.domains[name];
            if spec.state == DomainState::Inactive || spec.recall.is_empty() {
                continue;
            }
            if is_excluded(ctx.prompt, &manifest.global_exclude, &spec.exclude) {
                continue;
            }
            if match_keywords(ctx.prompt, &spec.recall).is_empty() {
                continue;
            }
            if seen.contains(name.as_str()) || seen.contains(spec.file.as_str()) {
                skipped.push(Value::String(name.clone()));
                continue;
            }
            let domain_rules = super::read_rules(&ctx.config.synapse_dir.join(&spec.file)).await;
            if domain_rules.is_empty() {
                continue;
            }
            rules.extend(domain_rules);
            matched.push(Value::String(name.clone()));
        }

        if matched.is_empty() && skipped.is_empty() {
            return Ok(None);
        }

        let mut result = LayerResult::for_layer(self.layer_index());
        result
            .metadata
            .insert("matched_domains".into(), Value::Array(matched));
        result
            .metadata
            .insert("skipped_duplicates".into(), Value::Array(skipped));
        result.rules = rules;
        Ok(Some(result))
    }
}
