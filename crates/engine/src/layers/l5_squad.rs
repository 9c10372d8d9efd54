//! L5 — squad rules. Loads the active squad's own `.synapse/` tree and
//! namespaces its domains so they cannot collide with project domains.

use crate::layer::{LayerContext, LayerProcessor, LayerResult};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use synapse_core::error::LayerError;
use synapse_core::paths;
use synapse_domain::{parse_manifest_str, DomainState};
use tracing::debug;

pub struct SquadLayer;

fn namespaced(squad_id: &str, domain: &str) -> String {
    format!("{}_{domain}", squad_id.to_uppercase().replace('-', "_"))
}

#[async_trait]
impl LayerProcessor for SquadLayer {
    fn name(&self) -> &'static str {
        "squad"
    }

    fn layer_index(&self) -> u8 {
        5
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(20)
    }

    async fn process(&self, ctx: &LayerContext<'_>) -> Result<Option<LayerResult>, LayerError> {
        let Some(squad) = ctx.session.active_squad.as_ref() else {
            return Ok(None);
        };

        let squad_synapse = paths::squad_synapse_dir(&ctx.config.root, &squad.id);
        let manifest_path = paths::manifest_path(&squad_synapse);
        let manifest = match tokio::fs::read_to_string(&manifest_path).await {
            Ok(content) => match parse_manifest_str(&content, &manifest_path) {
                Ok(m) => m,
                Err(e) => {
                    debug!(squad_id = %squad.id, error = %e, "Squad: manifest unparseable");
                    return Ok(None);
                }
            },
            Err(e) => {
                // A squad without its own manifest contributes nothing;
                // only the project manifest is load-bearing.
                debug!(squad_id = %squad.id, error = %e, "Squad: manifest unavailable");
                return Ok(None);
            }
        };

        let mut domain_names: Vec<&String> = manifest.domains.keys().collect();
        domain_names.sort();

        let mut rules = Vec::new();
        let mut loaded = Vec::new();
        for name in domain_names {
            let spec = &manifest.domains[name];
            if spec.state == DomainState::Inactive {
                continue;
            }
            let domain_rules = super::read_rules(&squad_synapse.join(&spec.file)).await;
            if domain_rules.is_empty() {
                continue;
            }
            rules.extend(domain_rules);
            loaded.push(Value::String(namespaced(&squad.id, name)));
        }

        if rules.is_empty() {
            return Ok(None);
        }

        let mut result = LayerResult::for_layer(self.layer_index());
        result
            .metadata
            .insert("squad_id".into(), Value::String(squad.id.clone()));
        result
            .metadata
            .insert("domains_loaded".into(), Value::Array(loaded));
        result.rules = rules;
        Ok(Some(result))
    }
}
