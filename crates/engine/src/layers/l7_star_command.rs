//! L7 — star commands. `*deploy` in the prompt pulls the `[*deploy]`
//! section out of the commands file.

use crate::layer::{LayerContext, LayerProcessor, LayerResult};
use async_trait::async_trait;
use regex_lite::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use synapse_core::error::LayerError;
use synapse_core::paths;

const COMMAND_PATTERN: &str = r"\*([A-Za-z][\w-]*)";

pub struct StarCommandLayer;

/// Strip a leading `N. ` ordinal from a command rule line.
fn strip_ordinal(line: &str) -> &str {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits > 0 {
        if let Some(rest) = line[digits..].strip_prefix('.') {
            return rest.trim_start();
        }
    }
    line
}

/// Parse the commands file into lowercase name → rules. Sections are
/// headed `[*name]`; inline content after the header and the following
/// lines (ordinals stripped) are the section's rules.
fn parse_commands(content: &str) -> HashMap<String, Vec<String>> {
    let mut map = HashMap::new();
    let mut current: Option<(String, Vec<String>)> = None;

    for raw in content.lines() {
        let line = raw.trim_end_matches('\r').trim();
        if let Some(rest) = line.strip_prefix("[*") {
            if let Some(end) = rest.find(']') {
                if let Some((name, rules)) = current.take() {
                    map.insert(name, rules);
                }
                let name = rest[..end].trim().to_lowercase();
                let inline = rest[end + 1..].trim();
                let mut rules = Vec::new();
                if !inline.is_empty() {
                    rules.push(inline.to_string());
                }
                current = Some((name, rules));
                continue;
            }
        }
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((_, rules)) = current.as_mut() {
            rules.push(strip_ordinal(line).to_string());
        }
    }
    if let Some((name, rules)) = current {
        map.insert(name, rules);
    }
    map
}

#[async_trait]
impl LayerProcessor for StarCommandLayer {
    fn name(&self) -> &'static str {
        "star_command"
    }

    fn layer_index(&self) -> u8 {
        7
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(5)
    }

    async fn process(&self, ctx: &LayerContext<'_>) -> Result<Option<LayerResult>, LayerError> {
        let pattern =
            Regex::new(COMMAND_PATTERN).map_err(|e| LayerError::Internal(e.to_string()))?;

        // Requested commands, deduplicated case-insensitively, prompt order.
        let mut requested = Vec::new();
        for cap in pattern.captures_iter(ctx.prompt) {
            if let Some(m) = cap.get(1) {
                let name = m.as_str().to_lowercase();
                if !requested.contains(&name) {
                    requested.push(name);
                }
            }
        }
        if requested.is_empty() {
            return Ok(None);
        }

        let commands_file = paths::commands_path(&ctx.config.synapse_dir);
        let content = match tokio::fs::read_to_string(&commands_file).await {
            Ok(c) => c,
            Err(_) => return Ok(None),
        };
        let sections = parse_commands(&content);

        let mut rules = Vec::new();
        let mut matched = Vec::new();
        for name in requested {
            if let Some(section) = sections.get(&name) {
                rules.extend(section.iter().cloned());
                matched.push(Value::String(name));
            }
        }
        if matched.is_empty() {
            return Ok(None);
        }

        let mut result = LayerResult::for_layer(self.layer_index());
        result.metadata.insert("commands".into(), Value::Array(matched));
        result.rules = rules;
        Ok(Some(result))
    }
}
