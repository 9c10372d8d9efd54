//! The orchestrator — runs the fixed roster under the bracket policy.
//!
//! Construction is the only fatal path (no manifest, no pipeline).
//! `process` is infallible: layer errors and timeouts degrade to missing
//! contributions and are visible only in the returned metrics.

use crate::formatter::{format_output, FormatInput};
use crate::layer::{EngineConfig, LayerContext, LayerOutcome, LayerProcessor, LayerRun};
use crate::layers::default_roster;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use synapse_core::bracket::estimate_context_percent;
use synapse_core::error::ManifestError;
use synapse_core::{paths, Bracket, Session};
use synapse_domain::{parse_manifest, Manifest};
use synapse_memory::{MemoryBridge, MemoryHint};
use tracing::{debug, warn};

/// Timing and status for one layer in a run.
#[derive(Debug, Clone)]
pub struct LayerMetrics {
    pub duration_ms: f64,
    pub status: String,
    pub rules: u32,
}

/// Aggregate metrics for one `process` call.
#[derive(Debug, Clone, Default)]
pub struct EngineMetrics {
    pub total_ms: f64,
    pub layers_loaded: u32,
    pub layers_skipped: u32,
    pub layers_errored: u32,
    pub total_rules: u32,
    pub per_layer: BTreeMap<String, LayerMetrics>,
}

/// The result of one pipeline run.
#[derive(Debug, Clone)]
pub struct EngineOutput {
    /// The rendered `<synapse-rules>` block.
    pub text: String,
    pub bracket: Bracket,
    pub metrics: EngineMetrics,
}

/// The assembled pipeline. Holds no per-call state; one instance serves
/// concurrent prompts.
pub struct SynapseEngine {
    config: EngineConfig,
    roster: Vec<Arc<dyn LayerProcessor>>,
    bridge: Option<Arc<MemoryBridge>>,
}

impl SynapseEngine {
    /// Build an engine for a project root, parsing `.synapse/manifest`.
    pub fn new(root: &Path) -> Result<Self, ManifestError> {
        let synapse_dir = paths::synapse_dir(root);
        let manifest = parse_manifest(&paths::manifest_path(&synapse_dir))?;
        Ok(Self::with_manifest(root, manifest))
    }

    /// Build an engine from an already-parsed manifest.
    pub fn with_manifest(root: &Path, manifest: Manifest) -> Self {
        let devmode = manifest.devmode;
        Self {
            config: EngineConfig {
                root: root.to_path_buf(),
                synapse_dir: paths::synapse_dir(root),
                manifest,
                devmode,
            },
            roster: default_roster(),
            bridge: None,
        }
    }

    /// Attach a memory bridge; without one, memory hints are simply absent.
    pub fn with_memory_bridge(mut self, bridge: Arc<MemoryBridge>) -> Self {
        self.bridge = Some(bridge);
        self
    }

    /// Replace the layer roster. Used for targeted testing.
    pub fn with_roster(mut self, roster: Vec<Arc<dyn LayerProcessor>>) -> Self {
        self.roster = roster;
        self
    }

    /// Run the pipeline for one prompt.
    pub async fn process(&self, prompt: &str, session: &Session) -> EngineOutput {
        let start = Instant::now();

        let percent = session
            .context
            .last_context_percent
            .unwrap_or_else(|| estimate_context_percent(session.prompt_count));
        let bracket = Bracket::from_percent(percent);
        let policy = bracket.policy();
        debug!(%bracket, percent, "Engine: starting pipeline run");

        let mut runs: Vec<LayerRun> = Vec::with_capacity(self.roster.len());
        for layer in &self.roster {
            let index = layer.layer_index();
            if !policy.layers.contains(&index) {
                runs.push(LayerRun {
                    name: layer.name(),
                    index,
                    outcome: LayerOutcome::Skipped,
                    duration_ms: 0.0,
                    result: None,
                });
                continue;
            }

            let layer_start = Instant::now();
            let (outcome, result) = {
                let ctx = LayerContext {
                    prompt,
                    session,
                    config: &self.config,
                    completed: &runs,
                };
                match tokio::time::timeout(layer.timeout(), layer.process(&ctx)).await {
                    Ok(Ok(Some(result))) => (LayerOutcome::Ok, Some(result)),
                    Ok(Ok(None)) => (LayerOutcome::Empty, None),
                    Ok(Err(e)) => {
                        warn!(
                            layer = layer.name(),
                            error = %e,
                            "Engine: layer failed, continuing without it"
                        );
                        (LayerOutcome::Error, None)
                    }
                    Err(_) => {
                        warn!(
                            layer = layer.name(),
                            timeout_ms = layer.timeout().as_millis() as u64,
                            "Engine: layer timed out, continuing without it"
                        );
                        (LayerOutcome::TimedOut, None)
                    }
                }
            };
            runs.push(LayerRun {
                name: layer.name(),
                index,
                outcome,
                duration_ms: layer_start.elapsed().as_secs_f64() * 1_000.0,
                result,
            });
        }

        let memory_hints = self.collect_memory_hints(&policy, bracket, session).await;

        let text = format_output(&FormatInput {
            bracket,
            context_percent: percent,
            runs: &runs,
            memory_hints: &memory_hints,
            devmode: self.config.devmode,
        });

        let metrics = Self::build_metrics(start.elapsed().as_secs_f64() * 1_000.0, &runs);
        EngineOutput {
            text,
            bracket,
            metrics,
        }
    }

    async fn collect_memory_hints(
        &self,
        policy: &synapse_core::BracketPolicy,
        bracket: Bracket,
        session: &Session,
    ) -> Vec<MemoryHint> {
        if !policy.memory_hints {
            return Vec::new();
        }
        match (&self.bridge, session.agent_id()) {
            (Some(bridge), Some(agent_id)) => {
                bridge
                    .get_memory_hints(agent_id, bracket, Some(bracket.token_budget()))
                    .await
            }
            _ => Vec::new(),
        }
    }

    fn build_metrics(total_ms: f64, runs: &[LayerRun]) -> EngineMetrics {
        let mut metrics = EngineMetrics {
            total_ms,
            ..EngineMetrics::default()
        };
        for run in runs {
            let rules = run.rules().len() as u32;
            match run.outcome {
                LayerOutcome::Ok => metrics.layers_loaded += 1,
                LayerOutcome::Skipped => metrics.layers_skipped += 1,
                LayerOutcome::Error | LayerOutcome::TimedOut => metrics.layers_errored += 1,
                LayerOutcome::Empty => {}
            }
            metrics.total_rules += rules;
            metrics.per_layer.insert(
                run.name.to_string(),
                LayerMetrics {
                    duration_ms: run.duration_ms,
                    status: run.outcome.as_str().to_string(),
                    rules,
                },
            );
        }
        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::LayerResult;
    use async_trait::async_trait;
    use synapse_core::LayerError;
    use std::time::Duration;
    use tempfile::tempdir;

    struct FailingLayer;

    #[async_trait]
    impl LayerProcessor for FailingLayer {
        fn name(&self) -> &'static str {
            "failing"
        }
        fn layer_index(&self) -> u8 {
            0
        }
        fn timeout(&self) -> Duration {
            Duration::from_millis(5)
        }
        async fn process(
            &self,
            _ctx: &LayerContext<'_>,
        ) -> Result<Option<LayerResult>, LayerError> {
            Err(LayerError::Internal("boom".into()))
        }
    }

    struct HangingLayer;

    #[async_trait]
    impl LayerProcessor for HangingLayer {
        fn name(&self) -> &'static str {
            "hanging"
        }
        fn layer_index(&self) -> u8 {
            1
        }
        fn timeout(&self) -> Duration {
            Duration::from_millis(10)
        }
        async fn process(
            &self,
            _ctx: &LayerContext<'_>,
        ) -> Result<Option<LayerResult>, LayerError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            unreachable!()
        }
    }

    struct StaticLayer;

    #[async_trait]
    impl LayerProcessor for StaticLayer {
        fn name(&self) -> &'static str {
            "static"
        }
        fn layer_index(&self) -> u8 {
            2
        }
        fn timeout(&self) -> Duration {
            Duration::from_millis(5)
        }
        async fn process(
            &self,
            _ctx: &LayerContext<'_>,
        ) -> Result<Option<LayerResult>, LayerError> {
            let mut result = LayerResult::for_layer(2);
            result.rules = vec!["static rule".into()];
            Ok(Some(result))
        }
    }

    fn engine_with(roster: Vec<Arc<dyn LayerProcessor>>) -> SynapseEngine {
        let dir = tempdir().unwrap();
        SynapseEngine::with_manifest(dir.path(), Manifest::default()).with_roster(roster)
    }

    #[tokio::test]
    async fn missing_manifest_is_fatal() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            SynapseEngine::new(dir.path()),
            Err(ManifestError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn layer_failure_degrades_not_aborts() {
        let engine = engine_with(vec![Arc::new(FailingLayer), Arc::new(StaticLayer)]);
        let output = engine.process("prompt", &Session::default()).await;
        assert!(output.text.contains("static rule"));
        assert_eq!(output.metrics.layers_errored, 1);
        assert_eq!(output.metrics.layers_loaded, 1);
        assert_eq!(output.metrics.per_layer["failing"].status, "error");
    }

    #[tokio::test]
    async fn layer_timeout_degrades_not_aborts() {
        let engine = engine_with(vec![Arc::new(HangingLayer), Arc::new(StaticLayer)]);
        let output = engine.process("prompt", &Session::default()).await;
        assert!(output.text.contains("static rule"));
        assert_eq!(output.metrics.per_layer["hanging"].status, "timeout");
        assert_eq!(output.metrics.layers_errored, 1);
    }

    #[tokio::test]
    async fn fresh_policy_skips_mid_layers() {
        // Index 3 is outside the Fresh policy {0, 1, 2, 7}.
        struct MidLayer;
        #[async_trait]
        impl LayerProcessor for MidLayer {
            fn name(&self) -> &'static str {
                "mid"
            }
            fn layer_index(&self) -> u8 {
                3
            }
            fn timeout(&self) -> Duration {
                Duration::from_millis(5)
            }
            async fn process(
                &self,
                _ctx: &LayerContext<'_>,
            ) -> Result<Option<LayerResult>, LayerError> {
                Ok(Some(LayerResult::for_layer(3)))
            }
        }

        let engine = engine_with(vec![Arc::new(MidLayer)]);
        let session = Session {
            context: synapse_core::SessionContext {
                last_context_percent: Some(90.0),
                ..Default::default()
            },
            ..Session::default()
        };
        let output = engine.process("prompt", &session).await;
        assert_eq!(output.bracket, Bracket::Fresh);
        assert_eq!(output.metrics.layers_skipped, 1);
        assert_eq!(output.metrics.per_layer["mid"].status, "skipped");
    }

    #[tokio::test]
    async fn bracket_prefers_reported_percent_over_estimate() {
        let engine = engine_with(vec![]);
        let session = Session {
            // Many prompts, but the host says plenty of window remains.
            prompt_count: 150,
            context: synapse_core::SessionContext {
                last_context_percent: Some(75.0),
                ..Default::default()
            },
            ..Session::default()
        };
        let output = engine.process("prompt", &session).await;
        assert_eq!(output.bracket, Bracket::Fresh);

        let estimated = Session {
            prompt_count: 150,
            ..Session::default()
        };
        let output = engine.process("prompt", &estimated).await;
        assert_eq!(output.bracket, Bracket::Critical);
    }

    #[tokio::test]
    async fn output_always_wrapped() {
        let engine = engine_with(vec![]);
        let output = engine.process("prompt", &Session::default()).await;
        assert!(output.text.starts_with("<synapse-rules>"));
        assert!(output.text.ends_with("</synapse-rules>"));
    }

    #[tokio::test]
    async fn metrics_count_rules() {
        let engine = engine_with(vec![Arc::new(StaticLayer)]);
        let output = engine.process("prompt", &Session::default()).await;
        assert_eq!(output.metrics.total_rules, 1);
        assert_eq!(output.metrics.per_layer["static"].rules, 1);
        assert!(output.metrics.total_ms >= 0.0);
    }
}
