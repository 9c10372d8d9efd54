//! The layer contract — the seam every pipeline stage implements.
//!
//! A layer decides *by itself* whether it applies to the current turn;
//! the orchestrator only handles eligibility (bracket policy), timeouts,
//! and bookkeeping. `Ok(None)` is a first-class outcome meaning "nothing
//! to contribute", distinct from an error.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::time::Duration;
use synapse_core::error::LayerError;
use synapse_core::Session;
use synapse_domain::Manifest;

/// Immutable engine-level configuration shared by every layer.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Project root; `squads/` lives here.
    pub root: PathBuf,
    /// The `.synapse/` directory holding manifest and rule files.
    pub synapse_dir: PathBuf,
    pub manifest: Manifest,
    pub devmode: bool,
}

/// Everything a layer may read while processing one prompt.
pub struct LayerContext<'a> {
    pub prompt: &'a str,
    pub session: &'a Session,
    pub config: &'a EngineConfig,
    /// Layers that already ran this turn, in index order. Read-only;
    /// later layers use it for deduplication.
    pub completed: &'a [LayerRun],
}

/// One layer's contribution.
#[derive(Debug, Clone, Default)]
pub struct LayerResult {
    pub rules: Vec<String>,
    /// Free-form per-layer annotations. Always carries at least `"layer"`,
    /// the numeric roster index.
    pub metadata: Map<String, Value>,
}

impl LayerResult {
    /// A result seeded with the mandatory `"layer"` index entry.
    pub fn for_layer(index: u8) -> Self {
        let mut metadata = Map::new();
        metadata.insert("layer".into(), Value::from(index));
        Self {
            rules: Vec::new(),
            metadata,
        }
    }
}

/// How a layer's invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerOutcome {
    /// Contributed a result.
    Ok,
    /// Ran and declined to contribute.
    Empty,
    /// Failed internally; contribution dropped.
    Error,
    /// Exceeded its time budget; contribution dropped.
    TimedOut,
    /// Not eligible under the current bracket policy.
    Skipped,
}

impl LayerOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayerOutcome::Ok => "ok",
            LayerOutcome::Empty => "empty",
            LayerOutcome::Error => "error",
            LayerOutcome::TimedOut => "timeout",
            LayerOutcome::Skipped => "skipped",
        }
    }
}

/// The record of one layer's run, kept for metrics and for later layers.
#[derive(Debug, Clone)]
pub struct LayerRun {
    pub name: &'static str,
    pub index: u8,
    pub outcome: LayerOutcome,
    pub duration_ms: f64,
    pub result: Option<LayerResult>,
}

impl LayerRun {
    /// Rules contributed by this run, empty unless the outcome is `Ok`.
    pub fn rules(&self) -> &[String] {
        self.result.as_ref().map(|r| r.rules.as_slice()).unwrap_or(&[])
    }

    /// A metadata value from this run's result, if any.
    pub fn metadata(&self, key: &str) -> Option<&Value> {
        self.result.as_ref().and_then(|r| r.metadata.get(key))
    }
}

/// A pipeline stage. Implementations must be cheap to construct and hold
/// no per-call state; the same instance serves concurrent prompts.
#[async_trait]
pub trait LayerProcessor: Send + Sync {
    /// Stable layer name used in metrics and formatter metadata.
    fn name(&self) -> &'static str;

    /// Fixed position in the roster, 0 through 7.
    fn layer_index(&self) -> u8;

    /// Per-layer time budget enforced by the orchestrator.
    fn timeout(&self) -> Duration;

    /// Produce this layer's contribution, or `Ok(None)` when the layer
    /// does not apply to the current turn.
    async fn process(&self, ctx: &LayerContext<'_>) -> Result<Option<LayerResult>, LayerError>;
}
