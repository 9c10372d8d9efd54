//! The SYNAPSE pipeline: eight fixed layers, an orchestrator, and the
//! output formatter that renders the `<synapse-rules>` block.
//!
//! The engine is constructed once per project (the only fatal path is a
//! missing or malformed manifest) and then processes prompts infallibly:
//! every layer failure, timeout, or missing file degrades to "that layer
//! contributed nothing this turn" and shows up in the run metrics.

pub mod engine;
pub mod formatter;
pub mod layer;
pub mod layers;
pub mod metrics_writer;

pub use engine::{EngineMetrics, EngineOutput, LayerMetrics, SynapseEngine};
pub use layer::{EngineConfig, LayerContext, LayerOutcome, LayerProcessor, LayerResult, LayerRun};
pub use metrics_writer::write_hook_metrics;
