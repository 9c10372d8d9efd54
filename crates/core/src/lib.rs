//! Core domain types and conventions shared across the SYNAPSE workspace.
//!
//! SYNAPSE assembles a bounded block of behavioral rules for injection into
//! an AI coding assistant's prompt. This crate holds the types every other
//! crate agrees on: the error taxonomy, the caller-supplied session state,
//! the context bracket model, the metrics artifact schema, and the
//! `.synapse/` directory conventions.

pub mod bracket;
pub mod error;
pub mod metrics;
pub mod paths;
pub mod session;

pub use bracket::{Bracket, BracketPolicy};
pub use error::{LayerError, ManifestError, MemoryError};
pub use metrics::{ActiveAgentPointer, HookLayerStatus, HookMetrics, LoaderStatus, UapMetrics};
pub use session::{ActiveAgent, ActiveSquad, ActiveTask, ActiveWorkflow, Session, SessionContext};
