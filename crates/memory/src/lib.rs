//! Memory bridge — feature-gated retrieval of context hints.
//!
//! The bridge sits between the pipeline and an external memory system.
//! It never fails: a disabled gate, a provider error, or a timeout all
//! collapse to "no hints this turn". How many hints and how many tokens
//! a turn may spend on them depends on the context bracket — the more
//! depleted the window, the more the session benefits from recalled
//! memory.

pub mod bridge;

pub use bridge::{
    bracket_tier, estimate_hint_tokens, BridgeTier, FeatureGate, MemoryBridge, MemoryHint,
    MemoryProvider, StaticGate, BRIDGE_TIMEOUT_MS,
};
