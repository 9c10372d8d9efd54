//! The bridge proper: gate, provider trait, tiering.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use synapse_core::{Bracket, MemoryError};
use tracing::{debug, warn};

/// Hard ceiling on one retrieval, milliseconds. The bridge runs inside
/// the prompt hot path; a slow memory system must never stall a turn.
pub const BRIDGE_TIMEOUT_MS: u64 = 15;

/// A single recalled hint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryHint {
    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Relevance score as reported by the provider.
    #[serde(default)]
    pub relevance: f32,

    /// Token cost of `content`. Providers may leave this at 0; the bridge
    /// fills it in with an estimate before budgeting.
    #[serde(default)]
    pub tokens: usize,
}

/// Retrieval depth and token allowance for a bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeTier {
    /// How deep the provider may search (0 = not at all).
    pub layer: u8,
    pub max_tokens: usize,
}

/// The bridge tier for a bracket. Fresh sessions get nothing; the
/// allowance grows as the window depletes.
pub fn bracket_tier(bracket: Bracket) -> BridgeTier {
    match bracket {
        Bracket::Fresh => BridgeTier {
            layer: 0,
            max_tokens: 0,
        },
        Bracket::Moderate => BridgeTier {
            layer: 1,
            max_tokens: 50,
        },
        Bracket::Depleted => BridgeTier {
            layer: 2,
            max_tokens: 200,
        },
        Bracket::Critical => BridgeTier {
            layer: 3,
            max_tokens: 1_000,
        },
    }
}

/// Rough token count for hint content: four characters per token,
/// rounded up.
pub fn estimate_hint_tokens(content: &str) -> usize {
    content.len().div_ceil(4)
}

/// Runtime switch deciding whether memory retrieval is enabled at all.
pub trait FeatureGate: Send + Sync {
    fn is_available(&self) -> bool;
}

/// A gate with a fixed answer.
pub struct StaticGate(pub bool);

impl FeatureGate for StaticGate {
    fn is_available(&self) -> bool {
        self.0
    }
}

/// The external memory system the bridge talks to.
#[async_trait]
pub trait MemoryProvider: Send + Sync {
    /// The provider name, for logging.
    fn name(&self) -> &str;

    /// Retrieve hints for an agent within a token allowance.
    async fn get_memories(
        &self,
        agent_id: &str,
        bracket: Bracket,
        max_tokens: usize,
    ) -> Result<Vec<MemoryHint>, MemoryError>;

    /// Drop any provider-side retrieval cache.
    fn clear_cache(&self);
}

/// Feature-gated, timeout-bounded access to a [`MemoryProvider`].
pub struct MemoryBridge {
    gate: Arc<dyn FeatureGate>,
    provider: Arc<dyn MemoryProvider>,
    timeout: Duration,
}

impl MemoryBridge {
    pub fn new(gate: Arc<dyn FeatureGate>, provider: Arc<dyn MemoryProvider>) -> Self {
        Self::with_timeout(gate, provider, Duration::from_millis(BRIDGE_TIMEOUT_MS))
    }

    pub fn with_timeout(
        gate: Arc<dyn FeatureGate>,
        provider: Arc<dyn MemoryProvider>,
        timeout: Duration,
    ) -> Self {
        Self {
            gate,
            provider,
            timeout,
        }
    }

    /// Retrieve hints for an agent under the bracket's budget.
    ///
    /// `token_budget` optionally tightens (never loosens) the tier's
    /// token allowance. All failure modes return an empty vector.
    pub async fn get_memory_hints(
        &self,
        agent_id: &str,
        bracket: Bracket,
        token_budget: Option<usize>,
    ) -> Vec<MemoryHint> {
        if !self.gate.is_available() {
            return Vec::new();
        }

        let tier = bracket_tier(bracket);
        let budget = match token_budget {
            Some(cap) => tier.max_tokens.min(cap),
            None => tier.max_tokens,
        };
        if tier.layer == 0 || budget == 0 {
            return Vec::new();
        }

        debug!(
            provider = self.provider.name(),
            agent_id,
            tier = tier.layer,
            budget,
            "Memory: retrieving hints"
        );

        let hints = match tokio::time::timeout(
            self.timeout,
            self.provider.get_memories(agent_id, bracket, budget),
        )
        .await
        {
            Ok(Ok(hints)) => hints,
            Ok(Err(e)) => {
                warn!(
                    provider = self.provider.name(),
                    error = %e,
                    "Memory: retrieval failed, continuing without hints"
                );
                return Vec::new();
            }
            Err(_) => {
                warn!(
                    provider = self.provider.name(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Memory: retrieval timed out, continuing without hints"
                );
                return Vec::new();
            }
        };

        Self::truncate_to_budget(hints, budget)
    }

    /// Explicit cache invalidation, delegated to the provider. Hint
    /// relevance shifts when the session changes shape (new agent, new
    /// workflow), so cache life is the caller's call.
    pub fn clear_cache(&self) {
        self.provider.clear_cache();
    }

    fn truncate_to_budget(hints: Vec<MemoryHint>, budget: usize) -> Vec<MemoryHint> {
        let mut spent = 0usize;
        let mut kept = Vec::new();
        for mut hint in hints {
            if hint.tokens == 0 {
                hint.tokens = estimate_hint_tokens(&hint.content);
            }
            if spent + hint.tokens > budget {
                break;
            }
            spent += hint.tokens;
            kept.push(hint);
        }
        kept
    }
}
