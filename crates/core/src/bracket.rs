//! Context brackets — the token-budget tiers that govern layer eligibility.
//!
//! A bracket is derived from the percentage of the context window still
//! free. As the window depletes, the pipeline is allowed to spend *more*
//! tokens on rules (the assistant needs firmer guidance late in a session)
//! while lower-priority layers are trimmed under the freshest bracket.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Average tokens a single prompt turn consumes, used when the host does
/// not report context usage directly.
pub const AVG_TOKENS_PER_PROMPT: u64 = 1_500;

/// Assumed context window size for estimation.
pub const MAX_CONTEXT_TOKENS: u64 = 200_000;

/// A context-budget tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Bracket {
    /// >= 60% of the window free.
    Fresh,
    /// >= 40% free.
    Moderate,
    /// >= 25% free.
    Depleted,
    /// < 25% free (also the fallback for unusable signals).
    Critical,
}

/// Which layers a bracket allows, and which auxiliary stages it enables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketPolicy {
    /// Layer indices (0–7) eligible to run. Layer 0 is in every policy.
    pub layers: Vec<u8>,
    /// Whether the memory bridge may contribute hints.
    pub memory_hints: bool,
    /// Whether the output should carry a session-handoff warning.
    pub handoff_warning: bool,
}

impl Bracket {
    /// Derive the bracket from percent-of-context-remaining.
    ///
    /// Non-finite or negative inputs map to `Critical` — an unusable
    /// signal is treated as the most depleted state, never as fresh.
    pub fn from_percent(percent: f64) -> Self {
        if !percent.is_finite() {
            return Bracket::Critical;
        }
        if percent >= 60.0 {
            Bracket::Fresh
        } else if percent >= 40.0 {
            Bracket::Moderate
        } else if percent >= 25.0 {
            Bracket::Depleted
        } else {
            Bracket::Critical
        }
    }

    /// The rule-injection token budget for this bracket.
    pub fn token_budget(&self) -> usize {
        match self {
            Bracket::Fresh => 800,
            Bracket::Moderate => 1_500,
            Bracket::Depleted => 2_000,
            Bracket::Critical => 2_500,
        }
    }

    /// The layer-eligibility policy for this bracket.
    ///
    /// Fresh sessions get a lean injection (constitution, global, agent,
    /// star-commands); every other bracket runs the full roster.
    pub fn policy(&self) -> BracketPolicy {
        match self {
            Bracket::Fresh => BracketPolicy {
                layers: vec![0, 1, 2, 7],
                memory_hints: false,
                handoff_warning: false,
            },
            Bracket::Moderate => BracketPolicy {
                layers: (0..=7).collect(),
                memory_hints: false,
                handoff_warning: false,
            },
            Bracket::Depleted => BracketPolicy {
                layers: (0..=7).collect(),
                memory_hints: true,
                handoff_warning: false,
            },
            Bracket::Critical => BracketPolicy {
                layers: (0..=7).collect(),
                memory_hints: true,
                handoff_warning: true,
            },
        }
    }

    /// All brackets, freshest first.
    pub fn all() -> [Bracket; 4] {
        [
            Bracket::Fresh,
            Bracket::Moderate,
            Bracket::Depleted,
            Bracket::Critical,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Bracket::Fresh => "FRESH",
            Bracket::Moderate => "MODERATE",
            Bracket::Depleted => "DEPLETED",
            Bracket::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Bracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Bracket {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FRESH" => Ok(Bracket::Fresh),
            "MODERATE" => Ok(Bracket::Moderate),
            "DEPLETED" => Ok(Bracket::Depleted),
            "CRITICAL" => Ok(Bracket::Critical),
            _ => Err(()),
        }
    }
}

/// Estimate percent-of-context-remaining from the prompt count alone,
/// using the default per-prompt token cost and window size.
pub fn estimate_context_percent(prompt_count: u32) -> f64 {
    estimate_context_percent_with(prompt_count, AVG_TOKENS_PER_PROMPT, MAX_CONTEXT_TOKENS)
}

/// Estimation with explicit constants, clamped to `[0, 100]`.
pub fn estimate_context_percent_with(
    prompt_count: u32,
    avg_tokens_per_prompt: u64,
    max_context: u64,
) -> f64 {
    if max_context == 0 {
        return 0.0;
    }
    let used = prompt_count as f64 * avg_tokens_per_prompt as f64;
    let percent = 100.0 - used / max_context as f64 * 100.0;
    percent.clamp(0.0, 100.0)
}
