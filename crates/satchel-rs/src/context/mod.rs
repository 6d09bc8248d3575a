//! Context window management: estimation, classification, budgets, and compaction.
//!
//! The context window is the scarcest resource in any LLM conversation. This
//! module provides the layered machinery for keeping a growing history under
//! a model's ceiling:
//!
//! 1. **[`estimate`]** — cheap character-based token estimation for turns and
//!    whole conversations. Deliberately approximate; a transport-reported
//!    `prompt_tokens` count always wins when available.
//!
//! 2. **[`limits`]** — resolves a model name to its context ceiling via an
//!    ordered substring table with documented first-match semantics.
//!
//! 3. **[`classify`]** + **[`budget`]** — grades the current user request
//!    (simple / moderate / complex) and maps that grade to fixed ratios
//!    governing how much stored context is worth injecting.
//!
//! 4. **[`importance`]** — scores a single turn's retention value in [0, 1],
//!    used to size per-turn detail budgets during compaction.
//!
//! 5. **[`compaction`]** — the [`Compactor`]: decides when history must
//!    shrink and replaces the middle of the conversation with a single
//!    synthesized summary turn, preserving the system turn and a recency
//!    window verbatim.

pub mod budget;
pub mod classify;
pub mod compaction;
pub mod estimate;
pub mod importance;
pub mod limits;

// Re-export commonly used items at the module level.
pub use budget::{ContextBudgets, budget_for};
pub use classify::{ComplexityLevel, classify};
pub use compaction::{CompactionConfig, CompactionResult, Compactor};
pub use estimate::{
    CHARS_PER_TOKEN, TURN_OVERHEAD_TOKENS, estimate_conversation_tokens, estimate_turn_tokens,
};
pub use importance::score_turn;
pub use limits::{DEFAULT_CONTEXT_LIMIT, context_limit_for};
