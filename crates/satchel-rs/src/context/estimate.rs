//! Character-based token estimation for turns and conversations.
//!
//! Exact token counts require a model-specific tokenizer; this crate trades
//! that precision for a constant-factor estimate that is cheap, monotone in
//! input length, and good enough to drive compaction decisions. Callers that
//! receive real `prompt_tokens` accounting from the transport should prefer
//! it over these estimates.

use crate::Turn;

/// Characters per token. Most tokenizers average 3-4 characters per token
/// for English text and source code; 4 keeps the estimate conservative.
pub const CHARS_PER_TOKEN: usize = 4;

/// Fixed per-turn overhead approximating role and formatting tokens.
pub const TURN_OVERHEAD_TOKENS: usize = 4;

/// Estimate the tokens a single turn will occupy in a request.
///
/// Sums the character length of the content plus, for each tool call, the
/// function name and its serialized arguments, divides by
/// [`CHARS_PER_TOKEN`] rounding up, and adds [`TURN_OVERHEAD_TOKENS`].
pub fn estimate_turn_tokens(turn: &Turn) -> usize {
    let mut chars = turn.content.as_ref().map_or(0, |c| c.len());

    if let Some(calls) = &turn.tool_calls {
        for call in calls {
            chars += call.function.name.len() + call.function.arguments.len();
        }
    }

    chars.div_ceil(CHARS_PER_TOKEN) + TURN_OVERHEAD_TOKENS
}

/// Estimate the total tokens for a whole conversation.
pub fn estimate_conversation_tokens(turns: &[Turn]) -> usize {
    turns.iter().map(estimate_turn_tokens).sum()
}
