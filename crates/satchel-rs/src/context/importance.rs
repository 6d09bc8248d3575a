//! Turn importance scoring for compaction.
//!
//! Estimates how costly it would be to lose a turn when the middle of the
//! conversation is summarized. A pure function of a single turn: no
//! conversation-wide context, no state. The compactor maps the score to a
//! per-turn detail budget.
//!
//! The tool-class, error-marker, and decision-keyword lists are literal
//! tables, matched case-insensitively as substrings.

use crate::{Role, Turn};

/// Every turn starts here before increments apply.
const BASE_SCORE: f64 = 0.3;

/// Tool-name fragments that mark a call as a write/edit (mutating) call.
const WRITE_TOOL_HINTS: &[&str] = &["write", "edit", "create", "patch", "apply", "delete", "remove"];

/// Tool-name fragments that mark a call as shell execution.
const SHELL_TOOL_HINTS: &[&str] = &["bash", "shell", "exec", "command", "terminal", "run"];

/// Content fragments that indicate an error was reported in this turn.
const ERROR_MARKERS: &[&str] = &["error", "failed", "failure", "exception", "panic", "traceback"];

/// Content fragments that indicate a decision or strategy was stated.
const DECISION_KEYWORDS: &[&str] = &[
    "decided",
    "decision",
    "instead of",
    "approach",
    "strategy",
    "plan",
    "trade-off",
    "chose",
    "agreed",
];

/// Score a turn's retention value in [0, 1].
///
/// Additive increments: user turns are worth more (they carry intent),
/// question marks and long prompts more still; tool activity counts per
/// call with mutating calls weighted above shell calls; error reports and
/// stated decisions each add a flat bump. The sum is clamped to 1.0.
pub fn score_turn(turn: &Turn) -> f64 {
    let mut score = BASE_SCORE;
    let content = turn.content.as_deref().unwrap_or("");
    let lower = content.to_lowercase();

    if turn.role == Role::User {
        score += 0.2;
        if content.contains('?') {
            score += 0.1;
        }
        if content.len() > 200 {
            score += 0.1;
        }
    }

    if let Some(calls) = &turn.tool_calls
        && !calls.is_empty()
    {
        score += 0.2;
        for call in calls {
            let name = call.function.name.to_lowercase();
            if WRITE_TOOL_HINTS.iter().any(|h| name.contains(h)) {
                score += 0.2;
            } else if SHELL_TOOL_HINTS.iter().any(|h| name.contains(h)) {
                score += 0.1;
            }
        }
    }

    if ERROR_MARKERS.iter().any(|m| lower.contains(m)) {
        score += 0.15;
    }
    if DECISION_KEYWORDS.iter().any(|k| lower.contains(k)) {
        score += 0.1;
    }

    score.clamp(0.0, 1.0)
}
