//! Conversation compaction: replacing old history with a summary turn.
//!
//! When the estimated (or transport-reported) token count approaches the
//! effective context ceiling, the [`Compactor`] rewrites the conversation as
//! `[first-turn, summary-turn, ...recent-turns]`: the system turn and the
//! most recent turns survive verbatim, everything in between is compressed
//! into a single synthesized summary.
//!
//! Two summarization paths share that assembly:
//!
//! - **Heuristic** ([`Compactor::compact`]) — deterministic, no model call.
//!   Each summarized turn gets a detail budget sized by its importance
//!   score; tool turns contribute file paths and tool names instead of
//!   prose.
//! - **Model-assisted** ([`Compactor::compact_with_summary`]) — the caller
//!   runs [`Compactor::build_summarization_prompt`] through the external
//!   summarization collaborator and hands the result back. A failed,
//!   timed-out, or degenerately short result falls back to the heuristic.
//!
//! The compactor itself never touches the network, and compaction is atomic:
//! it is computed from the current turn list and applied as one replacement,
//! with no partial state.

use std::collections::BTreeSet;

use tracing::debug;

use crate::context::estimate::estimate_conversation_tokens;
use crate::context::importance::score_turn;
use crate::context::limits::context_limit_for;
use crate::{Role, Turn};

/// Number of recent turns always preserved verbatim during compaction.
pub const KEEP_RECENT: usize = 6;

/// Default compaction trigger, as a fraction of the effective limit.
pub const DEFAULT_COMPACTION_THRESHOLD: f64 = 0.75;

/// Hard cap on the synthesized summary text, in characters.
pub const MAX_SUMMARY_CHARS: usize = 4000;

/// Minimum length for a caller-supplied model summary to be trusted.
/// Anything shorter is treated as degenerate and the heuristic path runs.
pub const MIN_ASSISTED_SUMMARY_CHARS: usize = 50;

/// Per-turn detail budgets (characters) keyed off the importance score.
const HIGH_DETAIL_CHARS: usize = 400;
const MID_DETAIL_CHARS: usize = 200;
const LOW_DETAIL_CHARS: usize = 80;

/// Instructions prepended by [`Compactor::build_summarization_prompt`].
const SUMMARIZATION_INSTRUCTIONS: &str = "\
Summarize the following conversation segment as a structured bullet list of
at most 500 words. Cover, in order:
- What the user asked for
- Decisions made and why
- Files created, modified, or inspected (exact paths)
- Current task state and what remains to be done
- Errors encountered and how they were resolved

Only include facts stated in the messages. Preserve file paths and error
messages verbatim. Do not add commentary or speculation.";

// ── Configuration ──────────────────────────────────────────────────

/// Tunables for the compaction policy.
///
/// There is exactly one compaction policy; `keep_recent` is the single
/// knob for how much recency survives verbatim.
#[derive(Debug, Clone)]
pub struct CompactionConfig {
    /// Recent turns preserved verbatim.
    pub keep_recent: usize,
    /// Trigger threshold as a fraction of the effective token limit.
    pub threshold: f64,
    /// Hard cap on summary text length in characters.
    pub max_summary_chars: usize,
}

impl Default for CompactionConfig {
    fn default() -> Self {
        Self {
            keep_recent: KEEP_RECENT,
            threshold: DEFAULT_COMPACTION_THRESHOLD,
            max_summary_chars: MAX_SUMMARY_CHARS,
        }
    }
}

// ── Result ─────────────────────────────────────────────────────────

/// Outcome of one compaction attempt. Transient; never persisted.
#[derive(Debug, Clone)]
pub struct CompactionResult {
    /// Whether the conversation was actually reduced.
    pub compacted: bool,
    /// Number of turns replaced by the summary.
    pub removed_count: usize,
    /// Estimated tokens before compaction.
    pub tokens_before: usize,
    /// Estimated tokens after compaction (equal to `tokens_before` when
    /// `compacted` is false).
    pub tokens_after: usize,
    /// The synthesized summary turn, when one was produced.
    pub summary_turn: Option<Turn>,
    /// The conversation to continue with. Identical to the input when
    /// `compacted` is false.
    pub turns: Vec<Turn>,
}

impl CompactionResult {
    fn noop(turns: &[Turn]) -> Self {
        let tokens = estimate_conversation_tokens(turns);
        Self {
            compacted: false,
            removed_count: 0,
            tokens_before: tokens,
            tokens_after: tokens,
            summary_turn: None,
            turns: turns.to_vec(),
        }
    }
}

// ── Compactor ──────────────────────────────────────────────────────

/// The compaction engine. Stateless apart from its configuration; every
/// decision is a pure function of the turn list handed in.
#[derive(Debug, Default)]
pub struct Compactor {
    config: CompactionConfig,
}

impl Compactor {
    pub fn new(config: CompactionConfig) -> Self {
        Self { config }
    }

    /// Set the number of recent turns preserved verbatim.
    pub fn with_keep_recent(mut self, n: usize) -> Self {
        self.config.keep_recent = n;
        self
    }

    /// Set the trigger threshold as a fraction of the effective limit.
    pub fn with_threshold(mut self, fraction: f64) -> Self {
        self.config.threshold = fraction;
        self
    }

    pub fn config(&self) -> &CompactionConfig {
        &self.config
    }

    /// Decide whether the conversation should be compacted.
    ///
    /// `last_known_prompt_tokens` is the transport's real token accounting
    /// from the previous request; when present it is preferred over the
    /// character-based estimate. `effective_limit` (when present, e.g. from
    /// [`effective_context_limit`](crate::memory::WorkingMemoryStore::effective_context_limit))
    /// overrides the model-table lookup; `custom_threshold` (e.g. a device
    /// profile's `compaction_threshold`) overrides the default fraction.
    pub fn should_compact(
        &self,
        turns: &[Turn],
        model: &str,
        last_known_prompt_tokens: Option<usize>,
        custom_threshold: Option<f64>,
        effective_limit: Option<usize>,
    ) -> bool {
        // Too short to be worth a summary turn.
        if turns.len() <= self.config.keep_recent + 3 {
            return false;
        }

        let limit = effective_limit.unwrap_or_else(|| context_limit_for(model));
        let threshold = limit as f64 * custom_threshold.unwrap_or(self.config.threshold);
        let count =
            last_known_prompt_tokens.unwrap_or_else(|| estimate_conversation_tokens(turns));

        count as f64 >= threshold
    }

    /// Compact a conversation using the deterministic heuristic summary.
    ///
    /// Turn 0 and the last `keep_recent` turns are preserved verbatim; the
    /// turns strictly between are replaced by one summary turn. Returns a
    /// no-op result when the conversation is too short, or when the rebuilt
    /// conversation would not be strictly smaller than the input — so
    /// `compacted == true` always implies `tokens_after < tokens_before`.
    pub fn compact(&self, turns: &[Turn]) -> CompactionResult {
        if turns.len() <= self.config.keep_recent + 1 {
            return CompactionResult::noop(turns);
        }
        let middle = &turns[1..turns.len() - self.config.keep_recent];
        self.assemble(turns, self.summarize_middle(middle))
    }

    /// Compact using a caller-supplied model-written summary.
    ///
    /// `assisted` is the external summarization collaborator's output for
    /// [`build_summarization_prompt`](Self::build_summarization_prompt) over
    /// the middle turns. `None`, or a result shorter than
    /// [`MIN_ASSISTED_SUMMARY_CHARS`] after trimming, falls back to the
    /// heuristic path.
    pub fn compact_with_summary(
        &self,
        turns: &[Turn],
        assisted: Option<&str>,
    ) -> CompactionResult {
        if turns.len() <= self.config.keep_recent + 1 {
            return CompactionResult::noop(turns);
        }
        match assisted.map(str::trim) {
            Some(text) if text.chars().count() >= MIN_ASSISTED_SUMMARY_CHARS => {
                let middle_len = turns.len() - 1 - self.config.keep_recent;
                let body = format!(
                    "[Auto-compacted context: {middle_len} messages summarized]\n\n{text}"
                );
                self.assemble(turns, body)
            }
            _ => {
                debug!("assisted summary missing or degenerate, using heuristic compaction");
                self.compact(turns)
            }
        }
    }

    /// Build the prompt for the external summarization collaborator.
    ///
    /// Formats the non-system turns as `ROLE: text` lines under a fixed
    /// instruction block. User and assistant text is truncated at 500
    /// characters per turn, tool output at 200. The caller owns the model
    /// call, its timeout, and the decision to fall back.
    pub fn build_summarization_prompt(&self, old_turns: &[Turn]) -> String {
        let mut prompt = String::from(SUMMARIZATION_INSTRUCTIONS);
        prompt.push_str("\n\n");

        for turn in old_turns {
            if turn.role == Role::System {
                continue;
            }
            let cap = if turn.role == Role::Tool { 200 } else { 500 };
            let text = turn.content.as_deref().unwrap_or("[no content]");
            let role = turn.role.to_string().to_uppercase();
            prompt.push_str(&format!("{role}: {}\n", truncate_chars(text, cap)));
        }

        prompt
    }

    // ── Internals ──────────────────────────────────────────────────

    /// Rebuild the conversation around `summary_text`, enforcing the cap
    /// and the must-shrink guard.
    fn assemble(&self, turns: &[Turn], summary_text: String) -> CompactionResult {
        let tokens_before = estimate_conversation_tokens(turns);
        let middle_len = turns.len() - 1 - self.config.keep_recent;

        let mut text = summary_text;
        if text.chars().count() > self.config.max_summary_chars {
            text = truncate_chars(&text, self.config.max_summary_chars);
            text.push_str("\n[summary truncated]");
        }
        let summary_turn = Turn::system(text);

        let mut new_turns = Vec::with_capacity(self.config.keep_recent + 2);
        new_turns.push(turns[0].clone());
        new_turns.push(summary_turn.clone());
        new_turns.extend_from_slice(&turns[turns.len() - self.config.keep_recent..]);

        let tokens_after = estimate_conversation_tokens(&new_turns);
        if tokens_after >= tokens_before {
            debug!(
                "compaction would not shrink the conversation ({tokens_before} -> {tokens_after} tokens), skipping"
            );
            return CompactionResult::noop(turns);
        }

        debug!(
            "compacted {middle_len} turns, {tokens_before} -> {tokens_after} estimated tokens"
        );
        CompactionResult {
            compacted: true,
            removed_count: middle_len,
            tokens_before,
            tokens_after,
            summary_turn: Some(summary_turn),
            turns: new_turns,
        }
    }

    /// Produce the heuristic summary text for the middle turns.
    fn summarize_middle(&self, middle: &[Turn]) -> String {
        let mut detail_lines: Vec<String> = Vec::new();
        let mut tool_names: BTreeSet<String> = BTreeSet::new();
        let mut file_paths: BTreeSet<String> = BTreeSet::new();
        let mut user_requests = 0usize;
        let mut tool_executions = 0usize;

        for turn in middle {
            let score = score_turn(turn);
            let budget = if score >= 0.7 {
                HIGH_DETAIL_CHARS
            } else if score >= 0.4 {
                MID_DETAIL_CHARS
            } else {
                LOW_DETAIL_CHARS
            };

            match turn.role {
                Role::User => {
                    user_requests += 1;
                    if let Some(text) = nonempty(turn.content.as_deref()) {
                        detail_lines.push(format!("USER: {}", truncate_chars(text, budget)));
                    }
                }
                Role::Assistant => {
                    if let Some(text) = nonempty(turn.content.as_deref()) {
                        detail_lines.push(format!("ASSISTANT: {}", truncate_chars(text, budget)));
                    }
                }
                Role::Tool => {
                    tool_executions += 1;
                    if let Some(text) = nonempty(turn.content.as_deref()) {
                        for path in extract_path_tokens(text) {
                            file_paths.insert(path);
                        }
                    }
                }
                Role::System => {
                    if let Some(text) = nonempty(turn.content.as_deref()) {
                        detail_lines.push(format!("SYSTEM: {}", truncate_chars(text, budget)));
                    }
                }
            }

            if let Some(calls) = &turn.tool_calls {
                for call in calls {
                    tool_names.insert(call.function.name.clone());
                    if let Some(path) = path_argument(&call.function.arguments) {
                        file_paths.insert(path);
                    }
                }
            }
        }

        let mut text = format!(
            "[Auto-compacted context: {} messages summarized]\n\
             User requests: {user_requests} | Tool executions: {tool_executions}",
            middle.len()
        );
        if !tool_names.is_empty() {
            let names: Vec<&str> = tool_names.iter().map(String::as_str).collect();
            text.push_str(&format!("\nTools used: {}", names.join(", ")));
        }
        if !file_paths.is_empty() {
            let paths: Vec<&str> = file_paths.iter().map(String::as_str).collect();
            text.push_str(&format!("\nFiles touched: {}", paths.join(", ")));
        }
        text.push_str("\n--- Conversation Summary ---\n");
        text.push_str(&detail_lines.join("\n"));
        text
    }
}

// ── Extraction helpers ─────────────────────────────────────────────

/// Truncate to at most `max_chars` characters, appending `...` when cut.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(max_chars).collect();
        out.push_str("...");
        out
    }
}

fn nonempty(text: Option<&str>) -> Option<&str> {
    text.filter(|t| !t.trim().is_empty())
}

/// Pull a file path out of tool-call argument JSON.
///
/// Tries the keys the tool ecosystem actually uses: `file_path`,
/// `filePath`, `path`.
fn path_argument(arguments: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(arguments).ok()?;
    let obj = value.as_object()?;

    for key in ["file_path", "filePath", "path"] {
        if let Some(v) = obj.get(key).and_then(|v| v.as_str())
            && !v.is_empty()
        {
            return Some(v.to_string());
        }
    }
    None
}

/// Scan free text for tokens that look like file paths: a separator plus a
/// short alphanumeric extension. URLs are excluded.
fn extract_path_tokens(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|t| {
            t.trim_matches(|c: char| {
                matches!(
                    c,
                    '"' | '\'' | '`' | ',' | ';' | ':' | '(' | ')' | '[' | ']' | '<' | '>'
                )
            })
        })
        .filter(|t| looks_like_path(t))
        .map(str::to_string)
        .collect()
}

fn looks_like_path(token: &str) -> bool {
    if token.len() < 3 || token.len() > 250 {
        return false;
    }
    if token.starts_with("http://") || token.starts_with("https://") {
        return false;
    }
    let has_separator = token.contains('/');
    let has_extension = token.rsplit_once('.').is_some_and(|(stem, ext)| {
        !stem.is_empty() && (1..=5).contains(&ext.len()) && ext.chars().all(|c| c.is_ascii_alphanumeric())
    });
    has_separator && has_extension
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ToolCall;

    fn conversation(old: usize, old_len: usize, recent: usize) -> Vec<Turn> {
        let mut turns = vec![Turn::system("You are a coding assistant.")];
        for i in 0..old {
            turns.push(Turn::user(format!("request {i}: {}", "x".repeat(old_len))));
        }
        for i in 0..recent {
            turns.push(Turn::assistant_text(format!("recent {i}")));
        }
        turns
    }

    // ── should_compact ─────────────────────────────────────────────

    #[test]
    fn short_conversation_never_compacts() {
        let turns = vec![
            Turn::system("sys"),
            Turn::user("hi"),
            Turn::assistant_text("hello"),
        ];
        let compactor = Compactor::default();
        assert!(!compactor.should_compact(&turns, "llama", Some(1_000_000), None, None));
        assert!(!compactor.should_compact(&turns, "claude", None, None, None));
    }

    #[test]
    fn known_prompt_tokens_force_compaction() {
        // 16 turns > KEEP_RECENT + 3; llama ceiling 8192, threshold 6144.
        let mut turns = vec![Turn::system("sys")];
        for _ in 0..15 {
            turns.push(Turn::user("x"));
        }
        let compactor = Compactor::default();
        assert!(compactor.should_compact(&turns, "llama", Some(7000), None, None));
        assert!(!compactor.should_compact(&turns, "llama", Some(6000), None, None));
    }

    #[test]
    fn known_prompt_tokens_beat_the_estimate() {
        // The estimate for these tiny turns is far below threshold; the
        // transport's accounting wins anyway.
        let mut turns = vec![Turn::system("sys")];
        for _ in 0..15 {
            turns.push(Turn::user("x"));
        }
        let compactor = Compactor::default();
        assert!(!compactor.should_compact(&turns, "llama", None, None, None));
        assert!(compactor.should_compact(&turns, "llama", Some(7000), None, None));
    }

    #[test]
    fn custom_threshold_and_effective_limit_override() {
        let mut turns = vec![Turn::system("sys")];
        for _ in 0..15 {
            turns.push(Turn::user("x"));
        }
        let compactor = Compactor::default();
        // 5000 >= 0.5 * 8192.
        assert!(compactor.should_compact(&turns, "llama", Some(5000), Some(0.5), None));
        // Effective limit lowered by a device profile: 5000 >= 0.75 * 4096.
        assert!(compactor.should_compact(&turns, "llama", Some(5000), None, Some(4096)));
    }

    // ── compact ────────────────────────────────────────────────────

    #[test]
    fn compact_is_noop_below_keep_recent_plus_one() {
        let turns = conversation(0, 0, KEEP_RECENT);
        let result = Compactor::default().compact(&turns);
        assert!(!result.compacted);
        assert_eq!(result.removed_count, 0);
        assert!(result.summary_turn.is_none());
        assert_eq!(result.turns.len(), turns.len());
        assert_eq!(result.tokens_after, result.tokens_before);
    }

    #[test]
    fn long_conversation_compacts_and_shrinks() {
        // system + 10 old turns of ~500 chars + 6 short recent turns.
        let turns = conversation(10, 500, 6);
        let result = Compactor::default().compact(&turns);

        assert!(result.compacted);
        assert_eq!(result.removed_count, 10);
        assert!(result.tokens_after < result.tokens_before);

        let summary = result.summary_turn.as_ref().unwrap();
        assert!(summary.content.as_ref().unwrap().contains("Auto-compacted"));
        assert_eq!(result.turns.len(), 1 + 1 + 6);
    }

    #[test]
    fn first_and_recent_turns_survive_verbatim() {
        let turns = conversation(10, 500, KEEP_RECENT);
        let result = Compactor::default().compact(&turns);
        assert!(result.compacted);

        assert_eq!(
            result.turns[0].content.as_deref(),
            turns[0].content.as_deref()
        );
        let out_tail = &result.turns[result.turns.len() - KEEP_RECENT..];
        let in_tail = &turns[turns.len() - KEEP_RECENT..];
        for (a, b) in out_tail.iter().zip(in_tail) {
            assert_eq!(a.content, b.content);
            assert_eq!(a.role, b.role);
        }
    }

    #[test]
    fn summary_counts_requests_and_tool_executions() {
        let mut turns = vec![Turn::system("sys")];
        turns.push(Turn::user(format!("please inspect {}", "a".repeat(200))));
        turns.push(Turn::assistant_tool_calls(vec![ToolCall::function(
            "c1",
            "read_file",
            r#"{"path":"src/main.rs"}"#,
        )]));
        turns.push(Turn::tool_result("c1", format!("contents {}", "b".repeat(300))));
        for i in 0..KEEP_RECENT {
            turns.push(Turn::assistant_text(format!("recent {i}")));
        }

        let result = Compactor::default().compact(&turns);
        assert!(result.compacted);
        let text = result.summary_turn.unwrap().content.unwrap();
        assert!(text.contains("User requests: 1"));
        assert!(text.contains("Tool executions: 1"));
        assert!(text.contains("Tools used: read_file"));
        assert!(text.contains("src/main.rs"));
        assert!(text.contains("--- Conversation Summary ---"));
    }

    #[test]
    fn file_paths_from_tool_call_arguments_survive() {
        let mut turns = vec![Turn::system("sys")];
        turns.push(Turn::user(format!("edit the entry point {}", "p".repeat(120))));
        turns.push(Turn::assistant_tool_calls(vec![ToolCall::function(
            "c1",
            "edit_file",
            r#"{"filePath":"src/index.ts","newText":"export {}"}"#,
        )]));
        turns.push(Turn::tool_result("c1", format!("ok {}", "q".repeat(200))));
        for i in 0..KEEP_RECENT {
            turns.push(Turn::assistant_text(format!("recent {i}")));
        }

        let result = Compactor::default().compact(&turns);
        assert!(result.compacted);
        let text = result.summary_turn.unwrap().content.unwrap();
        assert!(text.contains("src/index.ts"));
    }

    #[test]
    fn file_paths_from_tool_output_text_survive() {
        let mut turns = vec![Turn::system("sys")];
        turns.push(Turn::user(format!("grep the repo {}", "g".repeat(120))));
        turns.push(Turn::tool_result(
            "c1",
            format!(
                "matches found in src/context/mod.rs and tests/smoke.rs\n{}",
                "noise ".repeat(50)
            ),
        ));
        for i in 0..KEEP_RECENT {
            turns.push(Turn::assistant_text(format!("recent {i}")));
        }

        let result = Compactor::default().compact(&turns);
        assert!(result.compacted);
        let text = result.summary_turn.unwrap().content.unwrap();
        assert!(text.contains("src/context/mod.rs"));
        assert!(text.contains("tests/smoke.rs"));
    }

    #[test]
    fn summary_is_capped_with_truncation_marker() {
        // 30 long, high-importance user turns blow well past the cap.
        let mut turns = vec![Turn::system("sys")];
        for i in 0..30 {
            turns.push(Turn::user(format!("why {i}? {}", "detail ".repeat(80))));
        }
        for i in 0..KEEP_RECENT {
            turns.push(Turn::assistant_text(format!("recent {i}")));
        }

        let result = Compactor::default().compact(&turns);
        assert!(result.compacted);
        let text = result.summary_turn.unwrap().content.unwrap();
        assert!(text.chars().count() <= MAX_SUMMARY_CHARS + "\n[summary truncated]".len());
        assert!(text.ends_with("[summary truncated]"));
    }

    #[test]
    fn compaction_that_would_grow_is_refused() {
        // Middle turns of one character each: the summary preamble alone
        // outweighs them, so the guard keeps the original conversation.
        let mut turns = vec![Turn::system("s")];
        for _ in 0..5 {
            turns.push(Turn::user("x"));
        }
        for _ in 0..KEEP_RECENT {
            turns.push(Turn::assistant_text("y"));
        }

        let result = Compactor::default().compact(&turns);
        assert!(!result.compacted);
        assert_eq!(result.turns.len(), turns.len());
        assert_eq!(result.tokens_after, result.tokens_before);
    }

    #[test]
    fn compacted_always_means_smaller() {
        for (old, old_len) in [(8, 50), (10, 500), (20, 2000), (40, 10)] {
            let turns = conversation(old, old_len, KEEP_RECENT);
            let result = Compactor::default().compact(&turns);
            if result.compacted {
                assert!(result.tokens_after < result.tokens_before);
            }
        }
    }

    #[test]
    fn summary_turn_is_system_role() {
        let turns = conversation(10, 300, KEEP_RECENT);
        let result = Compactor::default().compact(&turns);
        assert_eq!(result.summary_turn.unwrap().role, Role::System);
    }

    #[test]
    fn keep_recent_is_configurable() {
        let turns = conversation(10, 300, 4);
        let compactor = Compactor::default().with_keep_recent(4);
        let result = compactor.compact(&turns);
        assert!(result.compacted);
        assert_eq!(result.removed_count, 10);
        assert_eq!(result.turns.len(), 1 + 1 + 4);
    }

    // ── compact_with_summary ───────────────────────────────────────

    #[test]
    fn assisted_summary_is_used_when_long_enough() {
        let turns = conversation(10, 300, KEEP_RECENT);
        let assisted = "The user audited the parser module, fixed two off-by-one bugs, \
                        and moved the fixtures into tests/data.";
        let result = Compactor::default().compact_with_summary(&turns, Some(assisted));

        assert!(result.compacted);
        let text = result.summary_turn.unwrap().content.unwrap();
        assert!(text.contains("Auto-compacted"));
        assert!(text.contains("audited the parser module"));
        assert!(!text.contains("--- Conversation Summary ---"));
    }

    #[test]
    fn degenerate_assisted_summary_falls_back_to_heuristic() {
        let turns = conversation(10, 300, KEEP_RECENT);
        for bad in [None, Some(""), Some("   "), Some("too short")] {
            let result = Compactor::default().compact_with_summary(&turns, bad);
            assert!(result.compacted);
            let text = result.summary_turn.unwrap().content.unwrap();
            assert!(text.contains("--- Conversation Summary ---"));
        }
    }

    // ── build_summarization_prompt ─────────────────────────────────

    #[test]
    fn prompt_contains_instructions_and_role_lines() {
        let turns = vec![
            Turn::system("you are ignored"),
            Turn::user("rename the helper"),
            Turn::assistant_text("done, renamed it"),
            Turn::tool_result("c1", "exit code 0"),
        ];
        let prompt = Compactor::default().build_summarization_prompt(&turns);

        assert!(prompt.contains("500 words"));
        assert!(prompt.contains("USER: rename the helper"));
        assert!(prompt.contains("ASSISTANT: done, renamed it"));
        assert!(prompt.contains("TOOL: exit code 0"));
        assert!(!prompt.contains("you are ignored"));
    }

    #[test]
    fn prompt_truncates_per_turn() {
        let turns = vec![
            Turn::user("u".repeat(2000)),
            Turn::tool_result("c1", "t".repeat(2000)),
        ];
        let prompt = Compactor::default().build_summarization_prompt(&turns);

        let user_line = prompt.lines().find(|l| l.starts_with("USER:")).unwrap();
        let tool_line = prompt.lines().find(|l| l.starts_with("TOOL:")).unwrap();
        // "USER: " + 500 chars + "..."
        assert_eq!(user_line.chars().count(), 6 + 500 + 3);
        assert_eq!(tool_line.chars().count(), 6 + 200 + 3);
    }

    // ── extraction helpers ─────────────────────────────────────────

    #[test]
    fn path_argument_key_variants() {
        assert_eq!(
            path_argument(r#"{"file_path":"a/b.rs"}"#).as_deref(),
            Some("a/b.rs")
        );
        assert_eq!(
            path_argument(r#"{"filePath":"src/index.ts"}"#).as_deref(),
            Some("src/index.ts")
        );
        assert_eq!(path_argument(r#"{"path":"c.toml"}"#).as_deref(), Some("c.toml"));
        assert_eq!(path_argument(r#"{"pattern":"TODO"}"#), None);
        assert_eq!(path_argument("not json"), None);
    }

    #[test]
    fn path_tokens_require_separator_and_extension() {
        let found = extract_path_tokens(
            "compiled src/lib.rs and docs/guide.md, skipped README plus https://example.com/x.rs and version 1.2.3",
        );
        assert!(found.contains(&"src/lib.rs".to_string()));
        assert!(found.contains(&"docs/guide.md".to_string()));
        assert!(!found.iter().any(|p| p.contains("README")));
        assert!(!found.iter().any(|p| p.contains("example.com")));
        assert!(!found.contains(&"1.2.3".to_string()));
    }

    #[test]
    fn quoted_paths_are_unwrapped() {
        let found = extract_path_tokens(r#"wrote "src/memory/store.rs" (new file)"#);
        assert_eq!(found, vec!["src/memory/store.rs".to_string()]);
    }
}
