//! Context-window and working-memory management for LLM conversations.
//!
//! `satchel-rs` manages the scarcest resource in any long-running,
//! turn-based LLM session: the bounded context window. As history grows it
//! decides what stays verbatim, what gets compressed into a summary turn,
//! and which cross-session facts are worth keeping outside the conversation
//! entirely.
//!
//! The crate deliberately does **not** talk to any model provider. The chat
//! transport, tool execution, and presentation layer are external
//! collaborators: they append [`Turn`]s, ask the [`Compactor`](context::Compactor)
//! whether to shrink history, and query the
//! [`WorkingMemoryStore`](memory::WorkingMemoryStore) for an injectable
//! context block. When model-assisted summarization is wanted, this crate
//! produces the prompt and consumes the resulting string — the network call
//! belongs to the caller.
//!
//! # Getting started
//!
//! ```ignore
//! use satchel_rs::prelude::*;
//!
//! let mut store = WorkingMemoryStore::load(Box::new(JsonFileStorage::new(
//!     default_store_path(),
//! )));
//! store.pin("We target SQLite for storage", PinKind::Decision, PinSource::User, 0.9, None);
//!
//! let compactor = Compactor::default();
//! if compactor.should_compact(&turns, "claude-sonnet-4", usage_prompt_tokens, None, None) {
//!     let result = compactor.compact(&turns);
//!     if result.compacted {
//!         turns = result.turns;
//!     }
//! }
//!
//! let level = classify(&user_input, turns.len());
//! let block = store.build_context(level);
//! store.flush();
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`context`] | Token estimation, model context limits, complexity classification, budget allocation, importance scoring, compaction |
//! | [`memory`] | Persistent working-memory store: pins, tracked files, tasks, device profiles, debounced persistence |
//!
//! # Design principles
//!
//! 1. **Cheap estimates over exact counts.** Token usage is estimated from
//!    character counts; when the transport reports real `prompt_tokens`,
//!    callers pass that instead and it wins.
//!
//! 2. **No fatal errors.** A corrupt store file, a failed disk write, or a
//!    degenerate model summary never ends a session — the worst case is a
//!    heuristic fallback or a lost debounce window.
//!
//! 3. **Policy as data.** Classifier phrases, model ceilings, and device
//!    presets are literal tables, reviewable without reading the matching
//!    code.

pub mod context;
pub mod memory;
pub mod prelude;

use serde::{Deserialize, Serialize};

// ── Turn types ─────────────────────────────────────────────────────

/// Role of a turn in the conversation.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::Tool => write!(f, "tool"),
        }
    }
}

/// A single turn in the conversation.
///
/// Matches the OpenAI-style wire shape so turns received from the transport
/// collaborator round-trip through this crate unchanged. Index 0 of a
/// conversation is conventionally the system turn.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Turn {
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Turn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn assistant_text(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn assistant_tool_calls(calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content: None,
            tool_calls: Some(calls),
            tool_call_id: None,
        }
    }

    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: Some(call_id.into()),
        }
    }
}

// ── Tool-call types ────────────────────────────────────────────────

/// The type of a tool call. Currently always `Function`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallType {
    #[serde(rename = "function")]
    Function,
}

/// A tool call attached to an assistant turn.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: CallType,
    pub function: FunctionCallData,
}

impl ToolCall {
    /// Create a function-style tool call. `arguments` is raw JSON text, as
    /// received from the model.
    pub fn function(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            call_type: CallType::Function,
            function: FunctionCallData {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FunctionCallData {
    pub name: String,
    pub arguments: String,
}
