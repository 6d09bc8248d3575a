//! Convenience re-exports for common `satchel-rs` types.
//!
//! Meant to be glob-imported by embedding agents:
//!
//! ```ignore
//! use satchel_rs::prelude::*;
//! ```
//!
//! This pulls in the types needed for the vast majority of integrations:
//! [`Turn`] constructors, the [`Compactor`], the classifier and budget
//! allocator, and the [`WorkingMemoryStore`] with its file storage.
//! Specialized items (the debounce timer, the raw model table, per-type
//! constants) live in their modules — import those directly when needed.

// ── Turn types ──────────────────────────────────────────────────────
pub use crate::{FunctionCallData, Role, ToolCall, Turn};

// ── Context management ──────────────────────────────────────────────
pub use crate::context::{
    CompactionConfig, CompactionResult, Compactor, ComplexityLevel, ContextBudgets, budget_for,
    classify, context_limit_for, estimate_conversation_tokens, estimate_turn_tokens, score_turn,
};

// ── Working memory ──────────────────────────────────────────────────
pub use crate::memory::{
    DeviceKind, DeviceProfile, JsonFileStorage, PinKind, PinSource, PinnedItem,
    WorkingMemoryStore, autosave_loop, default_store_path,
};
