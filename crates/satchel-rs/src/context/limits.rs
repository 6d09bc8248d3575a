//! Model-name to context-ceiling resolution.
//!
//! The table below maps known model-name fragments to token ceilings. Lookup
//! is case-insensitive: an exact match wins first, then the **first** entry
//! whose key appears as a substring of the name, in declaration order.
//!
//! First-match-in-declaration-order is a contract, not an accident. Some
//! keys are prefixes of others (`gpt-4` vs `gpt-4o`, `llama` vs
//! `codellama`), so reordering entries — or "improving" the lookup to
//! longest-match — changes which ceiling existing configurations resolve
//! to. The more specific key is simply declared first.

/// Fallback ceiling for model names not present in the table.
pub const DEFAULT_CONTEXT_LIMIT: usize = 32_768;

/// Ordered (name fragment, token ceiling) table. Declaration order is
/// load-bearing; see the module docs before inserting entries.
pub const MODEL_CONTEXT_LIMITS: &[(&str, usize)] = &[
    ("claude", 200_000),
    ("gemini-1.5", 1_000_000),
    ("gemini", 128_000),
    // "gpt-4o" and "gpt-4-turbo" must precede their prefix "gpt-4".
    ("gpt-4o", 128_000),
    ("gpt-4-turbo", 128_000),
    ("gpt-4", 8_192),
    ("gpt-3.5", 16_385),
    // "codellama" must precede its substring "llama".
    ("codellama", 16_384),
    ("llama", 8_192),
    ("mixtral", 32_768),
    ("mistral", 32_768),
    ("qwen", 32_768),
    ("deepseek", 32_768),
    ("phi", 16_384),
];

/// Resolve a model name to its context ceiling in tokens.
pub fn context_limit_for(model: &str) -> usize {
    let name = model.trim().to_lowercase();

    for (key, limit) in MODEL_CONTEXT_LIMITS {
        if name == *key {
            return *limit;
        }
    }
    for (key, limit) in MODEL_CONTEXT_LIMITS {
        if name.contains(key) {
            return *limit;
        }
    }
    DEFAULT_CONTEXT_LIMIT
}
