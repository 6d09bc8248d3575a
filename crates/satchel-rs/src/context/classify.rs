//! Conversation-complexity classification.
//!
//! Grades a user utterance (plus how deep the conversation already is) into
//! one of three levels. The grade decides how much stored context is worth
//! injecting — see [`budget_for`](super::budget::budget_for).
//!
//! The phrase and keyword lists are literal tables so the classifier's
//! behavior can be reviewed and extended without touching the matching code.

/// Coarse complexity grade for the current user request.
///
/// Derived on every turn, never persisted. Ordering is meaningful:
/// `Simple < Moderate < Complex`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ComplexityLevel {
    Simple,
    Moderate,
    Complex,
}

impl std::fmt::Display for ComplexityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComplexityLevel::Simple => write!(f, "simple"),
            ComplexityLevel::Moderate => write!(f, "moderate"),
            ComplexityLevel::Complex => write!(f, "complex"),
        }
    }
}

impl std::str::FromStr for ComplexityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simple" => Ok(ComplexityLevel::Simple),
            "moderate" => Ok(ComplexityLevel::Moderate),
            "complex" => Ok(ComplexityLevel::Complex),
            other => Err(format!("unknown complexity level: {other}")),
        }
    }
}

/// Greetings, acknowledgements, and yes/no answers that never need extra
/// context. Matched against the whole trimmed, lowercased utterance.
const SIMPLE_PHRASES: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "thanks",
    "thank you",
    "thx",
    "ok",
    "okay",
    "yes",
    "no",
    "yep",
    "nope",
    "yeah",
    "nah",
    "sure",
    "bye",
    "goodbye",
    "got it",
    "sounds good",
    "great",
    "cool",
    "nice",
    "lgtm",
];

/// Architecture / scale / security / infrastructure keywords that mark a
/// request as complex. Matched as substrings of the lowercased utterance.
const COMPLEX_KEYWORDS: &[&str] = &[
    "architecture",
    "architectural",
    "system design",
    "refactor",
    "migration",
    "migrate",
    "scalab",
    "scaling",
    "distributed",
    "microservice",
    "security",
    "vulnerab",
    "authentication",
    "authorization",
    "encryption",
    "infrastructure",
    "deployment",
    "kubernetes",
    "terraform",
    "load balanc",
    "concurren",
    "race condition",
    "database schema",
    "sharding",
    "replication",
    "disaster recovery",
];

/// Word count above which a request is complex regardless of keywords.
const COMPLEX_WORD_COUNT: usize = 50;

/// Conversation length above which any non-trivial request is complex.
const COMPLEX_HISTORY_LEN: usize = 30;

/// Classify a user utterance given the current conversation length.
///
/// Pure and stateless: the same input always yields the same level. Simple
/// checks run first, so a three-word utterance is `Simple` even if it
/// contains a complex keyword.
pub fn classify(utterance: &str, history_len: usize) -> ComplexityLevel {
    let text = utterance.trim().to_lowercase();
    let word_count = text.split_whitespace().count();

    if word_count <= 3 || text.starts_with('/') || SIMPLE_PHRASES.iter().any(|p| text == *p) {
        return ComplexityLevel::Simple;
    }

    if COMPLEX_KEYWORDS.iter().any(|k| text.contains(k))
        || word_count > COMPLEX_WORD_COUNT
        || history_len > COMPLEX_HISTORY_LEN
    {
        return ComplexityLevel::Complex;
    }

    ComplexityLevel::Moderate
}
