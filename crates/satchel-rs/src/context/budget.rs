//! Context budget allocation: how much stored context each complexity level
//! deserves.
//!
//! A pure lookup, not a computation. The ratios scale how much of each
//! context source (project files, long-term memory, working memory) the
//! orchestrating agent may inject for the current request; the working-memory
//! store consults `memory_ratio` and `max_pins_injected` directly in
//! [`build_context`](crate::memory::WorkingMemoryStore::build_context).

use crate::context::classify::ComplexityLevel;
use crate::memory::MAX_PINS;

/// Injection ratios for one complexity level.
///
/// Every field is non-decreasing across `Simple < Moderate < Complex`;
/// `budget_monotone_across_levels` in the tests pins that invariant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextBudgets {
    /// Share of project context (tech stack, notes) worth injecting.
    pub project_ratio: f64,
    /// Share of long-term / session memory worth injecting.
    pub memory_ratio: f64,
    /// Share of working-memory detail worth injecting.
    pub working_ratio: f64,
    /// Maximum number of pinned items to inject.
    pub max_pins_injected: usize,
}

/// Fixed budget table, keyed by complexity level.
pub fn budget_for(level: ComplexityLevel) -> ContextBudgets {
    match level {
        ComplexityLevel::Simple => ContextBudgets {
            project_ratio: 0.3,
            memory_ratio: 0.2,
            working_ratio: 0.1,
            max_pins_injected: 3,
        },
        ComplexityLevel::Moderate => ContextBudgets {
            project_ratio: 0.7,
            memory_ratio: 0.5,
            working_ratio: 0.5,
            max_pins_injected: 10,
        },
        ComplexityLevel::Complex => ContextBudgets {
            project_ratio: 1.0,
            memory_ratio: 1.0,
            working_ratio: 1.0,
            max_pins_injected: MAX_PINS,
        },
    }
}
