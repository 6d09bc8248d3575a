//! Persistence plumbing for the working-memory store: storage backend,
//! debounce timer, clock abstraction, and id generation.
//!
//! The debounce is an explicit `{Idle, Pending(deadline)}` state machine
//! driven by an injected [`Clock`], so its behavior is testable without real
//! delays. Arming while already pending is a no-op: successive writes batch
//! into the pending window rather than pushing the deadline back.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// How long a mutation waits before the store persists, absent a flush.
pub const PERSIST_DEBOUNCE: Duration = Duration::from_millis(3000);

/// Default store file, kept alongside the agent's other session state.
pub const DEFAULT_STORE_FILE: &str = ".agents/ram.json";

/// Default path for the working-memory store file.
pub fn default_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_FILE)
}

// ── Time helpers ───────────────────────────────────────────────────

/// Current unix epoch in seconds.
pub fn epoch_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Generate a short unique id with the given prefix.
///
/// Nanosecond timestamp in hex plus a process-wide counter to handle
/// sub-nanosecond calls.
pub fn generate_id(prefix: &str) -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let ts = std::time::SystemTime::now()
        .duration_since(std::time::SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let count = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{ts:x}-{count:04x}")
}

/// Monotonic time source for the debounce deadline. Injected so tests can
/// drive time by hand.
pub trait Clock: Send {
    fn now(&self) -> Instant;
}

/// The real wall clock.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

// ── Debounce timer ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerState {
    Idle,
    Pending(Instant),
}

/// Explicit debounce state machine.
#[derive(Debug)]
pub struct DebounceTimer {
    delay: Duration,
    state: TimerState,
}

impl DebounceTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            state: TimerState::Idle,
        }
    }

    /// Arm the timer at `now + delay`. A no-op while already pending:
    /// successive schedules batch into the existing window.
    pub fn schedule(&mut self, now: Instant) {
        if self.state == TimerState::Idle {
            self.state = TimerState::Pending(now + self.delay);
        }
    }

    /// Whether an armed deadline has passed.
    pub fn is_due(&self, now: Instant) -> bool {
        matches!(self.state, TimerState::Pending(deadline) if now >= deadline)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, TimerState::Pending(_))
    }

    /// Disarm without firing.
    pub fn cancel(&mut self) {
        self.state = TimerState::Idle;
    }
}

// ── Storage ────────────────────────────────────────────────────────

/// Whole-file storage for the serialized store.
///
/// `load` returning `Ok(None)` means "no store yet" — the caller starts
/// fresh without logging an error.
pub trait MemoryStorage: Send {
    fn load(&self) -> Result<Option<String>, String>;
    fn save(&self, json: &str) -> Result<(), String>;
}

/// JSON file storage with atomic writes (temp file + rename).
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}

impl MemoryStorage for JsonFileStorage {
    fn load(&self) -> Result<Option<String>, String> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(&self.path)
            .map_err(|e| format!("failed to read {}: {e}", self.path.display()))?;
        Ok(Some(json))
    }

    fn save(&self, json: &str) -> Result<(), String> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("failed to create {}: {e}", parent.display()))?;
        }

        let tmp = self.tmp_path();
        std::fs::write(&tmp, json).map_err(|e| format!("failed to write {}: {e}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| format!("failed to rename into {}: {e}", self.path.display()))?;
        Ok(())
    }
}

// ── Test doubles ───────────────────────────────────────────────────

/// Hand-driven clock for debounce tests.
#[cfg(test)]
#[derive(Clone)]
pub(crate) struct ManualClock {
    now: std::sync::Arc<std::sync::Mutex<Instant>>,
}

#[cfg(test)]
impl ManualClock {
    pub(crate) fn new() -> Self {
        Self {
            now: std::sync::Arc::new(std::sync::Mutex::new(Instant::now())),
        }
    }

    pub(crate) fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap()
    }
}
