//! The working-memory store: pins, tracked files, tasks, device profile,
//! and debounced persistence.
//!
//! Exactly one store instance exists per session, explicitly constructed
//! over an injected [`MemoryStorage`] and [`Clock`] — no module-level
//! singleton, so tests run in parallel against isolated paths. The store is
//! the sole writer of its own file.
//!
//! Persistence is never load-bearing: a missing or corrupt file yields
//! fresh defaults, and a failed write leaves the store operating in memory
//! with the dirty flag set so a later flush retries. Callers must
//! [`flush`](WorkingMemoryStore::flush) before process exit or the final
//! debounce window's mutations are lost.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, warn};

use crate::context::budget::budget_for;
use crate::context::classify::ComplexityLevel;
use crate::memory::persist::{
    Clock, DebounceTimer, MemoryStorage, PERSIST_DEBOUNCE, SystemClock, epoch_secs, generate_id,
};
use crate::memory::types::{
    ActiveTask, DeviceKind, DeviceProfile, MAX_ACTIVE_FILES, MAX_ACTIVE_TASKS, MAX_PINS, PinKind,
    PinSource, PinnedItem, TaskStatus, TrackedFile, WorkingMemory,
};

/// Point-in-time snapshot of store contents, for logging and the CLI.
#[derive(Debug, Clone)]
pub struct StoreStats {
    pub pins: usize,
    pub files: usize,
    pub tasks: usize,
    pub active_tasks: usize,
    pub session_count: u64,
    pub device_kind: DeviceKind,
    pub updated_at: u64,
}

/// The per-session working-memory aggregate and its eviction policies.
pub struct WorkingMemoryStore {
    data: WorkingMemory,
    storage: Box<dyn MemoryStorage>,
    clock: Box<dyn Clock>,
    timer: DebounceTimer,
    dirty: bool,
}

impl WorkingMemoryStore {
    /// Load the store from storage, or start fresh if nothing usable is
    /// there. Never fails: malformed persisted state is discarded with a
    /// warning. Sweeps expired pins and counts the session.
    pub fn load(storage: Box<dyn MemoryStorage>) -> Self {
        Self::load_with_clock(storage, Box::new(SystemClock))
    }

    /// [`load`](Self::load) with an injected clock for the debounce timer.
    pub fn load_with_clock(storage: Box<dyn MemoryStorage>, clock: Box<dyn Clock>) -> Self {
        let data = match storage.load() {
            Ok(Some(json)) => match serde_json::from_str::<WorkingMemory>(&json) {
                Ok(data) => data,
                Err(e) => {
                    warn!("working memory file is corrupt, starting fresh: {e}");
                    WorkingMemory::default()
                }
            },
            Ok(None) => {
                debug!("no working memory file yet, starting fresh");
                WorkingMemory::default()
            }
            Err(e) => {
                warn!("failed to read working memory, starting fresh: {e}");
                WorkingMemory::default()
            }
        };

        let mut store = Self {
            data,
            storage,
            clock,
            timer: DebounceTimer::new(PERSIST_DEBOUNCE),
            dirty: false,
        };
        store.sweep_expired(epoch_secs());
        store.data.metadata.session_count += 1;
        store.mark_dirty();
        store
    }

    /// Read-only view of the underlying aggregate.
    pub fn data(&self) -> &WorkingMemory {
        &self.data
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            pins: self.data.pins.len(),
            files: self.data.files.len(),
            tasks: self.data.tasks.len(),
            active_tasks: self
                .data
                .tasks
                .iter()
                .filter(|t| t.status != TaskStatus::Completed)
                .count(),
            session_count: self.data.metadata.session_count,
            device_kind: self.data.device_profile.kind,
            updated_at: self.data.metadata.updated_at,
        }
    }

    // ── Pins ───────────────────────────────────────────────────────

    /// Pin a fact for retention. `importance` is clamped to [0, 1];
    /// `ttl_minutes` of `None` means permanent. If the pin list overflows
    /// [`MAX_PINS`], the lowest-importance pins are evicted — never the
    /// oldest.
    pub fn pin(
        &mut self,
        content: impl Into<String>,
        kind: PinKind,
        source: PinSource,
        importance: f64,
        ttl_minutes: Option<u64>,
    ) -> PinnedItem {
        let now = epoch_secs();
        let item = PinnedItem {
            id: generate_id("pin"),
            content: content.into(),
            kind,
            source,
            importance: importance.clamp(0.0, 1.0),
            created_at: now,
            expires_at: ttl_minutes.map(|m| now + m * 60),
        };
        self.data.pins.push(item.clone());

        if self.data.pins.len() > MAX_PINS {
            self.data
                .pins
                .sort_by(|a, b| b.importance.total_cmp(&a.importance));
            self.data.pins.truncate(MAX_PINS);
        }

        self.mark_dirty();
        item
    }

    /// Remove a pin by id. Returns `false` if absent; safe to call twice.
    pub fn unpin(&mut self, id: &str) -> bool {
        let before = self.data.pins.len();
        self.data.pins.retain(|p| p.id != id);
        let removed = self.data.pins.len() != before;
        if removed {
            self.mark_dirty();
        }
        removed
    }

    /// Pins sorted by importance descending, optionally limited.
    ///
    /// Expired pins are swept on load and by [`cleanup`](Self::cleanup),
    /// not here.
    pub fn pins(&self, limit: Option<usize>) -> Vec<&PinnedItem> {
        let mut out: Vec<&PinnedItem> = self.data.pins.iter().collect();
        out.sort_by(|a, b| b.importance.total_cmp(&a.importance));
        if let Some(n) = limit {
            out.truncate(n);
        }
        out
    }

    /// Sweep expired pins now. Returns how many were removed.
    pub fn cleanup(&mut self) -> usize {
        self.sweep_expired(epoch_secs())
    }

    fn sweep_expired(&mut self, now: u64) -> usize {
        let before = self.data.pins.len();
        self.data.pins.retain(|p| !p.is_expired(now));
        let removed = before - self.data.pins.len();
        if removed > 0 {
            debug!("swept {removed} expired pin(s)");
            self.mark_dirty();
        }
        removed
    }

    // ── Tracked files ──────────────────────────────────────────────

    /// Record a file access: upsert by path, bump the access count, and
    /// overwrite the summary when one is provided. Over
    /// [`MAX_ACTIVE_FILES`], the least-recently-accessed entries drop.
    pub fn track_file_access(&mut self, path: &str, summary: Option<&str>) {
        self.touch_file(path, summary, epoch_secs());
    }

    fn touch_file(&mut self, path: &str, summary: Option<&str>, now: u64) {
        if let Some(entry) = self.data.files.iter_mut().find(|f| f.path == path) {
            entry.access_count += 1;
            entry.last_accessed = now;
            if let Some(s) = summary {
                entry.summary = Some(s.to_string());
            }
        } else {
            self.data.files.push(TrackedFile {
                path: path.to_string(),
                last_accessed: now,
                access_count: 1,
                summary: summary.map(str::to_string),
            });
            if self.data.files.len() > MAX_ACTIVE_FILES {
                self.data
                    .files
                    .sort_by_key(|f| std::cmp::Reverse(f.last_accessed));
                self.data.files.truncate(MAX_ACTIVE_FILES);
            }
        }
        self.mark_dirty();
    }

    // ── Tasks ──────────────────────────────────────────────────────

    /// Add a task. Over [`MAX_ACTIVE_TASKS`], completed tasks are evicted
    /// first, then the oldest.
    pub fn add_task(&mut self, description: impl Into<String>, subtasks: Vec<String>) -> ActiveTask {
        let now = epoch_secs();
        let task = ActiveTask {
            id: generate_id("task"),
            description: description.into(),
            status: TaskStatus::Active,
            created_at: now,
            updated_at: now,
            subtasks,
        };
        self.data.tasks.push(task.clone());

        while self.data.tasks.len() > MAX_ACTIVE_TASKS {
            let victim = self
                .data
                .tasks
                .iter()
                .position(|t| t.status == TaskStatus::Completed)
                .unwrap_or(0);
            self.data.tasks.remove(victim);
        }

        self.mark_dirty();
        task
    }

    /// Mark a task completed. Returns `false` for an unknown id.
    pub fn complete_task(&mut self, id: &str) -> bool {
        self.set_task_status(id, TaskStatus::Completed)
    }

    /// Pause a task. Returns `false` for an unknown id.
    pub fn pause_task(&mut self, id: &str) -> bool {
        self.set_task_status(id, TaskStatus::Paused)
    }

    fn set_task_status(&mut self, id: &str, status: TaskStatus) -> bool {
        match self.data.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.status = status;
                task.updated_at = epoch_secs();
                self.mark_dirty();
                true
            }
            None => false,
        }
    }

    // ── Device profile ─────────────────────────────────────────────

    /// Replace the device profile from the preset table. An unknown kind
    /// is a no-op; the unchanged current profile is returned either way.
    pub fn set_device_profile(&mut self, kind: &str) -> DeviceProfile {
        match kind.parse::<DeviceKind>() {
            Ok(k) => {
                self.data.device_profile = DeviceProfile::preset(k);
                self.mark_dirty();
            }
            Err(e) => warn!("{e}, keeping {} profile", self.data.device_profile.kind),
        }
        self.data.device_profile.clone()
    }

    pub fn device_profile(&self) -> &DeviceProfile {
        &self.data.device_profile
    }

    /// The ceiling compaction should work against: the smaller of the
    /// model's limit and what this device can afford.
    pub fn effective_context_limit(&self, model_limit: usize) -> usize {
        model_limit.min(self.data.device_profile.max_context_tokens)
    }

    // ── Session summary ────────────────────────────────────────────

    /// Record a summary of the ending session for injection next time.
    /// An empty summary clears the stored one.
    pub fn record_session_summary(&mut self, summary: impl Into<String>) {
        let s = summary.into();
        self.data.last_session_summary = if s.trim().is_empty() { None } else { Some(s) };
        self.mark_dirty();
    }

    pub fn last_session_summary(&self) -> Option<&str> {
        self.data.last_session_summary.as_deref()
    }

    // ── Context building ───────────────────────────────────────────

    /// Assemble the injectable context block for the given complexity
    /// level. Sections are gated by the level's `memory_ratio`: the
    /// last-session summary needs ≥ 0.3, tasks and file names need ≥ 0.5,
    /// and pins are always considered but capped at `max_pins_injected`.
    /// Returns an empty string when nothing qualifies.
    pub fn build_context(&self, level: ComplexityLevel) -> String {
        let budgets = budget_for(level);
        let mut sections: Vec<String> = Vec::new();

        if budgets.memory_ratio >= 0.3
            && let Some(summary) = self.data.last_session_summary.as_deref()
            && !summary.trim().is_empty()
        {
            sections.push(format!("## Last session\n{summary}"));
        }

        let pins = self.pins(Some(budgets.max_pins_injected));
        if !pins.is_empty() {
            let lines: Vec<String> = pins
                .iter()
                .map(|p| format!("- [{}] {}", p.kind, p.content))
                .collect();
            sections.push(format!("## Pinned\n{}", lines.join("\n")));
        }

        if budgets.memory_ratio >= 0.5 {
            let tasks: Vec<String> = self
                .data
                .tasks
                .iter()
                .filter(|t| t.status != TaskStatus::Completed)
                .map(|t| {
                    if t.subtasks.is_empty() {
                        format!("- [{}] {}", t.status, t.description)
                    } else {
                        format!(
                            "- [{}] {} ({} subtasks)",
                            t.status,
                            t.description,
                            t.subtasks.len()
                        )
                    }
                })
                .collect();
            if !tasks.is_empty() {
                sections.push(format!("## Active tasks\n{}", tasks.join("\n")));
            }

            let mut recent: Vec<&TrackedFile> = self.data.files.iter().collect();
            recent.sort_by_key(|f| std::cmp::Reverse(f.last_accessed));
            let names: Vec<&str> = recent.iter().take(10).map(|f| f.path.as_str()).collect();
            if !names.is_empty() {
                sections.push(format!("## Recent files\n{}", names.join(", ")));
            }
        }

        if sections.is_empty() {
            String::new()
        } else {
            sections.join("\n\n")
        }
    }

    // ── Persistence ────────────────────────────────────────────────

    fn mark_dirty(&mut self) {
        self.dirty = true;
        let now = self.clock.now();
        self.timer.schedule(now);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Persist if the debounce deadline has passed. Returns whether a
    /// write happened. Drive this from [`autosave_loop`] or any other
    /// periodic caller.
    pub fn tick(&mut self) -> bool {
        if self.dirty && self.timer.is_due(self.clock.now()) {
            self.timer.cancel();
            self.persist()
        } else {
            false
        }
    }

    /// Cancel any pending debounce and persist immediately if dirty.
    /// Call before process exit.
    pub fn flush(&mut self) -> bool {
        self.timer.cancel();
        if self.dirty { self.persist() } else { false }
    }

    fn persist(&mut self) -> bool {
        self.data.metadata.updated_at = epoch_secs();
        let json = match serde_json::to_string_pretty(&self.data) {
            Ok(json) => json,
            Err(e) => {
                warn!("failed to serialize working memory: {e}");
                return false;
            }
        };
        match self.storage.save(&json) {
            Ok(()) => {
                self.dirty = false;
                debug!("working memory persisted");
                true
            }
            Err(e) => {
                // Keep dirty so a later flush retries; the store keeps
                // operating in memory for the rest of the session.
                warn!("failed to persist working memory: {e}");
                false
            }
        }
    }
}

/// Periodically tick a shared store so debounced writes land without the
/// conversation loop having to remember to. Runs until the task is
/// dropped or aborted; `flush()` on shutdown is still the caller's job.
pub async fn autosave_loop(store: Arc<Mutex<WorkingMemoryStore>>, poll_interval: Duration) {
    loop {
        tokio::time::sleep(poll_interval).await;
        let mut guard = match store.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.tick();
    }
}
