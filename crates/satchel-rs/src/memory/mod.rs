//! Persistent working memory: the bounded store of pins, tracked files,
//! active tasks, and device/session metadata that outlives any single
//! conversation.
//!
//! Three layers:
//!
//! 1. **[`types`]** — the serde aggregate that lands in the store file,
//!    including the fixed device-profile presets.
//! 2. **[`persist`]** — the [`MemoryStorage`] whole-file backend, the
//!    explicit [`DebounceTimer`] state machine, and the injected [`Clock`]
//!    that drives it.
//! 3. **[`store`]** — the [`WorkingMemoryStore`] itself: every public
//!    operation, every eviction policy, and the dirty/flush lifecycle.
//!
//! The store never raises for storage trouble. Corrupt or missing files
//! load as fresh defaults; failed writes leave it running in memory with a
//! retry pending. The one hard requirement on callers is
//! [`flush`](WorkingMemoryStore::flush) before exit.

pub mod persist;
pub mod store;
pub mod types;

// Re-export commonly used items at the module level.
pub use persist::{
    Clock, DebounceTimer, JsonFileStorage, MemoryStorage, PERSIST_DEBOUNCE, SystemClock,
    default_store_path, epoch_secs, generate_id,
};
pub use store::{StoreStats, WorkingMemoryStore, autosave_loop};
pub use types::{
    ActiveTask, DeviceKind, DeviceProfile, MAX_ACTIVE_FILES, MAX_ACTIVE_TASKS, MAX_PINS, PinKind,
    PinSource, PinnedItem, StoreMetadata, TaskStatus, TrackedFile, WorkingMemory,
};
