//! Persisted working-memory data types.
//!
//! Everything in this file serializes into the single store file. Timestamps
//! are epoch seconds. Collection fields carry `#[serde(default)]` so a store
//! written by an older version (or with fields pruned by hand) still loads.

use serde::{Deserialize, Serialize};

/// Maximum pinned items kept; the lowest-importance pins are evicted first.
pub const MAX_PINS: usize = 50;

/// Maximum tracked files kept; least-recently-accessed are evicted first.
pub const MAX_ACTIVE_FILES: usize = 30;

/// Maximum tasks kept; completed tasks are evicted before active ones.
pub const MAX_ACTIVE_TASKS: usize = 20;

/// Schema version written into [`StoreMetadata`].
pub const STORE_VERSION: u32 = 1;

// ── Pins ───────────────────────────────────────────────────────────

/// What kind of fact a pin records.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PinKind {
    Decision,
    Fact,
    Task,
    Instruction,
    Reference,
}

impl std::fmt::Display for PinKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PinKind::Decision => write!(f, "decision"),
            PinKind::Fact => write!(f, "fact"),
            PinKind::Task => write!(f, "task"),
            PinKind::Instruction => write!(f, "instruction"),
            PinKind::Reference => write!(f, "reference"),
        }
    }
}

impl std::str::FromStr for PinKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "decision" => Ok(PinKind::Decision),
            "fact" => Ok(PinKind::Fact),
            "task" => Ok(PinKind::Task),
            "instruction" => Ok(PinKind::Instruction),
            "reference" => Ok(PinKind::Reference),
            other => Err(format!("unknown pin kind: {other}")),
        }
    }
}

/// Who created a pin.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PinSource {
    User,
    Agent,
    System,
}

/// A fact or decision explicitly marked for retention across compaction
/// and, unless it carries a TTL, across sessions.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PinnedItem {
    pub id: String,
    pub content: String,
    pub kind: PinKind,
    pub source: PinSource,
    /// Retention weight in [0, 1]; clamped on creation.
    pub importance: f64,
    pub created_at: u64,
    /// Epoch seconds after which the pin is swept. `None` means permanent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
}

impl PinnedItem {
    pub fn is_expired(&self, now: u64) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

// ── Tracked files ──────────────────────────────────────────────────

/// One entry per unique file path the session has touched.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TrackedFile {
    pub path: String,
    pub last_accessed: u64,
    /// Increments monotonically; never below 1.
    pub access_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

// ── Tasks ──────────────────────────────────────────────────────────

/// Lifecycle state of a task.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Active,
    Paused,
    Completed,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Active => write!(f, "active"),
            TaskStatus::Paused => write!(f, "paused"),
            TaskStatus::Completed => write!(f, "completed"),
        }
    }
}

/// A multi-step piece of work the user is partway through.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ActiveTask {
    pub id: String,
    pub description: String,
    pub status: TaskStatus,
    pub created_at: u64,
    pub updated_at: u64,
    #[serde(default)]
    pub subtasks: Vec<String>,
}

// ── Device profiles ────────────────────────────────────────────────

/// Named runtime-environment preset.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Mobile,
    Laptop,
    Desktop,
    Server,
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceKind::Mobile => write!(f, "mobile"),
            DeviceKind::Laptop => write!(f, "laptop"),
            DeviceKind::Desktop => write!(f, "desktop"),
            DeviceKind::Server => write!(f, "server"),
        }
    }
}

impl std::str::FromStr for DeviceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mobile" => Ok(DeviceKind::Mobile),
            "laptop" => Ok(DeviceKind::Laptop),
            "desktop" => Ok(DeviceKind::Desktop),
            "server" => Ok(DeviceKind::Server),
            other => Err(format!("unknown device kind: {other}")),
        }
    }
}

/// Bounds the token budget and compaction aggressiveness to match an
/// assumed runtime environment. Only the preset values below are legal;
/// the profile is replaced wholesale, never partially mutated.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DeviceProfile {
    pub kind: DeviceKind,
    pub max_context_tokens: usize,
    pub max_working_memory_items: usize,
    /// Compaction trigger fraction; presets stay within [0.5, 0.95].
    pub compaction_threshold: f64,
}

impl DeviceProfile {
    /// The fixed preset for a device kind. These exact values are part of
    /// the documented contract.
    pub fn preset(kind: DeviceKind) -> Self {
        match kind {
            DeviceKind::Mobile => Self {
                kind,
                max_context_tokens: 16_384,
                max_working_memory_items: 20,
                compaction_threshold: 0.65,
            },
            DeviceKind::Laptop => Self {
                kind,
                max_context_tokens: 65_536,
                max_working_memory_items: 50,
                compaction_threshold: 0.75,
            },
            DeviceKind::Desktop => Self {
                kind,
                max_context_tokens: 128_000,
                max_working_memory_items: 100,
                compaction_threshold: 0.80,
            },
            DeviceKind::Server => Self {
                kind,
                max_context_tokens: 200_000,
                max_working_memory_items: 200,
                compaction_threshold: 0.85,
            },
        }
    }
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self::preset(DeviceKind::Laptop)
    }
}

// ── Aggregate ──────────────────────────────────────────────────────

/// Store bookkeeping, written on every persist.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StoreMetadata {
    pub version: u32,
    pub updated_at: u64,
    pub session_count: u64,
}

impl Default for StoreMetadata {
    fn default() -> Self {
        Self {
            version: STORE_VERSION,
            updated_at: 0,
            session_count: 0,
        }
    }
}

/// The persisted working-memory aggregate: everything the store owns.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct WorkingMemory {
    #[serde(default)]
    pub metadata: StoreMetadata,
    #[serde(default)]
    pub pins: Vec<PinnedItem>,
    #[serde(default)]
    pub files: Vec<TrackedFile>,
    #[serde(default)]
    pub tasks: Vec<ActiveTask>,
    #[serde(default)]
    pub device_profile: DeviceProfile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_session_summary: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_presets_match_the_documented_contract() {
        let mobile = DeviceProfile::preset(DeviceKind::Mobile);
        assert_eq!(mobile.max_context_tokens, 16_384);
        assert_eq!(mobile.max_working_memory_items, 20);
        assert!((mobile.compaction_threshold - 0.65).abs() < 1e-9);

        let laptop = DeviceProfile::preset(DeviceKind::Laptop);
        assert_eq!(laptop.max_context_tokens, 65_536);
        assert_eq!(laptop.max_working_memory_items, 50);
        assert!((laptop.compaction_threshold - 0.75).abs() < 1e-9);

        let desktop = DeviceProfile::preset(DeviceKind::Desktop);
        assert_eq!(desktop.max_context_tokens, 128_000);
        assert_eq!(desktop.max_working_memory_items, 100);
        assert!((desktop.compaction_threshold - 0.80).abs() < 1e-9);

        let server = DeviceProfile::preset(DeviceKind::Server);
        assert_eq!(server.max_context_tokens, 200_000);
        assert_eq!(server.max_working_memory_items, 200);
        assert!((server.compaction_threshold - 0.85).abs() < 1e-9);
    }

    #[test]
    fn preset_thresholds_stay_in_range() {
        for kind in [
            DeviceKind::Mobile,
            DeviceKind::Laptop,
            DeviceKind::Desktop,
            DeviceKind::Server,
        ] {
            let p = DeviceProfile::preset(kind);
            assert!((0.5..=0.95).contains(&p.compaction_threshold));
        }
    }

    #[test]
    fn default_profile_is_laptop() {
        assert_eq!(DeviceProfile::default().kind, DeviceKind::Laptop);
    }

    #[test]
    fn pin_expiry() {
        let pin = PinnedItem {
            id: "pin-1".into(),
            content: "remember this".into(),
            kind: PinKind::Fact,
            source: PinSource::User,
            importance: 0.5,
            created_at: 1000,
            expires_at: Some(2000),
        };
        assert!(!pin.is_expired(1999));
        assert!(pin.is_expired(2000));

        let permanent = PinnedItem {
            expires_at: None,
            ..pin
        };
        assert!(!permanent.is_expired(u64::MAX));
    }

    #[test]
    fn aggregate_roundtrips_through_json() {
        let mut data = WorkingMemory::default();
        data.pins.push(PinnedItem {
            id: "pin-a".into(),
            content: "use sqlite".into(),
            kind: PinKind::Decision,
            source: PinSource::Agent,
            importance: 0.8,
            created_at: 42,
            expires_at: None,
        });
        data.tasks.push(ActiveTask {
            id: "task-a".into(),
            description: "migrate storage".into(),
            status: TaskStatus::Active,
            created_at: 42,
            updated_at: 43,
            subtasks: vec!["write schema".into()],
        });

        let json = serde_json::to_string_pretty(&data).unwrap();
        let back: WorkingMemory = serde_json::from_str(&json).unwrap();
        assert_eq!(back.pins.len(), 1);
        assert_eq!(back.pins[0].kind, PinKind::Decision);
        assert_eq!(back.tasks[0].status, TaskStatus::Active);
        assert_eq!(back.device_profile.kind, DeviceKind::Laptop);
    }

    #[test]
    fn partial_json_loads_with_defaults() {
        // A store written by an older version, missing most fields.
        let back: WorkingMemory =
            serde_json::from_str(r#"{"metadata":{"version":1,"updated_at":5,"session_count":2}}"#)
                .unwrap();
        assert_eq!(back.metadata.session_count, 2);
        assert!(back.pins.is_empty());
        assert_eq!(back.device_profile.kind, DeviceKind::Laptop);
        assert!(back.last_session_summary.is_none());
    }

    #[test]
    fn enums_serialize_snake_case() {
        assert_eq!(serde_json::to_string(&PinKind::Decision).unwrap(), "\"decision\"");
        assert_eq!(serde_json::to_string(&TaskStatus::Completed).unwrap(), "\"completed\"");
        assert_eq!(serde_json::to_string(&DeviceKind::Server).unwrap(), "\"server\"");
    }
}
