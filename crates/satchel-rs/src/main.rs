//! Inspect and maintain a satchel working-memory store from the shell.
//!
//! # Examples
//!
//! ```sh
//! # Summary of what the store holds
//! satchel stats
//!
//! # Pin a decision that must survive compaction
//! satchel pin "we target sqlite, not postgres" --kind decision --importance 0.9
//!
//! # See what would be injected for a complex request
//! satchel context --level complex
//!
//! # Let the classifier pick the level from an utterance
//! satchel context --utterance "refactor the auth layer for multi-tenant"
//!
//! # Switch to the mobile preset on a constrained machine
//! satchel device mobile
//! ```

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use satchel_rs::context::{ComplexityLevel, classify};
use satchel_rs::memory::{
    JsonFileStorage, PinKind, PinSource, WorkingMemoryStore, default_store_path,
};

/// Inspect and maintain the working-memory store.
#[derive(Parser)]
#[command(name = "satchel")]
struct Cli {
    /// Path to the store file (defaults to .agents/ram.json)
    #[arg(long)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show store statistics
    Stats,

    /// List pinned items, importance first
    Pins {
        /// Show at most this many
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Pin a new item
    Pin {
        /// The fact or decision to retain
        content: String,

        /// decision | fact | task | instruction | reference
        #[arg(long, default_value = "fact")]
        kind: String,

        /// Retention weight in [0, 1]
        #[arg(long, default_value_t = 0.5)]
        importance: f64,

        /// Expire after this many minutes (permanent if omitted)
        #[arg(long)]
        ttl_minutes: Option<u64>,
    },

    /// Remove a pinned item by id
    Unpin { id: String },

    /// Render the injectable context block
    Context {
        /// simple | moderate | complex (overrides --utterance)
        #[arg(long)]
        level: Option<String>,

        /// Classify this utterance to pick the level
        #[arg(long)]
        utterance: Option<String>,
    },

    /// Switch the device profile preset
    Device {
        /// mobile | laptop | desktop | server
        kind: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .init();

    let cli = Cli::parse();
    let path = cli.store.unwrap_or_else(default_store_path);
    let mut store = WorkingMemoryStore::load(Box::new(JsonFileStorage::new(path)));

    match cli.command {
        Command::Stats => {
            let stats = store.stats();
            println!("device:        {}", stats.device_kind);
            println!("sessions:      {}", stats.session_count);
            println!("pins:          {}", stats.pins);
            println!("files tracked: {}", stats.files);
            println!("tasks:         {} ({} open)", stats.tasks, stats.active_tasks);
            println!("last saved:    {}", fmt_epoch(stats.updated_at));
        }

        Command::Pins { limit } => {
            let pins = store.pins(limit);
            if pins.is_empty() {
                println!("no pins");
            }
            for pin in pins {
                let expiry = pin
                    .expires_at
                    .map(|at| format!(", expires {}", fmt_epoch(at)))
                    .unwrap_or_default();
                println!(
                    "{}  [{}] ({:.2}{expiry})\n    {}",
                    pin.id, pin.kind, pin.importance, pin.content
                );
            }
        }

        Command::Pin {
            content,
            kind,
            importance,
            ttl_minutes,
        } => {
            let kind: PinKind = kind.parse().unwrap_or_else(|e| {
                eprintln!("Error: {e}");
                process::exit(2);
            });
            let item = store.pin(content, kind, PinSource::User, importance, ttl_minutes);
            println!("pinned {}", item.id);
        }

        Command::Unpin { id } => {
            if store.unpin(&id) {
                println!("unpinned {id}");
            } else {
                eprintln!("Error: no pin with id {id}");
                store.flush();
                process::exit(2);
            }
        }

        Command::Context { level, utterance } => {
            let level = match (level, utterance) {
                (Some(name), _) => name.parse::<ComplexityLevel>().unwrap_or_else(|e| {
                    eprintln!("Error: {e}");
                    process::exit(2);
                }),
                (None, Some(text)) => classify(&text, 0),
                (None, None) => ComplexityLevel::Moderate,
            };
            let block = store.build_context(level);
            if block.is_empty() {
                eprintln!("(nothing to inject at level {level})");
            } else {
                println!("{block}");
            }
        }

        Command::Device { kind } => {
            if kind.parse::<satchel_rs::memory::DeviceKind>().is_err() {
                eprintln!("Error: unknown device kind {kind}");
                store.flush();
                process::exit(2);
            }
            let profile = store.set_device_profile(&kind);
            println!(
                "device {} (max context {}, max items {}, compaction at {:.0}%)",
                profile.kind,
                profile.max_context_tokens,
                profile.max_working_memory_items,
                profile.compaction_threshold * 100.0
            );
        }
    }

    store.flush();
}

/// Render an epoch-seconds timestamp in local time.
fn fmt_epoch(secs: u64) -> String {
    if secs == 0 {
        return "never".into();
    }
    chrono::DateTime::from_timestamp(secs as i64, 0)
        .map(|dt| {
            dt.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| secs.to_string())
}
