//! `flightcheck` - Aviation procedure checklists with persisted progress
//!
//! This library provides the checklist catalog, the record store that tracks
//! which steps have been ticked off, the persisted user settings, and the
//! key-value storage they are built on.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod record;
pub mod record_store;
pub mod settings;
pub mod storage;

pub use catalog::{catalog, ChecklistDefinition, ChecklistId};
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use record::{
    compute_progress, ActiveChecklist, ChecklistItem, ChecklistRecord, ChecklistSummary, Progress,
};
pub use record_store::{ChecklistUpdate, RecordStore};
pub use settings::{Settings, SettingsPatch, SettingsStore};
pub use storage::{KeyValueStore, MemoryStore, SqliteStore, StorageStats};
