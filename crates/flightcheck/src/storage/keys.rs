//! Storage key naming.
//!
//! These names are the durable on-disk contract; backups and other tools
//! depend on them.

use crate::catalog::ChecklistId;

/// Prefix of every checklist record key.
pub const RECORD_KEY_PREFIX: &str = "checklist_";

/// Key of the active checklist pointer.
pub const ACTIVE_CHECKLIST_KEY: &str = "currentChecklist";

/// Key of the settings record.
pub const SETTINGS_KEY: &str = "settings";

/// Storage key of a checklist record.
#[must_use]
pub fn record_key(id: ChecklistId) -> String {
    format!("{RECORD_KEY_PREFIX}{id}")
}

/// Check if `key` looks like a checklist record key.
///
/// Keys for identifiers no longer in the catalog still match.
#[must_use]
pub fn is_record_key(key: &str) -> bool {
    key.strip_prefix(RECORD_KEY_PREFIX)
        .is_some_and(|rest| !rest.is_empty())
}
