//! Checklist completion records.
//!
//! This module defines the mutable per-checklist state and the progress
//! values derived from it.

use serde::{Deserialize, Serialize};

use crate::catalog::{fingerprint_steps, ChecklistDefinition, ChecklistId};

/// One step of a checklist and whether it has been ticked off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    /// Step text, copied from the catalog when the record was created.
    pub text: String,
    /// Whether the step is done.
    pub completed: bool,
}

impl ChecklistItem {
    /// Create an unchecked item.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            completed: false,
        }
    }
}

/// Completion state for one checklist.
///
/// The item sequence is fixed when the record is first created; afterwards
/// only the `completed` flags change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistRecord {
    /// Which checklist this record tracks.
    pub id: ChecklistId,
    /// Title copied from the definition.
    pub title: String,
    /// Ordered items.
    pub items: Vec<ChecklistItem>,
}

impl ChecklistRecord {
    /// Materialize a fresh record with every item unchecked.
    #[must_use]
    pub fn from_definition(definition: &ChecklistDefinition) -> Self {
        Self {
            id: definition.id,
            title: definition.title.to_string(),
            items: definition.steps.iter().map(|s| ChecklistItem::new(*s)).collect(),
        }
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the record has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of completed items.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        count_completed(&self.items)
    }

    /// Progress of this record.
    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress::of(&self.items)
    }

    /// Fingerprint of the item texts, comparable with
    /// [`ChecklistDefinition::fingerprint`].
    #[must_use]
    pub fn fingerprint(&self) -> String {
        fingerprint_steps(self.items.iter().map(|item| item.text.as_str()))
    }

    /// Check whether the item texts still match the catalog definition.
    ///
    /// A record created before a catalog change keeps its original texts.
    #[must_use]
    pub fn matches_definition(&self, definition: &ChecklistDefinition) -> bool {
        self.fingerprint() == definition.fingerprint()
    }

    /// Mark every item as not completed.
    pub fn clear_completion(&mut self) {
        for item in &mut self.items {
            item.completed = false;
        }
    }

    /// Snapshot this record for the active checklist pointer.
    #[must_use]
    pub fn snapshot(&self) -> ActiveChecklist {
        ActiveChecklist {
            id: self.id,
            title: self.title.clone(),
            items: self.items.clone(),
        }
    }
}

/// Snapshot of the most recently loaded or mutated record.
///
/// Serialized as `{id, title, items}` under the `currentChecklist` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveChecklist {
    /// Checklist identifier.
    pub id: ChecklistId,
    /// Checklist title.
    pub title: String,
    /// Item states at the time of the snapshot.
    pub items: Vec<ChecklistItem>,
}

impl ActiveChecklist {
    /// Progress of the snapshot.
    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress::of(&self.items)
    }
}

/// Completion counts with the derived percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// Completed items.
    pub completed: usize,
    /// Total items.
    pub total: usize,
    /// Rounded percentage in `0..=100`.
    pub percent: u8,
}

impl Progress {
    /// Compute progress for a slice of items.
    #[must_use]
    pub fn of(items: &[ChecklistItem]) -> Self {
        let completed = count_completed(items);
        let total = items.len();
        Self {
            completed,
            total,
            percent: percent(completed, total),
        }
    }

    /// Check if every item is done (and there is at least one).
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.percent == 100
    }
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} ({}%)", self.completed, self.total, self.percent)
    }
}

/// Overview entry for one checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChecklistSummary {
    /// Rounded percentage in `0..=100`.
    pub progress: u8,
    /// `true` when progress is 100.
    pub completed: bool,
}

impl ChecklistSummary {
    /// Build a summary from a progress percentage.
    #[must_use]
    pub fn from_percent(progress: u8) -> Self {
        Self {
            progress,
            completed: progress == 100,
        }
    }
}

/// Percentage of completed items in a record.
///
/// Returns 0 for an empty record, otherwise `100 * completed / total` rounded
/// half up.
#[must_use]
pub fn compute_progress(record: &ChecklistRecord) -> u8 {
    percent(record.completed_count(), record.len())
}

fn count_completed(items: &[ChecklistItem]) -> usize {
    items.iter().filter(|item| item.completed).count()
}

fn percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total);
    // (200c + t) / 2t == floor(100c/t + 1/2)
    let rounded = (200 * completed + total) / (2 * total);
    u8::try_from(rounded).unwrap_or(100)
}
