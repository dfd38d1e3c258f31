//! Checklist record store.
//!
//! Materializes, persists, mutates and resets per-checklist completion state
//! on top of a [`KeyValueStore`], and keeps the last-touched record as the
//! active checklist.
//!
//! Each record is stored under `checklist_<id>` as a JSON array of
//! `{text, completed}`; the active checklist snapshot is stored under
//! `currentChecklist`. The two writes are independent: there is no atomicity
//! across them.
//!
//! Mutations are computed on a copy and only committed to the in-memory state
//! once the record write has succeeded, so a failed write leaves the loaded
//! record exactly as it was.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::catalog::{catalog, ChecklistId};
use crate::error::{Error, Result};
use crate::record::{
    compute_progress, ActiveChecklist, ChecklistItem, ChecklistRecord, ChecklistSummary, Progress,
};
use crate::storage::keys::{is_record_key, record_key, ACTIVE_CHECKLIST_KEY};
use crate::storage::KeyValueStore;

/// Result of a toggle or reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistUpdate {
    /// The record after the change.
    pub record: ChecklistRecord,
    /// Progress percentage after the change.
    pub progress: u8,
}

impl ChecklistUpdate {
    fn new(record: ChecklistRecord) -> Self {
        let progress = compute_progress(&record);
        Self { record, progress }
    }

    /// New completion state of the item at `index`.
    #[must_use]
    pub fn item_completed(&self, index: usize) -> Option<bool> {
        self.record.items.get(index).map(|item| item.completed)
    }

    /// Full progress counts of the updated record.
    #[must_use]
    pub fn counts(&self) -> Progress {
        self.record.progress()
    }
}

/// Owner of checklist completion state.
#[derive(Debug)]
pub struct RecordStore<S> {
    store: Arc<S>,
    records: HashMap<ChecklistId, ChecklistRecord>,
    active: Option<ActiveChecklist>,
}

impl<S: KeyValueStore> RecordStore<S> {
    /// Create a record store over the given key-value store.
    ///
    /// Nothing is read until a record is loaded.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            records: HashMap::new(),
            active: None,
        }
    }

    /// The underlying key-value store.
    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// The record loaded for `id` in this session, if any.
    #[must_use]
    pub fn record(&self, id: ChecklistId) -> Option<&ChecklistRecord> {
        self.records.get(&id)
    }

    /// The most recently loaded or mutated record, if any.
    #[must_use]
    pub fn active(&self) -> Option<&ActiveChecklist> {
        self.active.as_ref()
    }

    /// Load the record for `id`, creating it from the catalog on first access.
    ///
    /// A stored record is returned as it was persisted, even if the catalog
    /// steps have changed since; a mismatch is only logged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedRecord`] if the stored value does not parse,
    /// or [`Error::StorageUnavailable`] if the store fails.
    pub async fn load_or_create(&mut self, id: ChecklistId) -> Result<ChecklistRecord> {
        let key = record_key(id);
        let definition = id.definition();

        let record = match self.store.get(&key).await? {
            Some(raw) => {
                let items = parse_items(&key, &raw)?;
                let record = ChecklistRecord {
                    id,
                    title: definition.title.to_string(),
                    items,
                };
                if !record.matches_definition(definition) {
                    warn!(
                        "Stored checklist '{}' no longer matches the catalog ({} stored items, {} steps)",
                        id,
                        record.len(),
                        definition.len()
                    );
                }
                debug!("Loaded checklist '{}'", id);
                record
            }
            None => {
                let record = ChecklistRecord::from_definition(definition);
                self.write_items(&key, &record.items).await?;
                info!("Created checklist '{}' with {} items", id, record.len());
                record
            }
        };

        self.touch(&record).await?;
        self.records.insert(id, record.clone());
        Ok(record)
    }

    /// Flip the completed flag of one item.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChecklistNotLoaded`] if `id` has not been loaded,
    /// [`Error::IndexOutOfRange`] if `index` is not a valid item, or
    /// [`Error::StorageUnavailable`] if persisting fails.
    pub async fn toggle(&mut self, id: ChecklistId, index: usize) -> Result<ChecklistUpdate> {
        let mut updated = self.loaded(id)?.clone();
        let len = updated.len();
        let Some(item) = updated.items.get_mut(index) else {
            return Err(Error::IndexOutOfRange {
                id: id.to_string(),
                index,
                len,
            });
        };
        item.completed = !item.completed;
        debug!("Toggled item {} of '{}' to {}", index, id, item.completed);

        self.commit(updated).await
    }

    /// Mark every item of a loaded record as not completed.
    ///
    /// Writes even when nothing was completed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChecklistNotLoaded`] if `id` has not been loaded, or
    /// [`Error::StorageUnavailable`] if persisting fails.
    pub async fn reset(&mut self, id: ChecklistId) -> Result<ChecklistUpdate> {
        let mut updated = self.loaded(id)?.clone();
        updated.clear_completion();
        info!("Reset checklist '{}'", id);

        self.commit(updated).await
    }

    /// Read the persisted active checklist pointer.
    ///
    /// Used to resume a session; does not load or create any record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedRecord`] if the pointer does not parse, or
    /// [`Error::StorageUnavailable`] if the store fails.
    pub async fn resume(&mut self) -> Result<Option<ActiveChecklist>> {
        let Some(raw) = self.store.get(ACTIVE_CHECKLIST_KEY).await? else {
            return Ok(None);
        };
        let active: ActiveChecklist = serde_json::from_str(&raw)
            .map_err(|source| Error::malformed(ACTIVE_CHECKLIST_KEY, source))?;
        self.active = Some(active.clone());
        Ok(Some(active))
    }

    /// Reset whichever checklist the active pointer names.
    ///
    /// Returns `None` if there is no active checklist.
    ///
    /// # Errors
    ///
    /// Returns an error if loading or persisting the record fails.
    pub async fn reset_active(&mut self) -> Result<Option<ChecklistUpdate>> {
        let id = match self.active.as_ref().map(|active| active.id) {
            Some(id) => id,
            None => match self.resume().await? {
                Some(active) => active.id,
                None => return Ok(None),
            },
        };
        if !self.records.contains_key(&id) {
            self.load_or_create(id).await?;
        }
        self.reset(id).await.map(Some)
    }

    /// Progress of every catalog checklist, read-only.
    ///
    /// Checklists without a stored record report 0 and are not created. A
    /// stored record that does not parse is logged and reported as 0. The
    /// active checklist is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageUnavailable`] if the store fails.
    pub async fn list_all_progress(&self) -> Result<BTreeMap<ChecklistId, ChecklistSummary>> {
        let mut summaries = BTreeMap::new();
        for definition in catalog() {
            let key = record_key(definition.id);
            let percent = match self.store.get(&key).await? {
                None => 0,
                Some(raw) => match parse_items(&key, &raw) {
                    Ok(items) => Progress::of(&items).percent,
                    Err(e) => {
                        warn!("Ignoring unreadable checklist record: {}", e);
                        0
                    }
                },
            };
            summaries.insert(definition.id, ChecklistSummary::from_percent(percent));
        }
        Ok(summaries)
    }

    /// Remove every checklist record and the active pointer in one batch.
    ///
    /// Settings are kept. Returns the number of checklist records removed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageUnavailable`] if enumeration or removal fails.
    pub async fn clear_all(&mut self) -> Result<usize> {
        let mut keys: Vec<String> = self
            .store
            .all_keys()
            .await?
            .into_iter()
            .filter(|key| is_record_key(key))
            .collect();
        let removed = keys.len();
        keys.push(ACTIVE_CHECKLIST_KEY.to_string());

        self.store.remove_many(&keys).await?;
        self.records.clear();
        self.active = None;

        info!("Cleared {} checklist records", removed);
        Ok(removed)
    }

    fn loaded(&self, id: ChecklistId) -> Result<&ChecklistRecord> {
        self.records
            .get(&id)
            .ok_or_else(|| Error::ChecklistNotLoaded { id: id.to_string() })
    }

    async fn commit(&mut self, record: ChecklistRecord) -> Result<ChecklistUpdate> {
        self.write_items(&record_key(record.id), &record.items).await?;
        self.records.insert(record.id, record.clone());
        self.touch(&record).await?;
        Ok(ChecklistUpdate::new(record))
    }

    async fn write_items(&self, key: &str, items: &[ChecklistItem]) -> Result<()> {
        let raw = serde_json::to_string(items)?;
        self.store.set(key, &raw).await
    }

    /// Overwrite the active pointer with a snapshot of `record`.
    async fn touch(&mut self, record: &ChecklistRecord) -> Result<()> {
        let snapshot = record.snapshot();
        let raw = serde_json::to_string(&snapshot)?;
        self.store.set(ACTIVE_CHECKLIST_KEY, &raw).await?;
        self.active = Some(snapshot);
        Ok(())
    }
}

fn parse_items(key: &str, raw: &str) -> Result<Vec<ChecklistItem>> {
    serde_json::from_str(raw).map_err(|source| Error::malformed(key, source))
}
