//! Persisted user preferences.
//!
//! Stored as one JSON object under the `settings` key. A missing or
//! unreadable value is never an error: the defaults are used instead.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::storage::keys::SETTINGS_KEY;
use crate::storage::KeyValueStore;

/// User preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Dark theme, tuned for cockpit use.
    pub dark_mode: bool,
    /// Audible feedback when an item is checked.
    pub sound_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dark_mode: true,
            sound_enabled: true,
        }
    }
}

impl Settings {
    /// Apply a partial update.
    #[must_use]
    pub fn merge(self, patch: SettingsPatch) -> Self {
        Self {
            dark_mode: patch.dark_mode.unwrap_or(self.dark_mode),
            sound_enabled: patch.sound_enabled.unwrap_or(self.sound_enabled),
        }
    }
}

/// A partial settings update; `None` fields are left unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    /// New dark mode value.
    pub dark_mode: Option<bool>,
    /// New sound value.
    pub sound_enabled: Option<bool>,
}

impl SettingsPatch {
    /// Check if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dark_mode.is_none() && self.sound_enabled.is_none()
    }
}

/// Loads and saves the [`Settings`] singleton.
#[derive(Debug)]
pub struct SettingsStore<S> {
    store: Arc<S>,
    current: Settings,
}

impl<S: KeyValueStore> SettingsStore<S> {
    /// Create a settings store holding the defaults until [`load`](Self::load).
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            current: Settings::default(),
        }
    }

    /// The settings currently in memory.
    #[must_use]
    pub fn current(&self) -> Settings {
        self.current
    }

    /// Read the stored settings, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageUnavailable`](crate::Error::StorageUnavailable)
    /// if the store cannot be read. A malformed value is not an error.
    pub async fn load(&mut self) -> Result<Settings> {
        self.current = match self.store.get(SETTINGS_KEY).await? {
            None => Settings::default(),
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Ignoring unreadable settings, using defaults: {}", e);
                Settings::default()
            }),
        };
        Ok(self.current)
    }

    /// Merge `patch` over the current settings and persist the result.
    ///
    /// The whole object is written at once; the in-memory value only changes
    /// if the write succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageUnavailable`](crate::Error::StorageUnavailable)
    /// if the write fails.
    pub async fn update(&mut self, patch: SettingsPatch) -> Result<Settings> {
        let merged = self.current.merge(patch);
        let raw = serde_json::to_string(&merged)?;
        self.store.set(SETTINGS_KEY, &raw).await?;
        self.current = merged;
        debug!("Saved settings: {:?}", merged);
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, SqliteStore};

    fn settings_store() -> SettingsStore<MemoryStore> {
        SettingsStore::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_load_defaults_when_absent() {
        let mut settings = settings_store();
        let loaded = settings.load().await.unwrap();
        assert_eq!(
            loaded,
            Settings {
                dark_mode: true,
                sound_enabled: true
            }
        );
    }

    #[tokio::test]
    async fn test_update_then_load() {
        let store = Arc::new(MemoryStore::new());
        let mut settings = SettingsStore::new(Arc::clone(&store));
        settings.load().await.unwrap();
        settings
            .update(SettingsPatch {
                dark_mode: Some(false),
                ..SettingsPatch::default()
            })
            .await
            .unwrap();

        let mut reloaded = SettingsStore::new(store);
        let loaded = reloaded.load().await.unwrap();
        assert!(!loaded.dark_mode);
        assert!(loaded.sound_enabled);
    }

    #[tokio::test]
    async fn test_update_merges_over_current() {
        let mut settings = settings_store();
        settings
            .update(SettingsPatch {
                sound_enabled: Some(false),
                ..SettingsPatch::default()
            })
            .await
            .unwrap();
        let merged = settings
            .update(SettingsPatch {
                dark_mode: Some(false),
                ..SettingsPatch::default()
            })
            .await
            .unwrap();

        assert!(!merged.dark_mode);
        assert!(!merged.sound_enabled);
        assert_eq!(settings.current(), merged);
    }

    #[tokio::test]
    async fn test_stored_shape_is_camel_case() {
        let store = Arc::new(MemoryStore::new());
        let mut settings = SettingsStore::new(Arc::clone(&store));
        settings.update(SettingsPatch::default()).await.unwrap();

        let raw = store.get(SETTINGS_KEY).await.unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["darkMode"], true);
        assert_eq!(json["soundEnabled"], true);
    }

    #[tokio::test]
    async fn test_malformed_falls_back_to_defaults() {
        let store = Arc::new(MemoryStore::new());
        store.set(SETTINGS_KEY, "{darkMode: nope").await.unwrap();

        let mut settings = SettingsStore::new(store);
        assert_eq!(settings.load().await.unwrap(), Settings::default());
    }

    #[tokio::test]
    async fn test_missing_fields_default_to_true() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(SETTINGS_KEY, r#"{"soundEnabled":false}"#)
            .await
            .unwrap();

        let mut settings = SettingsStore::new(store);
        let loaded = settings.load().await.unwrap();
        assert!(loaded.dark_mode);
        assert!(!loaded.sound_enabled);
    }

    #[tokio::test]
    async fn test_settings_over_sqlite() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let mut settings = SettingsStore::new(store);
        settings
            .update(SettingsPatch {
                dark_mode: Some(false),
                sound_enabled: Some(false),
            })
            .await
            .unwrap();
        let loaded = settings.load().await.unwrap();
        assert!(!loaded.dark_mode && !loaded.sound_enabled);
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(SettingsPatch::default().is_empty());
        assert!(!SettingsPatch {
            dark_mode: Some(true),
            sound_enabled: None
        }
        .is_empty());
    }
}
