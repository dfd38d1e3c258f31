//! `SQLite`-backed key-value store.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::keys::RECORD_KEY_PREFIX;
use super::{migrations, KeyValueStore};
use crate::config::StorageConfig;
use crate::error::{Error, Result};

/// Default time to wait on a locked database.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Durable key-value store on top of `SQLite`.
///
/// Every key is a row in the `kv` table; each `set` is a single upsert, so a
/// crash mid-write leaves either the old or the new value.
#[derive(Debug)]
pub struct SqliteStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, DEFAULT_BUSY_TIMEOUT, true)
    }

    /// Open the store described by the storage configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open_configured(config: &StorageConfig) -> Result<Self> {
        Self::open_with(
            config.resolved_database_path(),
            config.busy_timeout(),
            config.wal_enabled,
        )
    }

    /// Open or create a store at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open_with(path: impl AsRef<Path>, busy_timeout: Duration, wal: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.busy_timeout(busy_timeout)?;
        if wal {
            conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        }

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Mutex::new(conn),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn stats(&self) -> Result<StorageStats> {
        let conn = self.conn.lock().await;

        let total_keys: i64 = conn.query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0))?;
        let record_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM kv WHERE key GLOB ?1",
            params![format!("{RECORD_KEY_PREFIX}?*")],
            |row| row.get(0),
        )?;
        let newest: Option<String> = conn
            .query_row(
                "SELECT updated_at FROM kv ORDER BY updated_at DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        drop(conn);

        let last_updated = newest
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            total_keys,
            record_count,
            last_updated,
            db_size_bytes,
        })
    }
}

#[async_trait::async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().await;
        let value: Option<String> = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let updated_at = Utc::now().to_rfc3339();
        let conn = self.conn.lock().await;
        conn.execute(
            r"
            INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            ",
            params![key, value, updated_at],
        )?;
        debug!("Wrote key {}", key);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM kv WHERE key = ?1", [key])?;
        Ok(())
    }

    async fn remove_many(&self, keys: &[String]) -> Result<()> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        let mut removed = 0;
        {
            let mut stmt = tx.prepare("DELETE FROM kv WHERE key = ?1")?;
            for key in keys {
                removed += stmt.execute([key.as_str()])?;
            }
        }
        tx.commit()?;

        if removed > 0 {
            info!("Removed {} keys", removed);
        }
        Ok(())
    }

    async fn all_keys(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT key FROM kv ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(keys)
    }
}

/// Statistics about the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStats {
    /// Total number of stored keys.
    pub total_keys: i64,
    /// Number of checklist record keys.
    pub record_count: i64,
    /// Time of the most recent write.
    pub last_updated: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_store() -> SqliteStore {
        SqliteStore::open_in_memory().expect("failed to create test store")
    }

    fn temp_db_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("flightcheck_{name}_{}.db", std::process::id()))
    }

    fn remove_db_files(path: &Path) {
        let _ = std::fs::remove_file(path);
        let _ = std::fs::remove_file(path.with_extension("db-wal"));
        let _ = std::fs::remove_file(path.with_extension("db-shm"));
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let store = create_test_store();
        store.set("checklist_prevol", "[]").await.unwrap();

        let value = store.get("checklist_prevol").await.unwrap();
        assert_eq!(value, Some("[]".to_string()));
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let store = create_test_store();
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let store = create_test_store();
        store.set("settings", "{}").await.unwrap();
        store
            .set("settings", r#"{"darkMode":false}"#)
            .await
            .unwrap();

        assert_eq!(
            store.get("settings").await.unwrap().as_deref(),
            Some(r#"{"darkMode":false}"#)
        );
        assert_eq!(store.all_keys().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_remove() {
        let store = create_test_store();
        store.set("a", "1").await.unwrap();
        store.remove("a").await.unwrap();
        store.remove("a").await.unwrap();
        assert!(store.get("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_many() {
        let store = create_test_store();
        for key in ["checklist_prevol", "checklist_roulage", "settings"] {
            store.set(key, "x").await.unwrap();
        }

        store
            .remove_many(&[
                "checklist_prevol".to_string(),
                "checklist_roulage".to_string(),
                "currentChecklist".to_string(),
            ])
            .await
            .unwrap();

        assert_eq!(store.all_keys().await.unwrap(), vec!["settings".to_string()]);
    }

    #[tokio::test]
    async fn test_remove_many_empty() {
        let store = create_test_store();
        store.remove_many(&[]).await.unwrap();
    }

    #[tokio::test]
    async fn test_all_keys_sorted() {
        let store = create_test_store();
        store.set("b", "1").await.unwrap();
        store.set("a", "2").await.unwrap();
        assert_eq!(
            store.all_keys().await.unwrap(),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[tokio::test]
    async fn test_unicode_value() {
        let store = create_test_store();
        let value = r#"[{"text":"Huile Température 55°C minimum","completed":true}]"#;
        store.set("checklist_demarrage", value).await.unwrap();
        assert_eq!(
            store.get("checklist_demarrage").await.unwrap().as_deref(),
            Some(value)
        );
    }

    #[tokio::test]
    async fn test_stats_empty() {
        let store = create_test_store();
        let stats = store.stats().await.unwrap();

        assert_eq!(stats.total_keys, 0);
        assert_eq!(stats.record_count, 0);
        assert!(stats.last_updated.is_none());
        assert_eq!(stats.db_size_bytes, 0);
    }

    #[tokio::test]
    async fn test_stats_counts_records() {
        let store = create_test_store();
        store.set("checklist_prevol", "[]").await.unwrap();
        store.set("checklist_approche", "[]").await.unwrap();
        store.set("currentChecklist", "{}").await.unwrap();
        store.set("settings", "{}").await.unwrap();
        store.set("checklist_", "[]").await.unwrap();
        store.set("checklistXprevol", "[]").await.unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_keys, 6);
        assert_eq!(stats.record_count, 2);
        assert!(stats.last_updated.is_some());
    }

    #[tokio::test]
    async fn test_path() {
        let store = create_test_store();
        assert_eq!(store.path().to_string_lossy(), ":memory:");
    }

    #[tokio::test]
    async fn test_open_file_based_persists() {
        let db_path = temp_db_path("persist");
        remove_db_files(&db_path);

        let store = SqliteStore::open(&db_path).unwrap();
        store.set("checklist_prevol", "[]").await.unwrap();
        assert_eq!(store.path(), db_path);
        assert!(store.stats().await.unwrap().db_size_bytes > 0);
        drop(store);

        let reopened = SqliteStore::open(&db_path).unwrap();
        assert_eq!(
            reopened.get("checklist_prevol").await.unwrap().as_deref(),
            Some("[]")
        );

        drop(reopened);
        remove_db_files(&db_path);
    }

    #[tokio::test]
    async fn test_open_creates_parent_dirs() {
        let nested_path = std::env::temp_dir().join(format!(
            "flightcheck_test_{}/nested/checklists.db",
            std::process::id()
        ));
        let root = nested_path.parent().unwrap().parent().unwrap().to_path_buf();
        let _ = std::fs::remove_dir_all(&root);

        let store = SqliteStore::open(&nested_path).unwrap();
        assert!(nested_path.exists());

        drop(store);
        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn test_open_configured() {
        let db_path = temp_db_path("configured");
        remove_db_files(&db_path);

        let config = StorageConfig {
            database_path: Some(db_path.clone()),
            busy_timeout_ms: 250,
            wal_enabled: false,
        };
        let store = SqliteStore::open_configured(&config).unwrap();
        assert_eq!(store.path(), db_path);

        drop(store);
        remove_db_files(&db_path);
    }
}
