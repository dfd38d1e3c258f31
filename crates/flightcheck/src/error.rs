//! Error types for flightcheck.
//!
//! This module defines all error types used throughout the flightcheck crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for flightcheck operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Checklist Errors ===
    /// The identifier does not name a checklist in the catalog.
    #[error("unknown checklist: {id}")]
    UnknownChecklist {
        /// The identifier that was requested.
        id: String,
    },

    /// A toggle referenced an item outside the record.
    #[error("item index {index} out of range for checklist '{id}' ({len} items)")]
    IndexOutOfRange {
        /// Checklist identifier.
        id: String,
        /// The requested index.
        index: usize,
        /// Number of items in the record.
        len: usize,
    },

    /// The checklist has not been loaded in this session.
    #[error("checklist '{id}' has not been loaded")]
    ChecklistNotLoaded {
        /// Checklist identifier.
        id: String,
    },

    // === Storage Errors ===
    /// The key-value store could not complete a read, write or enumeration.
    #[error("storage unavailable: {message}")]
    StorageUnavailable {
        /// Description of what went wrong.
        message: String,
    },

    /// A stored value does not parse or does not have the expected shape.
    #[error("malformed record under key '{key}': {source}")]
    MalformedRecord {
        /// The storage key that held the value.
        key: String,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for flightcheck operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::StorageUnavailable {
            message: err.to_string(),
        }
    }
}

impl Error {
    /// Create an unknown checklist error.
    #[must_use]
    pub fn unknown_checklist(id: impl Into<String>) -> Self {
        Self::UnknownChecklist { id: id.into() }
    }

    /// Create a storage unavailable error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::StorageUnavailable {
            message: message.into(),
        }
    }

    /// Create a malformed record error for the given key.
    #[must_use]
    pub fn malformed(key: impl Into<String>, source: serde_json::Error) -> Self {
        Self::MalformedRecord {
            key: key.into(),
            source,
        }
    }

    /// Check if this error comes from a bad identifier or index.
    ///
    /// These are routing bugs in the caller rather than runtime conditions.
    #[must_use]
    pub fn is_programmer_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownChecklist { .. }
                | Self::IndexOutOfRange { .. }
                | Self::ChecklistNotLoaded { .. }
        )
    }

    /// Check if this error is a storage failure.
    #[must_use]
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            Self::StorageUnavailable { .. } | Self::DatabaseOpen { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_checklist_display() {
        let err = Error::unknown_checklist("hover");
        assert_eq!(err.to_string(), "unknown checklist: hover");
        assert!(err.is_programmer_error());
        assert!(!err.is_storage_error());
    }

    #[test]
    fn test_index_out_of_range_display() {
        let err = Error::IndexOutOfRange {
            id: "prevol".to_string(),
            index: 9,
            len: 7,
        };
        let msg = err.to_string();
        assert!(msg.contains("prevol"));
        assert!(msg.contains('9'));
        assert!(msg.contains("7 items"));
        assert!(err.is_programmer_error());
    }

    #[test]
    fn test_not_loaded_is_programmer_error() {
        let err = Error::ChecklistNotLoaded {
            id: "roulage".to_string(),
        };
        assert!(err.is_programmer_error());
        assert!(err.to_string().contains("roulage"));
    }

    #[test]
    fn test_storage_error() {
        let err = Error::storage("disk full");
        assert_eq!(err.to_string(), "storage unavailable: disk full");
        assert!(err.is_storage_error());
        assert!(!err.is_programmer_error());
    }

    #[test]
    fn test_malformed_record_display() {
        let json_err = serde_json::from_str::<i32>("not valid json").unwrap_err();
        let err = Error::malformed("checklist_prevol", json_err);
        let msg = err.to_string();
        assert!(msg.contains("checklist_prevol"));
        assert!(!err.is_storage_error());
    }

    #[test]
    fn test_from_rusqlite_error_is_storage_unavailable() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::StorageUnavailable { .. }));
        }
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "busy_timeout_ms must be greater than 0".to_string(),
        };
        assert!(err.to_string().contains("busy_timeout_ms"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }

    #[test]
    fn test_database_migration_error_display() {
        let err = Error::DatabaseMigration {
            message: "version mismatch".to_string(),
        };
        assert!(err.to_string().contains("version mismatch"));
    }
}
