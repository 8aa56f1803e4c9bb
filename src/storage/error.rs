//! Error taxonomy for schema initialization.

use rusqlite::ErrorCode;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for schema initialization.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The database file cannot be opened, created, read or written.
    #[error("Database storage unavailable at {}: {source}", path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// An existing object named like one of our tables has an incompatible shape.
    #[error("Schema conflict on table '{table}': {reason}")]
    SchemaConflict { table: String, reason: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl SchemaError {
    /// Attach the database location, reclassifying I/O-level engine failures
    /// as [`SchemaError::StorageUnavailable`].
    pub fn at_location(self, path: &Path) -> Self {
        match self {
            Self::Database(source) if is_storage_failure(&source) => Self::StorageUnavailable {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        }
    }

    /// Wrap an error raised while opening or closing the database file.
    pub fn storage(path: &Path, source: rusqlite::Error) -> Self {
        Self::StorageUnavailable {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn conflict(table: &str, reason: impl Into<String>) -> Self {
        Self::SchemaConflict {
            table: table.to_string(),
            reason: reason.into(),
        }
    }

    pub fn is_storage_unavailable(&self) -> bool {
        matches!(self, Self::StorageUnavailable { .. })
    }

    pub fn is_schema_conflict(&self) -> bool {
        matches!(self, Self::SchemaConflict { .. })
    }
}

/// Engine error codes that mean the file itself is unusable.
fn is_storage_failure(err: &rusqlite::Error) -> bool {
    matches!(
        err.sqlite_error_code(),
        Some(
            ErrorCode::CannotOpen
                | ErrorCode::ReadOnly
                | ErrorCode::DiskFull
                | ErrorCode::SystemIoFailure
                | ErrorCode::NotADatabase
                | ErrorCode::PermissionDenied
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::DatabaseCorrupt
        )
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sqlite_failure(code: i32) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(rusqlite::ffi::Error::new(code), None)
    }

    #[test]
    fn test_io_failures_become_storage_unavailable() {
        let path = Path::new("/tmp/todo.db");
        for code in [
            rusqlite::ffi::SQLITE_CANTOPEN,
            rusqlite::ffi::SQLITE_READONLY,
            rusqlite::ffi::SQLITE_FULL,
            rusqlite::ffi::SQLITE_IOERR,
            rusqlite::ffi::SQLITE_NOTADB,
            rusqlite::ffi::SQLITE_PERM,
            rusqlite::ffi::SQLITE_BUSY,
            rusqlite::ffi::SQLITE_LOCKED,
            rusqlite::ffi::SQLITE_CORRUPT,
        ] {
            let err = SchemaError::from(sqlite_failure(code)).at_location(path);
            assert!(err.is_storage_unavailable(), "code {code} -> {err}");
        }
    }

    #[test]
    fn test_other_failures_stay_database_errors() {
        let err = SchemaError::from(sqlite_failure(rusqlite::ffi::SQLITE_CONSTRAINT))
            .at_location(Path::new("todo.db"));
        assert!(matches!(err, SchemaError::Database(_)));
    }

    #[test]
    fn test_conflict_is_not_reclassified() {
        let err = SchemaError::conflict("users", "missing column 'username'")
            .at_location(Path::new("todo.db"));
        assert!(err.is_schema_conflict());
        assert_eq!(
            err.to_string(),
            "Schema conflict on table 'users': missing column 'username'"
        );
    }

    #[test]
    fn test_storage_message_names_path() {
        let err = SchemaError::storage(
            Path::new("/nowhere/todo.db"),
            sqlite_failure(rusqlite::ffi::SQLITE_CANTOPEN),
        );
        assert!(err.to_string().contains("/nowhere/todo.db"));
    }
}
