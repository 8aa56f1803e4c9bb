//! One-shot schema bootstrap against a database file.

use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use tracing::{debug, info};

use super::error::SchemaError;
use super::schema::{apply_pragmas, initialize_schema};
use crate::config::Config;

/// Create the task-tracker tables at `config.database_location`.
///
/// The file is created if absent. Existing tables are left untouched, so
/// calling this any number of times is equivalent to calling it once. The
/// connection is closed before returning, on success and on error.
///
/// # Errors
///
/// - [`SchemaError::StorageUnavailable`] if the file cannot be opened,
///   created or written.
/// - [`SchemaError::SchemaConflict`] if an existing object with one of the
///   table names has an incompatible definition.
pub fn initialize(config: &Config) -> Result<(), SchemaError> {
    let path = config.database_location.as_path();
    let mut conn = open(config)?;

    // On error `conn` is dropped here, which closes it.
    initialize_schema(&mut conn).map_err(|e| e.at_location(path))?;

    conn.close()
        .map_err(|(_, source)| SchemaError::storage(path, source))?;

    info!(path = %path.display(), "Schema initialized");
    Ok(())
}

/// Open a read-write connection with the configured pragmas applied.
///
/// Use this for any connection that writes task data: foreign key
/// enforcement is a per-connection setting.
pub fn open(config: &Config) -> Result<Connection, SchemaError> {
    let path = config.database_location.as_path();
    let conn = open_file(path)?;
    apply_pragmas(&conn, config.enforce_foreign_keys)
        .map_err(|e| SchemaError::from(e).at_location(path))?;
    Ok(conn)
}

fn open_file(path: &Path) -> Result<Connection, SchemaError> {
    debug!(path = %path.display(), "Opening database");
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    Connection::open_with_flags(path, flags).map_err(|e| SchemaError::storage(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema::{schema_state, SchemaState};
    use tempfile::TempDir;

    #[test]
    fn test_initialize_creates_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::new(temp_dir.path().join("todo.db"));

        initialize(&config).unwrap();

        assert!(config.database_location.exists());
        let conn = open(&config).unwrap();
        assert_eq!(schema_state(&conn).unwrap(), SchemaState::Initialized);
    }

    #[test]
    fn test_open_applies_foreign_key_mode() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::new(temp_dir.path().join("todo.db"));

        let conn = open(&config).unwrap();
        let on: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(on, 1);

        config.enforce_foreign_keys = false;
        let conn = open(&config).unwrap();
        let off: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(off, 0);
    }

    #[test]
    fn test_missing_parent_is_storage_unavailable() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::new(temp_dir.path().join("missing").join("todo.db"));

        let err = initialize(&config).unwrap_err();
        assert!(err.is_storage_unavailable(), "unexpected error: {err}");
    }
}
