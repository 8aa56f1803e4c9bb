//! Test utilities shared by the integration tests.
//!
//! Provides:
//! - Temporary database fixtures
//! - Helpers for inserting rows through an initialized connection

#![allow(dead_code)]

use rusqlite::Connection;
use std::path::PathBuf;
use taskdb::config::Config;
use tempfile::TempDir;

/// Test fixture that manages a temporary database directory.
///
/// The directory is automatically cleaned up when the fixture is dropped.
pub struct TestFixture {
    /// Temporary directory for test database
    pub temp_dir: TempDir,
    /// Path to the database file
    pub db_path: PathBuf,
}

impl TestFixture {
    /// Create a new test fixture with a temporary database directory.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let db_path = temp_dir.path().join("todo.db");
        Self { temp_dir, db_path }
    }

    /// Configuration pointing at the fixture's database file.
    pub fn config(&self) -> Config {
        Config::new(&self.db_path)
    }

    /// Initialize the schema and return an open connection to it.
    pub fn initialized(&self) -> Connection {
        let config = self.config();
        taskdb::initialize(&config).expect("initialize failed");
        taskdb::open(&config).expect("open failed")
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Insert a user and return its id.
pub fn insert_user(conn: &Connection, username: &str, password_hash: &str) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO users (username, password_hash) VALUES (?1, ?2)",
        [username, password_hash],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Insert a category and return its id.
pub fn insert_category(conn: &Connection, name: &str) -> rusqlite::Result<i64> {
    conn.execute("INSERT INTO categories (name) VALUES (?1)", [name])?;
    Ok(conn.last_insert_rowid())
}

/// Dump of every schema object, used to compare schema state across runs.
pub fn schema_dump(conn: &Connection) -> rusqlite::Result<Vec<(String, String, Option<String>)>> {
    let mut stmt = conn.prepare("SELECT type, name, sql FROM sqlite_master ORDER BY type, name")?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
