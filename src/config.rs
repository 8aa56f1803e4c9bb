//! Configuration parsing for the schema initializer.
//!
//! Supports:
//! - CLI arguments via clap
//! - Environment variable overrides
//! - Defaults matching the task tracker's file layout

use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Default database file, relative to the working directory.
pub const DEFAULT_DATABASE_LOCATION: &str = "todo.db";

/// taskdb: create the task tracker's SQLite schema.
#[derive(Parser, Debug, Clone)]
#[command(name = "taskdb")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Path of the SQLite database file (created if absent)
    #[arg(
        short,
        long,
        env = "TASKDB_DATABASE",
        default_value = DEFAULT_DATABASE_LOCATION
    )]
    pub database_location: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Leave foreign key enforcement off for the initializing connection
    #[arg(long = "no-foreign-keys", action = ArgAction::SetFalse)]
    pub enforce_foreign_keys: bool,
}

impl Config {
    /// Parse configuration from CLI arguments and environment.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Configuration for a database at `database_location` with defaults
    /// for everything else.
    pub fn new(database_location: impl Into<PathBuf>) -> Self {
        Self {
            database_location: database_location.into(),
            ..Self::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_location: PathBuf::from(DEFAULT_DATABASE_LOCATION),
            log_level: "warn".into(),
            enforce_foreign_keys: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.database_location, PathBuf::from("todo.db"));
        assert!(config.enforce_foreign_keys);
    }

    #[test]
    fn test_parse_flags() {
        let config = Config::try_parse_from([
            "taskdb",
            "--database-location",
            "/var/lib/todo/tasks.db",
            "--no-foreign-keys",
        ])
        .unwrap();
        assert_eq!(
            config.database_location,
            PathBuf::from("/var/lib/todo/tasks.db")
        );
        assert!(!config.enforce_foreign_keys);
    }

    #[test]
    fn test_foreign_keys_enabled_without_flag() {
        let config = Config::try_parse_from(["taskdb", "-d", "x.db"]).unwrap();
        assert!(config.enforce_foreign_keys);
        assert_eq!(config.database_location, PathBuf::from("x.db"));
    }
}
