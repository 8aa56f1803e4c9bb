//! taskdb: create the task tracker's SQLite schema and exit.
//!
//! # Usage
//!
//! ```bash
//! taskdb --database-location ./todo.db --log-level info
//! ```
//!
//! Environment variables can also be used:
//! - `TASKDB_DATABASE`: Path of the database file
//! - `RUST_LOG`: Log level (trace, debug, info, warn, error)
//!
//! Prints nothing on success. Failures go to stderr with a non-zero exit code.

use anyhow::Context;
use std::fs;
use taskdb::config::Config;
use taskdb::observability::tracing::init_tracing;

fn main() -> anyhow::Result<()> {
    // Parse configuration from CLI arguments and environment
    let config = Config::parse_args();

    // Initialize tracing/logging
    init_tracing(&config.log_level);

    // Ensure the directory holding the database exists
    if let Some(parent) = config
        .database_location
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    taskdb::initialize(&config).with_context(|| {
        format!(
            "failed to initialize database at {}",
            config.database_location.display()
        )
    })?;

    Ok(())
}
