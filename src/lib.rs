//! taskdb: schema bootstrap for the task tracker's SQLite database.
//!
//! Creates three tables, `users`, `categories` and `tasks`, if they do not
//! exist yet. Re-running never drops or alters existing data.
//!
//! # Modules
//!
//! - [`config`]: CLI and environment configuration
//! - [`observability`]: Tracing setup
//! - [`storage`]: Schema definition and initialization
//!
//! # Example
//!
//! ```no_run
//! use taskdb::config::Config;
//!
//! taskdb::initialize(&Config::new("todo.db"))?;
//! # Ok::<(), taskdb::SchemaError>(())
//! ```

// Lint configuration
#![warn(clippy::all)]
#![allow(
    clippy::module_name_repetitions,    // storage::schema::SchemaState is fine
    clippy::must_use_candidate,         // Not all functions need #[must_use]
    clippy::missing_errors_doc,         // Error docs can be verbose
    clippy::missing_panics_doc,         // Panic docs can be verbose
    clippy::needless_raw_string_hashes  // r#""# is fine for SQL
)]

pub mod config;
pub mod observability;
pub mod storage;

pub use storage::{initialize, open, SchemaError, SchemaState};
