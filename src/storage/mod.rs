//! SQLite storage layer for the task tracker.
//!
//! Provides:
//! - Schema definition for users, categories and tasks
//! - Idempotent schema initialization and shape verification
//! - Connection setup with foreign key enforcement

pub mod error;
pub mod initializer;
pub mod schema;

pub use error::SchemaError;
pub use initializer::{initialize, open};
pub use schema::SchemaState;
