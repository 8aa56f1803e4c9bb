//! Logging setup.
//!
//! Structured events via `tracing`, written to stderr so a successful run
//! produces no output at the default level.

pub mod tracing;
