//! SQLite backend for the Kickoff prediction board.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Schema initialisation is lazy and
//! single-flight: the first operation on a store handle runs the migration
//! list, concurrent callers wait for it, and a failure is retried next time.

mod encode;
mod store;

pub mod error;
pub mod schema;

pub use error::{Error, MigrationError, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
