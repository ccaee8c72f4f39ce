//! Error type for `kickoff-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] kickoff_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// A schema migration step failed; nothing from the attempt was committed.
  #[error("schema error: {0}")]
  Schema(#[from] MigrationError),

  /// A write succeeded but the row could not be read back.
  #[error("write could not be confirmed: {0}")]
  Unconfirmed(String),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

impl Error {
  pub fn is_schema(&self) -> bool { matches!(self, Self::Schema(_)) }
}

/// A failure inside one named step of the migration list.
#[derive(Debug, Error)]
#[error("migration step `{step}` failed: {source}")]
pub struct MigrationError {
  pub step:   &'static str,
  pub source: rusqlite::Error,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
