//! Error types for `kickoff-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown predicted outcome: {0:?}")]
  UnknownOutcome(String),

  #[error("matchday {0} is outside 1..=34")]
  MatchdayOutOfRange(i64),

  #[error("goal count {0} is outside 0..=20")]
  GoalsOutOfRange(i64),

  /// Exactly one of the two goal columns was set.
  #[error("home and away goals must both be set or both be absent")]
  UnpairedGoals,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
