//! Prediction types, the fundamental unit of the Kickoff board.
//!
//! A prediction is keyed by (season, matchday, home team, away team, agent).
//! At most one live prediction exists per key; a later submission for the
//! same key replaces the earlier one in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Lowest valid matchday number.
pub const MIN_MATCHDAY: u8 = 1;
/// Highest valid matchday number.
pub const MAX_MATCHDAY: u8 = 34;
/// Upper bound for a predicted goal count.
pub const MAX_GOALS: u8 = 20;

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// The predicted result of a fixture.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
  HomeWin,
  Draw,
  AwayWin,
}

impl Outcome {
  /// Parse the wire/database form (`HOME_WIN`, `DRAW`, `AWAY_WIN`).
  pub fn parse(s: &str) -> Result<Self> {
    s.parse().map_err(|_| Error::UnknownOutcome(s.to_owned()))
  }

  /// Human-readable label for display.
  pub fn label(self) -> &'static str {
    match self {
      Outcome::HomeWin => "Home win",
      Outcome::Draw => "Draw",
      Outcome::AwayWin => "Away win",
    }
  }
}

// ─── Scoreline ───────────────────────────────────────────────────────────────

/// A predicted final score. Both sides are always present together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreline {
  pub home: u8,
  pub away: u8,
}

impl Scoreline {
  pub fn new(home: u8, away: u8) -> Self { Self { home, away } }

  /// Build from two nullable goal columns.
  ///
  /// `(None, None)` is "no score predicted"; a single-sided value is an
  /// integrity error.
  pub fn from_columns(home: Option<i64>, away: Option<i64>) -> Result<Option<Self>> {
    match (home, away) {
      (None, None) => Ok(None),
      (Some(h), Some(a)) => Ok(Some(Self { home: goals(h)?, away: goals(a)? })),
      _ => Err(Error::UnpairedGoals),
    }
  }

  /// Split back into the two nullable goal columns.
  pub fn to_columns(score: Option<Self>) -> (Option<i64>, Option<i64>) {
    match score {
      Some(s) => (Some(i64::from(s.home)), Some(i64::from(s.away))),
      None => (None, None),
    }
  }
}

impl std::fmt::Display for Scoreline {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}:{}", self.home, self.away)
  }
}

fn goals(value: i64) -> Result<u8> {
  u8::try_from(value)
    .ok()
    .filter(|g| *g <= MAX_GOALS)
    .ok_or(Error::GoalsOutOfRange(value))
}

/// Convert a stored matchday column back into the domain range.
pub fn matchday_from_column(value: i64) -> Result<u8> {
  u8::try_from(value)
    .ok()
    .filter(|m| (MIN_MATCHDAY..=MAX_MATCHDAY).contains(m))
    .ok_or(Error::MatchdayOutOfRange(value))
}

// ─── Input ───────────────────────────────────────────────────────────────────

/// A validated prediction submission, ready to be upserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPrediction {
  pub season:     String,
  pub matchday:   u8,
  pub agent_name: String,
  pub home_team:  String,
  pub away_team:  String,
  pub outcome:    Outcome,
  pub score:      Option<Scoreline>,
  pub reason:     Option<String>,
}

/// The shared (season, matchday, agent) part of a batch submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchHeader {
  pub season:     String,
  pub matchday:   u8,
  pub agent_name: String,
}

/// One fixture inside a batch submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionItem {
  pub home_team: String,
  pub away_team: String,
  pub outcome:   Outcome,
  pub score:     Option<Scoreline>,
  pub reason:    Option<String>,
}

impl BatchHeader {
  /// Combine the header with one item into a full submission.
  pub fn prediction(&self, item: PredictionItem) -> NewPrediction {
    NewPrediction {
      season:     self.season.clone(),
      matchday:   self.matchday,
      agent_name: self.agent_name.clone(),
      home_team:  item.home_team,
      away_team:  item.away_team,
      outcome:    item.outcome,
      score:      item.score,
      reason:     item.reason,
    }
  }
}

// ─── Stored ──────────────────────────────────────────────────────────────────

/// A prediction as persisted by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
  /// Surrogate id; preserved when the row is replaced.
  pub id:         i64,
  pub season:     String,
  pub matchday:   u8,
  pub agent_name: String,
  pub home_team:  String,
  pub away_team:  String,
  pub outcome:    Outcome,
  pub score:      Option<Scoreline>,
  pub reason:     String,
  /// Time of the last write (creation or replacement); server-assigned.
  pub created_at: DateTime<Utc>,
}
