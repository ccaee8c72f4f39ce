//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with millisecond precision and a
//! `Z` suffix, so string order equals time order. Rows written by older
//! generations of the service may carry the database default
//! `YYYY-MM-DD HH:MM:SS` form instead; both decode to UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use kickoff_core::{
  blog::BlogPost,
  prediction::{Outcome, Prediction, Scoreline, matchday_from_column},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Ok(dt.with_timezone(&Utc));
  }
  NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
    .map(|naive| naive.and_utc())
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── NaiveDate ────────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Raw rows ─────────────────────────────────────────────────────────────────

/// A `predictions` row exactly as stored.
pub struct RawPrediction {
  pub id:                   i64,
  pub season:               String,
  pub matchday:             i64,
  pub agent_name:           String,
  pub home_team:            String,
  pub away_team:            String,
  pub predicted_outcome:    String,
  pub predicted_home_goals: Option<i64>,
  pub predicted_away_goals: Option<i64>,
  pub reason:               String,
  pub created_at:           String,
}

impl RawPrediction {
  /// Column list matching [`RawPrediction::from_row`].
  pub const COLUMNS: &'static str = "id, season, matchday, agent_name, home_team, away_team,
     predicted_outcome, predicted_home_goals, predicted_away_goals, reason, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                   row.get(0)?,
      season:               row.get(1)?,
      matchday:             row.get(2)?,
      agent_name:           row.get(3)?,
      home_team:            row.get(4)?,
      away_team:            row.get(5)?,
      predicted_outcome:    row.get(6)?,
      predicted_home_goals: row.get(7)?,
      predicted_away_goals: row.get(8)?,
      reason:               row.get(9)?,
      created_at:           row.get(10)?,
    })
  }

  pub fn into_prediction(self) -> Result<Prediction> {
    Ok(Prediction {
      id:         self.id,
      season:     self.season,
      matchday:   matchday_from_column(self.matchday)?,
      agent_name: self.agent_name,
      home_team:  self.home_team,
      away_team:  self.away_team,
      outcome:    Outcome::parse(&self.predicted_outcome)?,
      score:      Scoreline::from_columns(
        self.predicted_home_goals,
        self.predicted_away_goals,
      )?,
      reason:     self.reason,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// A `blog_posts` row exactly as stored.
pub struct RawBlogPost {
  pub id:         i64,
  pub title:      String,
  pub post_date:  String,
  pub author:     String,
  pub text:       String,
  pub created_at: String,
}

impl RawBlogPost {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      title:      row.get(1)?,
      post_date:  row.get(2)?,
      author:     row.get(3)?,
      text:       row.get(4)?,
      created_at: row.get(5)?,
    })
  }

  pub fn into_blog_post(self) -> Result<BlogPost> {
    Ok(BlogPost {
      id:         self.id,
      title:      self.title,
      date:       decode_date(&self.post_date)?,
      author:     self.author,
      text:       self.text,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
