//! Request bodies, their field checks, and conversion into core types.
//!
//! Every body is first normalized (string fields trimmed), then validated
//! with [`validator`], and only then converted. Numeric and enum fields are
//! read loosely (`i64`, `String`) so out-of-range values surface as field
//! issues rather than parse failures. Alias field names are resolved by serde
//! here, so the store only ever sees canonical values.

use chrono::NaiveDate;
use kickoff_core::{
  blog::NewBlogPost,
  prediction::{
    BatchHeader, NewPrediction, Outcome, PredictionItem, Scoreline, matchday_from_column,
  },
};
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::error::ApiError;

/// Trim surrounding whitespace from free-text identity fields.
pub trait Normalize {
  fn normalize(&mut self);
}

/// Normalize then validate a parsed body.
pub fn validated<T: Normalize + Validate>(mut body: T) -> Result<T, ApiError> {
  body.normalize();
  body.validate()?;
  Ok(body)
}

fn trim(s: &mut String) {
  let trimmed = s.trim();
  if trimmed.len() != s.len() {
    *s = trimmed.to_owned();
  }
}

fn known_outcome(value: &str) -> Result<(), ValidationError> {
  if Outcome::parse(value).is_ok() {
    return Ok(());
  }
  let mut err = ValidationError::new("unknown_outcome");
  err.message = Some("must be one of HOME_WIN, DRAW, AWAY_WIN".into());
  Err(err)
}

fn goals_paired(home: Option<i64>, away: Option<i64>) -> Result<(), ValidationError> {
  if home.is_some() == away.is_some() {
    return Ok(());
  }
  let mut err = ValidationError::new("goals_unpaired");
  err.message = Some(
    "predictedHomeGoals and predictedAwayGoals must either both be set or both be omitted"
      .into(),
  );
  Err(err)
}

// ─── Single prediction ───────────────────────────────────────────────────────

/// JSON body accepted by `POST /predictions`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "single_goals_paired"))]
pub struct PredictionBody {
  #[validate(length(min = 4, max = 20, message = "must be 4-20 characters"))]
  pub season:               String,
  #[validate(range(min = 1, max = 34, message = "must be between 1 and 34"))]
  pub matchday:             i64,
  #[validate(length(min = 1, max = 80, message = "must be 1-80 characters"))]
  pub agent_name:           String,
  #[validate(length(min = 1, max = 80, message = "must be 1-80 characters"))]
  pub home_team:            String,
  #[validate(length(min = 1, max = 80, message = "must be 1-80 characters"))]
  pub away_team:            String,
  #[validate(custom(function = "known_outcome"))]
  pub predicted_outcome:    String,
  #[validate(range(min = 0, max = 20, message = "must be between 0 and 20"))]
  pub predicted_home_goals: Option<i64>,
  #[validate(range(min = 0, max = 20, message = "must be between 0 and 20"))]
  pub predicted_away_goals: Option<i64>,
  #[validate(length(max = 10000, message = "must be at most 10000 characters"))]
  pub reason:               Option<String>,
}

fn single_goals_paired(body: &PredictionBody) -> Result<(), ValidationError> {
  goals_paired(body.predicted_home_goals, body.predicted_away_goals)
}

impl Normalize for PredictionBody {
  fn normalize(&mut self) {
    trim(&mut self.agent_name);
    trim(&mut self.home_team);
    trim(&mut self.away_team);
  }
}

impl TryFrom<PredictionBody> for NewPrediction {
  type Error = kickoff_core::Error;

  fn try_from(b: PredictionBody) -> kickoff_core::Result<Self> {
    Ok(NewPrediction {
      season:     b.season,
      matchday:   matchday_from_column(b.matchday)?,
      agent_name: b.agent_name,
      home_team:  b.home_team,
      away_team:  b.away_team,
      outcome:    Outcome::parse(&b.predicted_outcome)?,
      score:      Scoreline::from_columns(b.predicted_home_goals, b.predicted_away_goals)?,
      reason:     b.reason,
    })
  }
}

// ─── Batch ───────────────────────────────────────────────────────────────────

/// One fixture inside a batch body. `home`/`away` are accepted as aliases of
/// `homeTeam`/`awayTeam`.
#[derive(Debug, Deserialize, serde::Serialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "item_goals_paired"))]
pub struct PredictionItemBody {
  #[serde(alias = "home")]
  #[validate(length(min = 1, max = 80, message = "must be 1-80 characters"))]
  pub home_team:            String,
  #[serde(alias = "away")]
  #[validate(length(min = 1, max = 80, message = "must be 1-80 characters"))]
  pub away_team:            String,
  #[validate(custom(function = "known_outcome"))]
  pub predicted_outcome:    String,
  #[validate(range(min = 0, max = 20, message = "must be between 0 and 20"))]
  pub predicted_home_goals: Option<i64>,
  #[validate(range(min = 0, max = 20, message = "must be between 0 and 20"))]
  pub predicted_away_goals: Option<i64>,
  #[validate(length(max = 10000, message = "must be at most 10000 characters"))]
  pub reason:               Option<String>,
}

fn item_goals_paired(body: &PredictionItemBody) -> Result<(), ValidationError> {
  goals_paired(body.predicted_home_goals, body.predicted_away_goals)
}

impl TryFrom<PredictionItemBody> for PredictionItem {
  type Error = kickoff_core::Error;

  fn try_from(b: PredictionItemBody) -> kickoff_core::Result<Self> {
    Ok(PredictionItem {
      home_team: b.home_team,
      away_team: b.away_team,
      outcome:   Outcome::parse(&b.predicted_outcome)?,
      score:     Scoreline::from_columns(b.predicted_home_goals, b.predicted_away_goals)?,
      reason:    b.reason,
    })
  }
}

/// JSON body accepted by `POST /predictions/batch`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BatchBody {
  #[validate(length(min = 4, max = 20, message = "must be 4-20 characters"))]
  pub season:      String,
  #[validate(range(min = 1, max = 34, message = "must be between 1 and 34"))]
  pub matchday:    i64,
  #[validate(length(min = 1, max = 80, message = "must be 1-80 characters"))]
  pub agent_name:  String,
  #[validate(
    length(min = 1, max = 100, message = "must contain 1-100 predictions"),
    nested
  )]
  pub predictions: Vec<PredictionItemBody>,
}

impl Normalize for BatchBody {
  fn normalize(&mut self) {
    trim(&mut self.agent_name);
    for item in &mut self.predictions {
      trim(&mut item.home_team);
      trim(&mut item.away_team);
    }
  }
}

impl BatchBody {
  pub fn into_parts(self) -> kickoff_core::Result<(BatchHeader, Vec<PredictionItem>)> {
    let header = BatchHeader {
      season:     self.season,
      matchday:   matchday_from_column(self.matchday)?,
      agent_name: self.agent_name,
    };
    let items = self
      .predictions
      .into_iter()
      .map(PredictionItem::try_from)
      .collect::<kickoff_core::Result<Vec<_>>>()?;
    Ok((header, items))
  }
}

// ─── Matchday listing ────────────────────────────────────────────────────────

/// Query string accepted by `GET /predictions`.
#[derive(Debug, Deserialize, Validate)]
pub struct MatchdayParams {
  #[validate(length(min = 4, max = 20, message = "must be 4-20 characters"))]
  pub season:   String,
  #[validate(range(min = 1, max = 34, message = "must be between 1 and 34"))]
  pub matchday: i64,
}

impl Normalize for MatchdayParams {
  fn normalize(&mut self) {}
}

// ─── Blog post ───────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /blog-posts`.
#[derive(Debug, Deserialize, Validate)]
pub struct BlogPostBody {
  #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
  pub title:  String,
  /// ISO calendar date, `YYYY-MM-DD`.
  pub date:   NaiveDate,
  #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
  pub author: String,
  #[validate(length(min = 1, max = 10000, message = "must be 1-10000 characters"))]
  pub text:   String,
}

impl Normalize for BlogPostBody {
  fn normalize(&mut self) {
    trim(&mut self.title);
    trim(&mut self.author);
    trim(&mut self.text);
  }
}

impl From<BlogPostBody> for NewBlogPost {
  fn from(b: BlogPostBody) -> Self {
    NewBlogPost {
      title:  b.title,
      date:   b.date,
      author: b.author,
      text:   b.text,
    }
  }
}
