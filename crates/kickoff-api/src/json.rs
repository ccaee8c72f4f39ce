//! Response shapes. Field names are camelCase; absent goals serialize as
//! `null` rather than being omitted.

use chrono::{DateTime, NaiveDate, Utc};
use kickoff_core::{
  blog::BlogPost,
  matchday::{CurrentMatchday, MatchdaySummary},
  prediction::{Outcome, Prediction},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionJson {
  pub id:                   i64,
  pub season:               String,
  pub matchday:             u8,
  pub agent_name:           String,
  pub home_team:            String,
  pub away_team:            String,
  pub predicted_outcome:    Outcome,
  pub predicted_home_goals: Option<u8>,
  pub predicted_away_goals: Option<u8>,
  pub reason:               String,
  pub created_at:           DateTime<Utc>,
}

impl From<&Prediction> for PredictionJson {
  fn from(p: &Prediction) -> Self {
    Self {
      id:                   p.id,
      season:               p.season.clone(),
      matchday:             p.matchday,
      agent_name:           p.agent_name.clone(),
      home_team:            p.home_team.clone(),
      away_team:            p.away_team.clone(),
      predicted_outcome:    p.outcome,
      predicted_home_goals: p.score.map(|s| s.home),
      predicted_away_goals: p.score.map(|s| s.away),
      reason:               p.reason.clone(),
      created_at:           p.created_at,
    }
  }
}

pub fn predictions(rows: &[Prediction]) -> Vec<PredictionJson> {
  rows.iter().map(PredictionJson::from).collect()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureJson {
  pub home_team:   String,
  pub away_team:   String,
  pub predictions: Vec<PredictionJson>,
}

#[derive(Debug, Serialize)]
pub struct CurrentMatchdayJson {
  pub season:   String,
  pub matchday: u8,
  pub summary:  MatchdaySummary,
  pub fixtures: Vec<FixtureJson>,
}

impl From<&CurrentMatchday> for CurrentMatchdayJson {
  fn from(current: &CurrentMatchday) -> Self {
    let fixtures = current
      .fixtures()
      .into_iter()
      .map(|group| FixtureJson {
        home_team:   group.home_team.to_owned(),
        away_team:   group.away_team.to_owned(),
        predictions: group.predictions.into_iter().map(PredictionJson::from).collect(),
      })
      .collect();

    Self {
      season: current.season.clone(),
      matchday: current.matchday,
      summary: current.summary(),
      fixtures,
    }
  }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostJson {
  pub id:         i64,
  pub title:      String,
  pub date:       NaiveDate,
  pub author:     String,
  pub text:       String,
  pub created_at: DateTime<Utc>,
}

impl From<BlogPost> for BlogPostJson {
  fn from(b: BlogPost) -> Self {
    Self {
      id:         b.id,
      title:      b.title,
      date:       b.date,
      author:     b.author,
      text:       b.text,
      created_at: b.created_at,
    }
  }
}
