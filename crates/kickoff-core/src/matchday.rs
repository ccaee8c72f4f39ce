//! The "current matchday" read model and its display grouping.
//!
//! The store resolves which (season, matchday) pair is current; everything in
//! this module is derived from the rows it returns and never stored.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::prediction::Prediction;

/// All predictions for the resolved current (season, matchday) pair.
///
/// `predictions` is ordered by home team, away team, then agent name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentMatchday {
  pub season:      String,
  pub matchday:    u8,
  pub predictions: Vec<Prediction>,
}

/// The predictions for one fixture, in agent order.
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureGroup<'a> {
  pub home_team:   &'a str,
  pub away_team:   &'a str,
  pub predictions: Vec<&'a Prediction>,
}

/// Headline counts shown above the fixture list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchdaySummary {
  pub fixtures:    usize,
  pub agents:      usize,
  pub predictions: usize,
}

impl CurrentMatchday {
  /// Group predictions into per-fixture buckets, preserving first-seen order.
  pub fn fixtures(&self) -> Vec<FixtureGroup<'_>> {
    let mut groups: Vec<FixtureGroup<'_>> = Vec::new();
    for p in &self.predictions {
      let existing = groups
        .iter_mut()
        .find(|g| g.home_team == p.home_team && g.away_team == p.away_team);
      match existing {
        Some(group) => group.predictions.push(p),
        None => groups.push(FixtureGroup {
          home_team:   &p.home_team,
          away_team:   &p.away_team,
          predictions: vec![p],
        }),
      }
    }
    groups
  }

  pub fn summary(&self) -> MatchdaySummary {
    let fixtures: BTreeSet<(&str, &str)> = self
      .predictions
      .iter()
      .map(|p| (p.home_team.as_str(), p.away_team.as_str()))
      .collect();
    let agents: BTreeSet<&str> =
      self.predictions.iter().map(|p| p.agent_name.as_str()).collect();

    MatchdaySummary {
      fixtures:    fixtures.len(),
      agents:      agents.len(),
      predictions: self.predictions.len(),
    }
  }
}
