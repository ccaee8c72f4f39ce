//! Integration tests for `SqliteStore` against an in-memory database.

use std::time::Duration;

use chrono::NaiveDate;
use kickoff_core::{
  blog::NewBlogPost,
  prediction::{BatchHeader, NewPrediction, Outcome, PredictionItem, Scoreline},
  store::BoardStore,
};

use crate::{
  Error, SqliteStore,
  schema::{DEFAULT_AGENT_NAME, DEFAULT_REASON, MIGRATIONS, column_names},
};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

/// Run raw SQL on the store's connection, bypassing the schema guard.
async fn exec_raw(s: &SqliteStore, sql: &'static str) -> Result<(), tokio_rusqlite::Error> {
  s.conn
    .call(move |conn| {
      conn.execute_batch(sql)?;
      Ok(())
    })
    .await
}

fn prediction(
  season:   &str,
  matchday: u8,
  home:     &str,
  away:     &str,
  agent:    &str,
  outcome:  Outcome,
) -> NewPrediction {
  NewPrediction {
    season:     season.into(),
    matchday,
    agent_name: agent.into(),
    home_team:  home.into(),
    away_team:  away.into(),
    outcome,
    score:      None,
    reason:     None,
  }
}

fn item(home: &str, away: &str, outcome: Outcome, score: Option<Scoreline>) -> PredictionItem {
  PredictionItem {
    home_team: home.into(),
    away_team: away.into(),
    outcome,
    score,
    reason:    None,
  }
}

fn header(season: &str, matchday: u8, agent: &str) -> BatchHeader {
  BatchHeader {
    season:     season.into(),
    matchday,
    agent_name: agent.into(),
  }
}

/// Keep successive writes in distinct milliseconds.
async fn tick() { tokio::time::sleep(Duration::from_millis(5)).await; }

// ─── Single upsert ───────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_inserts_and_returns_row() {
  let s = store().await;

  let mut input = prediction("2025-26", 4, "Bayern", "Dortmund", "oracle", Outcome::HomeWin);
  input.score  = Some(Scoreline::new(3, 1));
  input.reason = Some("Home pressing".into());

  let stored = s.upsert_prediction(input).await.unwrap();
  assert!(stored.id > 0);
  assert_eq!(stored.season, "2025-26");
  assert_eq!(stored.matchday, 4);
  assert_eq!(stored.agent_name, "oracle");
  assert_eq!(stored.outcome, Outcome::HomeWin);
  assert_eq!(stored.score, Some(Scoreline::new(3, 1)));
  assert_eq!(stored.reason, "Home pressing");
}

#[tokio::test]
async fn resubmission_replaces_fields_and_keeps_id() {
  let s = store().await;

  let mut first = prediction("2025-26", 4, "Bayern", "Dortmund", "oracle", Outcome::HomeWin);
  first.score = Some(Scoreline::new(2, 0));
  let first = s.upsert_prediction(first).await.unwrap();

  tick().await;
  let second = s
    .upsert_prediction(prediction("2025-26", 4, "Bayern", "Dortmund", "oracle", Outcome::Draw))
    .await
    .unwrap();

  assert_eq!(second.id, first.id);
  assert_eq!(second.outcome, Outcome::Draw);
  assert_eq!(second.score, None);
  assert!(second.created_at > first.created_at);

  let rows = s.matchday_predictions("2025-26".into(), 4).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0], second);
}

#[tokio::test]
async fn many_submissions_for_one_key_leave_one_row() {
  let s = store().await;
  let outcomes = [
    Outcome::HomeWin,
    Outcome::Draw,
    Outcome::AwayWin,
    Outcome::Draw,
    Outcome::HomeWin,
  ];

  let mut ids = Vec::new();
  for outcome in outcomes {
    let p = s
      .upsert_prediction(prediction("2025-26", 9, "Leipzig", "Union", "oracle", outcome))
      .await
      .unwrap();
    ids.push(p.id);
  }

  assert!(ids.iter().all(|id| *id == ids[0]));
  let rows = s.matchday_predictions("2025-26".into(), 9).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].outcome, Outcome::HomeWin);
}

#[tokio::test]
async fn different_agents_keep_separate_rows() {
  let s = store().await;
  let a = s
    .upsert_prediction(prediction("2025-26", 2, "Mainz", "Bochum", "alpha", Outcome::HomeWin))
    .await
    .unwrap();
  let b = s
    .upsert_prediction(prediction("2025-26", 2, "Mainz", "Bochum", "beta", Outcome::AwayWin))
    .await
    .unwrap();

  assert_ne!(a.id, b.id);
  let rows = s.matchday_predictions("2025-26".into(), 2).await.unwrap();
  let agents: Vec<&str> = rows.iter().map(|p| p.agent_name.as_str()).collect();
  assert_eq!(agents, ["alpha", "beta"]);
}

#[tokio::test]
async fn missing_reason_stores_placeholder() {
  let s = store().await;

  let mut with_reason = prediction("2025-26", 1, "Hoffenheim", "Wolfsburg", "oracle", Outcome::Draw);
  with_reason.reason = Some("Both sides tired".into());
  s.upsert_prediction(with_reason).await.unwrap();

  // A replacement without a reason resets it.
  let replaced = s
    .upsert_prediction(prediction("2025-26", 1, "Hoffenheim", "Wolfsburg", "oracle", Outcome::Draw))
    .await
    .unwrap();
  assert_eq!(replaced.reason, DEFAULT_REASON);
}

#[tokio::test]
async fn concurrent_writes_to_one_key_converge() {
  // Last committed write wins; which task commits last is up to the store.
  let s = store().await;
  s.ensure_schema().await.unwrap();

  let mut tasks = tokio::task::JoinSet::new();
  for outcome in [Outcome::HomeWin, Outcome::AwayWin] {
    let s = s.clone();
    tasks.spawn(async move {
      s.upsert_prediction(prediction("2025-26", 6, "Bremen", "Koeln", "racer", outcome))
        .await
        .unwrap()
    });
  }
  let mut returned = Vec::new();
  while let Some(result) = tasks.join_next().await {
    returned.push(result.unwrap());
  }

  let rows = s.matchday_predictions("2025-26".into(), 6).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert!(returned.iter().all(|p| p.id == rows[0].id));
  assert!(matches!(rows[0].outcome, Outcome::HomeWin | Outcome::AwayWin));
}

// ─── Batch upsert ────────────────────────────────────────────────────────────

#[tokio::test]
async fn batch_returns_agent_rows_newest_first() {
  let s = store().await;

  let earlier = s
    .upsert_prediction(prediction("2025-26", 5, "Augsburg", "Freiburg", "oracle", Outcome::Draw))
    .await
    .unwrap();
  tick().await;

  let rows = s
    .upsert_prediction_batch(
      header("2025-26", 5, "oracle"),
      vec![
        item("Bayern", "Dortmund", Outcome::HomeWin, Some(Scoreline::new(2, 1))),
        item("Mainz", "Bochum", Outcome::AwayWin, None),
      ],
    )
    .await
    .unwrap();

  assert_eq!(rows.len(), 3);
  // Batch rows share a timestamp, so the later id comes first.
  assert_eq!(rows[0].home_team, "Mainz");
  assert_eq!(rows[1].home_team, "Bayern");
  assert_eq!(rows[1].score, Some(Scoreline::new(2, 1)));
  assert_eq!(rows[2].id, earlier.id);
  assert!(rows.iter().all(|p| p.agent_name == "oracle" && p.matchday == 5));
}

#[tokio::test]
async fn batch_only_returns_the_submitting_agent() {
  let s = store().await;
  s.upsert_prediction(prediction("2025-26", 5, "Bayern", "Dortmund", "other", Outcome::Draw))
    .await
    .unwrap();

  let rows = s
    .upsert_prediction_batch(
      header("2025-26", 5, "oracle"),
      vec![item("Bayern", "Dortmund", Outcome::HomeWin, None)],
    )
    .await
    .unwrap();

  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].agent_name, "oracle");
}

#[tokio::test]
async fn batch_replaces_existing_rows_in_place() {
  let s = store().await;
  let existing = s
    .upsert_prediction(prediction("2025-26", 5, "Bayern", "Dortmund", "oracle", Outcome::Draw))
    .await
    .unwrap();
  tick().await;

  let rows = s
    .upsert_prediction_batch(
      header("2025-26", 5, "oracle"),
      vec![item("Bayern", "Dortmund", Outcome::AwayWin, Some(Scoreline::new(0, 1)))],
    )
    .await
    .unwrap();

  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].id, existing.id);
  assert_eq!(rows[0].outcome, Outcome::AwayWin);
  assert!(rows[0].created_at > existing.created_at);
}

#[tokio::test]
async fn failing_batch_item_rolls_back_the_whole_batch() {
  let s = store().await;
  let before = s
    .upsert_prediction(prediction("2025-26", 8, "Bayern", "Dortmund", "oracle", Outcome::Draw))
    .await
    .unwrap();

  let items = vec![
    item("Bayern", "Dortmund", Outcome::HomeWin, None),
    item("Mainz", "Bochum", Outcome::HomeWin, None),
    // Violates the goals CHECK constraint.
    item("Koeln", "Hertha", Outcome::HomeWin, Some(Scoreline::new(25, 0))),
    item("Leipzig", "Union", Outcome::Draw, None),
    item("Bremen", "Freiburg", Outcome::AwayWin, None),
  ];
  let result = s.upsert_prediction_batch(header("2025-26", 8, "oracle"), items).await;
  assert!(matches!(result, Err(Error::Database(_))));

  let rows = s.matchday_predictions("2025-26".into(), 8).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0], before);
}

#[tokio::test]
async fn empty_batch_writes_nothing() {
  let s = store().await;
  let rows = s
    .upsert_prediction_batch(header("2025-26", 8, "oracle"), vec![])
    .await
    .unwrap();
  assert!(rows.is_empty());
}

// ─── Current matchday ────────────────────────────────────────────────────────

#[tokio::test]
async fn current_matchday_on_empty_store_is_none() {
  let s = store().await;
  assert!(s.current_matchday().await.unwrap().is_none());
}

#[tokio::test]
async fn current_matchday_follows_latest_written_season() {
  let s = store().await;
  s.upsert_prediction(prediction("2024-25", 30, "Bayern", "Dortmund", "oracle", Outcome::HomeWin))
    .await
    .unwrap();
  tick().await;
  s.upsert_prediction(prediction("2025-26", 1, "Mainz", "Bochum", "oracle", Outcome::Draw))
    .await
    .unwrap();

  let current = s.current_matchday().await.unwrap().unwrap();
  assert_eq!(current.season, "2025-26");
  assert_eq!(current.matchday, 1);
  assert_eq!(current.predictions.len(), 1);
}

#[tokio::test]
async fn current_matchday_is_numeric_max_not_most_recent() {
  let s = store().await;
  s.upsert_prediction(prediction("2025-26", 5, "Bayern", "Dortmund", "oracle", Outcome::HomeWin))
    .await
    .unwrap();
  tick().await;
  // Backfilling an earlier matchday does not move the board back.
  s.upsert_prediction(prediction("2025-26", 3, "Mainz", "Bochum", "oracle", Outcome::Draw))
    .await
    .unwrap();

  let current = s.current_matchday().await.unwrap().unwrap();
  assert_eq!(current.season, "2025-26");
  assert_eq!(current.matchday, 5);
  assert_eq!(current.predictions.len(), 1);
  assert_eq!(current.predictions[0].home_team, "Bayern");
}

#[tokio::test]
async fn rewriting_an_old_season_makes_it_current() {
  let s = store().await;
  s.upsert_prediction(prediction("2024-25", 34, "Bayern", "Dortmund", "oracle", Outcome::HomeWin))
    .await
    .unwrap();
  tick().await;
  s.upsert_prediction(prediction("2025-26", 1, "Mainz", "Bochum", "oracle", Outcome::Draw))
    .await
    .unwrap();
  tick().await;
  s.upsert_prediction(prediction("2024-25", 34, "Bayern", "Dortmund", "oracle", Outcome::Draw))
    .await
    .unwrap();

  let current = s.current_matchday().await.unwrap().unwrap();
  assert_eq!(current.season, "2024-25");
  assert_eq!(current.matchday, 34);
}

#[tokio::test]
async fn current_matchday_orders_by_fixture_then_agent() {
  let s = store().await;
  for (home, away, agent) in [
    ("Union", "Leipzig", "beta"),
    ("Augsburg", "Bremen", "gamma"),
    ("Union", "Leipzig", "alpha"),
    ("Augsburg", "Bremen", "alpha"),
    ("Augsburg", "Bayern", "beta"),
  ] {
    s.upsert_prediction(prediction("2025-26", 12, home, away, agent, Outcome::Draw))
      .await
      .unwrap();
  }

  let current = s.current_matchday().await.unwrap().unwrap();
  let order: Vec<(&str, &str, &str)> = current
    .predictions
    .iter()
    .map(|p| (p.home_team.as_str(), p.away_team.as_str(), p.agent_name.as_str()))
    .collect();
  assert_eq!(order, [
    ("Augsburg", "Bayern", "beta"),
    ("Augsburg", "Bremen", "alpha"),
    ("Augsburg", "Bremen", "gamma"),
    ("Union", "Leipzig", "alpha"),
    ("Union", "Leipzig", "beta"),
  ]);

  let summary = current.summary();
  assert_eq!((summary.fixtures, summary.agents, summary.predictions), (3, 3, 5));
}

// ─── Schema initialisation ───────────────────────────────────────────────────

#[tokio::test]
async fn concurrent_ensure_schema_calls_all_succeed() {
  let s = store().await;
  let mut tasks = tokio::task::JoinSet::new();
  for _ in 0..8 {
    let s = s.clone();
    tasks.spawn(async move { s.ensure_schema().await });
  }
  while let Some(result) = tasks.join_next().await {
    result.unwrap().unwrap();
  }

  s.upsert_prediction(prediction("2025-26", 1, "Mainz", "Bochum", "oracle", Outcome::Draw))
    .await
    .unwrap();
}

#[tokio::test]
async fn schema_work_runs_once_per_handle() {
  let s = store().await;
  s.ensure_schema().await.unwrap();

  // Once initialised the guard is not re-evaluated, even if the table goes away.
  exec_raw(&s, "DROP TABLE predictions;").await.unwrap();
  s.ensure_schema().await.unwrap();

  let result = s
    .upsert_prediction(prediction("2025-26", 1, "Mainz", "Bochum", "oracle", Outcome::Draw))
    .await;
  assert!(matches!(result, Err(Error::Database(_))));
}

#[tokio::test]
async fn failed_schema_initialisation_is_retried() {
  let s = store().await;

  // A pre-existing table too broken to migrate.
  exec_raw(&s, "CREATE TABLE predictions (id INTEGER PRIMARY KEY, season TEXT);")
    .await
    .unwrap();

  let err = s.ensure_schema().await.unwrap_err();
  assert!(err.is_schema());
  assert!(matches!(
    err,
    Error::Schema(ref m) if m.step == "dedupe_predictions"
  ));

  // The whole attempt rolled back: no columns were added.
  let columns = s
    .conn
    .call(|conn| Ok(column_names(conn, "predictions")?))
    .await
    .unwrap();
  assert_eq!(columns, ["id", "season"]);

  // Reads fail with the same schema error rather than touching the table.
  assert!(s.current_matchday().await.unwrap_err().is_schema());

  exec_raw(&s, "DROP TABLE predictions;").await.unwrap();
  s.ensure_schema().await.unwrap();

  let stored = s
    .upsert_prediction(prediction("2025-26", 1, "Mainz", "Bochum", "oracle", Outcome::Draw))
    .await
    .unwrap();
  assert_eq!(stored.matchday, 1);
}

#[tokio::test]
async fn legacy_table_is_migrated_and_deduplicated() {
  let s = store().await;

  // The first generation of the table: no agent, no reason, duplicates allowed.
  exec_raw(
    &s,
    "CREATE TABLE predictions (
       id                   INTEGER PRIMARY KEY,
       season               TEXT    NOT NULL,
       matchday             INTEGER NOT NULL CHECK (matchday BETWEEN 1 AND 34),
       home_team            TEXT    NOT NULL,
       away_team            TEXT    NOT NULL,
       predicted_outcome    TEXT    NOT NULL,
       predicted_home_goals INTEGER,
       predicted_away_goals INTEGER,
       created_at           TEXT    NOT NULL DEFAULT CURRENT_TIMESTAMP
     );
     INSERT INTO predictions VALUES
       (1, '2024-25', 10, 'Bayern', 'Dortmund', 'HOME_WIN', NULL, NULL, '2024-11-01 10:00:00'),
       (2, '2024-25', 10, 'Bayern', 'Dortmund', 'DRAW',     1,    1,    '2024-11-01 10:05:00'),
       (3, '2024-25', 10, 'Mainz',  'Bochum',   'AWAY_WIN', 0,    2,    '2024-11-01 10:06:00'),
       (4, '2024-25', 10, 'Bayern', 'Dortmund', 'AWAY_WIN', 0,    2,    '2024-11-01 10:07:00');",
  )
  .await
  .unwrap();

  s.ensure_schema().await.unwrap();

  let columns = s
    .conn
    .call(|conn| Ok(column_names(conn, "predictions")?))
    .await
    .unwrap();
  assert!(columns.iter().any(|c| c == "agent_name"));
  assert!(columns.iter().any(|c| c == "reason"));

  let version: i64 = s
    .conn
    .call(|conn| Ok(conn.query_row("PRAGMA user_version", [], |r| r.get(0))?))
    .await
    .unwrap();
  assert_eq!(version, MIGRATIONS.len() as i64);

  let rows = s.matchday_predictions("2024-25".into(), 10).await.unwrap();
  let ids: Vec<i64> = rows.iter().map(|p| p.id).collect();
  assert_eq!(ids, [4, 3]);
  assert!(rows.iter().all(|p| p.agent_name == DEFAULT_AGENT_NAME));
  assert!(rows.iter().all(|p| p.reason == DEFAULT_REASON));
  assert_eq!(rows[0].score, Some(Scoreline::new(0, 2)));

  // The unique index now rejects raw duplicates...
  let duplicate = exec_raw(
    &s,
    "INSERT INTO predictions (season, matchday, home_team, away_team, predicted_outcome)
     VALUES ('2024-25', 10, 'Bayern', 'Dortmund', 'DRAW');",
  )
  .await;
  assert!(duplicate.is_err());

  // ...while upserts for the migrated key replace the surviving row.
  let replaced = s
    .upsert_prediction(prediction(
      "2024-25",
      10,
      "Bayern",
      "Dortmund",
      DEFAULT_AGENT_NAME,
      Outcome::HomeWin,
    ))
    .await
    .unwrap();
  assert_eq!(replaced.id, 4);
  assert_eq!(replaced.outcome, Outcome::HomeWin);

  let current = s.current_matchday().await.unwrap().unwrap();
  assert_eq!((current.season.as_str(), current.matchday), ("2024-25", 10));
}

// ─── Blog posts ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn blog_posts_are_appended() {
  let s = store().await;
  let input = NewBlogPost {
    title:  "Why I predict a home win".into(),
    date:   NaiveDate::from_ymd_opt(2025, 9, 13).unwrap(),
    author: "oracle".into(),
    text:   "Recent xG form and home pressing intensity.".into(),
  };

  let first  = s.create_blog_post(input.clone()).await.unwrap();
  let second = s.create_blog_post(input).await.unwrap();

  assert!(second.id > first.id);
  assert_eq!(first.title, "Why I predict a home win");
  assert_eq!(first.date, NaiveDate::from_ymd_opt(2025, 9, 13).unwrap());
  assert_eq!(second.text, first.text);
}
