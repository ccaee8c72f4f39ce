//! [`SqliteStore`], the SQLite implementation of [`BoardStore`].

use std::{path::Path, sync::Arc};

use chrono::Utc;
use kickoff_core::{
  blog::{BlogPost, NewBlogPost},
  matchday::CurrentMatchday,
  prediction::{
    BatchHeader, NewPrediction, Prediction, PredictionItem, Scoreline,
    matchday_from_column,
  },
  store::BoardStore,
};
use rusqlite::{Connection, OptionalExtension as _, params};
use tokio::sync::OnceCell;

use crate::{
  Error, Result,
  encode::{RawBlogPost, RawPrediction, encode_date, encode_dt},
  schema::{self, DEFAULT_REASON, PRAGMAS},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Kickoff store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection and the schema guard are shared, so
/// every clone sees the same single-flight initialisation.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
  schema:          Arc<OnceCell<()>>,
}

impl SqliteStore {
  /// Open (or create) a store at `path`.
  ///
  /// The schema is not touched until the first call to
  /// [`BoardStore::ensure_schema`] or any other store operation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::with_connection(conn).await
  }

  /// Open an in-memory store, used by tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::with_connection(conn).await
  }

  async fn with_connection(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(PRAGMAS)?;
        Ok(())
      })
      .await?;
    Ok(Self { conn, schema: Arc::new(OnceCell::new()) })
  }

  /// Close the underlying connection. Other clones become unusable.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  async fn run_migrations(&self) -> Result<()> {
    let applied = self
      .conn
      .call(|conn| Ok(schema::apply_migrations(conn)))
      .await??;
    tracing::info!(steps = applied, "database schema is up to date");
    Ok(())
  }
}

// ─── SQL helpers ─────────────────────────────────────────────────────────────

const UPSERT_PREDICTION: &str = "
INSERT INTO predictions (
    season, matchday, agent_name, home_team, away_team,
    predicted_outcome, predicted_home_goals, predicted_away_goals,
    reason, created_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
ON CONFLICT (season, matchday, home_team, away_team, agent_name)
DO UPDATE SET
    predicted_outcome    = excluded.predicted_outcome,
    predicted_home_goals = excluded.predicted_home_goals,
    predicted_away_goals = excluded.predicted_away_goals,
    reason               = excluded.reason,
    created_at           = MAX(predictions.created_at, excluded.created_at)";

fn upsert_row(conn: &Connection, p: &NewPrediction, now: &str) -> rusqlite::Result<()> {
  let (home_goals, away_goals) = Scoreline::to_columns(p.score);
  let mut stmt = conn.prepare_cached(UPSERT_PREDICTION)?;
  stmt.execute(params![
    p.season,
    i64::from(p.matchday),
    p.agent_name,
    p.home_team,
    p.away_team,
    p.outcome.as_ref(),
    home_goals,
    away_goals,
    p.reason.as_deref().unwrap_or(DEFAULT_REASON),
    now,
  ])?;
  Ok(())
}

fn select_by_key(conn: &Connection, p: &NewPrediction) -> rusqlite::Result<Option<RawPrediction>> {
  let sql = format!(
    "SELECT {} FROM predictions
     WHERE season = ?1 AND matchday = ?2 AND home_team = ?3
       AND away_team = ?4 AND agent_name = ?5",
    RawPrediction::COLUMNS
  );
  conn
    .query_row(
      &sql,
      params![
        p.season,
        i64::from(p.matchday),
        p.home_team,
        p.away_team,
        p.agent_name,
      ],
      RawPrediction::from_row,
    )
    .optional()
}

/// Every row one agent has for a (season, matchday), newest write first.
fn select_for_agent(
  conn:   &Connection,
  header: &BatchHeader,
) -> rusqlite::Result<Vec<RawPrediction>> {
  let sql = format!(
    "SELECT {} FROM predictions
     WHERE season = ?1 AND matchday = ?2 AND agent_name = ?3
     ORDER BY created_at DESC, id DESC",
    RawPrediction::COLUMNS
  );
  let mut stmt = conn.prepare(&sql)?;
  let rows = stmt
    .query_map(
      params![header.season, i64::from(header.matchday), header.agent_name],
      RawPrediction::from_row,
    )?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

/// Every row for a (season, matchday), grouped by fixture for display.
fn select_matchday(
  conn:     &Connection,
  season:   &str,
  matchday: i64,
) -> rusqlite::Result<Vec<RawPrediction>> {
  let sql = format!(
    "SELECT {} FROM predictions
     WHERE season = ?1 AND matchday = ?2
     ORDER BY home_team ASC, away_team ASC, agent_name ASC",
    RawPrediction::COLUMNS
  );
  let mut stmt = conn.prepare(&sql)?;
  let rows = stmt
    .query_map(params![season, matchday], RawPrediction::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

fn describe_key(p: &NewPrediction) -> String {
  format!(
    "prediction {} matchday {} {} vs {} by {}",
    p.season, p.matchday, p.home_team, p.away_team, p.agent_name
  )
}

fn decode_all(raws: Vec<RawPrediction>) -> Result<Vec<Prediction>> {
  raws.into_iter().map(RawPrediction::into_prediction).collect()
}

// ─── BoardStore impl ─────────────────────────────────────────────────────────

impl BoardStore for SqliteStore {
  type Error = Error;

  // ── Schema ────────────────────────────────────────────────────────────────

  async fn ensure_schema(&self) -> Result<()> {
    self.schema.get_or_try_init(|| self.run_migrations()).await?;
    Ok(())
  }

  // ── Predictions: writes ──────────────────────────────────────────────────

  async fn upsert_prediction(&self, input: NewPrediction) -> Result<Prediction> {
    self.ensure_schema().await?;

    let key = describe_key(&input);
    let now = encode_dt(Utc::now());

    let raw: Option<RawPrediction> = self
      .conn
      .call(move |conn| {
        upsert_row(conn, &input, &now)?;
        Ok(select_by_key(conn, &input)?)
      })
      .await?;

    raw
      .ok_or(Error::Unconfirmed(key))?
      .into_prediction()
  }

  async fn upsert_prediction_batch(
    &self,
    header: BatchHeader,
    items:  Vec<PredictionItem>,
  ) -> Result<Vec<Prediction>> {
    self.ensure_schema().await?;

    let expected = items.len();
    let now      = encode_dt(Utc::now());
    let key      = format!(
      "batch {} matchday {} by {}",
      header.season, header.matchday, header.agent_name
    );

    let raws: Vec<RawPrediction> = self
      .conn
      .call(move |conn| {
        // Dropping the transaction without commit rolls back every item.
        let tx = conn.transaction()?;
        for item in items {
          upsert_row(&tx, &header.prediction(item), &now)?;
        }
        tx.commit()?;

        Ok(select_for_agent(conn, &header)?)
      })
      .await?;

    if expected > 0 && raws.is_empty() {
      return Err(Error::Unconfirmed(key));
    }
    tracing::debug!(items = expected, rows = raws.len(), "{key} committed");

    decode_all(raws)
  }

  // ── Predictions: reads ───────────────────────────────────────────────────

  async fn matchday_predictions(
    &self,
    season:   String,
    matchday: u8,
  ) -> Result<Vec<Prediction>> {
    self.ensure_schema().await?;

    let raws = self
      .conn
      .call(move |conn| Ok(select_matchday(conn, &season, i64::from(matchday))?))
      .await?;

    decode_all(raws)
  }

  async fn current_matchday(&self) -> Result<Option<CurrentMatchday>> {
    self.ensure_schema().await?;

    let resolved: Option<(String, i64, Vec<RawPrediction>)> = self
      .conn
      .call(|conn| {
        // One read transaction so the three queries see the same snapshot.
        let tx = conn.transaction()?;

        let season: Option<String> = tx
          .query_row(
            "SELECT season FROM predictions
             ORDER BY created_at DESC, id DESC
             LIMIT 1",
            [],
            |row| row.get(0),
          )
          .optional()?;
        let Some(season) = season else {
          return Ok(None);
        };

        // Highest matchday by value, not by recency.
        let matchday: i64 = tx.query_row(
          "SELECT MAX(matchday) FROM predictions WHERE season = ?1",
          params![season],
          |row| row.get(0),
        )?;

        let rows = select_matchday(&tx, &season, matchday)?;
        tx.commit()?;
        Ok(Some((season, matchday, rows)))
      })
      .await?;

    let Some((season, matchday, raws)) = resolved else {
      return Ok(None);
    };

    Ok(Some(CurrentMatchday {
      season,
      matchday: matchday_from_column(matchday)?,
      predictions: decode_all(raws)?,
    }))
  }

  // ── Blog posts ────────────────────────────────────────────────────────────

  async fn create_blog_post(&self, input: NewBlogPost) -> Result<BlogPost> {
    self.ensure_schema().await?;

    let date = encode_date(input.date);
    let now  = encode_dt(Utc::now());

    let raw: Option<RawBlogPost> = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO blog_posts (title, post_date, author, text, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          params![input.title, date, input.author, input.text, now],
        )?;
        let id = conn.last_insert_rowid();

        Ok(
          conn
            .query_row(
              "SELECT id, title, post_date, author, text, created_at
               FROM blog_posts WHERE id = ?1",
              params![id],
              RawBlogPost::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .ok_or_else(|| Error::Unconfirmed("blog post".to_owned()))?
      .into_blog_post()
  }
}
