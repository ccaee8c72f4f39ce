//! SQL schema and migrations for the Kickoff SQLite store.
//!
//! The schema is brought up to date by an ordered list of named steps. Each
//! step inspects the live database and is a no-op when its change is already
//! present, so the whole list can be replayed against a fresh file, an
//! up-to-date file, or a table written by an older generation of the service.
//! The list runs inside one transaction; `PRAGMA user_version` records how many
//! steps the last successful run applied.

use rusqlite::{Connection, params};

use crate::error::MigrationError;

/// Agent name given to rows written before submitters were tracked.
pub const DEFAULT_AGENT_NAME: &str = "Unknown Agent";

/// Reason stored when a submission carries none.
pub const DEFAULT_REASON: &str = "No reason provided";

/// Connection-level settings, applied once when a handle is opened.
pub const PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
PRAGMA busy_timeout = 5000;
";

/// One named, idempotent schema step.
pub struct Migration {
  pub name:  &'static str,
  pub apply: fn(&Connection) -> rusqlite::Result<()>,
}

/// Every schema step, in application order.
pub const MIGRATIONS: &[Migration] = &[
  Migration { name: "create_predictions",        apply: create_predictions },
  Migration { name: "add_agent_name",            apply: add_agent_name },
  Migration { name: "add_reason",                apply: add_reason },
  Migration { name: "dedupe_predictions",        apply: dedupe_predictions },
  Migration { name: "create_prediction_indexes", apply: create_prediction_indexes },
  Migration { name: "create_blog_posts",         apply: create_blog_posts },
];

/// Apply every step of [`MIGRATIONS`] in a single transaction.
///
/// Returns the number of steps applied. On failure the transaction is rolled
/// back and the error names the step that failed.
pub fn apply_migrations(conn: &mut Connection) -> Result<usize, MigrationError> {
  let tx = conn
    .transaction()
    .map_err(|source| MigrationError { step: "begin", source })?;

  for migration in MIGRATIONS {
    tracing::debug!(step = migration.name, "applying schema step");
    (migration.apply)(&tx)
      .map_err(|source| MigrationError { step: migration.name, source })?;
  }

  tx.pragma_update(None, "user_version", MIGRATIONS.len() as i64)
    .map_err(|source| MigrationError { step: "user_version", source })?;
  tx.commit()
    .map_err(|source| MigrationError { step: "commit", source })?;

  Ok(MIGRATIONS.len())
}

/// Names of the columns currently defined on `table`.
pub fn column_names(conn: &Connection, table: &str) -> rusqlite::Result<Vec<String>> {
  let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
  let names = stmt
    .query_map(params![table], |row| row.get(0))?
    .collect::<rusqlite::Result<Vec<String>>>()?;
  Ok(names)
}

fn has_column(conn: &Connection, table: &str, column: &str) -> rusqlite::Result<bool> {
  Ok(column_names(conn, table)?.iter().any(|c| c == column))
}

// ─── Steps ───────────────────────────────────────────────────────────────────

fn create_predictions(conn: &Connection) -> rusqlite::Result<()> {
  conn.execute_batch(
    "
CREATE TABLE IF NOT EXISTS predictions (
    id                   INTEGER PRIMARY KEY AUTOINCREMENT,
    season               TEXT    NOT NULL,
    matchday             INTEGER NOT NULL CHECK (matchday BETWEEN 1 AND 34),
    agent_name           TEXT    NOT NULL DEFAULT 'Unknown Agent',
    home_team            TEXT    NOT NULL,
    away_team            TEXT    NOT NULL,
    predicted_outcome    TEXT    NOT NULL
                         CHECK (predicted_outcome IN ('HOME_WIN', 'DRAW', 'AWAY_WIN')),
    predicted_home_goals INTEGER CHECK (predicted_home_goals BETWEEN 0 AND 20),
    predicted_away_goals INTEGER CHECK (predicted_away_goals BETWEEN 0 AND 20),
    reason               TEXT    NOT NULL DEFAULT 'No reason provided',
    created_at           TEXT    NOT NULL
                         DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    -- both goal columns set, or neither
    CHECK ((predicted_home_goals IS NULL) = (predicted_away_goals IS NULL))
);
",
  )
}

fn add_agent_name(conn: &Connection) -> rusqlite::Result<()> {
  if has_column(conn, "predictions", "agent_name")? {
    return Ok(());
  }
  tracing::info!("adding predictions.agent_name");
  conn.execute_batch(
    "ALTER TABLE predictions
       ADD COLUMN agent_name TEXT NOT NULL DEFAULT 'Unknown Agent';",
  )
}

fn add_reason(conn: &Connection) -> rusqlite::Result<()> {
  if has_column(conn, "predictions", "reason")? {
    return Ok(());
  }
  tracing::info!("adding predictions.reason");
  conn.execute_batch(
    "ALTER TABLE predictions
       ADD COLUMN reason TEXT NOT NULL DEFAULT 'No reason provided';",
  )
}

/// Keep only the highest-id row per uniqueness key.
fn dedupe_predictions(conn: &Connection) -> rusqlite::Result<()> {
  let removed = conn.execute(
    "DELETE FROM predictions
     WHERE id NOT IN (
       SELECT MAX(id)
       FROM predictions
       GROUP BY season, matchday, home_team, away_team, agent_name
     )",
    [],
  )?;
  if removed > 0 {
    tracing::info!(removed, "removed duplicate predictions");
  }
  Ok(())
}

fn create_prediction_indexes(conn: &Connection) -> rusqlite::Result<()> {
  conn.execute_batch(
    "
CREATE UNIQUE INDEX IF NOT EXISTS predictions_key_idx
    ON predictions (season, matchday, home_team, away_team, agent_name);

CREATE INDEX IF NOT EXISTS predictions_recent_idx
    ON predictions (season, matchday, created_at DESC, id DESC);
",
  )
}

fn create_blog_posts(conn: &Connection) -> rusqlite::Result<()> {
  conn.execute_batch(
    "
-- Append-only; never updated.
CREATE TABLE IF NOT EXISTS blog_posts (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    title      TEXT NOT NULL,
    post_date  TEXT NOT NULL,   -- YYYY-MM-DD
    author     TEXT NOT NULL,
    text       TEXT NOT NULL,
    created_at TEXT NOT NULL
               DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);
",
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  fn memory() -> Connection { Connection::open_in_memory().unwrap() }

  #[test]
  fn every_step_is_idempotent_on_its_own() {
    let conn = memory();
    for migration in MIGRATIONS {
      (migration.apply)(&conn).unwrap();
      (migration.apply)(&conn).unwrap();
    }
  }

  #[test]
  fn full_list_can_be_replayed() {
    let mut conn = memory();
    assert_eq!(apply_migrations(&mut conn).unwrap(), MIGRATIONS.len());
    assert_eq!(apply_migrations(&mut conn).unwrap(), MIGRATIONS.len());

    let version: i64 = conn
      .query_row("PRAGMA user_version", [], |r| r.get(0))
      .unwrap();
    assert_eq!(version, MIGRATIONS.len() as i64);
  }

  #[test]
  fn fresh_table_has_full_column_set() {
    let conn = memory();
    create_predictions(&conn).unwrap();
    let columns = column_names(&conn, "predictions").unwrap();
    for expected in [
      "id",
      "season",
      "matchday",
      "agent_name",
      "home_team",
      "away_team",
      "predicted_outcome",
      "predicted_home_goals",
      "predicted_away_goals",
      "reason",
      "created_at",
    ] {
      assert!(columns.iter().any(|c| c == expected), "missing {expected}");
    }
  }

  #[test]
  fn add_column_steps_fill_defaults() {
    let conn = memory();
    conn
      .execute_batch(
        "CREATE TABLE predictions (
           id INTEGER PRIMARY KEY,
           season TEXT NOT NULL,
           matchday INTEGER NOT NULL,
           home_team TEXT NOT NULL,
           away_team TEXT NOT NULL,
           predicted_outcome TEXT NOT NULL
         );
         INSERT INTO predictions (season, matchday, home_team, away_team, predicted_outcome)
         VALUES ('2024-25', 4, 'Koeln', 'Hertha', 'DRAW');",
      )
      .unwrap();

    add_agent_name(&conn).unwrap();
    add_reason(&conn).unwrap();

    let (agent, reason): (String, String) = conn
      .query_row("SELECT agent_name, reason FROM predictions", [], |r| {
        Ok((r.get(0)?, r.get(1)?))
      })
      .unwrap();
    assert_eq!(agent, DEFAULT_AGENT_NAME);
    assert_eq!(reason, DEFAULT_REASON);
  }

  #[test]
  fn dedupe_keeps_highest_id_per_key() {
    let conn = memory();
    create_predictions(&conn).unwrap();
    conn
      .execute_batch(
        "INSERT INTO predictions (id, season, matchday, agent_name, home_team, away_team, predicted_outcome)
         VALUES (1, '2025-26', 2, 'a', 'Bayern', 'Dortmund', 'HOME_WIN'),
                (2, '2025-26', 2, 'a', 'Bayern', 'Dortmund', 'DRAW'),
                (3, '2025-26', 2, 'b', 'Bayern', 'Dortmund', 'AWAY_WIN'),
                (4, '2025-26', 2, 'a', 'Bayern', 'Dortmund', 'AWAY_WIN');",
      )
      .unwrap();

    dedupe_predictions(&conn).unwrap();

    let mut stmt = conn.prepare("SELECT id FROM predictions ORDER BY id").unwrap();
    let ids: Vec<i64> = stmt
      .query_map([], |r| r.get(0))
      .unwrap()
      .collect::<rusqlite::Result<_>>()
      .unwrap();
    assert_eq!(ids, [3, 4]);
  }

  #[test]
  fn unique_index_rejects_duplicate_keys() {
    let mut conn = memory();
    apply_migrations(&mut conn).unwrap();
    let insert = "INSERT INTO predictions
                    (season, matchday, agent_name, home_team, away_team, predicted_outcome)
                  VALUES ('2025-26', 1, 'a', 'Bayern', 'Dortmund', 'DRAW')";
    conn.execute(insert, []).unwrap();
    assert!(conn.execute(insert, []).is_err());
  }

  #[test]
  fn check_constraints_reject_bad_rows() {
    let mut conn = memory();
    apply_migrations(&mut conn).unwrap();

    let bad_matchday = conn.execute(
      "INSERT INTO predictions (season, matchday, home_team, away_team, predicted_outcome)
       VALUES ('2025-26', 35, 'Bayern', 'Dortmund', 'DRAW')",
      [],
    );
    assert!(bad_matchday.is_err());

    let bad_outcome = conn.execute(
      "INSERT INTO predictions (season, matchday, home_team, away_team, predicted_outcome)
       VALUES ('2025-26', 3, 'Bayern', 'Dortmund', 'HOME')",
      [],
    );
    assert!(bad_outcome.is_err());

    let one_sided = conn.execute(
      "INSERT INTO predictions
         (season, matchday, home_team, away_team, predicted_outcome, predicted_home_goals)
       VALUES ('2025-26', 3, 'Bayern', 'Dortmund', 'DRAW', 1)",
      [],
    );
    assert!(one_sided.is_err());
  }
}
