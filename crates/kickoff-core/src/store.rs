//! The `BoardStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `kickoff-store-sqlite`).
//! Higher layers (`kickoff-api`, `kickoff-server`) depend on this abstraction,
//! not on any concrete backend, so the contract is identical whichever store
//! sits behind it.

use std::future::Future;

use crate::{
  blog::{BlogPost, NewBlogPost},
  matchday::CurrentMatchday,
  prediction::{BatchHeader, NewPrediction, Prediction, PredictionItem},
};

/// Abstraction over a Kickoff storage backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait BoardStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Schema ────────────────────────────────────────────────────────────

  /// Bring the backing store into the expected shape.
  ///
  /// Idempotent and safe to call concurrently. The migration work runs at
  /// most once per store handle; every concurrent caller awaits the same
  /// in-flight attempt. A failed attempt is not remembered, so the next call
  /// retries. Every other method calls this first.
  fn ensure_schema(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Predictions: writes ──────────────────────────────────────────────

  /// Insert or replace the prediction for its (season, matchday, home team,
  /// away team, agent) key and return the row as re-read from the store.
  ///
  /// On replacement the id is preserved and `created_at` is refreshed.
  fn upsert_prediction(
    &self,
    input: NewPrediction,
  ) -> impl Future<Output = Result<Prediction, Self::Error>> + Send + '_;

  /// Upsert every item of a batch in one all-or-nothing transaction.
  ///
  /// Returns all current rows for the header's (season, matchday, agent),
  /// most recently written first.
  fn upsert_prediction_batch(
    &self,
    header: BatchHeader,
    items: Vec<PredictionItem>,
  ) -> impl Future<Output = Result<Vec<Prediction>, Self::Error>> + Send + '_;

  // ── Predictions: reads ───────────────────────────────────────────────

  /// All predictions for one (season, matchday), ordered by home team, away
  /// team, then agent name.
  fn matchday_predictions(
    &self,
    season: String,
    matchday: u8,
  ) -> impl Future<Output = Result<Vec<Prediction>, Self::Error>> + Send + '_;

  /// Resolve the current matchday: the season of the most recently written
  /// row, and the numerically highest matchday within it. Returns `None` when
  /// no predictions exist.
  fn current_matchday(
    &self,
  ) -> impl Future<Output = Result<Option<CurrentMatchday>, Self::Error>> + Send + '_;

  // ── Blog posts ────────────────────────────────────────────────────────

  /// Append a blog post and return it as persisted.
  fn create_blog_post(
    &self,
    input: NewBlogPost,
  ) -> impl Future<Output = Result<BlogPost, Self::Error>> + Send + '_;
}
