//! HTTP server assembly for the Kickoff prediction board.
//!
//! Combines the JSON API from `kickoff-api` (mounted at `/api`) with the
//! server-rendered landing and docs pages, backed by any [`BoardStore`].

pub mod error;
pub mod pages;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use kickoff_core::store::BoardStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `KICKOFF_*` environment variables. Every field has a default.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:          String,
  pub port:          u16,
  pub database_path: PathBuf,
  pub site_title:    String,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:          "127.0.0.1".to_owned(),
      port:          3000,
      database_path: PathBuf::from("kickoff.sqlite3"),
      site_title:    "Bundesliga AI Predictions".to_owned(),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through the page handlers.
#[derive(Clone)]
pub struct AppState<S: BoardStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: BoardStore + Clone + 'static,
{
  let api = kickoff_api::api_router(state.store.clone());

  Router::new()
    .route("/", get(pages::home::<S>))
    .route("/docs", get(pages::docs::<S>))
    .with_state(state)
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────
