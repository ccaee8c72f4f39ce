//! Handlers for `/predictions` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/predictions` | One prediction; replaces any earlier one for the same key |
//! | `POST` | `/predictions/batch` | 1-100 fixtures for one agent, all-or-nothing |
//! | `GET`  | `/predictions` | Requires `?season=&matchday=` |
//! | `GET`  | `/predictions/current` | 404 when nothing has been submitted |

use std::sync::Arc;

use axum::{
  Json,
  extract::{
    Query, State,
    rejection::{JsonRejection, QueryRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use kickoff_core::{
  prediction::{NewPrediction, matchday_from_column},
  store::BoardStore,
};
use serde_json::json;

use crate::{
  error::ApiError,
  json::{self, CurrentMatchdayJson, PredictionJson},
  validate::{BatchBody, MatchdayParams, PredictionBody, validated},
};

// ─── Submit one ───────────────────────────────────────────────────────────────

/// `POST /predictions`
pub async fn submit<S>(
  State(store): State<Arc<S>>,
  body: Result<Json<PredictionBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BoardStore,
{
  let Json(body) = body?;
  let input = NewPrediction::try_from(validated(body)?)?;

  let saved = store
    .upsert_prediction(input)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  tracing::info!(
    id = saved.id,
    agent = %saved.agent_name,
    season = %saved.season,
    matchday = saved.matchday,
    "prediction saved"
  );
  Ok((
    StatusCode::CREATED,
    Json(json!({ "prediction": PredictionJson::from(&saved) })),
  ))
}

// ─── Submit batch ─────────────────────────────────────────────────────────────

/// `POST /predictions/batch`
pub async fn submit_batch<S>(
  State(store): State<Arc<S>>,
  body: Result<Json<BatchBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BoardStore,
{
  let Json(body) = body?;
  let (header, items) = validated(body)?.into_parts()?;
  let submitted = items.len();
  let agent = header.agent_name.clone();

  let rows = store
    .upsert_prediction_batch(header, items)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  tracing::info!(%agent, submitted, rows = rows.len(), "prediction batch saved");
  Ok((
    StatusCode::CREATED,
    Json(json!({ "predictions": json::predictions(&rows) })),
  ))
}

// ─── List one matchday ────────────────────────────────────────────────────────

/// `GET /predictions?season=<season>&matchday=<n>`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  params: Result<Query<MatchdayParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BoardStore,
{
  let Query(params) = params?;
  let params = validated(params)?;
  let matchday = matchday_from_column(params.matchday)?;
  let rows = store
    .matchday_predictions(params.season, matchday)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(json!({ "predictions": json::predictions(&rows) })))
}

// ─── Current matchday ─────────────────────────────────────────────────────────

/// `GET /predictions/current`
pub async fn current<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<CurrentMatchdayJson>, ApiError>
where
  S: BoardStore,
{
  let current = store
    .current_matchday()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound("no predictions have been submitted yet".into()))?;
  Ok(Json(CurrentMatchdayJson::from(&current)))
}
