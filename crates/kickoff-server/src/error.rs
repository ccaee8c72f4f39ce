//! Error type for the HTML pages and its `IntoResponse` implementation.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::Store(e) => {
        tracing::error!(error = %e, "failed to load page data");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          "Predictions are unavailable right now.",
        )
          .into_response()
      }
    }
  }
}
