//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  /// The body was not syntactically valid JSON, or was sent without a JSON
  /// content type.
  #[error("invalid JSON body: {0}")]
  InvalidJson(String),

  /// The body parsed but failed field checks; one entry per issue.
  #[error("validation failed: {}", .0.join("; "))]
  Validation(Vec<String>),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::NotFound(m) => {
        (StatusCode::NOT_FOUND, Json(json!({ "error": m }))).into_response()
      }
      ApiError::InvalidJson(detail) => (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "Invalid JSON body", "detail": detail })),
      )
        .into_response(),
      ApiError::Validation(issues) => (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "Validation failed", "issues": issues })),
      )
        .into_response(),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store operation failed");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          Json(json!({ "error": "An internal error occurred" })),
        )
          .into_response()
      }
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    match rejection {
      // Well-formed JSON of the wrong shape (missing field, wrong type).
      JsonRejection::JsonDataError(e) => ApiError::Validation(vec![e.body_text()]),
      other => ApiError::InvalidJson(other.body_text()),
    }
  }
}

/// Conversion failures after validation are reported as field issues.
impl From<kickoff_core::Error> for ApiError {
  fn from(e: kickoff_core::Error) -> Self { ApiError::Validation(vec![e.to_string()]) }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self {
    ApiError::Validation(vec![rejection.body_text()])
  }
}

impl From<ValidationErrors> for ApiError {
  fn from(errors: ValidationErrors) -> Self {
    let mut issues = Vec::new();
    collect_issues("", &errors, &mut issues);
    issues.sort();
    ApiError::Validation(issues)
  }
}

/// `home_team` -> `homeTeam`, matching the JSON field names clients send.
/// `__all__` is left untouched.
fn camel_case(field: &str) -> String {
  if field.starts_with('_') {
    return field.to_owned();
  }
  let mut out = String::with_capacity(field.len());
  let mut upper = false;
  for c in field.chars() {
    if c == '_' {
      upper = true;
    } else if upper {
      out.extend(c.to_uppercase());
      upper = false;
    } else {
      out.push(c);
    }
  }
  out
}

/// Flatten nested validation errors into `path: message` strings, e.g.
/// `predictions[2].homeTeam: must be 1-80 characters`.
fn collect_issues(prefix: &str, errors: &ValidationErrors, out: &mut Vec<String>) {
  for (field, kind) in errors.errors() {
    let field = camel_case(&field.to_string());
    // Struct-level checks are reported under `__all__`; attach them to the
    // enclosing path instead.
    let path = match (prefix.is_empty(), field == "__all__") {
      (_, true) if !prefix.is_empty() => prefix.to_owned(),
      (true, true) => "body".to_owned(),
      (true, false) => field,
      (false, _) => format!("{prefix}.{field}"),
    };
    match kind {
      ValidationErrorsKind::Field(errs) => {
        for e in errs {
          let message = e
            .message
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_else(|| e.code.to_string());
          out.push(format!("{path}: {message}"));
        }
      }
      ValidationErrorsKind::Struct(inner) => collect_issues(&path, inner, out),
      ValidationErrorsKind::List(items) => {
        for (index, inner) in items {
          collect_issues(&format!("{path}[{index}]"), inner, out);
        }
      }
    }
  }
}
