//! API error type and [`axum::response::IntoResponse`] implementation.

use std::time::Duration;

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  NotFound(String),

  /// The request body could not be turned into a safe statement.
  #[error("invalid request: {0}")]
  Validation(#[from] census_core::Error),

  /// The body or a path parameter could not be parsed at all.
  #[error("invalid request: {0}")]
  Malformed(String),

  #[error("search timed out after {0:?}")]
  Timeout(Duration),

  /// A store failure. Only `action` is shown to the caller.
  #[error("store error while {action}: {source}")]
  Store {
    action: &'static str,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },
}

impl ApiError {
  /// Adapter for `map_err` that wraps a store error with what the handler
  /// was doing.
  pub fn store<E>(action: &'static str) -> impl FnOnce(E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    move |e| Self::Store { action, source: Box::new(e) }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { Self::Malformed(rejection.body_text()) }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self { Self::Malformed(rejection.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::Validation(_) | ApiError::Malformed(_) => {
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
      }
      ApiError::Timeout(after) => {
        tracing::warn!(?after, "search timed out");
        (
          StatusCode::REQUEST_TIMEOUT,
          "search request timed out; please try a more specific search".to_owned(),
        )
      }
      ApiError::Store { action, source } => {
        tracing::error!(error = %source, "store error while {action}");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          format!("an error occurred while {action}"),
        )
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
