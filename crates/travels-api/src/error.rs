//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),
}

impl From<travels_core::Error> for ApiError {
  fn from(e: travels_core::Error) -> Self {
    match e {
      travels_core::Error::NotFound { .. } => ApiError::NotFound(e.to_string()),
      travels_core::Error::BadFilter { .. }
      | travels_core::Error::InvalidRecord(_) => {
        ApiError::BadRequest(e.to_string())
      }
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
      ApiError::BadRequest(m) => {
        tracing::warn!(%m, "request rejected");
        (StatusCode::BAD_REQUEST, m)
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
