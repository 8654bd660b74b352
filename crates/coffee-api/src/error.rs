//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use coffee_core::{ValidationError, store::StoreError};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  NotFound(String),

  #[error(transparent)]
  Validation(#[from] ValidationError),

  /// The document store could not be reached.
  #[error("{0}")]
  Unavailable(String),

  /// The document store answered, but refused or garbled the request.
  #[error("{0}")]
  BadGateway(String),

  #[error("internal error: {0}")]
  Internal(String),
}

impl From<coffee_core::Error> for ApiError {
  fn from(e: coffee_core::Error) -> Self {
    use coffee_core::Error;
    match e {
      Error::Validation(v) => ApiError::Validation(v),
      Error::NotFound { .. } => ApiError::NotFound(e.to_string()),
      Error::Store(s @ StoreError::Unavailable(_)) => ApiError::Unavailable(s.to_string()),
      Error::Store(s) => ApiError::BadGateway(s.to_string()),
      Error::Serialization(s) => ApiError::Internal(s.to_string()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
      ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
      ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
      ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    match &self {
      ApiError::Unavailable(e) | ApiError::BadGateway(e) => warn!(%status, "store failure: {e}"),
      ApiError::Internal(e) => error!("internal error: {e}"),
      _ => {}
    }
    let body = match &self {
      ApiError::Validation(v) => json!({ "error": self.to_string(), "fields": v.errors }),
      _ => json!({ "error": self.to_string() }),
    };
    (status, Json(body)).into_response()
  }
}
