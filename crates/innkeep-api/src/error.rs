//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error body has the shape `{"error": "<message>", "kind": "<kind>"}`
//! where `kind` is the stable name from [`innkeep_core::Error::kind`].

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use innkeep_core::Error as CoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Domain(#[from] CoreError),
}

impl ApiError {
  /// Lift any storage-trait error into the API error.
  pub fn domain(err: impl Into<CoreError>) -> Self { Self::Domain(err.into()) }

  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Domain(e) => match e {
        CoreError::InvalidRange(_) => StatusCode::BAD_REQUEST,
        CoreError::RoomNotFound(_) | CoreError::NotFound(_) => StatusCode::NOT_FOUND,
        CoreError::RoomUnavailable(_) | CoreError::InvalidTransition { .. } => {
          StatusCode::CONFLICT
        }
        CoreError::CapacityExceeded { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        CoreError::AdapterFailure { .. } | CoreError::AdapterTimeout { .. } => {
          StatusCode::BAD_GATEWAY
        }
        CoreError::StoreUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
      },
    }
  }

  pub fn kind(&self) -> &'static str {
    match self {
      ApiError::BadRequest(_) => "bad_request",
      ApiError::Domain(e) => e.kind(),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(kind = self.kind(), "request failed: {self}");
    }
    (status, Json(json!({ "error": self.to_string(), "kind": self.kind() }))).into_response()
  }
}
