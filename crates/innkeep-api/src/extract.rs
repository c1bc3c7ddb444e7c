//! Request extractors that reject with [`ApiError`] instead of axum's
//! plain-text rejections.

use axum::{
  Json,
  extract::{FromRequest, FromRequestParts, Query, Request},
  http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// JSON request body. A missing content type or a body that does not
/// deserialize into `T` is a [`ApiError::BadRequest`].
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
  T: DeserializeOwned,
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
    let Json(value) = Json::<T>::from_request(req, state)
      .await
      .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    Ok(ApiJson(value))
  }
}

/// Query string. Parameters that do not deserialize into `T` are a
/// [`ApiError::BadRequest`].
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
  T: DeserializeOwned,
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
    let Query(value) = Query::<T>::from_request_parts(parts, state)
      .await
      .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    Ok(ApiQuery(value))
  }
}
