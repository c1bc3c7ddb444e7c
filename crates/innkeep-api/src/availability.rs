//! Handlers for availability endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/availability` | `?start_date&end_date`, optional `room_id` |
//! | `POST` | `/availability` | Body: [`SetBody`]; manual upsert of one night |
//! | `POST` | `/check-availability` | Body: [`AvailabilityQuery`] |

use std::sync::Arc;

use axum::{Json, extract::State};
use chrono::NaiveDate;
use innkeep_core::{
  room::{Availability, AvailabilityQuery, AvailabilityUpdate, Room},
  store::InventoryLedger,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
  error::ApiError,
  extract::{ApiJson, ApiQuery},
};

// ─── Read ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub room_id:    Option<i64>,
  pub start_date: NaiveDate,
  pub end_date:   NaiveDate,
}

/// `GET /availability?start_date=...&end_date=...[&room_id=...]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<Vec<Availability>>, ApiError>
where
  S: InventoryLedger,
{
  let records = store
    .get_availability(params.room_id, params.start_date, params.end_date)
    .await
    .map_err(ApiError::domain)?;
  Ok(Json(records))
}

// ─── Check ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CheckResponse {
  pub available: Vec<Room>,
}

/// `POST /check-availability`
pub async fn check<S>(
  State(store): State<Arc<S>>,
  ApiJson(query): ApiJson<AvailabilityQuery>,
) -> Result<Json<CheckResponse>, ApiError>
where
  S: InventoryLedger,
{
  let available = store
    .check_availability(&query)
    .await
    .map_err(ApiError::domain)?;
  Ok(Json(CheckResponse { available }))
}

// ─── Set ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SetBody {
  pub room_id:   i64,
  pub date:      NaiveDate,
  pub available: bool,
  pub price:     Option<Decimal>,
  pub min_stay:  Option<u32>,
}

/// `POST /availability`
pub async fn set<S>(
  State(store): State<Arc<S>>,
  ApiJson(body): ApiJson<SetBody>,
) -> Result<Json<Value>, ApiError>
where
  S: InventoryLedger,
{
  if body.min_stay == Some(0) {
    return Err(ApiError::BadRequest("min_stay must be at least 1".into()));
  }
  let mut update = AvailabilityUpdate::new(body.room_id, body.date, body.available);
  update.price = body.price;
  update.min_stay = body.min_stay;

  store.set_availability(update).await.map_err(ApiError::domain)?;
  Ok(Json(json!({ "success": true })))
}
