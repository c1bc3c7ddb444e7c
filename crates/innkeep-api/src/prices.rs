//! Handler for `GET /price-observations`, the read-only view of scraped
//! competitor prices.

use std::sync::Arc;

use axum::{Json, extract::State};
use chrono::NaiveDate;
use innkeep_core::{competitor::PriceObservation, store::PriceStore};
use serde::Deserialize;

use crate::{error::ApiError, extract::ApiQuery};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub source:     String,
  pub start_date: NaiveDate,
  pub end_date:   NaiveDate,
}

/// `GET /price-observations?source=...&start_date=...&end_date=...`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<Vec<PriceObservation>>, ApiError>
where
  S: PriceStore,
{
  let observations = store
    .latest_for(&params.source, params.start_date, params.end_date)
    .await
    .map_err(ApiError::domain)?;
  Ok(Json(observations))
}
