//! Handlers for `/rooms` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/rooms` | Active rooms only |
//! | `GET`  | `/rooms/{id}` | 404 if unknown |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use innkeep_core::{Error as CoreError, room::Room, store::InventoryLedger};

use crate::error::ApiError;

/// `GET /rooms`
pub async fn list<S>(State(store): State<Arc<S>>) -> Result<Json<Vec<Room>>, ApiError>
where
  S: InventoryLedger,
{
  let rooms = store.list_rooms(false).await.map_err(ApiError::domain)?;
  Ok(Json(rooms))
}

/// `GET /rooms/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Room>, ApiError>
where
  S: InventoryLedger,
{
  let room = store
    .get_room(id)
    .await
    .map_err(ApiError::domain)?
    .ok_or(CoreError::RoomNotFound(id))?;
  Ok(Json(room))
}
