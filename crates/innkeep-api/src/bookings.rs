//! Handlers for `/bookings` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `POST`  | `/bookings` | Body: [`CreateBody`]; returns 201 + [`Created`] |
//! | `GET`   | `/bookings/{id}` | 404 if not found |
//! | `PATCH` | `/bookings/{id}` | Body: [`PatchBody`]; returns `{success, changes}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use innkeep_core::{
  Error as CoreError,
  booking::{Booking, BookingPatch, BookingStatus, GuestInfo, NewBooking, PaymentStatus},
  store::BookingLedger,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::ApiError, extract::ApiJson};

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub room_id:     i64,
  pub check_in:    NaiveDate,
  pub check_out:   NaiveDate,
  pub guests:      u32,
  pub guest_name:  String,
  pub guest_email: String,
  pub guest_phone: Option<String>,
  pub notes:       Option<String>,
  pub source:      Option<String>,
}

impl CreateBody {
  fn into_new_booking(self) -> Result<NewBooking, ApiError> {
    let name = self.guest_name.trim();
    let email = self.guest_email.trim();
    if name.is_empty() {
      return Err(ApiError::BadRequest("guest_name is required".into()));
    }
    if !email.contains('@') {
      return Err(ApiError::BadRequest("guest_email is not an email address".into()));
    }

    let guest = GuestInfo {
      name:  name.to_owned(),
      email: email.to_owned(),
      phone: self.guest_phone.filter(|p| !p.trim().is_empty()),
    };
    let mut booking =
      NewBooking::new(self.room_id, self.check_in, self.check_out, self.guests, guest);
    booking.notes = self.notes;
    if let Some(source) = self.source.filter(|s| !s.trim().is_empty()) {
      booking.source = source;
    }
    Ok(booking)
  }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Created {
  pub booking_id:  Uuid,
  pub total_price: Decimal,
  pub status:      BookingStatus,
}

/// `POST /bookings`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  ApiJson(body): ApiJson<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BookingLedger,
{
  let booking = store
    .create_booking(body.into_new_booking()?)
    .await
    .map_err(ApiError::domain)?;
  let created = Created {
    booking_id:  booking.id,
    total_price: booking.total_price,
    status:      booking.status,
  };
  Ok((StatusCode::CREATED, Json(created)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /bookings/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Booking>, ApiError>
where
  S: BookingLedger,
{
  let booking = store
    .get_booking(id)
    .await
    .map_err(ApiError::domain)?
    .ok_or(CoreError::NotFound(id))?;
  Ok(Json(booking))
}

// ─── Patch ───────────────────────────────────────────────────────────────────

/// `payment_intent_id` is the payment gateway's reference; it is recorded as
/// the booking's `payment_ref`.
#[derive(Debug, Deserialize)]
pub struct PatchBody {
  pub status:            Option<BookingStatus>,
  pub payment_status:    Option<PaymentStatus>,
  pub payment_intent_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Patched {
  pub success: bool,
  pub changes: usize,
}

/// `PATCH /bookings/{id}`
pub async fn patch<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  ApiJson(body): ApiJson<PatchBody>,
) -> Result<Json<Patched>, ApiError>
where
  S: BookingLedger,
{
  let patch = BookingPatch {
    status:         body.status,
    payment_status: body.payment_status,
    payment_ref:    body.payment_intent_id,
  };
  let changes = store.update_booking(id, patch).await.map_err(ApiError::domain)?;
  Ok(Json(Patched { success: true, changes }))
}
