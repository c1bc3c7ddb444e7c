//! Bookings and the two state machines that govern them.
//!
//! Booking status moves `pending → confirmed → completed`, with `cancelled`
//! reachable from either of the first two. Payment status moves
//! `unpaid → paid → refunded` independently, except that a booking cannot be
//! completed while still unpaid.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result, StayRange};

// ─── Status machines ─────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BookingStatus {
  #[default]
  Pending,
  Confirmed,
  Completed,
  Cancelled,
}

impl BookingStatus {
  pub fn can_transition_to(self, next: Self) -> bool {
    use BookingStatus::*;
    matches!(
      (self, next),
      (Pending, Confirmed)
        | (Confirmed, Completed)
        | (Pending, Cancelled)
        | (Confirmed, Cancelled)
    )
  }

  pub fn is_terminal(self) -> bool {
    matches!(self, Self::Completed | Self::Cancelled)
  }

  /// Whether a booking in this status occupies its nights.
  pub fn holds_inventory(self) -> bool { !matches!(self, Self::Cancelled) }
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentStatus {
  #[default]
  Unpaid,
  Paid,
  Refunded,
}

impl PaymentStatus {
  pub fn can_transition_to(self, next: Self) -> bool {
    use PaymentStatus::*;
    matches!((self, next), (Unpaid, Paid) | (Paid, Refunded))
  }
}

/// Validate a booking-status move given the payment status the booking will
/// have once the change is applied.
pub fn check_status_transition(
  from: BookingStatus,
  to: BookingStatus,
  payment: PaymentStatus,
) -> Result<()> {
  if !from.can_transition_to(to) {
    let reason = if from.is_terminal() {
      format!("{from} is terminal")
    } else {
      "not an allowed status change".to_owned()
    };
    return Err(Error::InvalidTransition {
      from: from.to_string(),
      to: to.to_string(),
      reason,
    });
  }
  if to == BookingStatus::Completed && payment == PaymentStatus::Unpaid {
    return Err(Error::InvalidTransition {
      from: from.to_string(),
      to: to.to_string(),
      reason: "booking is still unpaid".to_owned(),
    });
  }
  Ok(())
}

pub fn check_payment_transition(from: PaymentStatus, to: PaymentStatus) -> Result<()> {
  if from.can_transition_to(to) {
    Ok(())
  } else {
    Err(Error::InvalidTransition {
      from: from.to_string(),
      to: to.to_string(),
      reason: "not an allowed payment change".to_owned(),
    })
  }
}

// ─── Booking ─────────────────────────────────────────────────────────────────

/// Contact details captured with a reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestInfo {
  pub name:  String,
  pub email: String,
  pub phone: Option<String>,
}

/// A reservation. Rows are never deleted; cancellation is a status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
  pub id:             Uuid,
  pub room_id:        i64,
  pub check_in:       NaiveDate,
  pub check_out:      NaiveDate,
  pub guests:         u32,
  pub guest:          GuestInfo,
  /// Computed by the store at commit time; never accepted from callers.
  pub total_price:    Decimal,
  pub status:         BookingStatus,
  pub payment_status: PaymentStatus,
  pub payment_ref:    Option<String>,
  pub notes:          Option<String>,
  /// Where the reservation came from, e.g. `website` or a channel name.
  pub source:         String,
  pub created_at:     DateTime<Utc>,
  pub updated_at:     DateTime<Utc>,
}

impl Booking {
  pub fn stay(&self) -> Result<StayRange> { StayRange::new(self.check_in, self.check_out) }
}

/// Input to [`crate::store::BookingLedger::create_booking`].
#[derive(Debug, Clone)]
pub struct NewBooking {
  pub room_id:   i64,
  pub check_in:  NaiveDate,
  pub check_out: NaiveDate,
  pub guests:    u32,
  pub guest:     GuestInfo,
  pub notes:     Option<String>,
  pub source:    String,
}

impl NewBooking {
  pub const DEFAULT_SOURCE: &'static str = "website";

  pub fn new(
    room_id: i64,
    check_in: NaiveDate,
    check_out: NaiveDate,
    guests: u32,
    guest: GuestInfo,
  ) -> Self {
    Self {
      room_id,
      check_in,
      check_out,
      guests,
      guest,
      notes: None,
      source: Self::DEFAULT_SOURCE.to_owned(),
    }
  }
}

/// Partial update accepted by [`crate::store::BookingLedger::update_booking`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingPatch {
  pub status:         Option<BookingStatus>,
  pub payment_status: Option<PaymentStatus>,
  pub payment_ref:    Option<String>,
}

impl BookingPatch {
  pub fn is_empty(&self) -> bool {
    self.status.is_none() && self.payment_status.is_none() && self.payment_ref.is_none()
  }

  /// Check the patch against `current` and return the booking as it would be
  /// stored. Fields equal to the current value are not treated as moves.
  pub fn apply_to(&self, current: &Booking) -> Result<Booking> {
    let mut next = current.clone();

    if let Some(payment) = self.payment_status
      && payment != current.payment_status
    {
      check_payment_transition(current.payment_status, payment)?;
      next.payment_status = payment;
    }

    if let Some(status) = self.status
      && status != current.status
    {
      check_status_transition(current.status, status, next.payment_status)?;
      next.status = status;
    }

    if let Some(reference) = &self.payment_ref {
      next.payment_ref = Some(reference.clone());
    }

    Ok(next)
  }
}
