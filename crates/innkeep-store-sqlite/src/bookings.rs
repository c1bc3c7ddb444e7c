//! Booking transaction manager.
//!
//! `create_booking` re-checks the room inside the same `IMMEDIATE`
//! transaction that inserts the booking, so no other writer can commit an
//! overlapping booking between the check and the insert.

use chrono::Utc;
use innkeep_core::{
  Error as CoreError, StayRange,
  booking::{
    Booking, BookingPatch, BookingStatus, NewBooking, PaymentStatus, check_status_transition,
  },
  store::BookingLedger,
  sync::{NewSyncEntry, SyncAction},
};
use rusqlite::{Connection, OptionalExtension as _, TransactionBehavior};
use serde_json::json;
use uuid::Uuid;

use crate::{
  Error, Result, SqliteStore,
  encode::{BOOKING_COLUMNS, RawBooking, encode_date, encode_decimal, encode_dt, encode_uuid},
  inventory::{is_bookable, load_active_room, stay_price},
  sync_log::append_entry,
};

fn load_booking(conn: &Connection, id: Uuid) -> Result<Option<Booking>> {
  let raw = conn
    .query_row(
      &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE booking_id = ?1"),
      rusqlite::params![encode_uuid(id)],
      RawBooking::from_row,
    )
    .optional()?;
  raw.map(RawBooking::into_booking).transpose()
}

fn write_status(conn: &Connection, booking: &Booking) -> Result<usize> {
  Ok(conn.execute(
    "UPDATE bookings
     SET status = ?2, payment_status = ?3, payment_ref = ?4, updated_at = ?5
     WHERE booking_id = ?1",
    rusqlite::params![
      encode_uuid(booking.id),
      booking.status.as_ref(),
      booking.payment_status.as_ref(),
      booking.payment_ref,
      encode_dt(booking.updated_at),
    ],
  )?)
}

fn insert_booking(conn: &mut Connection, input: NewBooking) -> Result<Booking> {
  let stay = StayRange::new(input.check_in, input.check_out)?;
  if input.guests == 0 {
    return Err(CoreError::InvalidRange("at least one guest is required".into()).into());
  }

  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  let room = load_active_room(&tx, input.room_id)?;
  if input.guests > room.max_occupancy {
    return Err(
      CoreError::CapacityExceeded {
        room_id:   room.id,
        max:       room.max_occupancy,
        requested: input.guests,
      }
      .into(),
    );
  }
  if !is_bookable(&tx, &room, &stay)? {
    return Err(CoreError::RoomUnavailable(room.id).into());
  }

  let now = Utc::now();
  let booking = Booking {
    id:             Uuid::new_v4(),
    room_id:        room.id,
    check_in:       stay.check_in(),
    check_out:      stay.check_out(),
    guests:         input.guests,
    guest:          input.guest,
    total_price:    stay_price(&tx, &room, &stay)?,
    status:         BookingStatus::Pending,
    payment_status: PaymentStatus::Unpaid,
    payment_ref:    None,
    notes:          input.notes,
    source:         input.source,
    created_at:     now,
    updated_at:     now,
  };

  tx.execute(
    "INSERT INTO bookings (
       booking_id, room_id, check_in, check_out, guests,
       guest_name, guest_email, guest_phone, total_price, status,
       payment_status, payment_ref, notes, source, created_at, updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
    rusqlite::params![
      encode_uuid(booking.id),
      booking.room_id,
      encode_date(booking.check_in),
      encode_date(booking.check_out),
      booking.guests,
      booking.guest.name,
      booking.guest.email,
      booking.guest.phone,
      encode_decimal(booking.total_price),
      booking.status.as_ref(),
      booking.payment_status.as_ref(),
      booking.payment_ref,
      booking.notes,
      booking.source,
      encode_dt(booking.created_at),
      encode_dt(booking.updated_at),
    ],
  )?;

  append_entry(
    &tx,
    NewSyncEntry::local(
      SyncAction::BookingCreated,
      Some(booking.id),
      json!({
        "room_id":     booking.room_id,
        "check_in":    booking.check_in,
        "check_out":   booking.check_out,
        "guests":      booking.guests,
        "total_price": booking.total_price,
        "source":      booking.source,
      }),
    ),
  )?;

  tx.commit()?;
  Ok(booking)
}

fn patch_booking(conn: &mut Connection, id: Uuid, patch: BookingPatch) -> Result<usize> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  let current = load_booking(&tx, id)?.ok_or(CoreError::NotFound(id))?;
  let mut next = patch.apply_to(&current)?;
  if next == current {
    return Ok(0);
  }
  next.updated_at = Utc::now();

  let changes = write_status(&tx, &next)?;
  append_entry(
    &tx,
    NewSyncEntry::local(
      SyncAction::BookingUpdated,
      Some(id),
      json!({
        "status":         next.status,
        "payment_status": next.payment_status,
        "payment_ref":    next.payment_ref,
      }),
    ),
  )?;

  tx.commit()?;
  Ok(changes)
}

fn move_status(conn: &mut Connection, id: Uuid, to: BookingStatus) -> Result<Booking> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  let current = load_booking(&tx, id)?.ok_or(CoreError::NotFound(id))?;
  check_status_transition(current.status, to, current.payment_status)?;

  let next = Booking {
    status: to,
    updated_at: Utc::now(),
    ..current.clone()
  };
  write_status(&tx, &next)?;

  let action = if to == BookingStatus::Cancelled {
    SyncAction::BookingCancelled
  } else {
    SyncAction::BookingStatusChanged
  };
  append_entry(
    &tx,
    NewSyncEntry::local(action, Some(id), json!({ "from": current.status, "to": to })),
  )?;

  tx.commit()?;
  Ok(next)
}

// ─── BookingLedger impl ──────────────────────────────────────────────────────

impl BookingLedger for SqliteStore {
  type Error = Error;

  async fn create_booking(&self, input: NewBooking) -> Result<Booking> {
    let room_id = input.room_id;
    match self.with_conn(move |conn| insert_booking(conn, input)).await {
      Ok(booking) => {
        tracing::info!(
          booking_id = %booking.id,
          room_id,
          check_in = %booking.check_in,
          check_out = %booking.check_out,
          total = %booking.total_price,
          "booking created"
        );
        Ok(booking)
      }
      Err(Error::Core(reason)) => {
        tracing::info!(room_id, kind = reason.kind(), "booking rejected: {reason}");
        Err(Error::Core(reason))
      }
      Err(e) => Err(e),
    }
  }

  async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>> {
    self.with_conn(move |conn| load_booking(conn, id)).await
  }

  async fn list_bookings(&self, room_id: Option<i64>) -> Result<Vec<Booking>> {
    let raws: Vec<RawBooking> = self
      .with_conn(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {BOOKING_COLUMNS} FROM bookings
           WHERE (?1 IS NULL OR room_id = ?1)
           ORDER BY created_at DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![room_id], RawBooking::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBooking::into_booking).collect()
  }

  async fn update_booking(&self, id: Uuid, patch: BookingPatch) -> Result<usize> {
    let changes = self.with_conn(move |conn| patch_booking(conn, id, patch)).await?;
    tracing::info!(booking_id = %id, changes, "booking updated");
    Ok(changes)
  }

  async fn transition_status(&self, id: Uuid, next: BookingStatus) -> Result<Booking> {
    let booking = self.with_conn(move |conn| move_status(conn, id, next)).await?;
    tracing::info!(booking_id = %id, status = %booking.status, "booking status changed");
    Ok(booking)
  }
}
