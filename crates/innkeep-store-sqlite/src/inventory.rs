//! Inventory ledger: rooms, per-night availability and stay pricing.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use innkeep_core::{
  Error as CoreError, StayRange,
  booking::BookingStatus,
  room::{
    Availability, AvailabilityQuery, AvailabilitySource, AvailabilityUpdate, Room, RoomPatch,
    stay_total,
  },
  store::InventoryLedger,
  sync::{NewSyncEntry, SyncAction},
};
use rusqlite::{Connection, OptionalExtension as _, TransactionBehavior};
use rust_decimal::Decimal;
use serde_json::json;

use crate::{
  Error, Result, SqliteStore,
  encode::{
    AVAILABILITY_COLUMNS, RawAvailability, RawRoom, ROOM_COLUMNS, encode_date, encode_decimal,
    encode_dt,
  },
  sync_log::append_entry,
};

// ─── Connection-level helpers ────────────────────────────────────────────────
//
// These take a plain `&Connection` so the booking transaction can reuse them
// between its re-check and its insert.

pub(crate) fn load_room(conn: &Connection, id: i64) -> Result<Option<Room>> {
  let raw = conn
    .query_row(
      &format!("SELECT {ROOM_COLUMNS} FROM rooms WHERE id = ?1"),
      rusqlite::params![id],
      RawRoom::from_row,
    )
    .optional()?;
  raw.map(RawRoom::into_room).transpose()
}

/// An active room, or `RoomNotFound`.
pub(crate) fn load_active_room(conn: &Connection, id: i64) -> Result<Room> {
  load_room(conn, id)?
    .filter(|room| room.active)
    .ok_or_else(|| CoreError::RoomNotFound(id).into())
}

fn load_rooms(conn: &Connection, include_inactive: bool) -> Result<Vec<Room>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {ROOM_COLUMNS} FROM rooms WHERE (?1 OR active = 1) ORDER BY id"
  ))?;
  let raws = stmt
    .query_map(rusqlite::params![include_inactive], RawRoom::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawRoom::into_room).collect()
}

fn load_availability(
  conn: &Connection,
  room_id: Option<i64>,
  range: &StayRange,
) -> Result<Vec<Availability>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {AVAILABILITY_COLUMNS} FROM availability
     WHERE (?1 IS NULL OR room_id = ?1)
       AND date >= ?2 AND date < ?3
     ORDER BY date, room_id"
  ))?;
  let raws = stmt
    .query_map(
      rusqlite::params![
        room_id,
        encode_date(range.check_in()),
        encode_date(range.check_out()),
      ],
      RawAvailability::from_row,
    )?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawAvailability::into_availability).collect()
}

/// Whether any booking that still holds inventory overlaps `range`.
pub(crate) fn has_overlapping_booking(
  conn: &Connection,
  room_id: i64,
  range: &StayRange,
) -> Result<bool> {
  let hit = conn
    .query_row(
      "SELECT 1 FROM bookings
       WHERE room_id = ?1
         AND status != ?2
         AND check_in < ?4
         AND ?3 < check_out
       LIMIT 1",
      rusqlite::params![
        room_id,
        BookingStatus::Cancelled.as_ref(),
        encode_date(range.check_in()),
        encode_date(range.check_out()),
      ],
      |_| Ok(()),
    )
    .optional()?;
  Ok(hit.is_some())
}

/// Whether `room` can be sold for every night of `stay`: no closed night, the
/// check-in night's minimum stay is met and no holding booking overlaps.
/// Occupancy is checked separately by the callers.
pub(crate) fn is_bookable(conn: &Connection, room: &Room, stay: &StayRange) -> Result<bool> {
  let records = load_availability(conn, Some(room.id), stay)?;

  if records.iter().any(|a| !a.available) {
    return Ok(false);
  }
  let min_stay = records
    .iter()
    .find(|a| a.date == stay.check_in())
    .map_or(1, |a| a.min_stay);
  if stay.nights() < min_stay {
    return Ok(false);
  }

  Ok(!has_overlapping_booking(conn, room.id, stay)?)
}

pub(crate) fn stay_price(conn: &Connection, room: &Room, stay: &StayRange) -> Result<Decimal> {
  let overrides: HashMap<NaiveDate, Decimal> = load_availability(conn, Some(room.id), stay)?
    .into_iter()
    .filter_map(|a| a.price.map(|p| (a.date, p)))
    .collect();
  Ok(stay_total(room.base_price, stay.dates().map(|night| overrides.get(&night))))
}

fn load_night(conn: &Connection, room_id: i64, date: NaiveDate) -> Result<Option<Availability>> {
  let raw = conn
    .query_row(
      &format!("SELECT {AVAILABILITY_COLUMNS} FROM availability WHERE room_id = ?1 AND date = ?2"),
      rusqlite::params![room_id, encode_date(date)],
      RawAvailability::from_row,
    )
    .optional()?;
  raw.map(RawAvailability::into_availability).transpose()
}

fn upsert_night(conn: &mut Connection, update: AvailabilityUpdate) -> Result<Availability> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  if load_room(&tx, update.room_id)?.is_none() {
    return Err(CoreError::RoomNotFound(update.room_id).into());
  }
  let before = load_night(&tx, update.room_id, update.date)?;

  let synced_at = (update.source == AvailabilitySource::Synced).then(|| encode_dt(Utc::now()));
  tx.execute(
    "INSERT INTO availability
       (room_id, date, available, price, min_stay, source, last_synced_at)
     VALUES (?1, ?2, ?3, ?4, COALESCE(?5, 1), ?6, ?7)
     ON CONFLICT (room_id, date) DO UPDATE SET
       available      = excluded.available,
       price          = excluded.price,
       min_stay       = COALESCE(?5, availability.min_stay),
       source         = excluded.source,
       last_synced_at = COALESCE(excluded.last_synced_at, availability.last_synced_at)",
    rusqlite::params![
      update.room_id,
      encode_date(update.date),
      update.available,
      update.price.map(encode_decimal),
      update.min_stay,
      update.source.as_ref(),
      synced_at,
    ],
  )?;

  let after = load_night(&tx, update.room_id, update.date)?
    .ok_or_else(|| Error::Decode("availability row vanished after upsert".into()))?;

  // Repeating an identical update leaves no trace in the audit log either.
  let changed = before.as_ref().is_none_or(|b| {
    b.available != after.available || b.price != after.price || b.min_stay != after.min_stay
  });
  if changed {
    append_entry(
      &tx,
      NewSyncEntry::local(
        SyncAction::AvailabilityUpdated,
        None,
        json!({
          "room_id":   after.room_id,
          "date":      after.date,
          "available": after.available,
          "price":     after.price,
          "min_stay":  after.min_stay,
        }),
      ),
    )?;
  }

  tx.commit()?;
  Ok(after)
}

fn patch_room(conn: &mut Connection, id: i64, patch: RoomPatch) -> Result<Room> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  let mut room = load_room(&tx, id)?.ok_or(CoreError::RoomNotFound(id))?;
  if let Some(price) = patch.base_price {
    room.base_price = price;
  }
  if let Some(active) = patch.active {
    room.active = active;
  }

  tx.execute(
    "UPDATE rooms SET base_price = ?2, active = ?3 WHERE id = ?1",
    rusqlite::params![id, encode_decimal(room.base_price), room.active],
  )?;
  append_entry(
    &tx,
    NewSyncEntry::local(
      SyncAction::RoomUpdated,
      None,
      json!({ "room_id": id, "base_price": room.base_price, "active": room.active }),
    ),
  )?;

  tx.commit()?;
  Ok(room)
}

// ─── InventoryLedger impl ────────────────────────────────────────────────────

impl InventoryLedger for SqliteStore {
  type Error = Error;

  async fn list_rooms(&self, include_inactive: bool) -> Result<Vec<Room>> {
    self
      .with_conn(move |conn| load_rooms(conn, include_inactive))
      .await
  }

  async fn get_room(&self, id: i64) -> Result<Option<Room>> {
    self.with_conn(move |conn| load_room(conn, id)).await
  }

  async fn provision_room(&self, room: Room) -> Result<Room> {
    let id = room.id;
    self
      .with_conn(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO rooms (id, name, category, max_occupancy, base_price, active)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            room.id,
            room.name,
            room.category,
            room.max_occupancy,
            encode_decimal(room.base_price),
            room.active,
          ],
        )?;
        load_room(conn, id)?.ok_or_else(|| CoreError::RoomNotFound(id).into())
      })
      .await
  }

  async fn update_room(&self, id: i64, patch: RoomPatch) -> Result<Room> {
    let room = self.with_conn(move |conn| patch_room(conn, id, patch)).await?;
    tracing::info!(room_id = id, base_price = %room.base_price, active = room.active, "room updated");
    Ok(room)
  }

  async fn get_availability(
    &self,
    room_id: Option<i64>,
    start: NaiveDate,
    end: NaiveDate,
  ) -> Result<Vec<Availability>> {
    let range = StayRange::new(start, end)?;
    self
      .with_conn(move |conn| load_availability(conn, room_id, &range))
      .await
  }

  async fn check_availability(&self, query: &AvailabilityQuery) -> Result<Vec<Room>> {
    let stay = StayRange::new(query.check_in, query.check_out)?;
    if query.guests == 0 {
      return Err(CoreError::InvalidRange("at least one guest is required".into()).into());
    }
    let guests = query.guests;
    let room_filter = query.room_id;

    self
      .with_conn(move |conn| {
        let mut open = Vec::new();
        for room in load_rooms(conn, false)? {
          if room_filter.is_some_and(|id| id != room.id) || room.max_occupancy < guests {
            continue;
          }
          if is_bookable(conn, &room, &stay)? {
            open.push(room);
          }
        }
        Ok(open)
      })
      .await
  }

  async fn price_for_stay(
    &self,
    room_id: i64,
    check_in: NaiveDate,
    check_out: NaiveDate,
  ) -> Result<Decimal> {
    let stay = StayRange::new(check_in, check_out)?;
    self
      .with_conn(move |conn| {
        let room = load_active_room(conn, room_id)?;
        stay_price(conn, &room, &stay)
      })
      .await
  }

  async fn set_availability(&self, update: AvailabilityUpdate) -> Result<Availability> {
    let stored = self.with_conn(move |conn| upsert_night(conn, update)).await?;
    tracing::debug!(
      room_id = stored.room_id,
      date = %stored.date,
      available = stored.available,
      "availability set"
    );
    Ok(stored)
  }
}
