//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, calendar dates as `YYYY-MM-DD`
//! (so lexical order is chronological order), money as decimal strings and
//! UUIDs as hyphenated lowercase strings. Enums use their snake_case names.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use innkeep_core::{
  booking::{Booking, GuestInfo},
  competitor::PriceObservation,
  room::{Availability, Room},
  sync::ChannelSyncEntry,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::Decode(format!("date {s:?}: {e}")))
}

pub fn encode_decimal(d: Decimal) -> String { d.normalize().to_string() }

pub fn decode_decimal(s: &str) -> Result<Decimal> {
  Decimal::from_str(s).map_err(|e| Error::Decode(format!("decimal {s:?}: {e}")))
}

/// Decode a snake_case enum column via its `strum` parser.
pub fn decode_enum<T: FromStr>(what: &str, s: &str) -> Result<T> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown {what}: {s:?}")))
}

fn decode_count(what: &str, n: i64) -> Result<u32> {
  u32::try_from(n).map_err(|_| Error::Decode(format!("{what} out of range: {n}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const ROOM_COLUMNS: &str = "id, name, category, max_occupancy, base_price, active";

/// Raw values read directly from a `rooms` row.
pub struct RawRoom {
  pub id:            i64,
  pub name:          String,
  pub category:      String,
  pub max_occupancy: i64,
  pub base_price:    String,
  pub active:        bool,
}

impl RawRoom {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      name:          row.get(1)?,
      category:      row.get(2)?,
      max_occupancy: row.get(3)?,
      base_price:    row.get(4)?,
      active:        row.get(5)?,
    })
  }

  pub fn into_room(self) -> Result<Room> {
    Ok(Room {
      id:            self.id,
      name:          self.name,
      category:      self.category,
      max_occupancy: decode_count("max_occupancy", self.max_occupancy)?,
      base_price:    decode_decimal(&self.base_price)?,
      active:        self.active,
    })
  }
}

pub const AVAILABILITY_COLUMNS: &str =
  "room_id, date, available, price, min_stay, source, last_synced_at";

/// Raw values read directly from an `availability` row.
pub struct RawAvailability {
  pub room_id:        i64,
  pub date:           String,
  pub available:      bool,
  pub price:          Option<String>,
  pub min_stay:       i64,
  pub source:         String,
  pub last_synced_at: Option<String>,
}

impl RawAvailability {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      room_id:        row.get(0)?,
      date:           row.get(1)?,
      available:      row.get(2)?,
      price:          row.get(3)?,
      min_stay:       row.get(4)?,
      source:         row.get(5)?,
      last_synced_at: row.get(6)?,
    })
  }

  pub fn into_availability(self) -> Result<Availability> {
    Ok(Availability {
      room_id:        self.room_id,
      date:           decode_date(&self.date)?,
      available:      self.available,
      price:          self.price.as_deref().map(decode_decimal).transpose()?,
      min_stay:       decode_count("min_stay", self.min_stay)?,
      source:         decode_enum("availability source", &self.source)?,
      last_synced_at: self.last_synced_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

pub const BOOKING_COLUMNS: &str = "booking_id, room_id, check_in, check_out, guests,
  guest_name, guest_email, guest_phone, total_price, status, payment_status,
  payment_ref, notes, source, created_at, updated_at";

/// Raw values read directly from a `bookings` row.
pub struct RawBooking {
  pub booking_id:     String,
  pub room_id:        i64,
  pub check_in:       String,
  pub check_out:      String,
  pub guests:         i64,
  pub guest_name:     String,
  pub guest_email:    String,
  pub guest_phone:    Option<String>,
  pub total_price:    String,
  pub status:         String,
  pub payment_status: String,
  pub payment_ref:    Option<String>,
  pub notes:          Option<String>,
  pub source:         String,
  pub created_at:     String,
  pub updated_at:     String,
}

impl RawBooking {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      booking_id:     row.get(0)?,
      room_id:        row.get(1)?,
      check_in:       row.get(2)?,
      check_out:      row.get(3)?,
      guests:         row.get(4)?,
      guest_name:     row.get(5)?,
      guest_email:    row.get(6)?,
      guest_phone:    row.get(7)?,
      total_price:    row.get(8)?,
      status:         row.get(9)?,
      payment_status: row.get(10)?,
      payment_ref:    row.get(11)?,
      notes:          row.get(12)?,
      source:         row.get(13)?,
      created_at:     row.get(14)?,
      updated_at:     row.get(15)?,
    })
  }

  pub fn into_booking(self) -> Result<Booking> {
    Ok(Booking {
      id:             decode_uuid(&self.booking_id)?,
      room_id:        self.room_id,
      check_in:       decode_date(&self.check_in)?,
      check_out:      decode_date(&self.check_out)?,
      guests:         decode_count("guests", self.guests)?,
      guest:          GuestInfo {
        name:  self.guest_name,
        email: self.guest_email,
        phone: self.guest_phone,
      },
      total_price:    decode_decimal(&self.total_price)?,
      status:         decode_enum("booking status", &self.status)?,
      payment_status: decode_enum("payment status", &self.payment_status)?,
      payment_ref:    self.payment_ref,
      notes:          self.notes,
      source:         self.source,
      created_at:     decode_dt(&self.created_at)?,
      updated_at:     decode_dt(&self.updated_at)?,
    })
  }
}

pub const OBSERVATION_COLUMNS: &str = "source, room_mapping, price, currency,
  original_price, original_currency, search_checkin, search_checkout,
  captured_at, method";

/// Raw values read directly from a `competitor_prices` row.
pub struct RawObservation {
  pub source:            String,
  pub room_mapping:      String,
  pub price:             String,
  pub currency:          String,
  pub original_price:    String,
  pub original_currency: String,
  pub search_checkin:    String,
  pub search_checkout:   String,
  pub captured_at:       String,
  pub method:            String,
}

impl RawObservation {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      source:            row.get(0)?,
      room_mapping:      row.get(1)?,
      price:             row.get(2)?,
      currency:          row.get(3)?,
      original_price:    row.get(4)?,
      original_currency: row.get(5)?,
      search_checkin:    row.get(6)?,
      search_checkout:   row.get(7)?,
      captured_at:       row.get(8)?,
      method:            row.get(9)?,
    })
  }

  pub fn into_observation(self) -> Result<PriceObservation> {
    Ok(PriceObservation {
      source:            self.source,
      room_mapping:      self.room_mapping,
      price:             decode_decimal(&self.price)?,
      currency:          self.currency,
      original_price:    decode_decimal(&self.original_price)?,
      original_currency: self.original_currency,
      search_checkin:    decode_date(&self.search_checkin)?,
      search_checkout:   decode_date(&self.search_checkout)?,
      captured_at:       decode_dt(&self.captured_at)?,
      method:            decode_enum("acquisition method", &self.method)?,
    })
  }
}

pub const SYNC_COLUMNS: &str =
  "entry_id, channel, action, booking_id, payload, status, created_at";

/// Raw values read directly from a `channel_sync_log` row.
pub struct RawSyncEntry {
  pub entry_id:   String,
  pub channel:    String,
  pub action:     String,
  pub booking_id: Option<String>,
  pub payload:    String,
  pub status:     String,
  pub created_at: String,
}

impl RawSyncEntry {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      entry_id:   row.get(0)?,
      channel:    row.get(1)?,
      action:     row.get(2)?,
      booking_id: row.get(3)?,
      payload:    row.get(4)?,
      status:     row.get(5)?,
      created_at: row.get(6)?,
    })
  }

  pub fn into_entry(self) -> Result<ChannelSyncEntry> {
    Ok(ChannelSyncEntry {
      id:         decode_uuid(&self.entry_id)?,
      channel:    self.channel,
      action:     decode_enum("sync action", &self.action)?,
      booking_id: self.booking_id.as_deref().map(decode_uuid).transpose()?,
      payload:    serde_json::from_str(&self.payload)?,
      status:     decode_enum("sync status", &self.status)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
