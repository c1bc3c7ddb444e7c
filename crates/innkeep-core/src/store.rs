//! Storage traits for the inventory, booking, price and sync-log components.
//!
//! Each trait is implemented by a storage backend (e.g.
//! `innkeep-store-sqlite`). The HTTP layer and the scrape pipeline depend on
//! these abstractions, never on a concrete backend, so they can be exercised
//! against an isolated in-memory store.
//!
//! Backend errors convert into [`crate::Error`]; domain failures keep their
//! kind and storage faults become [`crate::Error::StoreUnavailable`].

use std::future::Future;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
  booking::{Booking, BookingPatch, BookingStatus, NewBooking},
  competitor::{CompetitorConfig, PriceObservation},
  room::{Availability, AvailabilityQuery, AvailabilityUpdate, Room, RoomPatch},
  sync::{ChannelSyncEntry, NewSyncEntry},
};

// ─── Inventory ───────────────────────────────────────────────────────────────

/// The sole owner of room and availability mutation.
pub trait InventoryLedger: Send + Sync {
  type Error: std::error::Error + Send + Sync + Into<crate::Error> + 'static;

  /// Active rooms, or every room when `include_inactive` is set.
  fn list_rooms(
    &self,
    include_inactive: bool,
  ) -> impl Future<Output = Result<Vec<Room>, Self::Error>> + Send + '_;

  fn get_room(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Room>, Self::Error>> + Send + '_;

  /// Insert a room from seed data. An existing room with the same id is left
  /// untouched and returned as stored.
  fn provision_room(
    &self,
    room: Room,
  ) -> impl Future<Output = Result<Room, Self::Error>> + Send + '_;

  /// Apply an administrative price or active-flag change.
  fn update_room(
    &self,
    id: i64,
    patch: RoomPatch,
  ) -> impl Future<Output = Result<Room, Self::Error>> + Send + '_;

  /// Stored availability records with `start <= date < end`, ordered by date
  /// then room. Fails with `InvalidRange` when `end <= start`.
  fn get_availability(
    &self,
    room_id: Option<i64>,
    start: NaiveDate,
    end: NaiveDate,
  ) -> impl Future<Output = Result<Vec<Availability>, Self::Error>> + Send + '_;

  /// Active rooms that can host `query.guests` for every night of the stay.
  fn check_availability<'a>(
    &'a self,
    query: &'a AvailabilityQuery,
  ) -> impl Future<Output = Result<Vec<Room>, Self::Error>> + Send + 'a;

  /// Total for the stay: per night, the override price or the base price.
  fn price_for_stay(
    &self,
    room_id: i64,
    check_in: NaiveDate,
    check_out: NaiveDate,
  ) -> impl Future<Output = Result<Decimal, Self::Error>> + Send + '_;

  /// Upsert the `(room_id, date)` record. Idempotent.
  fn set_availability(
    &self,
    update: AvailabilityUpdate,
  ) -> impl Future<Output = Result<Availability, Self::Error>> + Send + '_;
}

// ─── Bookings ────────────────────────────────────────────────────────────────

/// The sole owner of booking mutation.
pub trait BookingLedger: Send + Sync {
  type Error: std::error::Error + Send + Sync + Into<crate::Error> + 'static;

  /// Re-validate availability and insert the booking as one atomic unit.
  ///
  /// Fails with `InvalidRange`, `RoomNotFound`, `CapacityExceeded` or
  /// `RoomUnavailable`; on failure nothing is written.
  fn create_booking(
    &self,
    input: NewBooking,
  ) -> impl Future<Output = Result<Booking, Self::Error>> + Send + '_;

  fn get_booking(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Booking>, Self::Error>> + Send + '_;

  /// All bookings, newest first, optionally for a single room.
  fn list_bookings(
    &self,
    room_id: Option<i64>,
  ) -> impl Future<Output = Result<Vec<Booking>, Self::Error>> + Send + '_;

  /// Apply a partial update and return the number of rows changed.
  fn update_booking(
    &self,
    id: Uuid,
    patch: BookingPatch,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Move a booking to `next`, enforcing the status machine.
  fn transition_status(
    &self,
    id: Uuid,
    next: BookingStatus,
  ) -> impl Future<Output = Result<Booking, Self::Error>> + Send + '_;
}

// ─── Competitor prices ───────────────────────────────────────────────────────

pub trait PriceStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + Into<crate::Error> + 'static;

  /// Insert or replace by `(source, room_mapping, search_checkin)`.
  fn save(
    &self,
    observation: PriceObservation,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete every observation and return how many were removed.
  fn purge_all(&self) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Observations for `source` whose search check-in lies in `[start, end)`.
  fn latest_for<'a>(
    &'a self,
    source: &'a str,
    start: NaiveDate,
    end: NaiveDate,
  ) -> impl Future<Output = Result<Vec<PriceObservation>, Self::Error>> + Send + 'a;

  fn list_competitors(
    &self,
    enabled_only: bool,
  ) -> impl Future<Output = Result<Vec<CompetitorConfig>, Self::Error>> + Send + '_;

  /// Insert or replace a competitor by name.
  fn upsert_competitor(
    &self,
    competitor: CompetitorConfig,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

// ─── Channel sync log ────────────────────────────────────────────────────────

pub trait ChannelSyncLog: Send + Sync {
  type Error: std::error::Error + Send + Sync + Into<crate::Error> + 'static;

  fn append(
    &self,
    entry: NewSyncEntry,
  ) -> impl Future<Output = Result<ChannelSyncEntry, Self::Error>> + Send + '_;

  /// Entries in insertion order, optionally for one booking.
  fn entries(
    &self,
    booking_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<ChannelSyncEntry>, Self::Error>> + Send + '_;
}
