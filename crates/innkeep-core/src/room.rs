//! Rooms and their per-night availability records.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

// ─── Room ────────────────────────────────────────────────────────────────────

/// A sellable room. Rooms are provisioned from seed data and are never
/// deleted; retiring a room clears its `active` flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
  pub id:            i64,
  pub name:          String,
  pub category:      String,
  pub max_occupancy: u32,
  /// Nightly price in the operator's base currency.
  pub base_price:    Decimal,
  pub active:        bool,
}

/// Administrative changes to a room. Unset fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoomPatch {
  pub base_price: Option<Decimal>,
  pub active:     Option<bool>,
}

// ─── Availability ────────────────────────────────────────────────────────────

/// Who last wrote an availability record.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AvailabilitySource {
  #[default]
  Manual,
  /// Written by a channel-manager sync.
  Synced,
}

/// The stored state of one room on one night. At most one record exists per
/// `(room_id, date)`; a missing record means "open at base price".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
  pub room_id:        i64,
  pub date:           NaiveDate,
  pub available:      bool,
  /// Replaces the room's base price for this night when set.
  pub price:          Option<Decimal>,
  /// Minimum nights for a stay that checks in on this date.
  pub min_stay:       u32,
  pub source:         AvailabilitySource,
  pub last_synced_at: Option<DateTime<Utc>>,
}

/// Input to [`crate::store::InventoryLedger::set_availability`].
#[derive(Debug, Clone)]
pub struct AvailabilityUpdate {
  pub room_id:   i64,
  pub date:      NaiveDate,
  pub available: bool,
  pub price:     Option<Decimal>,
  /// Keeps the stored value (or 1 for a new record) when unset.
  pub min_stay:  Option<u32>,
  pub source:    AvailabilitySource,
}

impl AvailabilityUpdate {
  /// A manual open/close of one night with no price override.
  pub fn new(room_id: i64, date: NaiveDate, available: bool) -> Self {
    Self {
      room_id,
      date,
      available,
      price: None,
      min_stay: None,
      source: AvailabilitySource::Manual,
    }
  }

  pub fn with_price(mut self, price: Decimal) -> Self {
    self.price = Some(price);
    self
  }
}

/// Parameters for [`crate::store::InventoryLedger::check_availability`].
#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityQuery {
  pub check_in:  NaiveDate,
  pub check_out: NaiveDate,
  pub guests:    u32,
  pub room_id:   Option<i64>,
}

/// Sum of nightly prices: the override where one is stored, otherwise the
/// base price.
pub fn stay_total<'a>(
  base_price: Decimal,
  nights: impl IntoIterator<Item = Option<&'a Decimal>>,
) -> Decimal {
  nights
    .into_iter()
    .map(|override_price| override_price.copied().unwrap_or(base_price))
    .sum()
}
