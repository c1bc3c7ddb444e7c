//! Channel sync log: the write-once audit trail of state changes that an
//! external channel manager must later be told about.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

/// The channel name used for changes originating in this system.
pub const LOCAL_CHANNEL: &str = "direct";

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SyncAction {
  BookingCreated,
  BookingUpdated,
  BookingStatusChanged,
  BookingCancelled,
  AvailabilityUpdated,
  RoomUpdated,
}

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
pub enum SyncStatus {
  /// Recorded locally, not yet pushed to the channel manager.
  #[default]
  Pending,
  Synced,
  Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSyncEntry {
  pub id:         Uuid,
  pub channel:    String,
  pub action:     SyncAction,
  pub booking_id: Option<Uuid>,
  pub payload:    serde_json::Value,
  pub status:     SyncStatus,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::ChannelSyncLog::append`].
#[derive(Debug, Clone)]
pub struct NewSyncEntry {
  pub channel:    String,
  pub action:     SyncAction,
  pub booking_id: Option<Uuid>,
  pub payload:    serde_json::Value,
}

impl NewSyncEntry {
  pub fn local(action: SyncAction, booking_id: Option<Uuid>, payload: serde_json::Value) -> Self {
    Self {
      channel: LOCAL_CHANNEL.to_owned(),
      action,
      booking_id,
      payload,
    }
  }
}
