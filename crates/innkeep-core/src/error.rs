//! The error taxonomy shared by every Innkeep crate.

use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid range: {0}")]
  InvalidRange(String),

  #[error("room not found: {0}")]
  RoomNotFound(i64),

  #[error("room {0} is not available for the requested dates")]
  RoomUnavailable(i64),

  #[error("room {room_id} sleeps at most {max} guests, {requested} requested")]
  CapacityExceeded {
    room_id:   i64,
    max:       u32,
    requested: u32,
  },

  #[error("cannot move from {from} to {to}: {reason}")]
  InvalidTransition {
    from:   String,
    to:     String,
    reason: String,
  },

  #[error("booking not found: {0}")]
  NotFound(Uuid),

  #[error("adapter {adapter} failed: {message}")]
  AdapterFailure { adapter: String, message: String },

  #[error("adapter {adapter} timed out after {after:?}")]
  AdapterTimeout { adapter: String, after: Duration },

  #[error("store unavailable: {0}")]
  StoreUnavailable(String),
}

impl Error {
  /// Stable machine-readable name, used in API error bodies and logs.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::InvalidRange(_) => "invalid_range",
      Self::RoomNotFound(_) => "room_not_found",
      Self::RoomUnavailable(_) => "room_unavailable",
      Self::CapacityExceeded { .. } => "capacity_exceeded",
      Self::InvalidTransition { .. } => "invalid_transition",
      Self::NotFound(_) => "not_found",
      Self::AdapterFailure { .. } => "adapter_failure",
      Self::AdapterTimeout { .. } => "adapter_timeout",
      Self::StoreUnavailable(_) => "store_unavailable",
    }
  }

  /// Scrape-local failures are counted and skipped rather than propagated.
  pub fn is_soft(&self) -> bool {
    matches!(self, Self::AdapterFailure { .. } | Self::AdapterTimeout { .. })
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
