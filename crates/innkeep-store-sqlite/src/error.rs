//! Error type for `innkeep-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A domain rule rejected the operation; nothing was written.
  #[error(transparent)]
  Core(#[from] innkeep_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  /// A stored column could not be decoded into its domain type.
  #[error("decode error: {0}")]
  Decode(String),
}

impl From<Error> for innkeep_core::Error {
  fn from(err: Error) -> Self {
    match err {
      Error::Core(core) => core,
      other => innkeep_core::Error::StoreUnavailable(other.to_string()),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
