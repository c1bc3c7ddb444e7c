use thiserror::Error;

/// Errors that abort a scrape run. Per-cell adapter failures never surface
/// here; they are counted in the run summary instead.
#[derive(Debug, Error)]
pub enum Error {
  #[error("a scrape run is already in progress")]
  AlreadyRunning,

  #[error("failed to build HTTP client: {0}")]
  Client(#[from] reqwest::Error),

  #[error(transparent)]
  Core(#[from] innkeep_core::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Shorthand for an [`innkeep_core::Error::AdapterFailure`].
pub(crate) fn adapter_failure(
  adapter: &str,
  message: impl std::fmt::Display,
) -> innkeep_core::Error {
  innkeep_core::Error::AdapterFailure {
    adapter: adapter.to_owned(),
    message: message.to_string(),
  }
}
