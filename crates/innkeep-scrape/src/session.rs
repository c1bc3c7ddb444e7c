//! A cookie-holding HTTP session shared by the direct-scrape adapters.
//!
//! The session is opened by the first adapter's `initialize` and dropped by
//! `close`, so cookies never outlive a run.

use std::time::Duration;

use innkeep_core::Result;
use reqwest::{
  Client,
  header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue},
};
use tokio::sync::RwLock;

use crate::error::adapter_failure;

#[derive(Debug, Clone)]
pub struct SessionConfig {
  pub user_agent:      String,
  pub request_timeout: Duration,
  pub accept_language: String,
}

impl Default for SessionConfig {
  fn default() -> Self {
    Self {
      user_agent:      "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
                        Chrome/126.0 Safari/537.36"
        .into(),
      request_timeout: Duration::from_secs(30),
      accept_language: "en-GB,en;q=0.8".into(),
    }
  }
}

#[derive(Debug)]
pub struct HttpSession {
  config: SessionConfig,
  client: RwLock<Option<Client>>,
}

impl HttpSession {
  pub fn new(config: SessionConfig) -> Self {
    Self {
      config,
      client: RwLock::new(None),
    }
  }

  /// Build the client if it is not open yet.
  pub async fn open(&self, adapter: &str) -> Result<()> {
    let mut slot = self.client.write().await;
    if slot.is_some() {
      return Ok(());
    }

    let mut headers = HeaderMap::new();
    headers.insert(
      ACCEPT,
      HeaderValue::from_static("text/html,application/xhtml+xml,application/json;q=0.9,*/*;q=0.8"),
    );
    let language = HeaderValue::from_str(&self.config.accept_language)
      .map_err(|e| adapter_failure(adapter, format!("bad accept-language: {e}")))?;
    headers.insert(ACCEPT_LANGUAGE, language);

    let client = Client::builder()
      .user_agent(&self.config.user_agent)
      .default_headers(headers)
      .cookie_store(true)
      .gzip(true)
      .timeout(self.config.request_timeout)
      .redirect(reqwest::redirect::Policy::limited(5))
      .build()
      .map_err(|e| adapter_failure(adapter, format!("cannot build HTTP client: {e}")))?;

    tracing::debug!(adapter, "http session opened");
    *slot = Some(client);
    Ok(())
  }

  pub async fn close(&self) {
    if self.client.write().await.take().is_some() {
      tracing::debug!("http session closed");
    }
  }

  pub async fn is_open(&self) -> bool { self.client.read().await.is_some() }

  /// GET `url` and return the body, failing on any non-success status.
  pub async fn get_text(&self, adapter: &str, url: &str) -> Result<String> {
    let client = self
      .client
      .read()
      .await
      .clone()
      .ok_or_else(|| adapter_failure(adapter, "session is not open"))?;

    let response = client
      .get(url)
      .send()
      .await
      .map_err(|e| adapter_failure(adapter, format!("request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
      return Err(adapter_failure(adapter, format!("HTTP {status} for {url}")));
    }

    response
      .text()
      .await
      .map_err(|e| adapter_failure(adapter, format!("failed to read body: {e}")))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn open_and_close_are_idempotent() {
    let session = HttpSession::new(SessionConfig::default());
    assert!(!session.is_open().await);

    session.open("test").await.unwrap();
    session.open("test").await.unwrap();
    assert!(session.is_open().await);

    session.close().await;
    session.close().await;
    assert!(!session.is_open().await);
  }

  #[tokio::test]
  async fn closed_session_refuses_requests() {
    let session = HttpSession::new(SessionConfig::default());
    let err = session.get_text("test", "https://example.com").await.unwrap_err();
    assert!(err.is_soft());
  }
}
