//! Host-suffix dispatch from a competitor URL to its direct-scrape adapter.

use std::sync::Arc;

use url::Url;

use crate::adapter::SourceAdapter;

/// The lowercased host of `url`, if it parses.
pub fn host_of(url: &str) -> Option<String> {
  Url::parse(url)
    .ok()
    .and_then(|u| u.host_str().map(str::to_lowercase))
}

fn host_matches(host: &str, suffix: &str) -> bool {
  host == suffix
    || host
      .strip_suffix(suffix)
      .is_some_and(|prefix| prefix.ends_with('.'))
}

#[derive(Default, Clone)]
pub struct AdapterRegistry {
  entries: Vec<(String, Arc<dyn SourceAdapter>)>,
}

impl AdapterRegistry {
  pub fn new() -> Self { Self::default() }

  /// Route hosts equal to or ending in `.{suffix}` to `adapter`. Later
  /// registrations for the same suffix take precedence.
  pub fn register(&mut self, suffix: &str, adapter: Arc<dyn SourceAdapter>) -> &mut Self {
    self.entries.push((suffix.to_lowercase(), adapter));
    self
  }

  /// The adapter for the host of `url`. The longest matching suffix wins.
  pub fn for_url(&self, url: &str) -> Option<Arc<dyn SourceAdapter>> {
    let host = host_of(url)?;
    self
      .entries
      .iter()
      .filter(|(suffix, _)| host_matches(&host, suffix))
      .max_by_key(|(suffix, _)| suffix.len())
      .map(|(_, adapter)| adapter.clone())
  }

  /// Every distinct adapter, each once, in registration order.
  pub fn adapters(&self) -> Vec<Arc<dyn SourceAdapter>> {
    let mut unique: Vec<Arc<dyn SourceAdapter>> = Vec::new();
    for (_, adapter) in &self.entries {
      if !unique.iter().any(|seen| Arc::ptr_eq(seen, adapter)) {
        unique.push(adapter.clone());
      }
    }
    unique
  }
}

#[cfg(test)]
mod tests {
  use async_trait::async_trait;
  use innkeep_core::Result;

  use super::*;
  use crate::adapter::{Quote, Search};

  struct Named(&'static str);

  #[async_trait]
  impl SourceAdapter for Named {
    fn name(&self) -> &str { self.0 }

    async fn fetch(&self, _: &Search<'_>) -> Result<Vec<Quote>> { Ok(Vec::new()) }
  }

  fn registry() -> AdapterRegistry {
    let mut registry = AdapterRegistry::new();
    registry
      .register("booking.com", Arc::new(Named("booking")))
      .register("airbnb.com", Arc::new(Named("airbnb")))
      .register("secure.booking.com", Arc::new(Named("secure")));
    registry
  }

  fn name_for(registry: &AdapterRegistry, url: &str) -> Option<String> {
    registry.for_url(url).map(|a| a.name().to_owned())
  }

  #[test]
  fn dispatches_by_host_suffix() {
    let r = registry();
    assert_eq!(name_for(&r, "https://www.booking.com/hotel/dk/x.html").as_deref(), Some("booking"));
    assert_eq!(name_for(&r, "https://AIRBNB.com/rooms/1").as_deref(), Some("airbnb"));
    assert_eq!(name_for(&r, "https://secure.booking.com/book").as_deref(), Some("secure"));
  }

  #[test]
  fn unknown_or_lookalike_hosts_have_no_adapter() {
    let r = registry();
    assert!(r.for_url("https://www.expedia.com/h1").is_none());
    assert!(r.for_url("https://notbooking.com/h1").is_none());
    assert!(r.for_url("not a url").is_none());
  }

  #[test]
  fn shared_adapters_are_listed_once() {
    let shared: Arc<dyn SourceAdapter> = Arc::new(Named("airbnb"));
    let mut r = AdapterRegistry::new();
    r.register("airbnb.com", shared.clone()).register("airbnb.dk", shared);
    assert_eq!(r.adapters().len(), 1);
  }
}
