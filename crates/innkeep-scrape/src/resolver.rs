//! Direct scrape first, paid API second.
//!
//! For one cell the resolver tries the adapter registered for the
//! competitor's host. An error, a timeout, an empty result or an
//! unconvertible currency all count as a failed attempt and hand over to
//! the fallback adapter, whose observations are tagged `api_fallback`.

use std::{collections::HashSet, sync::Arc, time::Duration};

use chrono::Utc;
use innkeep_core::{
  Error as CoreError, Result,
  competitor::{AcquisitionMethod, PriceObservation},
};
use tokio::sync::RwLock;

use crate::{
  adapter::{Quote, Search, SourceAdapter},
  currency::CurrencyConverter,
  error::adapter_failure,
  politeness::Politeness,
  registry::{AdapterRegistry, host_of},
  window::Cell,
};

/// What happened to one cell.
#[derive(Debug)]
pub enum Resolution {
  Resolved {
    method:       AcquisitionMethod,
    observations: Vec<PriceObservation>,
  },
  /// Every available method was tried and failed; holds the last error.
  Failed(CoreError),
  /// No direct adapter matches the host and no fallback is configured.
  Skipped,
}

/// Closes the adapters of one run. Dropping the guard without calling
/// [`CloseGuard::close`] (a panic, or the run future being dropped) hands the
/// remaining adapters to a background task that closes them.
#[must_use = "dropping the guard closes the adapters immediately"]
pub struct CloseGuard {
  adapters: Vec<Arc<dyn SourceAdapter>>,
}

impl CloseGuard {
  pub async fn close(mut self) {
    while let Some(adapter) = self.adapters.pop() {
      adapter.close().await;
    }
  }
}

impl Drop for CloseGuard {
  fn drop(&mut self) {
    if self.adapters.is_empty() {
      return;
    }
    let adapters = std::mem::take(&mut self.adapters);
    match tokio::runtime::Handle::try_current() {
      Ok(handle) => {
        tracing::warn!(adapters = adapters.len(), "run ended early, closing adapters");
        handle.spawn(async move {
          for adapter in adapters {
            adapter.close().await;
          }
        });
      }
      Err(_) => tracing::error!(adapters = adapters.len(), "no runtime left to close adapters"),
    }
  }
}

pub struct FallbackResolver {
  registry:        AdapterRegistry,
  fallback:        Option<Arc<dyn SourceAdapter>>,
  converter:       CurrencyConverter,
  attempt_timeout: Duration,
  /// Adapters whose `initialize` failed this run.
  unavailable:     RwLock<HashSet<String>>,
}

impl FallbackResolver {
  pub fn new(
    registry: AdapterRegistry,
    converter: CurrencyConverter,
    attempt_timeout: Duration,
  ) -> Self {
    Self {
      registry,
      fallback: None,
      converter,
      attempt_timeout,
      unavailable: RwLock::new(HashSet::new()),
    }
  }

  pub fn with_fallback(mut self, adapter: Arc<dyn SourceAdapter>) -> Self {
    self.fallback = Some(adapter);
    self
  }

  fn all_adapters(&self) -> Vec<Arc<dyn SourceAdapter>> {
    let mut adapters = self.registry.adapters();
    adapters.extend(self.fallback.clone());
    adapters
  }

  /// Initialize every adapter. One that fails is logged and left out of
  /// this run.
  pub async fn initialize(&self) {
    let mut unavailable = self.unavailable.write().await;
    unavailable.clear();
    for adapter in self.all_adapters() {
      if let Err(e) = adapter.initialize().await {
        tracing::warn!(adapter = adapter.name(), error = %e, "adapter unavailable for this run");
        unavailable.insert(adapter.name().to_owned());
      }
    }
  }

  /// Initialize every adapter and return the guard that closes them all,
  /// including ones that failed to initialize.
  pub async fn open(&self) -> CloseGuard {
    let guard = CloseGuard {
      adapters: self.all_adapters(),
    };
    self.initialize().await;
    guard
  }

  /// Turn quotes into observations in the base currency. A listing with
  /// several rooms is recorded per room as `"<mapping> / <room name>"`.
  /// Quotes that land on the same mapping keep only the cheapest, so each
  /// returned observation is one stored row.
  fn observe(
    &self,
    adapter: &str,
    search: &Search<'_>,
    quotes: Vec<Quote>,
    method: AcquisitionMethod,
  ) -> Result<Vec<PriceObservation>> {
    let multi_room = quotes.len() > 1;
    let captured_at = Utc::now();

    let observations = quotes
      .into_iter()
      .map(|quote| {
        let price = self
          .converter
          .convert(quote.amount, &quote.currency)
          .ok_or_else(|| adapter_failure(adapter, format!("no rate for {}", quote.currency)))?;
        let room_mapping = match &quote.category {
          Some(category) if multi_room => {
            format!("{} / {category}", search.competitor.room_mapping)
          }
          _ => search.competitor.room_mapping.clone(),
        };
        Ok(PriceObservation {
          source: search.competitor.name.clone(),
          room_mapping,
          price,
          currency: self.converter.base().to_owned(),
          original_price: quote.amount,
          original_currency: quote.currency.to_uppercase(),
          search_checkin: search.window.check_in(),
          search_checkout: search.window.check_out(),
          captured_at,
          method,
        })
      })
      .collect::<Result<Vec<_>>>()?;

    let mut kept: Vec<PriceObservation> = Vec::with_capacity(observations.len());
    for observation in observations {
      match kept.iter_mut().find(|k| k.room_mapping == observation.room_mapping) {
        Some(existing) if existing.price <= observation.price => {}
        Some(existing) => *existing = observation,
        None => kept.push(observation),
      }
    }
    Ok(kept)
  }

  async fn attempt(
    &self,
    adapter: &dyn SourceAdapter,
    search: &Search<'_>,
    method: AcquisitionMethod,
  ) -> Result<Vec<PriceObservation>> {
    let name = adapter.name();
    let quotes = tokio::time::timeout(self.attempt_timeout, adapter.fetch(search))
      .await
      .map_err(|_| CoreError::AdapterTimeout {
        adapter: name.to_owned(),
        after:   self.attempt_timeout,
      })??;
    if quotes.is_empty() {
      return Err(adapter_failure(name, "no prices found"));
    }
    self.observe(name, search, quotes, method)
  }

  /// Resolve one cell, pacing each request through `pace`.
  pub async fn resolve(&self, cell: &Cell<'_>, guests: u32, pace: &Politeness) -> Resolution {
    let search = Search {
      competitor: cell.competitor,
      window: cell.window,
      guests,
    };
    let url = search.url();

    let (direct, fallback) = {
      let unavailable = self.unavailable.read().await;
      let usable = |adapter: &Arc<dyn SourceAdapter>| !unavailable.contains(adapter.name());
      (
        self.registry.for_url(&url).filter(usable),
        self.fallback.clone().filter(usable),
      )
    };
    if direct.is_none() && fallback.is_none() {
      return Resolution::Skipped;
    }

    let mut last_error = None;

    if let Some(adapter) = direct {
      let host = host_of(&url);
      if let Some(host) = &host {
        pace.wait(host).await;
      }
      let outcome = self.attempt(adapter.as_ref(), &search, AcquisitionMethod::DirectScrape).await;
      if let Some(host) = &host {
        pace.done(host).await;
      }
      match outcome {
        Ok(observations) => {
          return Resolution::Resolved {
            method: AcquisitionMethod::DirectScrape,
            observations,
          };
        }
        Err(e) => {
          tracing::info!(
            competitor = %search.competitor.name,
            check_in = %search.window.check_in(),
            adapter = adapter.name(),
            error = %e,
            "direct scrape failed"
          );
          last_error = Some(e);
        }
      }
    }

    if let Some(adapter) = fallback {
      pace.wait(adapter.name()).await;
      let outcome = self.attempt(adapter.as_ref(), &search, AcquisitionMethod::ApiFallback).await;
      pace.done(adapter.name()).await;
      match outcome {
        Ok(observations) => {
          return Resolution::Resolved {
            method: AcquisitionMethod::ApiFallback,
            observations,
          };
        }
        Err(e) => last_error = Some(e),
      }
    }

    Resolution::Failed(last_error.unwrap_or_else(|| adapter_failure("resolver", "no attempt made")))
  }
}
