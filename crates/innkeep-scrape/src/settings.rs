//! Deserializable pipeline settings and the wiring that turns them into an
//! orchestrator.

use std::{collections::HashMap, sync::Arc, time::Duration};

use innkeep_core::store::PriceStore;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
  Result,
  api_fallback::{self, SerpApi},
  currency::CurrencyConverter,
  orchestrator::ScrapeOrchestrator,
  politeness::Politeness,
  registry::AdapterRegistry,
  resolver::FallbackResolver,
  session::{HttpSession, SessionConfig},
  sites,
  window::WindowPlan,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScrapeSettings {
  /// Minimum seconds between two requests to the same host.
  pub politeness_secs:      u64,
  /// Wall-clock limit for one competitor × window cell.
  pub cell_timeout_secs:    u64,
  /// Limit for a single adapter attempt.
  pub adapter_timeout_secs: u64,
  pub default_guests:       u32,
  pub user_agent:           Option<String>,
  pub accept_language:      Option<String>,
  /// Base-currency units per one unit of each foreign currency.
  pub rates:                HashMap<String, Decimal>,
  pub serpapi_key:          Option<String>,
  pub serpapi_endpoint:     String,
  pub windows:              WindowPlan,
}

impl Default for ScrapeSettings {
  fn default() -> Self {
    Self {
      politeness_secs:      5,
      cell_timeout_secs:    90,
      adapter_timeout_secs: 30,
      default_guests:       2,
      user_agent:           None,
      accept_language:      None,
      rates:                HashMap::new(),
      serpapi_key:          None,
      serpapi_endpoint:     api_fallback::DEFAULT_ENDPOINT.to_owned(),
      windows:              WindowPlan::default(),
    }
  }
}

impl ScrapeSettings {
  fn session_config(&self) -> SessionConfig {
    let defaults = SessionConfig::default();
    SessionConfig {
      user_agent:      self.user_agent.clone().unwrap_or(defaults.user_agent),
      request_timeout: Duration::from_secs(self.adapter_timeout_secs),
      accept_language: self.accept_language.clone().unwrap_or(defaults.accept_language),
    }
  }

  /// The built-in site adapters, plus the SerpApi fallback when a key is
  /// configured.
  pub fn build_resolver(&self, base_currency: &str) -> Result<FallbackResolver> {
    let session = Arc::new(HttpSession::new(self.session_config()));
    let mut registry = AdapterRegistry::new();
    for (suffix, adapter) in sites::builtin(session) {
      registry.register(suffix, adapter);
    }

    let resolver = FallbackResolver::new(
      registry,
      CurrencyConverter::new(base_currency, self.rates.clone()),
      Duration::from_secs(self.adapter_timeout_secs),
    );

    match self.serpapi_key.as_deref().filter(|k| !k.is_empty()) {
      Some(key) => {
        tracing::info!("API fallback enabled");
        let api = SerpApi::new(
          &self.serpapi_endpoint,
          key,
          base_currency,
          Duration::from_secs(self.adapter_timeout_secs),
        )?;
        Ok(resolver.with_fallback(Arc::new(api)))
      }
      None => {
        tracing::info!("API fallback disabled (no key)");
        Ok(resolver)
      }
    }
  }

  pub fn build_orchestrator<S: PriceStore>(
    &self,
    store: Arc<S>,
    base_currency: &str,
  ) -> Result<ScrapeOrchestrator<S>> {
    Ok(ScrapeOrchestrator::new(
      store,
      self.build_resolver(base_currency)?,
      Politeness::new(Duration::from_secs(self.politeness_secs)),
      Duration::from_secs(self.cell_timeout_secs),
    ))
  }
}
