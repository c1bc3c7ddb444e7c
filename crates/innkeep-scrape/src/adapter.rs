//! The source-adapter capability.
//!
//! An adapter turns one competitor listing plus one date window into price
//! quotes. Direct-scrape adapters are selected by the listing's host; the
//! API fallback adapter accepts any competitor.

use async_trait::async_trait;
use innkeep_core::{Result, StayRange, competitor::CompetitorConfig};
use rust_decimal::Decimal;

/// What to search for.
#[derive(Debug, Clone, Copy)]
pub struct Search<'a> {
  pub competitor: &'a CompetitorConfig,
  pub window:     StayRange,
  pub guests:     u32,
}

impl Search<'_> {
  /// The competitor's URL template with its placeholders filled.
  pub fn url(&self) -> String {
    self
      .competitor
      .url_template
      .replace("{checkin}", &self.window.check_in().to_string())
      .replace("{checkout}", &self.window.check_out().to_string())
      .replace("{nights}", &self.window.nights().to_string())
      .replace("{adults}", &self.guests.to_string())
  }

  /// Whether the template already carries the dates, so adapters should not
  /// add their own query parameters.
  pub fn is_templated(&self) -> bool { self.competitor.url_template.contains("{checkin}") }
}

/// One price as quoted by a competitor, before currency normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
  /// Total for the whole window.
  pub amount:   Decimal,
  /// ISO 4217 code.
  pub currency: String,
  /// The competitor's room name when a listing offers several rooms.
  pub category: Option<String>,
}

impl Quote {
  pub fn new(amount: Decimal, currency: impl Into<String>) -> Self {
    Self {
      amount,
      currency: currency.into(),
      category: None,
    }
  }

  pub fn with_category(mut self, category: impl Into<String>) -> Self {
    self.category = Some(category.into());
    self
  }
}

#[async_trait]
pub trait SourceAdapter: Send + Sync {
  /// Stable name used in logs and error messages.
  fn name(&self) -> &str;

  /// Acquire whatever the adapter needs (sessions, tokens) before first use.
  async fn initialize(&self) -> Result<()> { Ok(()) }

  /// Zero or more quotes for the search. An empty result is not an error
  /// here; the resolver decides what it means.
  async fn fetch(&self, search: &Search<'_>) -> Result<Vec<Quote>>;

  /// Release anything acquired in [`SourceAdapter::initialize`]. Must be safe
  /// to call more than once.
  async fn close(&self) {}
}
