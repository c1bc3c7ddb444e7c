//! Competitor configuration and the price observations scraped for it.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// One external listing to monitor. Managed by administrators; the scrape
/// pipeline only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitorConfig {
  /// Unique human-readable source name, e.g. `"Harbour Inn (Booking.com)"`.
  pub name:         String,
  /// Listing URL; may contain `{checkin}`, `{checkout}`, `{nights}` and
  /// `{adults}` placeholders filled per date window.
  pub url_template: String,
  /// Which of our own room types this listing is compared against.
  pub room_mapping: String,
  #[serde(default = "default_enabled")]
  pub enabled:      bool,
}

fn default_enabled() -> bool { true }

/// How an observation was obtained.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AcquisitionMethod {
  DirectScrape,
  ApiFallback,
}

/// One captured competitor price for a date window.
///
/// `(source, room_mapping, search_checkin)` is unique in the store: saving
/// the same cell again replaces the earlier capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceObservation {
  pub source:            String,
  pub room_mapping:      String,
  /// Price for the whole window, converted to `currency`.
  pub price:             Decimal,
  /// The operator's base currency.
  pub currency:          String,
  /// The amount as quoted by the competitor, before conversion.
  pub original_price:    Decimal,
  pub original_currency: String,
  pub search_checkin:    NaiveDate,
  pub search_checkout:   NaiveDate,
  pub captured_at:       DateTime<Utc>,
  pub method:            AcquisitionMethod,
}
