//! Direct-scrape adapters for the travel sites we know how to read.
//!
//! Every adapter here shares one [`HttpSession`], so cookies set by one
//! request are replayed on the next request to the same site.

pub mod agoda;
pub mod airbnb;
pub mod booking_com;

use std::{collections::BTreeMap, sync::Arc};

use innkeep_core::Result;
use scraper::ElementRef;
use url::Url;

pub use self::{agoda::Agoda, airbnb::Airbnb, booking_com::BookingCom};
use crate::{
  adapter::{Quote, Search, SourceAdapter},
  error::adapter_failure,
  session::HttpSession,
};

/// `(host suffix, adapter)` pairs for the registry.
pub fn builtin(session: Arc<HttpSession>) -> Vec<(&'static str, Arc<dyn SourceAdapter>)> {
  let booking: Arc<dyn SourceAdapter> = Arc::new(BookingCom::new(session.clone()));
  let airbnb: Arc<dyn SourceAdapter> = Arc::new(Airbnb::new(session.clone()));
  let agoda: Arc<dyn SourceAdapter> = Arc::new(Agoda::new(session));

  let mut entries = vec![("booking.com", booking)];
  for suffix in airbnb::HOSTS {
    entries.push((suffix, airbnb.clone()));
  }
  entries.push(("agoda.com", agoda));
  entries
}

/// The listing URL: the filled template when it carries the dates itself,
/// otherwise the template with `pairs` appended as query parameters.
pub(crate) fn listing_url(
  adapter: &str,
  search: &Search<'_>,
  pairs: &[(&str, String)],
) -> Result<String> {
  if search.is_templated() {
    return Ok(search.url());
  }
  let mut url = Url::parse(&search.competitor.url_template)
    .map_err(|e| adapter_failure(adapter, format!("bad listing url: {e}")))?;
  {
    let mut query = url.query_pairs_mut();
    for (key, value) in pairs {
      query.append_pair(key, value);
    }
  }
  Ok(url.into())
}

/// Collapsed, trimmed text content of an element.
pub(crate) fn text_of(element: ElementRef<'_>) -> String {
  element
    .text()
    .flat_map(str::split_whitespace)
    .collect::<Vec<_>>()
    .join(" ")
}

/// Keep the cheapest quote per room category, in category order.
pub(crate) fn cheapest_per_category(quotes: Vec<Quote>) -> Vec<Quote> {
  let mut best: BTreeMap<Option<String>, Quote> = BTreeMap::new();
  for quote in quotes {
    match best.get(&quote.category) {
      Some(kept) if kept.amount <= quote.amount => {}
      _ => {
        best.insert(quote.category.clone(), quote);
      }
    }
  }
  best.into_values().collect()
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use innkeep_core::{StayRange, competitor::CompetitorConfig};
  use rust_decimal::Decimal;

  use super::*;

  #[test]
  fn plain_listing_urls_get_search_parameters() {
    let competitor = CompetitorConfig {
      name:         "Harbour Inn".into(),
      url_template: "https://www.booking.com/hotel/dk/harbour.html?lang=en-gb".into(),
      room_mapping: "double".into(),
      enabled:      true,
    };
    let window =
      StayRange::from_nights(NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(), 2).unwrap();
    let search = Search { competitor: &competitor, window, guests: 2 };

    let url = listing_url("booking.com", &search, &[("checkin", "2026-07-01".into())]).unwrap();
    assert_eq!(url, "https://www.booking.com/hotel/dk/harbour.html?lang=en-gb&checkin=2026-07-01");
  }

  #[test]
  fn cheapest_quote_wins_per_category() {
    let quotes = vec![
      Quote::new(Decimal::from(900), "DKK").with_category("Double"),
      Quote::new(Decimal::from(700), "DKK").with_category("Double"),
      Quote::new(Decimal::from(1500), "DKK").with_category("Suite"),
    ];
    let kept = cheapest_per_category(quotes);
    assert_eq!(kept.len(), 2);
    assert_eq!(kept[0].amount, Decimal::from(700));
    assert_eq!(kept[1].category.as_deref(), Some("Suite"));
  }
}
