//! Paid fallback: SerpApi's Google Hotels engine.
//!
//! Searched by competitor name rather than URL, so it serves any
//! competitor. Prices are requested directly in the base currency.

use std::time::Duration;

use async_trait::async_trait;
use innkeep_core::Result;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
  adapter::{Quote, Search, SourceAdapter},
  error::adapter_failure,
};

pub const DEFAULT_ENDPOINT: &str = "https://serpapi.com/search.json";

#[derive(Debug, Deserialize)]
struct Rate {
  extracted_lowest: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct Property {
  name:           String,
  total_rate:     Option<Rate>,
  rate_per_night: Option<Rate>,
}

/// Either a property-details response (top-level rates) or a search result
/// list.
#[derive(Debug, Deserialize)]
struct Response {
  error:          Option<String>,
  name:           Option<String>,
  total_rate:     Option<Rate>,
  rate_per_night: Option<Rate>,
  #[serde(default)]
  properties:     Vec<Property>,
}

fn lowest(rate: Option<&Rate>) -> Option<Decimal> { rate.and_then(|r| r.extracted_lowest) }

fn stay_total(total: Option<&Rate>, nightly: Option<&Rate>, nights: u32) -> Option<Decimal> {
  lowest(total).or_else(|| lowest(nightly).map(|n| n * Decimal::from(nights)))
}

/// The stay total for `competitor` out of a SerpApi response body.
fn parse_response(body: &str, competitor: &str, nights: u32) -> Result<Option<Decimal>> {
  let response: Response = serde_json::from_str(body)
    .map_err(|e| adapter_failure(SerpApi::NAME, format!("unexpected response: {e}")))?;
  if let Some(error) = response.error {
    return Err(adapter_failure(SerpApi::NAME, error));
  }

  if response.name.is_some() || response.total_rate.is_some() {
    return Ok(stay_total(
      response.total_rate.as_ref(),
      response.rate_per_night.as_ref(),
      nights,
    ));
  }

  // Only a property named like the competitor counts; any other hit is a
  // different hotel.
  let wanted = competitor.to_lowercase();
  let property = response.properties.iter().find(|p| {
    let name = p.name.to_lowercase();
    name.contains(&wanted) || wanted.contains(&name)
  });
  Ok(property.and_then(|p| stay_total(p.total_rate.as_ref(), p.rate_per_night.as_ref(), nights)))
}

pub struct SerpApi {
  client:   Client,
  endpoint: String,
  api_key:  String,
  currency: String,
}

impl SerpApi {
  pub const NAME: &'static str = "serpapi";

  pub fn new(
    endpoint: impl Into<String>,
    api_key: impl Into<String>,
    currency: impl Into<String>,
    timeout: Duration,
  ) -> crate::Result<Self> {
    Ok(Self {
      client:   Client::builder().timeout(timeout).build()?,
      endpoint: endpoint.into(),
      api_key:  api_key.into(),
      currency: currency.into(),
    })
  }
}

#[async_trait]
impl SourceAdapter for SerpApi {
  fn name(&self) -> &str { Self::NAME }

  async fn fetch(&self, search: &Search<'_>) -> Result<Vec<Quote>> {
    let check_in = search.window.check_in().to_string();
    let check_out = search.window.check_out().to_string();
    let adults = search.guests.to_string();

    let response = self
      .client
      .get(&self.endpoint)
      .query(&[
        ("engine", "google_hotels"),
        ("q", search.competitor.name.as_str()),
        ("check_in_date", check_in.as_str()),
        ("check_out_date", check_out.as_str()),
        ("adults", adults.as_str()),
        ("currency", self.currency.as_str()),
        ("api_key", self.api_key.as_str()),
      ])
      .send()
      .await
      .map_err(|e| adapter_failure(Self::NAME, format!("request failed: {e}")))?;

    let status = response.status();
    let body = response
      .text()
      .await
      .map_err(|e| adapter_failure(Self::NAME, format!("failed to read body: {e}")))?;
    if !status.is_success() {
      return Err(adapter_failure(Self::NAME, format!("HTTP {status}")));
    }

    let total = parse_response(&body, &search.competitor.name, search.window.nights())?;
    Ok(total.map(|amount| Quote::new(amount, self.currency.clone())).into_iter().collect())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn property_details_use_total_rate() {
    let body = r#"{
      "name": "Harbour Inn",
      "total_rate": { "lowest": "DKK 3,600", "extracted_lowest": 3600 },
      "rate_per_night": { "lowest": "DKK 1,200", "extracted_lowest": 1200 }
    }"#;
    assert_eq!(parse_response(body, "Harbour Inn", 3).unwrap(), Some(Decimal::from(3600)));
  }

  #[test]
  fn search_results_match_by_name_and_fall_back_to_nightly() {
    let body = r#"{
      "properties": [
        { "name": "Seaside Lodge", "total_rate": { "extracted_lowest": 999 } },
        { "name": "Harbour Inn Copenhagen", "rate_per_night": { "extracted_lowest": 1100 } }
      ]
    }"#;
    assert_eq!(parse_response(body, "Harbour Inn", 2).unwrap(), Some(Decimal::from(2200)));
  }

  #[test]
  fn api_errors_are_adapter_failures() {
    let err = parse_response(r#"{"error":"Invalid API key."}"#, "x", 1).unwrap_err();
    assert_eq!(err.kind(), "adapter_failure");
  }

  #[test]
  fn unrelated_search_hits_are_not_quoted() {
    let body = r#"{
      "properties": [
        { "name": "Totally Different Hostel", "total_rate": { "extracted_lowest": 450 } }
      ]
    }"#;
    assert_eq!(parse_response(body, "Harbour Inn", 2).unwrap(), None);
  }

  #[test]
  fn no_properties_means_no_quote() {
    assert_eq!(parse_response(r#"{"properties":[]}"#, "x", 1).unwrap(), None);
  }
}
