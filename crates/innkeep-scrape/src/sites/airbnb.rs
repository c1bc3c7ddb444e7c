//! Airbnb listing pages.
//!
//! Airbnb renders client-side; prices live in the JSON state blobs embedded
//! as `<script type="application/json">`. The first `structuredDisplayPrice`
//! found is the listing's price for the requested dates.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use innkeep_core::Result;
use rust_decimal::Decimal;
use scraper::{Html, Selector};
use serde_json::Value;

use super::listing_url;
use crate::{
  adapter::{Quote, Search, SourceAdapter},
  currency::{detect_currency, parse_amount},
  session::HttpSession,
};

/// Host suffixes served by this adapter.
pub const HOSTS: [&str; 4] = ["airbnb.com", "airbnb.co.uk", "airbnb.dk", "airbnb.de"];

static STATE_SCRIPT: LazyLock<Selector> = LazyLock::new(|| {
  Selector::parse(r#"script[type="application/json"]"#).expect("static selector")
});

pub struct Airbnb {
  session: Arc<HttpSession>,
}

impl Airbnb {
  pub const NAME: &'static str = "airbnb";

  pub fn new(session: Arc<HttpSession>) -> Self { Self { session } }
}

fn find_display_price(value: &Value) -> Option<&Value> {
  match value {
    Value::Object(map) => map
      .get("structuredDisplayPrice")
      .filter(|v| v.is_object())
      .or_else(|| map.values().find_map(find_display_price)),
    Value::Array(items) => items.iter().find_map(find_display_price),
    _ => None,
  }
}

fn price_text<'a>(line: &'a Value, keys: &[&str]) -> Option<&'a str> {
  keys.iter().find_map(|key| line.get(*key)?.as_str())
}

/// The stay total from a `structuredDisplayPrice` object. A price qualified
/// as nightly is multiplied by `nights`.
fn quote_from_display(display: &Value, nights: u32) -> Option<Quote> {
  let secondary = display.get("secondaryLine");
  if let Some(text) = secondary.and_then(|line| price_text(line, &["price", "discountedPrice"]))
    && secondary
      .and_then(|line| line.get("qualifier")?.as_str())
      .is_none_or(|q| !q.contains("night"))
  {
    return Some(Quote::new(parse_amount(text)?, detect_currency(text)?));
  }

  let primary = display.get("primaryLine")?;
  let text = price_text(primary, &["discountedPrice", "price"])?;
  let mut amount = parse_amount(text)?;
  let nightly = primary
    .get("qualifier")
    .and_then(Value::as_str)
    .is_some_and(|q| q.contains("night"));
  if nightly {
    amount *= Decimal::from(nights);
  }
  Some(Quote::new(amount, detect_currency(text)?))
}

/// Quotes found on an Airbnb page; at most one, as a listing is one unit.
pub fn parse_page(html: &str, nights: u32) -> Vec<Quote> {
  let document = Html::parse_document(html);
  document
    .select(&STATE_SCRIPT)
    .filter_map(|script| serde_json::from_str::<Value>(&script.text().collect::<String>()).ok())
    .find_map(|state| find_display_price(&state).and_then(|d| quote_from_display(d, nights)))
    .into_iter()
    .collect()
}

#[async_trait]
impl SourceAdapter for Airbnb {
  fn name(&self) -> &str { Self::NAME }

  async fn initialize(&self) -> Result<()> { self.session.open(Self::NAME).await }

  async fn fetch(&self, search: &Search<'_>) -> Result<Vec<Quote>> {
    let url = listing_url(Self::NAME, search, &[
      ("check_in", search.window.check_in().to_string()),
      ("check_out", search.window.check_out().to_string()),
      ("adults", search.guests.to_string()),
    ])?;
    let html = self.session.get_text(Self::NAME, &url).await?;

    let quotes = parse_page(&html, search.window.nights());
    tracing::debug!(adapter = Self::NAME, %url, quotes = quotes.len(), "page parsed");
    Ok(quotes)
  }

  async fn close(&self) { self.session.close().await }
}
