//! Booking.com hotel pages.
//!
//! A hotel page lists its rooms in the availability table; each row is one
//! rate plan, and a room type cell spans every rate row beneath it. Pages
//! without the table (search results) fall back to the first property card.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use innkeep_core::Result;
use scraper::{Html, Selector};

use super::{cheapest_per_category, listing_url, text_of};
use crate::{
  adapter::{Quote, Search, SourceAdapter},
  currency::{detect_currency, parse_amount},
  error::adapter_failure,
  session::HttpSession,
};

fn selector(css: &str) -> Selector { Selector::parse(css).expect("static selector") }

static ROW: LazyLock<Selector> = LazyLock::new(|| selector("table.hprt-table tr[data-block-id]"));
static ROOM_TYPE: LazyLock<Selector> = LazyLock::new(|| selector(".hprt-roomtype-icon-link"));
static ROW_PRICE: LazyLock<Selector> = LazyLock::new(|| {
  selector(".bui-price-display__value, .prco-valign-middle-helper")
});
static CARD_PRICE: LazyLock<Selector> = LazyLock::new(|| {
  selector(r#"[data-testid="property-card"] [data-testid="price-and-discounted-price"]"#)
});

pub struct BookingCom {
  session: Arc<HttpSession>,
}

impl BookingCom {
  pub const NAME: &'static str = "booking.com";

  pub fn new(session: Arc<HttpSession>) -> Self { Self { session } }
}

/// Quotes found on a Booking.com page.
pub fn parse_page(html: &str) -> Vec<Quote> {
  let document = Html::parse_document(html);

  let mut quotes = Vec::new();
  let mut room_type: Option<String> = None;
  for row in document.select(&ROW) {
    if let Some(cell) = row.select(&ROOM_TYPE).next() {
      room_type = Some(text_of(cell)).filter(|t| !t.is_empty());
    }
    let Some(price_text) = row.select(&ROW_PRICE).next().map(text_of) else {
      continue;
    };
    let (Some(amount), Some(currency)) = (parse_amount(&price_text), detect_currency(&price_text))
    else {
      continue;
    };
    let quote = Quote::new(amount, currency);
    quotes.push(match &room_type {
      Some(name) => quote.with_category(name.clone()),
      None => quote,
    });
  }
  if !quotes.is_empty() {
    return cheapest_per_category(quotes);
  }

  document
    .select(&CARD_PRICE)
    .next()
    .map(text_of)
    .and_then(|text| Some(Quote::new(parse_amount(&text)?, detect_currency(&text)?)))
    .into_iter()
    .collect()
}

#[async_trait]
impl SourceAdapter for BookingCom {
  fn name(&self) -> &str { Self::NAME }

  async fn initialize(&self) -> Result<()> { self.session.open(Self::NAME).await }

  async fn fetch(&self, search: &Search<'_>) -> Result<Vec<Quote>> {
    let url = listing_url(Self::NAME, search, &[
      ("checkin", search.window.check_in().to_string()),
      ("checkout", search.window.check_out().to_string()),
      ("group_adults", search.guests.to_string()),
      ("group_children", "0".to_owned()),
      ("no_rooms", "1".to_owned()),
    ])?;
    let html = self.session.get_text(Self::NAME, &url).await?;

    let quotes = parse_page(&html);
    if quotes.is_empty() && html.contains("captcha") {
      return Err(adapter_failure(Self::NAME, "blocked by a captcha page"));
    }
    tracing::debug!(adapter = Self::NAME, %url, quotes = quotes.len(), "page parsed");
    Ok(quotes)
  }

  async fn close(&self) { self.session.close().await }
}
