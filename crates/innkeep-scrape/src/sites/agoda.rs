//! Agoda property pages.
//!
//! Each master room block shows the cheapest offer for that room type as an
//! average nightly rate, with the currency in a sibling element.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use innkeep_core::Result;
use rust_decimal::Decimal;
use scraper::{Html, Selector};

use super::{cheapest_per_category, listing_url, text_of};
use crate::{
  adapter::{Quote, Search, SourceAdapter},
  currency::{detect_currency, parse_amount},
  session::HttpSession,
};

fn selector(css: &str) -> Selector { Selector::parse(css).expect("static selector") }

static MASTER_ROOM: LazyLock<Selector> =
  LazyLock::new(|| selector(r#"[data-selenium="MasterRoom"]"#));
static ROOM_NAME: LazyLock<Selector> =
  LazyLock::new(|| selector(r#"[data-selenium="masterroom-title-name"]"#));
static PRICE: LazyLock<Selector> = LazyLock::new(|| selector(r#"[data-selenium="display-price"]"#));
static CURRENCY: LazyLock<Selector> =
  LazyLock::new(|| selector(r#"[data-selenium="hotel-currency"]"#));

pub struct Agoda {
  session: Arc<HttpSession>,
}

impl Agoda {
  pub const NAME: &'static str = "agoda";

  pub fn new(session: Arc<HttpSession>) -> Self { Self { session } }
}

/// Quotes found on an Agoda page, as stay totals for `nights` nights.
pub fn parse_page(html: &str, nights: u32) -> Vec<Quote> {
  let document = Html::parse_document(html);
  let nights = Decimal::from(nights);

  let quotes = document
    .select(&MASTER_ROOM)
    .filter_map(|block| {
      let price_text = block.select(&PRICE).next().map(text_of)?;
      let currency = block
        .select(&CURRENCY)
        .next()
        .map(text_of)
        .and_then(|text| detect_currency(&text))
        .or_else(|| detect_currency(&price_text))?;
      let quote = Quote::new(parse_amount(&price_text)? * nights, currency);
      Some(match block.select(&ROOM_NAME).next().map(text_of) {
        Some(name) if !name.is_empty() => quote.with_category(name),
        _ => quote,
      })
    })
    .collect();
  cheapest_per_category(quotes)
}

#[async_trait]
impl SourceAdapter for Agoda {
  fn name(&self) -> &str { Self::NAME }

  async fn initialize(&self) -> Result<()> { self.session.open(Self::NAME).await }

  async fn fetch(&self, search: &Search<'_>) -> Result<Vec<Quote>> {
    let url = listing_url(Self::NAME, search, &[
      ("checkIn", search.window.check_in().to_string()),
      ("los", search.window.nights().to_string()),
      ("adults", search.guests.to_string()),
      ("rooms", "1".to_owned()),
    ])?;
    let html = self.session.get_text(Self::NAME, &url).await?;

    let quotes = parse_page(&html, search.window.nights());
    tracing::debug!(adapter = Self::NAME, %url, quotes = quotes.len(), "page parsed");
    Ok(quotes)
  }

  async fn close(&self) { self.session.close().await }
}
