//! Money parsing and conversion into the operator's base currency.

use std::{collections::HashMap, sync::LazyLock};

use regex::Regex;
use rust_decimal::Decimal;

/// Converts quoted amounts using fixed configured rates.
#[derive(Debug, Clone)]
pub struct CurrencyConverter {
  base:  String,
  /// Units of the base currency per one unit of the keyed currency.
  rates: HashMap<String, Decimal>,
}

impl CurrencyConverter {
  pub fn new(base: impl Into<String>, rates: HashMap<String, Decimal>) -> Self {
    Self {
      base:  base.into().to_uppercase(),
      rates: rates
        .into_iter()
        .map(|(code, rate)| (code.to_uppercase(), rate))
        .collect(),
    }
  }

  pub fn base(&self) -> &str { &self.base }

  /// `amount` in the base currency, rounded to cents. `None` for a currency
  /// with no configured rate.
  pub fn convert(&self, amount: Decimal, currency: &str) -> Option<Decimal> {
    let code = currency.to_uppercase();
    if code == self.base {
      return Some(amount);
    }
    self
      .rates
      .get(&code)
      .map(|rate| (amount * rate).round_dp(2))
  }
}

// ─── Parsing ─────────────────────────────────────────────────────────────────

static AMOUNT: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\d[\d.,\u{a0}\u{202f} ]*").expect("static regex"));

static ISO_CODE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\b([A-Z]{3})\b").expect("static regex"));

/// Parse the first number in a display price such as `"DKK 1.234"`,
/// `"€1,234.50"` or `"1 234,50 kr."`.
///
/// With both separators present the later one is the decimal point. With a
/// single separator kind, it is a decimal point only when it occurs once and
/// is followed by one or two digits.
pub fn parse_amount(text: &str) -> Option<Decimal> {
  let raw = AMOUNT.find(text)?.as_str();
  let digits: String = raw
    .chars()
    .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
    .collect();
  let digits = digits.trim_end_matches(['.', ',']);

  let last_dot = digits.rfind('.');
  let last_comma = digits.rfind(',');
  let decimal_sep = match (last_dot, last_comma) {
    (Some(d), Some(c)) => Some(if d > c { '.' } else { ',' }),
    (Some(i), None) | (None, Some(i)) => {
      let sep = digits.as_bytes()[i] as char;
      let once = digits.matches(sep).count() == 1;
      let tail = digits.len() - i - 1;
      (once && (1..=2).contains(&tail)).then_some(sep)
    }
    (None, None) => None,
  };

  let normalized: String = digits
    .chars()
    .filter_map(|c| match c {
      '0'..='9' => Some(c),
      c if Some(c) == decimal_sep => Some('.'),
      _ => None,
    })
    .collect();
  normalized.parse().ok()
}

/// Guess the ISO currency code of a display price.
pub fn detect_currency(text: &str) -> Option<String> {
  if let Some(code) = ISO_CODE.captures(text).map(|c| c[1].to_owned()) {
    return Some(code);
  }
  let symbol = |s: &str| text.contains(s);
  let code = if symbol("US$") || symbol("$") {
    "USD"
  } else if symbol("€") {
    "EUR"
  } else if symbol("£") {
    "GBP"
  } else if symbol("¥") {
    "JPY"
  } else if symbol("฿") {
    "THB"
  } else if text.to_lowercase().contains("kr") {
    "DKK"
  } else {
    return None;
  };
  Some(code.to_owned())
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use super::*;

  fn dec(s: &str) -> Decimal { Decimal::from_str(s).unwrap() }

  #[test]
  fn parses_common_display_formats() {
    assert_eq!(parse_amount("DKK 1.234"), Some(dec("1234")));
    assert_eq!(parse_amount("€1,234.50"), Some(dec("1234.50")));
    assert_eq!(parse_amount("1 234,50 kr."), Some(dec("1234.50")));
    assert_eq!(parse_amount("$ 980"), Some(dec("980")));
    assert_eq!(parse_amount("US$1,024"), Some(dec("1024")));
    assert_eq!(parse_amount("Price: 12.5"), Some(dec("12.5")));
    assert_eq!(parse_amount("sold out"), None);
  }

  #[test]
  fn detects_codes_and_symbols() {
    assert_eq!(detect_currency("DKK 1.234").as_deref(), Some("DKK"));
    assert_eq!(detect_currency("€ 99").as_deref(), Some("EUR"));
    assert_eq!(detect_currency("1.200 kr.").as_deref(), Some("DKK"));
    assert_eq!(detect_currency("1200").as_deref(), None);
  }

  #[test]
  fn converts_into_base_currency() {
    let converter = CurrencyConverter::new(
      "dkk",
      HashMap::from([("EUR".to_owned(), dec("7.46")), ("usd".to_owned(), dec("6.85"))]),
    );
    assert_eq!(converter.convert(dec("100"), "DKK"), Some(dec("100")));
    assert_eq!(converter.convert(dec("100"), "eur"), Some(dec("746.00")));
    assert_eq!(converter.convert(dec("12.34"), "USD"), Some(dec("84.53")));
    assert_eq!(converter.convert(dec("100"), "GBP"), None);
  }
}
