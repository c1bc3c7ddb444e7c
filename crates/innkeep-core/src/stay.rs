//! Half-open date ranges, the unit of every availability and booking query.
//!
//! A stay of `[check_in, check_out)` occupies the nights starting on
//! `check_in` up to but excluding `check_out`; the guest leaves on the
//! morning of `check_out`, so that date is free for the next arrival.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::{Error, Result};

/// A validated `[check_in, check_out)` range with `check_out > check_in`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct StayRange {
  check_in:  NaiveDate,
  check_out: NaiveDate,
}

impl StayRange {
  /// Fails with [`Error::InvalidRange`] unless `check_out > check_in`.
  pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self> {
    if check_out <= check_in {
      return Err(Error::InvalidRange(format!(
        "end date {check_out} must be after start date {check_in}"
      )));
    }
    Ok(Self { check_in, check_out })
  }

  /// A range starting on `check_in` and spanning `nights` nights.
  pub fn from_nights(check_in: NaiveDate, nights: u32) -> Result<Self> {
    let check_out = check_in
      .checked_add_days(Days::new(u64::from(nights)))
      .ok_or_else(|| Error::InvalidRange(format!("{check_in} + {nights} nights overflows")))?;
    Self::new(check_in, check_out)
  }

  pub fn check_in(&self) -> NaiveDate { self.check_in }

  pub fn check_out(&self) -> NaiveDate { self.check_out }

  pub fn nights(&self) -> u32 {
    (self.check_out - self.check_in).num_days() as u32
  }

  /// Every occupied night, in order.
  pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
    self
      .check_in
      .iter_days()
      .take_while(move |d| *d < self.check_out)
  }

  /// `[a,b)` and `[c,d)` overlap iff `a < d && c < b`.
  pub fn overlaps(&self, other: &StayRange) -> bool {
    self.check_in < other.check_out && other.check_in < self.check_out
  }

  pub fn contains(&self, date: NaiveDate) -> bool {
    self.check_in <= date && date < self.check_out
  }
}
