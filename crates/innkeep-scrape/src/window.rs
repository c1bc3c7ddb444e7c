//! Search-window generation and cell planning.
//!
//! Both are pure: they decide *what* to scrape, never *when*.

use chrono::{Days, NaiveDate};
use innkeep_core::{Error as CoreError, Result, StayRange, competitor::CompetitorConfig};
use serde::{Deserialize, Serialize};

/// Shape of the date windows searched for each competitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowPlan {
  /// Days from today to the first check-in.
  pub offset_days: u32,
  /// Days between consecutive check-ins.
  pub stride_days: u32,
  /// Number of windows.
  pub count:       u32,
  /// Nights per window.
  pub stay_nights: u32,
}

impl Default for WindowPlan {
  fn default() -> Self {
    Self {
      offset_days: 0,
      stride_days: 7,
      count:       4,
      stay_nights: 3,
    }
  }
}

/// Window `i` checks in on `today + offset + i * stride` and checks out
/// `stay_nights` later.
pub fn generate_windows(today: NaiveDate, plan: &WindowPlan) -> Result<Vec<StayRange>> {
  if plan.stay_nights == 0 {
    return Err(CoreError::InvalidRange("windows need at least one night".into()));
  }
  if plan.count > 1 && plan.stride_days == 0 {
    return Err(CoreError::InvalidRange("stride must be positive".into()));
  }

  (0..u64::from(plan.count))
    .map(|i| {
      let days = u64::from(plan.offset_days) + i * u64::from(plan.stride_days);
      let check_in = today
        .checked_add_days(Days::new(days))
        .ok_or_else(|| CoreError::InvalidRange(format!("{today} + {days} days overflows")))?;
      StayRange::from_nights(check_in, plan.stay_nights)
    })
    .collect()
}

/// One competitor searched for one window.
#[derive(Debug, Clone, Copy)]
pub struct Cell<'a> {
  pub competitor: &'a CompetitorConfig,
  pub window:     StayRange,
}

/// Every competitor against every window, competitor-major.
pub fn plan_cells<'a>(competitors: &'a [CompetitorConfig], windows: &[StayRange]) -> Vec<Cell<'a>> {
  competitors
    .iter()
    .flat_map(|competitor| windows.iter().map(move |&window| Cell { competitor, window }))
    .collect()
}

#[cfg(test)]
mod tests {
  use proptest::prelude::*;

  use super::*;

  fn d(y: i32, m: u32, day: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, day).unwrap() }

  fn competitor(name: &str) -> CompetitorConfig {
    CompetitorConfig {
      name:         name.into(),
      url_template: format!("https://www.booking.com/hotel/dk/{name}.html"),
      room_mapping: "double".into(),
      enabled:      true,
    }
  }

  #[test]
  fn weekly_three_night_windows() {
    let today = d(2026, 7, 1);
    let windows = generate_windows(today, &WindowPlan::default()).unwrap();

    assert_eq!(windows.len(), 4);
    for (i, window) in windows.iter().enumerate() {
      assert_eq!(window.check_in(), today + Days::new(7 * i as u64));
      assert_eq!(window.nights(), 3);
    }
  }

  #[test]
  fn zero_count_yields_nothing() {
    let plan = WindowPlan { count: 0, ..WindowPlan::default() };
    assert!(generate_windows(d(2026, 7, 1), &plan).unwrap().is_empty());
  }

  #[test]
  fn zero_night_windows_are_rejected() {
    let plan = WindowPlan { stay_nights: 0, ..WindowPlan::default() };
    assert!(matches!(
      generate_windows(d(2026, 7, 1), &plan),
      Err(CoreError::InvalidRange(_))
    ));
  }

  #[test]
  fn cells_are_competitor_major() {
    let competitors = [competitor("a"), competitor("b")];
    let windows = generate_windows(d(2026, 7, 1), &WindowPlan {
      count: 3,
      ..WindowPlan::default()
    })
    .unwrap();

    let order: Vec<_> = plan_cells(&competitors, &windows)
      .iter()
      .map(|c| (c.competitor.name.as_str(), c.window.check_in()))
      .collect();
    assert_eq!(order, vec![
      ("a", d(2026, 7, 1)),
      ("a", d(2026, 7, 8)),
      ("a", d(2026, 7, 15)),
      ("b", d(2026, 7, 1)),
      ("b", d(2026, 7, 8)),
      ("b", d(2026, 7, 15)),
    ]);
  }

  proptest! {
    #[test]
    fn windows_follow_the_plan(
      offset in 0u32..60,
      stride in 1u32..30,
      count in 0u32..20,
      stay in 1u32..14,
    ) {
      let today = d(2026, 1, 1);
      let plan = WindowPlan { offset_days: offset, stride_days: stride, count, stay_nights: stay };
      let windows = generate_windows(today, &plan).unwrap();

      prop_assert_eq!(windows.len(), count as usize);
      for (i, w) in windows.iter().enumerate() {
        let expected = today + Days::new(u64::from(offset) + i as u64 * u64::from(stride));
        prop_assert_eq!(w.check_in(), expected);
        prop_assert_eq!(w.nights(), stay);
      }
    }
  }
}
