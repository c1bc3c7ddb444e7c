//! Per-host pacing between consecutive requests.

use std::{collections::HashMap, time::Duration};

use tokio::{sync::Mutex, time::Instant};

/// How long to wait before the next request to a host last contacted at
/// `last`. The first request to a host never waits.
pub fn time_until_ready(last: Option<Instant>, now: Instant, interval: Duration) -> Duration {
  match last {
    Some(last) => interval.saturating_sub(now.saturating_duration_since(last)),
    None => Duration::ZERO,
  }
}

#[derive(Debug)]
pub struct Politeness {
  interval: Duration,
  last:     Mutex<HashMap<String, Instant>>,
}

impl Politeness {
  pub fn new(interval: Duration) -> Self {
    Self {
      interval,
      last: Mutex::new(HashMap::new()),
    }
  }

  pub fn interval(&self) -> Duration { self.interval }

  /// Sleep until `host` may be contacted again, then mark it as contacted.
  /// Call [`Politeness::done`] once the request completes so the next wait
  /// counts from the end of this request.
  ///
  /// The lock is held across the sleep; the orchestrator is sequential, so
  /// nothing else is waiting on it.
  pub async fn wait(&self, host: &str) {
    let mut last = self.last.lock().await;
    let delay = time_until_ready(last.get(host).copied(), Instant::now(), self.interval);
    if !delay.is_zero() {
      tracing::debug!(host, delay_ms = delay.as_millis() as u64, "politeness wait");
      tokio::time::sleep(delay).await;
    }
    last.insert(host.to_owned(), Instant::now());
  }

  /// Mark the request to `host` as finished.
  pub async fn done(&self, host: &str) {
    self.last.lock().await.insert(host.to_owned(), Instant::now());
  }

  /// Forget every host, e.g. between runs.
  pub async fn reset(&self) { self.last.lock().await.clear(); }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn first_request_does_not_wait() {
    let now = Instant::now();
    assert_eq!(time_until_ready(None, now, Duration::from_secs(5)), Duration::ZERO);
  }

  #[test]
  fn waits_for_the_rest_of_the_interval() {
    let last = Instant::now();
    let now = last + Duration::from_secs(2);
    assert_eq!(time_until_ready(Some(last), now, Duration::from_secs(5)), Duration::from_secs(3));
    assert_eq!(
      time_until_ready(Some(last), last + Duration::from_secs(9), Duration::from_secs(5)),
      Duration::ZERO
    );
  }

  #[tokio::test]
  async fn hosts_are_paced_independently() {
    let politeness = Politeness::new(Duration::from_millis(150));
    let started = Instant::now();

    politeness.wait("www.booking.com").await;
    politeness.wait("www.airbnb.com").await;
    assert!(started.elapsed() < Duration::from_millis(100));

    politeness.wait("www.booking.com").await;
    assert!(started.elapsed() >= Duration::from_millis(150));
  }

  #[tokio::test]
  async fn interval_counts_from_the_end_of_a_slow_request() {
    let interval = Duration::from_millis(100);
    let politeness = Politeness::new(interval);
    let started = Instant::now();

    politeness.wait("www.booking.com").await;
    tokio::time::sleep(interval).await;
    politeness.done("www.booking.com").await;

    politeness.wait("www.booking.com").await;
    assert!(started.elapsed() >= interval * 2);
  }
}
