//! Scriptable adapter for resolver and orchestrator tests.

use std::{
  sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
  },
  time::Duration,
};

use async_trait::async_trait;
use innkeep_core::Result;

use crate::{
  adapter::{Quote, Search, SourceAdapter},
  error::adapter_failure,
};

#[derive(Debug, Clone)]
pub enum Behavior {
  Quotes(Vec<Quote>),
  Fail,
  /// Never answers within any reasonable timeout.
  Hang,
  /// Answers after the given delay.
  Slow(Duration, Vec<Quote>),
  /// Panics inside `fetch`.
  Panic,
}

pub struct MockAdapter {
  name:            &'static str,
  behavior:        Behavior,
  fail_initialize: bool,
  calls:           AtomicUsize,
  closes:          AtomicUsize,
  open:            AtomicBool,
}

impl MockAdapter {
  pub fn new(name: &'static str, behavior: Behavior) -> Arc<Self> {
    Arc::new(Self {
      name,
      behavior,
      fail_initialize: false,
      calls: AtomicUsize::new(0),
      closes: AtomicUsize::new(0),
      open: AtomicBool::new(false),
    })
  }

  pub fn failing_initialize(self: Arc<Self>) -> Arc<Self> {
    let mut inner = Arc::into_inner(self).expect("unshared mock");
    inner.fail_initialize = true;
    Arc::new(inner)
  }

  pub fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }

  pub fn closes(&self) -> usize { self.closes.load(Ordering::SeqCst) }

  pub fn is_open(&self) -> bool { self.open.load(Ordering::SeqCst) }
}

#[async_trait]
impl SourceAdapter for MockAdapter {
  fn name(&self) -> &str { self.name }

  async fn initialize(&self) -> Result<()> {
    if self.fail_initialize {
      return Err(adapter_failure(self.name, "login refused"));
    }
    self.open.store(true, Ordering::SeqCst);
    Ok(())
  }

  async fn fetch(&self, _: &Search<'_>) -> Result<Vec<Quote>> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    match &self.behavior {
      Behavior::Quotes(quotes) => Ok(quotes.clone()),
      Behavior::Fail => Err(adapter_failure(self.name, "HTTP 403 Forbidden")),
      Behavior::Hang => {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(Vec::new())
      }
      Behavior::Slow(delay, quotes) => {
        tokio::time::sleep(*delay).await;
        Ok(quotes.clone())
      }
      Behavior::Panic => panic!("{} crashed mid-fetch", self.name),
    }
  }

  async fn close(&self) {
    self.closes.fetch_add(1, Ordering::SeqCst);
    self.open.store(false, Ordering::SeqCst);
  }
}
