//! The scrape run: competitors × windows, one cell at a time.
//!
//! A run is sequential and exclusive. Each cell is bounded by its own
//! wall-clock timeout on top of the per-attempt adapter timeouts, so one
//! stuck cell costs at most `cell_timeout`. Adapter problems are counted and
//! the run moves on; only a store failure ends it early. Cancellation is
//! checked between cells, so the cell in flight is finished and stored.
//! Adapters are closed on every exit path, including a panic or a dropped
//! run future.

use std::{fmt, sync::Arc, time::Duration};

use chrono::NaiveDate;
use innkeep_core::{
  Error as CoreError,
  competitor::{AcquisitionMethod, CompetitorConfig},
  store::PriceStore,
};
use serde::Serialize;
use tokio::{sync::Mutex, time::Instant};
use tokio_util::sync::CancellationToken;

use crate::{
  Error, Result,
  politeness::Politeness,
  resolver::{FallbackResolver, Resolution},
  window::{Cell, WindowPlan, generate_windows, plan_cells},
};

/// Parameters of one run.
#[derive(Debug, Clone, Default)]
pub struct ScrapeRequest {
  /// Competitors to scrape by name; empty means every enabled competitor.
  pub competitors: Vec<String>,
  pub plan:        WindowPlan,
  pub guests:      u32,
  /// Delete every stored observation before scraping.
  pub purge:       bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
  pub successes:     usize,
  pub failures:      usize,
  pub skips:         usize,
  pub observations:  usize,
  /// Successes that came from the API fallback.
  pub api_fallbacks: usize,
  /// Observations deleted by `purge`.
  pub purged:        usize,
  pub cancelled:     bool,
  pub elapsed:       Duration,
}

impl fmt::Display for RunSummary {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{} succeeded ({} via API fallback), {} failed, {} skipped, {} observations saved in {:.1}s",
      self.successes,
      self.api_fallbacks,
      self.failures,
      self.skips,
      self.observations,
      self.elapsed.as_secs_f64(),
    )?;
    if self.cancelled {
      write!(f, " (cancelled)")?;
    }
    Ok(())
  }
}

pub struct ScrapeOrchestrator<S> {
  store:        Arc<S>,
  resolver:     FallbackResolver,
  politeness:   Politeness,
  cell_timeout: Duration,
  run_lock:     Mutex<()>,
}

impl<S: PriceStore> ScrapeOrchestrator<S> {
  pub fn new(
    store: Arc<S>,
    resolver: FallbackResolver,
    politeness: Politeness,
    cell_timeout: Duration,
  ) -> Self {
    Self {
      store,
      resolver,
      politeness,
      cell_timeout,
      run_lock: Mutex::new(()),
    }
  }

  fn store_error(e: S::Error) -> Error { Error::Core(e.into()) }

  /// The competitors named in `names`, or every enabled one when empty.
  /// Naming a disabled competitor runs it anyway.
  async fn select_competitors(&self, names: &[String]) -> Result<Vec<CompetitorConfig>> {
    if names.is_empty() {
      return self.store.list_competitors(true).await.map_err(Self::store_error);
    }

    let all = self.store.list_competitors(false).await.map_err(Self::store_error)?;
    for name in names {
      if !all.iter().any(|c| &c.name == name) {
        tracing::warn!(competitor = %name, "unknown competitor requested");
      }
    }
    Ok(all.into_iter().filter(|c| names.contains(&c.name)).collect())
  }

  /// Run every cell of `request` with windows counted from `today`.
  ///
  /// Fails with [`Error::AlreadyRunning`] when another run holds the lock,
  /// and with a store error if an observation cannot be written.
  pub async fn run(
    &self,
    today: NaiveDate,
    request: &ScrapeRequest,
    cancel: &CancellationToken,
  ) -> Result<RunSummary> {
    let _guard = self.run_lock.try_lock().map_err(|_| Error::AlreadyRunning)?;
    let started = Instant::now();

    let windows = generate_windows(today, &request.plan)?;
    let competitors = self.select_competitors(&request.competitors).await?;
    let cells = plan_cells(&competitors, &windows);

    let mut summary = RunSummary::default();
    if request.purge {
      summary.purged = self.store.purge_all().await.map_err(Self::store_error)?;
    }

    tracing::info!(
      competitors = competitors.len(),
      windows = windows.len(),
      cells = cells.len(),
      "scrape run started"
    );

    self.politeness.reset().await;
    let adapters = self.resolver.open().await;
    let outcome = self.run_cells(&cells, request.guests, cancel, &mut summary).await;
    adapters.close().await;

    summary.elapsed = started.elapsed();
    match outcome {
      Ok(()) => {
        tracing::info!(%summary, "scrape run finished");
        Ok(summary)
      }
      Err(e) => {
        tracing::error!(error = %e, %summary, "scrape run aborted");
        Err(e)
      }
    }
  }

  async fn run_cells(
    &self,
    cells: &[Cell<'_>],
    guests: u32,
    cancel: &CancellationToken,
    summary: &mut RunSummary,
  ) -> Result<()> {
    for (index, cell) in cells.iter().enumerate() {
      let remaining = cells.len() - index;
      if cancel.is_cancelled() {
        summary.skips += remaining;
        summary.cancelled = true;
        tracing::info!(remaining, "scrape run cancelled");
        return Ok(());
      }

      // A cell already started runs to completion or to its own timeout.
      let resolution = tokio::time::timeout(
        self.cell_timeout,
        self.resolver.resolve(cell, guests, &self.politeness),
      )
      .await;

      let competitor = &cell.competitor.name;
      let check_in = cell.window.check_in();
      match resolution {
        Err(_) => {
          summary.failures += 1;
          let err = CoreError::AdapterTimeout {
            adapter: "cell".to_owned(),
            after:   self.cell_timeout,
          };
          tracing::warn!(%competitor, %check_in, error = %err, "cell timed out");
        }
        Ok(Resolution::Skipped) => {
          summary.skips += 1;
          tracing::debug!(%competitor, %check_in, "no adapter for competitor");
        }
        Ok(Resolution::Failed(err)) => {
          summary.failures += 1;
          tracing::warn!(%competitor, %check_in, kind = err.kind(), error = %err, "cell failed");
        }
        Ok(Resolution::Resolved { method, observations }) => {
          let count = observations.len();
          for observation in observations {
            self.store.save(observation).await.map_err(Self::store_error)?;
          }
          summary.successes += 1;
          summary.observations += count;
          if method == AcquisitionMethod::ApiFallback {
            summary.api_fallbacks += 1;
          }
          tracing::info!(%competitor, %check_in, %method, observations = count, "cell scraped");
        }
      }
    }
    Ok(())
  }
}
