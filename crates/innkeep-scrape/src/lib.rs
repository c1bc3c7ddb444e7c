//! Competitor price intelligence for Innkeep.
//!
//! A run walks every configured competitor across a set of generated date
//! windows. For each cell the [`resolver::FallbackResolver`] tries the
//! direct-scrape adapter registered for the competitor's host and then the
//! paid API fallback; whatever is found is normalized to the base currency
//! and written through [`innkeep_core::store::PriceStore`].
//!
//! ```rust,ignore
//! let orchestrator = settings.build_orchestrator(store, "DKK")?;
//! let summary = orchestrator.run(today, &request, &cancel).await?;
//! println!("{summary}");
//! ```

pub mod adapter;
pub mod api_fallback;
pub mod currency;
pub mod error;
pub mod orchestrator;
pub mod politeness;
pub mod registry;
pub mod resolver;
pub mod session;
pub mod settings;
pub mod sites;
pub mod window;

#[cfg(test)]
mod mock;

pub use adapter::{Quote, Search, SourceAdapter};
pub use error::{Error, Result};
pub use orchestrator::{RunSummary, ScrapeOrchestrator, ScrapeRequest};
pub use settings::ScrapeSettings;
pub use window::{WindowPlan, generate_windows};
