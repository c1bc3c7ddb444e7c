//! innkeep server binary.
//!
//! Reads `innkeep.toml` (or the path given with `--config`), opens the SQLite
//! store, applies seed data and then either serves the JSON API or runs one
//! competitor price scrape.
//!
//! ```
//! cargo run -p innkeep-server -- serve
//! cargo run -p innkeep-server -- scrape --competitor "Harbour Inn" --count 2
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use innkeep_scrape::{ScrapeRequest, WindowPlan};
use innkeep_server::{ServerConfig, close_store, expand_tilde, seed};
use innkeep_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Innkeep inventory and price intelligence")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "innkeep.toml", global = true)]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the JSON API.
  Serve,
  /// Scrape competitor prices once and exit.
  Scrape(ScrapeArgs),
}

#[derive(Args)]
struct ScrapeArgs {
  /// Only scrape these competitors (repeatable). Defaults to every enabled
  /// competitor.
  #[arg(short = 'n', long = "competitor")]
  competitors: Vec<String>,
  /// Days from today to the first check-in.
  #[arg(long)]
  offset:      Option<u32>,
  /// Days between consecutive check-ins.
  #[arg(long)]
  stride:      Option<u32>,
  /// Number of date windows.
  #[arg(long)]
  count:       Option<u32>,
  /// Nights per window.
  #[arg(long)]
  stay:        Option<u32>,
  #[arg(long)]
  guests:      Option<u32>,
  /// Delete all stored observations before scraping.
  #[arg(long)]
  purge:       bool,
  /// Print the run summary as JSON.
  #[arg(long)]
  json:        bool,
}

impl ScrapeArgs {
  fn request(&self, config: &ServerConfig) -> ScrapeRequest {
    let base = config.scrape.windows;
    ScrapeRequest {
      competitors: self.competitors.clone(),
      plan:        WindowPlan {
        offset_days: self.offset.unwrap_or(base.offset_days),
        stride_days: self.stride.unwrap_or(base.stride_days),
        count:       self.count.unwrap_or(base.count),
        stay_nights: self.stay.unwrap_or(base.stay_nights),
      },
      guests:      self.guests.unwrap_or(config.scrape.default_guests),
      purge:       self.purge,
    }
  }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let config = ServerConfig::load(&cli.config).context("failed to load configuration")?;

  let store_path = expand_tilde(&config.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  seed(&store, &config).await.context("failed to apply seed data")?;

  let store = Arc::new(store);
  let outcome = match cli.command {
    Command::Serve => serve(store.clone(), &config).await,
    Command::Scrape(args) => scrape(store.clone(), &config, &args).await,
  };
  close_store(store).await?;
  outcome
}

async fn serve(store: Arc<SqliteStore>, config: &ServerConfig) -> anyhow::Result<()> {
  let app = innkeep_api::api_router(store);
  let address = config.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(async {
      let _ = tokio::signal::ctrl_c().await;
      tracing::info!("shutting down");
    })
    .await
    .context("server error")?;

  Ok(())
}

async fn scrape(
  store: Arc<SqliteStore>,
  config: &ServerConfig,
  args: &ScrapeArgs,
) -> anyhow::Result<()> {
  let orchestrator = config
    .scrape
    .build_orchestrator(store, &config.base_currency)
    .context("failed to build scrape pipeline")?;

  let cancel = CancellationToken::new();
  tokio::spawn({
    let cancel = cancel.clone();
    async move {
      if tokio::signal::ctrl_c().await.is_ok() {
        tracing::warn!("interrupt received, finishing the current cell");
        cancel.cancel();
      }
    }
  });

  let today = chrono::Local::now().date_naive();
  let request = args.request(config);
  let summary = orchestrator
    .run(today, &request, &cancel)
    .await
    .context("scrape run failed")?;

  if args.json {
    println!("{}", serde_json::to_string_pretty(&summary)?);
  } else {
    println!("{summary}");
  }
  Ok(())
}
