//! Configuration and bootstrap helpers for the `innkeep` binary.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use innkeep_core::{
  competitor::CompetitorConfig,
  room::Room,
  store::{InventoryLedger, PriceStore},
};
use innkeep_scrape::ScrapeSettings;
use innkeep_store_sqlite::SqliteStore;
use rust_decimal::Decimal;
use serde::Deserialize;

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:          String,
  #[serde(default = "default_port")]
  pub port:          u16,
  #[serde(default = "default_store_path")]
  pub store_path:    PathBuf,
  /// ISO 4217 code every price is stored in.
  #[serde(default = "default_base_currency")]
  pub base_currency: String,
  /// Rooms provisioned at startup. Existing rooms are left as stored.
  #[serde(default)]
  pub rooms:         Vec<RoomSeed>,
  /// Competitors upserted at startup.
  #[serde(default)]
  pub competitors:   Vec<CompetitorConfig>,
  #[serde(default)]
  pub scrape:        ScrapeSettings,
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("innkeep.db") }
fn default_base_currency() -> String { "DKK".into() }

#[derive(Debug, Clone, Deserialize)]
pub struct RoomSeed {
  pub id:            i64,
  pub name:          String,
  pub category:      String,
  pub max_occupancy: u32,
  pub base_price:    Decimal,
  #[serde(default = "default_active")]
  pub active:        bool,
}

fn default_active() -> bool { true }

impl From<RoomSeed> for Room {
  fn from(seed: RoomSeed) -> Self {
    Room {
      id:            seed.id,
      name:          seed.name,
      category:      seed.category,
      max_occupancy: seed.max_occupancy,
      base_price:    seed.base_price,
      active:        seed.active,
    }
  }
}

impl ServerConfig {
  /// Layer the optional file at `path` under `INNKEEP_*` environment
  /// variables. Nested keys use a double underscore, e.g.
  /// `INNKEEP_SCRAPE__SERPAPI_KEY`.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("INNKEEP").separator("__"))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Bootstrap ───────────────────────────────────────────────────────────────

/// Provision seed rooms and upsert seed competitors.
pub async fn seed<S>(store: &S, config: &ServerConfig) -> Result<(), innkeep_core::Error>
where
  S: InventoryLedger + PriceStore,
{
  for seed in &config.rooms {
    let room = store
      .provision_room(seed.clone().into())
      .await
      .map_err(Into::<innkeep_core::Error>::into)?;
    tracing::debug!(room_id = room.id, name = %room.name, "room provisioned");
  }
  for competitor in &config.competitors {
    PriceStore::upsert_competitor(store, competitor.clone())
      .await
      .map_err(Into::<innkeep_core::Error>::into)?;
  }
  tracing::info!(
    rooms = config.rooms.len(),
    competitors = config.competitors.len(),
    "seed data applied"
  );
  Ok(())
}

/// Flush and close the store once every other handle to it is gone.
pub async fn close_store(store: Arc<SqliteStore>) -> anyhow::Result<()> {
  match Arc::into_inner(store) {
    Some(store) => store.close().await.context("failed to close store"),
    None => {
      tracing::warn!("store still in use at shutdown, leaving it to drop");
      Ok(())
    }
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
