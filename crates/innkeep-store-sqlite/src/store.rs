//! [`SqliteStore`], the SQLite implementation of every Innkeep store trait.
//!
//! The trait impls live next to the SQL they run: `inventory.rs`,
//! `bookings.rs`, `prices.rs` and `sync_log.rs`.

use std::path::Path;

use crate::{Result, schema::SCHEMA};

/// The shared Innkeep database, backed by a single SQLite file.
///
/// Cloning is cheap. The inner connection is reference-counted and every
/// clone talks to the same connection thread, which executes calls one at a
/// time.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Flush and close the underlying connection.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `f` on the connection thread.
  ///
  /// `f` returns the crate [`Result`], so domain rejections raised inside a
  /// transaction travel back unchanged; dropping an uncommitted transaction on
  /// that path rolls it back.
  pub(crate) async fn with_conn<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&mut rusqlite::Connection) -> Result<T> + Send + 'static,
    T: Send + 'static,
  {
    self.conn.call(move |conn| Ok(f(conn))).await?
  }
}
