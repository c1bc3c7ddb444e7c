//! SQLite backend for the Innkeep stores.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. Every multi-statement write runs
//! inside a single `IMMEDIATE` transaction on that thread.

mod bookings;
mod encode;
mod inventory;
mod prices;
mod schema;
mod store;
mod sync_log;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
