//! Core types and trait definitions for the Innkeep booking backend.
//!
//! This crate has no HTTP or database dependencies. The
//! storage backend, the JSON API and the competitor-price pipeline all depend
//! on it.

pub mod booking;
pub mod competitor;
pub mod error;
pub mod room;
pub mod stay;
pub mod store;
pub mod sync;

pub use error::{Error, Result};
pub use stay::StayRange;
