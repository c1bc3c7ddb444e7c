//! JSON HTTP API for Innkeep.
//!
//! Exposes an axum [`Router`] backed by any store implementing the
//! [`Backend`] traits. Auth, TLS and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = innkeep_api::api_router(Arc::new(store));
//! axum::serve(listener, app).await?;
//! ```

pub mod availability;
pub mod bookings;
pub mod error;
pub mod extract;
pub mod prices;
pub mod rooms;

use std::sync::Arc;

use axum::{
  Json, Router,
  routing::{get, post},
};
use innkeep_core::store::{BookingLedger, InventoryLedger, PriceStore};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Everything the HTTP surface reads or writes.
pub trait Backend: InventoryLedger + BookingLedger + PriceStore + 'static {}

impl<T> Backend for T where T: InventoryLedger + BookingLedger + PriceStore + 'static {}

/// Build a fully-materialised API router for `store`.
pub fn api_router<S: Backend>(store: Arc<S>) -> Router<()> {
  Router::new()
    // Inventory
    .route("/rooms", get(rooms::list::<S>))
    .route("/rooms/{id}", get(rooms::get_one::<S>))
    .route("/availability", get(availability::list::<S>).post(availability::set::<S>))
    .route("/check-availability", post(availability::check::<S>))
    // Bookings
    .route("/bookings", post(bookings::create::<S>))
    .route("/bookings/{id}", get(bookings::get_one::<S>).patch(bookings::patch::<S>))
    // Competitor prices
    .route("/price-observations", get(prices::list::<S>))
    .route("/health", get(health))
    .layer(TraceLayer::new_for_http())
    .with_state(store)
}

/// `GET /health`
async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }
