//! HTTP route handlers for the checkout shipping flow.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Health check
//!
//! # Rates
//! POST /rates                   - Quote a package, remember the result
//!
//! # Opt-ins
//! GET  /shipping-options        - Opt-in display list for the last quote
//! POST /update-shipping-options - Replace the selected opt-ins
//!
//! # Insurance
//! GET  /insurance               - Whether insurance is offered and ticked
//! POST /insurance               - Tick or untick insurance
//!
//! # Orders
//! GET  /order-meta              - Metadata to write onto the finalized order
//! POST /shipments               - Create a shipment from the last quote
//! ```
//!
//! All endpoints speak JSON and keep their state in the shopper's session.

pub mod insurance;
pub mod order_meta;
pub mod rates;
pub mod shipments;
pub mod shipping_options;

use axum::{
    Router,
    routing::{get, post},
};

use crate::carrier::CarrierTransport;
use crate::state::AppState;

/// Build the checkout router.
pub fn routes<T: CarrierTransport + 'static>() -> Router<AppState<T>> {
    Router::new()
        .route("/health", get(health))
        .route("/rates", post(rates::calculate::<T>))
        .route("/shipping-options", get(shipping_options::show::<T>))
        .route(
            "/update-shipping-options",
            post(shipping_options::update),
        )
        .route(
            "/insurance",
            get(insurance::show::<T>).post(insurance::update),
        )
        .route("/order-meta", get(order_meta::show))
        .route("/shipments", post(shipments::create::<T>))
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
