//! ShipLogic checkout shipping library.
//!
//! Quotes carrier rates for a checkout package, manages the shopper's
//! opt-in and insurance choices, and exposes the flow as a JSON API.
//! The binary in `main.rs` wires this up with a `PostgreSQL` session store.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod address;
pub mod carrier;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod optins;
pub mod order_meta;
pub mod payload;
pub mod rates;
pub mod routes;
pub mod state;

use axum::{Router, extract::Request};
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore};

use carrier::CarrierTransport;
use state::AppState;

/// Build the checkout application router.
///
/// Sentry layers are added by the binary so the router can be driven
/// directly in tests.
pub fn app<T, S>(state: AppState<T>, sessions: SessionManagerLayer<S>) -> Router
where
    T: CarrierTransport + 'static,
    S: SessionStore + Clone,
{
    routes::routes::<T>()
        .layer(sessions)
        .layer(axum::middleware::from_fn(
            middleware::request_id_middleware,
        ))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}
