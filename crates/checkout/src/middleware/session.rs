//! Session middleware configuration.
//!
//! The checkout remembers opt-in selections, the insurance toggle and the
//! last quote per shopper. Production uses the `PostgreSQL` store; any
//! other `SessionStore` (tests use `MemoryStore`) goes through
//! [`session_layer`].

use sqlx::PgPool;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::CheckoutConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "shiplogic_checkout_session";

/// Session expiry time in seconds (2 days).
const SESSION_EXPIRY_SECONDS: i64 = 2 * 24 * 60 * 60;

/// Create the session layer with `PostgreSQL` store.
///
/// The sessions table must exist; see [`crate::db::migrate_sessions`].
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &CheckoutConfig,
) -> SessionManagerLayer<PostgresStore> {
    let store = PostgresStore::new(pool.clone());
    session_layer(store, config.base_url.starts_with("https://"))
}

/// Session layer over any store.
#[must_use]
pub fn session_layer<S: SessionStore + Clone>(store: S, secure: bool) -> SessionManagerLayer<S> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
