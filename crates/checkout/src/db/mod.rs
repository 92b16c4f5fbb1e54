//! `PostgreSQL` access for the checkout service.
//!
//! The database only holds checkout sessions (the `tower_sessions.session`
//! table). Create it before the first start with:
//!
//! ```bash
//! cargo run -p shiplogic-cli -- migrate
//! ```

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tower_sessions_sqlx_store::PostgresStore;

/// Create a `PostgreSQL` connection pool.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Create the session schema and table if they do not exist.
///
/// # Errors
///
/// Returns `sqlx::Error` if the migration statements fail.
pub async fn migrate_sessions(pool: &PgPool) -> Result<(), sqlx::Error> {
    PostgresStore::new(pool.clone()).migrate().await
}
