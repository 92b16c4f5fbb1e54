//! Session table migration.
//!
//! # Usage
//!
//! ```bash
//! shiplogic-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `CHECKOUT_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

use shiplogic_checkout::{config, db};

use super::CommandError;

/// Create the checkout session table.
///
/// # Errors
///
/// Returns an error if the database URL is missing or the migration fails.
pub async fn sessions() -> Result<(), CommandError> {
    let database_url = config::database_url_from_env()?;

    tracing::info!("Connecting to checkout database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Creating session table...");
    db::migrate_sessions(&pool).await?;

    tracing::info!("Session migration complete!");
    Ok(())
}
