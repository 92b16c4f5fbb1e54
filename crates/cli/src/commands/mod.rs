//! CLI subcommands.

pub mod migrate;
pub mod quote;
pub mod shipments;

use shiplogic_checkout::carrier::CarrierError;
use shiplogic_checkout::config::ConfigError;
use shiplogic_checkout::rates::ShippingError;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database connection or migration error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Input file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    /// Input file is not a valid package.
    #[error("Invalid package file: {0}")]
    Package(String),

    /// Quoting failed before the carrier was called.
    #[error("Shipping error: {0}")]
    Shipping(#[from] ShippingError),

    /// Carrier call failed.
    #[error("Carrier error: {0}")]
    Carrier(#[from] CarrierError),

    /// Output could not be encoded.
    #[error("Encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}
