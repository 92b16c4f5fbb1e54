//! Checkout configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CHECKOUT_DATABASE_URL` - `PostgreSQL` connection string for sessions
//!   (falls back to `DATABASE_URL`)
//! - `SHIPLOGIC_ACCOUNT_ID` - ShipLogic account id
//! - `SHOP_ADDRESS_1`, `SHOP_CITY`, `SHOP_STATE`, `SHOP_COUNTRY`,
//!   `SHOP_POSTAL_CODE` - Collection address (`SHOP_STATE` is a region code)
//! - Either `SHIPLOGIC_API_KEY` (bearer token, current API) or
//!   `SHIPLOGIC_ACCESS_KEY_ID` + `SHIPLOGIC_SECRET_ACCESS_KEY` (signed
//!   requests, legacy API)
//!
//! ## Optional
//! - `CHECKOUT_HOST` - Bind address (default: 127.0.0.1)
//! - `CHECKOUT_PORT` - Listen port (default: 3000)
//! - `CHECKOUT_BASE_URL` - Public URL (default: <http://localhost:3000>)
//! - `SHOP_CONTACT_NAME`, `SHOP_COMPANY_NAME`, `SHOP_ADDRESS_2`, `SHOP_SUBURB`
//! - `SHIPLOGIC_ENABLE_LOCKERS` - Offer pickup-point rates (default: false)
//! - `SHIPLOGIC_BILLING_INSURANCE` - Offer insurance (default: false)
//! - `SHIPLOGIC_INSURANCE_MIN_SUBTOTAL` - Subtotal that unlocks insurance
//!   (default: 1500)
//! - `SHIPLOGIC_VISIBLE_OPT_INS` - Comma-separated opt-in names to show
//! - `SHIPLOGIC_WEIGHT_UNIT` - kg, g, lbs or oz (default: kg)
//! - `SHIPLOGIC_DIMENSION_UNIT` - cm, m, mm or in (default: cm)
//! - `SHIPLOGIC_PARCEL_SIZES` - Box sizes as `LxWxH:maxKg,...` in cm
//! - `SHIPLOGIC_FLYER_SIZE` - Flyer size as `LxWxH:maxKg`
//! - `SHIPLOGIC_CURRENCY` - Display currency (default: ZAR)
//! - `SHIPLOGIC_LOG_PAYLOADS` - Log carrier payloads at INFO (default: false)
//! - `SHIPLOGIC_API_BASE`, `SHIPLOGIC_LEGACY_API_BASE` - API base overrides
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use rust_decimal::Decimal;
use secrecy::SecretString;
use shiplogic_core::{AccountId, CurrencyCode};
use thiserror::Error;

use crate::carrier::{API_BASE, LEGACY_API_BASE};
use crate::optins::normalize_opt_in_name;
use crate::payload::{BoxSize, DimensionUnit, PackingSettings, WeightUnit};

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Checkout service configuration.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL
    pub base_url: String,
    /// Carrier API access
    pub carrier: CarrierConfig,
    /// Shop and quoting settings
    pub shipping: ShippingConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Carrier API access.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct CarrierConfig {
    /// Bearer token; when non-blank the current API is used
    pub api_key: Option<SecretString>,
    /// Access key id for signed legacy requests
    pub access_key_id: Option<String>,
    /// Secret access key for signed legacy requests
    pub secret_access_key: Option<SecretString>,
    pub api_base: String,
    pub legacy_api_base: String,
    /// Log request and response bodies at INFO instead of DEBUG
    pub log_payloads: bool,
}

impl std::fmt::Debug for CarrierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CarrierConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("api_base", &self.api_base)
            .field("legacy_api_base", &self.legacy_api_base)
            .field("log_payloads", &self.log_payloads)
            .finish()
    }
}

/// The shop's collection address as configured.
#[derive(Debug, Clone, Default)]
pub struct ShopAddress {
    pub contact_name: Option<String>,
    pub company_name: Option<String>,
    pub address_1: String,
    pub address_2: Option<String>,
    pub suburb: Option<String>,
    pub city: String,
    /// Region code, e.g. `WC`
    pub state: String,
    pub country: String,
    pub postal_code: String,
}

/// Shop and quoting settings.
#[derive(Debug, Clone)]
pub struct ShippingConfig {
    pub account_id: AccountId,
    pub shop: ShopAddress,
    pub packing: PackingSettings,
    pub enable_lockers: bool,
    pub billing_insurance: bool,
    pub insurance_min_subtotal: Decimal,
    /// Normalized opt-in names the checkout may show
    pub visible_opt_ins: Vec<String>,
    pub currency: CurrencyCode,
}

impl CheckoutConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid,
    /// or if secrets fail validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = database_url_from_env()?;
        let host = get_parsed_env::<IpAddr>("CHECKOUT_HOST", "127.0.0.1")?;
        let port = get_parsed_env::<u16>("CHECKOUT_PORT", "3000")?;
        let base_url = get_env_or_default("CHECKOUT_BASE_URL", "http://localhost:3000");

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            carrier: CarrierConfig::from_env()?,
            shipping: ShippingConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl CarrierConfig {
    /// Load carrier access from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if neither credential type is configured or a
    /// secret fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = get_optional_env("SHIPLOGIC_API_KEY")
            .map(|key| {
                validate_secret_strength(&key, "SHIPLOGIC_API_KEY")?;
                Ok::<_, ConfigError>(SecretString::from(key))
            })
            .transpose()?;
        let access_key_id = get_optional_env("SHIPLOGIC_ACCESS_KEY_ID");
        let secret_access_key = get_optional_env("SHIPLOGIC_SECRET_ACCESS_KEY")
            .map(|secret| {
                validate_secret_strength(&secret, "SHIPLOGIC_SECRET_ACCESS_KEY")?;
                Ok::<_, ConfigError>(SecretString::from(secret))
            })
            .transpose()?;

        if api_key.is_none() {
            if access_key_id.is_none() {
                return Err(ConfigError::MissingEnvVar(
                    "SHIPLOGIC_API_KEY or SHIPLOGIC_ACCESS_KEY_ID".to_string(),
                ));
            }
            if secret_access_key.is_none() {
                return Err(ConfigError::MissingEnvVar(
                    "SHIPLOGIC_SECRET_ACCESS_KEY".to_string(),
                ));
            }
        }

        Ok(Self {
            api_key,
            access_key_id,
            secret_access_key,
            api_base: get_env_or_default("SHIPLOGIC_API_BASE", API_BASE),
            legacy_api_base: get_env_or_default("SHIPLOGIC_LEGACY_API_BASE", LEGACY_API_BASE),
            log_payloads: get_bool_env("SHIPLOGIC_LOG_PAYLOADS")?,
        })
    }
}

impl ShippingConfig {
    /// Load shop and quoting settings from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value
    /// cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let account_id = AccountId::new(get_required_parsed_env::<i64>("SHIPLOGIC_ACCOUNT_ID")?);

        let shop = ShopAddress {
            contact_name: get_optional_env("SHOP_CONTACT_NAME"),
            company_name: get_optional_env("SHOP_COMPANY_NAME"),
            address_1: get_required_env("SHOP_ADDRESS_1")?,
            address_2: get_optional_env("SHOP_ADDRESS_2"),
            suburb: get_optional_env("SHOP_SUBURB"),
            city: get_required_env("SHOP_CITY")?,
            state: get_required_env("SHOP_STATE")?,
            country: get_required_env("SHOP_COUNTRY")?,
            postal_code: get_required_env("SHOP_POSTAL_CODE")?,
        };

        let packing = PackingSettings {
            weight_unit: get_parsed_env::<WeightUnit>("SHIPLOGIC_WEIGHT_UNIT", "kg")?,
            dimension_unit: get_parsed_env::<DimensionUnit>("SHIPLOGIC_DIMENSION_UNIT", "cm")?,
            parcel_sizes: get_optional_env("SHIPLOGIC_PARCEL_SIZES")
                .map(|sizes| parse_box_sizes(&sizes, "SHIPLOGIC_PARCEL_SIZES"))
                .transpose()?
                .unwrap_or_default(),
            flyer_size: get_optional_env("SHIPLOGIC_FLYER_SIZE")
                .map(|size| {
                    BoxSize::from_str(&size).map_err(|e| {
                        ConfigError::InvalidEnvVar("SHIPLOGIC_FLYER_SIZE".to_string(), e.to_string())
                    })
                })
                .transpose()?,
        };

        let currency_code = get_env_or_default("SHIPLOGIC_CURRENCY", "ZAR");
        let currency = CurrencyCode::from_code(&currency_code).ok_or_else(|| {
            ConfigError::InvalidEnvVar(
                "SHIPLOGIC_CURRENCY".to_string(),
                format!("unsupported currency `{currency_code}`"),
            )
        })?;

        Ok(Self {
            account_id,
            shop,
            packing,
            enable_lockers: get_bool_env("SHIPLOGIC_ENABLE_LOCKERS")?,
            billing_insurance: get_bool_env("SHIPLOGIC_BILLING_INSURANCE")?,
            insurance_min_subtotal: get_parsed_env::<Decimal>(
                "SHIPLOGIC_INSURANCE_MIN_SUBTOTAL",
                "1500",
            )?,
            visible_opt_ins: parse_visible_opt_ins(
                &get_optional_env("SHIPLOGIC_VISIBLE_OPT_INS").unwrap_or_default(),
            ),
            currency,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
/// Session database URL from `CHECKOUT_DATABASE_URL`, falling back to
/// `DATABASE_URL`.
///
/// # Errors
///
/// Returns `ConfigError::MissingEnvVar` if neither is set.
pub fn database_url_from_env() -> Result<SecretString, ConfigError> {
    get_database_url("CHECKOUT_DATABASE_URL")
}

fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable. Blank values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to a default.
fn get_parsed_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a required environment variable.
fn get_required_parsed_env<T>(key: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_required_env(key)?
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Read a boolean flag. Unset means false.
fn get_bool_env(key: &str) -> Result<bool, ConfigError> {
    get_optional_env(key).map_or(Ok(false), |value| parse_bool(key, &value))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got `{other}`"),
        )),
    }
}

/// Parse `LxWxH:maxKg,...`.
fn parse_box_sizes(value: &str, key: &str) -> Result<Vec<BoxSize>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|size| !size.is_empty())
        .map(|size| {
            BoxSize::from_str(size)
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
        .collect()
}

/// Split and normalize the visible opt-in names.
fn parse_visible_opt_ins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|name| normalize_opt_in_name(name.trim()))
        .filter(|name| !name.is_empty())
        .collect()
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a credential is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}
