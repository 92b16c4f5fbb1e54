//! One-shot rate quote from a package file.
//!
//! # Usage
//!
//! ```bash
//! shiplogic-cli quote --file package.json --opt-in 12 --insurance
//! shiplogic-cli quote --file package.yaml
//! ```
//!
//! The file holds a checkout package: `destination`, `contents` and
//! optionally `cart_subtotal`, `contents_cost` and `billing_company`.
//! Carrier and shop settings come from the same environment variables as
//! the checkout service.

use std::path::Path;

use shiplogic_checkout::carrier::CarrierClient;
use shiplogic_checkout::config::{CarrierConfig, ShippingConfig};
use shiplogic_checkout::models::{RatePackage, SelectedOptIns};
use shiplogic_checkout::rates::{RateContext, RateService};
use shiplogic_core::OptInRateId;

use super::CommandError;

/// Options for a quote.
#[derive(Debug, Default)]
pub struct QuoteOptions {
    pub opt_ins: Vec<i64>,
    pub time_based_opt_ins: Vec<i64>,
    pub insurance: bool,
}

/// Read a package from a JSON or YAML file (by extension).
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn read_package(path: &Path) -> Result<RatePackage, CommandError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CommandError::Read {
        path: path.display().to_string(),
        source,
    })?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext, "yaml" | "yml"));

    if is_yaml {
        serde_yaml::from_str(&contents).map_err(|e| CommandError::Package(e.to_string()))
    } else {
        serde_json::from_str(&contents).map_err(|e| CommandError::Package(e.to_string()))
    }
}

/// Quote the package and return the outcome as pretty JSON.
///
/// # Errors
///
/// Returns an error if configuration is incomplete, the file is invalid, or
/// an address cannot be resolved. Carrier failures are reported in the
/// output's `notice`.
pub async fn run(path: &Path, options: QuoteOptions) -> Result<String, CommandError> {
    let carrier = CarrierClient::new(&CarrierConfig::from_env()?);
    let service = RateService::new(carrier, ShippingConfig::from_env()?);

    let context = RateContext {
        package: read_package(path)?,
        insurance: options.insurance,
        selected: SelectedOptIns {
            regular: options.opt_ins.into_iter().map(OptInRateId::new).collect(),
            time_based: options
                .time_based_opt_ins
                .into_iter()
                .map(OptInRateId::new)
                .collect(),
        },
    };

    let outcome = service.get_rates(&context).await?;
    if let Some(notice) = &outcome.notice {
        tracing::warn!(message = %notice.message, "Carrier returned no rates");
    }

    Ok(serde_json::to_string_pretty(&serde_json::json!({
        "rates": outcome.bundle.rates,
        "opt_in_rates": outcome.bundle.opt_in_rates,
        "notice": outcome.notice,
        "request": outcome.request,
    }))?)
}
