//! Opt-in service add-ons offered by the carrier.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::OptInRateId;

/// An optional add-on (e.g., "Signature Required") with its own charge.
///
/// Selection state is not stored here; it is derived from the rate
/// adjustments the carrier applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptInRate {
    pub id: OptInRateId,
    pub name: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub charge_value: Decimal,
}

/// The two opt-in catalogs returned by the `rates/opt-in` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptInCatalog {
    #[serde(default)]
    pub opt_in_rates: Vec<OptInRate>,
    #[serde(default)]
    pub opt_in_time_based_rates: Vec<OptInRate>,
}

impl OptInCatalog {
    /// True when neither catalog has entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.opt_in_rates.is_empty() && self.opt_in_time_based_rates.is_empty()
    }

    /// Iterate over every entry tagged with the catalog it came from.
    /// Regular entries come first.
    pub fn entries(&self) -> impl Iterator<Item = (OptInKind, &OptInRate)> {
        self.opt_in_rates
            .iter()
            .map(|rate| (OptInKind::Regular, rate))
            .chain(
                self.opt_in_time_based_rates
                    .iter()
                    .map(|rate| (OptInKind::TimeBased, rate)),
            )
    }
}

/// Which catalog an opt-in belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptInKind {
    Regular,
    TimeBased,
}
