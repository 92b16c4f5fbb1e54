//! Cache types for the rate orchestrator.

use sha2::{Digest, Sha256};
use shiplogic_core::{OptInCatalog, RateQuote, RatesResponse};

/// Prefix for `rates` results.
pub const RATES: &str = "rates";

/// Prefix for opt-in catalogs.
pub const OPT_IN: &str = "opt-in";

/// Prefix for locker (pickup point) rates.
pub const LOCKER_RATES: &str = "locker-rates";

/// Values stored in the cache.
#[derive(Clone)]
pub enum CacheValue {
    Rates(Box<RatesResponse>),
    OptIns(Box<OptInCatalog>),
    LockerRates(Vec<RateQuote>),
}

/// Cache key for a request body: `{prefix}:{sha256(body) as hex}`.
///
/// `body` must be the exact bytes sent to the carrier.
#[must_use]
pub fn cache_key(prefix: &str, body: &[u8]) -> String {
    format!("{prefix}:{}", hex::encode(Sha256::digest(body)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_prefixed_sha256() {
        assert_eq!(
            cache_key(RATES, b"abc"),
            "rates:ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_one_byte_changes_the_key() {
        assert_ne!(
            cache_key(RATES, br#"{"opt_in_rates":[1]}"#),
            cache_key(RATES, br#"{"opt_in_rates":[2]}"#)
        );
    }

    #[test]
    fn test_prefix_separates_namespaces() {
        assert_ne!(cache_key(RATES, b"{}"), cache_key(LOCKER_RATES, b"{}"));
    }
}
