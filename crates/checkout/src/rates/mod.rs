//! Rate orchestration.
//!
//! # Flow
//!
//! 1. Resolve sender and receiver addresses
//! 2. Fetch the opt-in catalog for the address pair (cached, failures
//!    degrade to an empty catalog)
//! 3. Build the `rates` body: parcels, declared value, selected opt-ins
//! 4. Look the body up by content hash; a hit skips the carrier
//! 5. On a miss, call `getRates` and, when lockers are enabled, append rates
//!    for the closest pickup point
//! 6. Cache non-empty results for 5 minutes
//!
//! Carrier failures never fail the request: the outcome carries an empty
//! rate set and a notice for the shopper instead.

pub mod cache;
mod locker;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::{Deserialize, Serialize};
use shiplogic_core::{
    Address, OptInCatalog, OptInRateRequest, RatesResponse, ShipmentRateRequest,
};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::address::{AddressResolutionError, RegionTable};
use crate::carrier::{self, CarrierError, CarrierPayload, CarrierTransport, Operation};
use crate::config::ShippingConfig;
use crate::models::{RatePackage, SelectedOptIns};
use crate::payload::{self, PayloadBuildError};
use cache::{CacheValue, cache_key};

/// How long carrier results stay cached.
pub const CACHE_TTL: Duration = Duration::from_secs(300);

const CACHE_CAPACITY: u64 = 1000;

/// Errors that stop a quote before the carrier is involved.
#[derive(Debug, Error)]
pub enum ShippingError {
    #[error(transparent)]
    Address(#[from] AddressResolutionError),

    #[error(transparent)]
    Payload(#[from] PayloadBuildError),

    #[error("failed to encode rate request: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Everything needed to quote one package.
#[derive(Debug, Clone)]
pub struct RateContext {
    pub package: RatePackage,
    pub insurance: bool,
    pub selected: SelectedOptIns,
}

/// The `{rates, opt_in_rates}` pair returned to the checkout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateBundle {
    pub rates: RatesResponse,
    pub opt_in_rates: OptInCatalog,
}

/// Severity of a checkout notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Error,
    Notice,
}

/// A message for the shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutNotice {
    pub level: NoticeLevel,
    pub message: String,
}

impl CheckoutNotice {
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Result of a quote.
#[derive(Debug, Clone)]
pub struct RateOutcome {
    pub bundle: RateBundle,
    /// Set when the carrier failed and `bundle.rates` is empty because of it.
    pub notice: Option<CheckoutNotice>,
    /// The body the rates were priced with.
    pub request: ShipmentRateRequest,
}

/// Quotes packages against the carrier with a shared result cache.
pub struct RateService<T> {
    inner: Arc<RateServiceInner<T>>,
}

struct RateServiceInner<T> {
    transport: T,
    settings: ShippingConfig,
    regions: RegionTable,
    cache: Cache<String, CacheValue>,
}

impl<T> Clone for RateService<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: CarrierTransport> RateService<T> {
    /// Create a service with the built-in region table.
    #[must_use]
    pub fn new(transport: T, settings: ShippingConfig) -> Self {
        Self::with_regions(transport, settings, RegionTable::default())
    }

    /// Create a service with a custom region table.
    #[must_use]
    pub fn with_regions(transport: T, settings: ShippingConfig, regions: RegionTable) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(RateServiceInner {
                transport,
                settings,
                regions,
                cache,
            }),
        }
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    #[must_use]
    pub fn settings(&self) -> &ShippingConfig {
        &self.inner.settings
    }

    /// Quote a package.
    ///
    /// # Errors
    ///
    /// Returns `ShippingError` if an address cannot be resolved or the
    /// parcels cannot be built. Carrier failures are reported through
    /// [`RateOutcome::notice`] instead.
    #[instrument(skip(self, context), fields(city = %context.package.destination.city))]
    pub async fn get_rates(&self, context: &RateContext) -> Result<RateOutcome, ShippingError> {
        let settings = &self.inner.settings;
        let sender = self.inner.regions.resolve_sender(&settings.shop)?;
        let receiver = self.inner.regions.resolve_receiver(&context.package)?;

        let opt_in_rates = self.get_opt_in_rates(&sender, &receiver).await;

        let parcels = payload::build_parcels(&settings.packing, &context.package.contents)?;
        let declared_value = ShipmentRateRequest::declared_value_for(
            context.insurance,
            context.package.cart_subtotal,
            context.package.contents_cost,
        );
        let request = ShipmentRateRequest::new(sender, receiver, parcels, settings.account_id)
            .with_declared_value(declared_value)
            .with_opt_ins(
                context.selected.regular.clone(),
                context.selected.time_based.clone(),
            );

        let body = serde_json::to_string(&request)?;
        let key = cache_key(cache::RATES, body.as_bytes());

        if let Some(CacheValue::Rates(rates)) = self.inner.cache.get(&key).await {
            debug!(cache_key = %key, "Cache hit for rates");
            return Ok(RateOutcome {
                bundle: RateBundle {
                    rates: *rates,
                    opt_in_rates,
                },
                notice: None,
                request,
            });
        }

        match self.fetch_rates(&request, body).await {
            Ok(rates) => {
                if !rates.is_empty() {
                    self.inner
                        .cache
                        .insert(key, CacheValue::Rates(Box::new(rates.clone())))
                        .await;
                }
                Ok(RateOutcome {
                    bundle: RateBundle {
                        rates,
                        opt_in_rates,
                    },
                    notice: None,
                    request,
                })
            }
            Err(e) => {
                warn!(error = %e, "Carrier rate request failed");
                Ok(RateOutcome {
                    bundle: RateBundle {
                        rates: RatesResponse::default(),
                        opt_in_rates,
                    },
                    notice: Some(CheckoutNotice::error(e.to_string())),
                    request,
                })
            }
        }
    }

    /// Opt-in catalog for an address pair.
    ///
    /// Keyed on the two addresses only. Any failure yields an empty catalog,
    /// and empty catalogs are not cached.
    #[instrument(skip_all)]
    pub async fn get_opt_in_rates(&self, sender: &Address, receiver: &Address) -> OptInCatalog {
        let request = OptInRateRequest {
            collection_address: sender.clone(),
            delivery_address: receiver.clone(),
        };
        let body = match serde_json::to_string(&request) {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "Failed to encode opt-in request");
                return OptInCatalog::default();
            }
        };
        let key = cache_key(cache::OPT_IN, body.as_bytes());

        if let Some(CacheValue::OptIns(catalog)) = self.inner.cache.get(&key).await {
            debug!(cache_key = %key, "Cache hit for opt-in rates");
            return *catalog;
        }

        let catalog = match self
            .inner
            .transport
            .send(Operation::GetOptInRates, CarrierPayload::Body(body))
            .await
            .and_then(|raw| carrier::decode::<OptInCatalog>(&raw))
        {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!(error = %e, "Opt-in rates unavailable");
                return OptInCatalog::default();
            }
        };

        if !catalog.is_empty() {
            self.inner
                .cache
                .insert(key, CacheValue::OptIns(Box::new(catalog.clone())))
                .await;
        }

        catalog
    }

    /// Call `getRates` and append locker rates when enabled.
    async fn fetch_rates(
        &self,
        request: &ShipmentRateRequest,
        body: String,
    ) -> Result<RatesResponse, CarrierError> {
        let raw = self
            .inner
            .transport
            .send(Operation::GetRates, CarrierPayload::Body(body))
            .await?;
        let mut rates: RatesResponse = carrier::decode(&raw)?;

        if self.inner.settings.enable_lockers {
            let locker_rates = self.get_locker_rates(request).await?;
            rates.rates.extend(locker_rates);
        }

        Ok(rates)
    }
}
