//! Application state shared across handlers.

use std::sync::Arc;

use crate::carrier::CarrierClient;
use crate::config::ShippingConfig;
use crate::rates::RateService;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Generic over the carrier transport so the
/// router can be driven by a scripted carrier in tests.
pub struct AppState<T = CarrierClient> {
    inner: Arc<AppStateInner<T>>,
}

struct AppStateInner<T> {
    rates: RateService<T>,
}

impl<T> Clone for AppState<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: crate::carrier::CarrierTransport> AppState<T> {
    /// Create a new application state around a carrier transport.
    #[must_use]
    pub fn new(transport: T, shipping: ShippingConfig) -> Self {
        Self::from_service(RateService::new(transport, shipping))
    }

    /// Create state from an existing rate service.
    #[must_use]
    pub fn from_service(rates: RateService<T>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { rates }),
        }
    }

    /// Get a reference to the rate orchestrator.
    #[must_use]
    pub fn rates(&self) -> &RateService<T> {
        &self.inner.rates
    }

    /// Get a reference to the shop and quoting settings.
    #[must_use]
    pub fn shipping(&self) -> &ShippingConfig {
        self.inner.rates.settings()
    }

    /// Get a reference to the carrier transport.
    #[must_use]
    pub fn carrier(&self) -> &T {
        self.inner.rates.transport()
    }
}
