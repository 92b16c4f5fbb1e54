//! Rates for delivery to the closest pickup point.

use shiplogic_core::{PickupPointsResponse, RateQuote, RatesResponse, ShipmentRateRequest};
use tracing::{debug, instrument};

use super::RateService;
use super::cache::{self, CacheValue, cache_key};
use crate::carrier::{self, CarrierError, CarrierPayload, CarrierTransport, Operation};

impl<T: CarrierTransport> RateService<T> {
    /// Rates for the pickup point closest to the receiver's city.
    ///
    /// Quotes are relabelled to name the pickup point. No pickup points, or
    /// a request that is already addressed to one, yields no rates.
    ///
    /// # Errors
    ///
    /// Returns `CarrierError` if the search or the rate request fails.
    #[instrument(skip_all)]
    pub async fn get_locker_rates(
        &self,
        request: &ShipmentRateRequest,
    ) -> Result<Vec<RateQuote>, CarrierError> {
        let Some(receiver) = request.delivery_address() else {
            return Ok(Vec::new());
        };

        let raw = self
            .inner
            .transport
            .send(
                Operation::GetLockerLocations,
                CarrierPayload::Query(receiver.city().to_string()),
            )
            .await?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        let locations: PickupPointsResponse = carrier::decode(&raw)?;
        let Some(point) = locations.closest() else {
            debug!(city = receiver.city(), "No pickup points near receiver");
            return Ok(Vec::new());
        };

        let locker_request = request.for_pickup_point(point);
        let body = serde_json::to_string(&locker_request)?;
        let key = cache_key(cache::LOCKER_RATES, body.as_bytes());

        if let Some(CacheValue::LockerRates(rates)) = self.inner.cache.get(&key).await {
            debug!(cache_key = %key, "Cache hit for locker rates");
            return Ok(rates);
        }

        let raw = self
            .inner
            .transport
            .send(Operation::GetRates, CarrierPayload::Body(body))
            .await?;
        let RatesResponse { mut rates, .. } = carrier::decode(&raw)?;

        for quote in &mut rates {
            quote.relabel_for_pickup_point(point);
        }

        if !rates.is_empty() {
            self.inner
                .cache
                .insert(key, CacheValue::LockerRates(rates.clone()))
                .await;
        }

        Ok(rates)
    }
}
