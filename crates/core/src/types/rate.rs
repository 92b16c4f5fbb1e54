//! Rate requests and the quotes the carrier returns for them.
//!
//! The request structs serialize directly into the carrier's JSON body. The
//! serialized bytes double as the cache key input, so field order and
//! omission rules here are part of the caching contract.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::address::Address;
use super::id::{AccountId, OptInRateId};
use super::parcel::Parcel;
use super::pickup_point::{PickupPoint, PickupPointId};

/// Body of a `rates` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentRateRequest {
    collection_address: Address,
    #[serde(flatten)]
    destination: Destination,
    parcels: Vec<Parcel>,
    account_id: AccountId,
    #[serde(with = "rust_decimal::serde::float")]
    declared_value: Decimal,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    opt_in_rates: Vec<OptInRateId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    opt_in_time_based_rates: Vec<OptInRateId>,
}

/// Where the shipment is delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Destination {
    /// Door-to-door delivery.
    Address { delivery_address: Address },
    /// Delivery to a locker / pickup point.
    PickupPoint {
        delivery_pickup_point_id: PickupPointId,
        delivery_pickup_point_provider: String,
    },
}

impl ShipmentRateRequest {
    /// Create a door-to-door rate request with no declared value and no
    /// opt-ins.
    #[must_use]
    pub const fn new(
        sender: Address,
        receiver: Address,
        parcels: Vec<Parcel>,
        account_id: AccountId,
    ) -> Self {
        Self {
            collection_address: sender,
            destination: Destination::Address {
                delivery_address: receiver,
            },
            parcels,
            account_id,
            declared_value: Decimal::ZERO,
            opt_in_rates: Vec::new(),
            opt_in_time_based_rates: Vec::new(),
        }
    }

    /// The value to declare for insurance purposes.
    ///
    /// Zero unless insurance is enabled. With insurance, the cart subtotal is
    /// used when present and non-zero, otherwise the contents cost. Negative
    /// inputs never produce a negative declared value.
    #[must_use]
    pub fn declared_value_for(
        insurance: bool,
        cart_subtotal: Option<Decimal>,
        contents_cost: Option<Decimal>,
    ) -> Decimal {
        if !insurance {
            return Decimal::ZERO;
        }

        cart_subtotal
            .filter(|value| !value.is_zero())
            .or_else(|| contents_cost.filter(|value| !value.is_zero()))
            .map_or(Decimal::ZERO, |value| value.max(Decimal::ZERO))
    }

    /// Set the declared value, clamping negatives to zero.
    #[must_use]
    pub fn with_declared_value(mut self, value: Decimal) -> Self {
        self.declared_value = value.max(Decimal::ZERO);
        self
    }

    /// Attach the shopper's selected opt-in ids.
    #[must_use]
    pub fn with_opt_ins(mut self, regular: Vec<OptInRateId>, time_based: Vec<OptInRateId>) -> Self {
        self.opt_in_rates = regular;
        self.opt_in_time_based_rates = time_based;
        self
    }

    /// Copy of this request delivered to a pickup point instead of the
    /// receiver's address.
    #[must_use]
    pub fn for_pickup_point(&self, point: &PickupPoint) -> Self {
        Self {
            destination: Destination::PickupPoint {
                delivery_pickup_point_id: point.pickup_point_id.clone(),
                delivery_pickup_point_provider: point.pickup_point_provider.clone(),
            },
            ..self.clone()
        }
    }

    #[must_use]
    pub const fn sender(&self) -> &Address {
        &self.collection_address
    }

    #[must_use]
    pub const fn destination(&self) -> &Destination {
        &self.destination
    }

    /// The receiver's address, if this is a door-to-door request.
    #[must_use]
    pub const fn delivery_address(&self) -> Option<&Address> {
        match &self.destination {
            Destination::Address { delivery_address } => Some(delivery_address),
            Destination::PickupPoint { .. } => None,
        }
    }

    #[must_use]
    pub fn parcels(&self) -> &[Parcel] {
        &self.parcels
    }

    #[must_use]
    pub const fn account_id(&self) -> AccountId {
        self.account_id
    }

    #[must_use]
    pub const fn declared_value(&self) -> Decimal {
        self.declared_value
    }

    #[must_use]
    pub fn opt_in_rates(&self) -> &[OptInRateId] {
        &self.opt_in_rates
    }

    #[must_use]
    pub fn opt_in_time_based_rates(&self) -> &[OptInRateId] {
        &self.opt_in_time_based_rates
    }
}

/// Body of a `rates/opt-in` request. Only the two addresses are sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptInRateRequest {
    pub collection_address: Address,
    pub delivery_address: Address,
}

/// Response body of a `rates` request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatesResponse {
    #[serde(default)]
    pub rates: Vec<RateQuote>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RatesResponse {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// The first quote; its adjustments reflect the opt-ins the carrier applied.
    #[must_use]
    pub fn first_quote(&self) -> Option<&RateQuote> {
        self.rates.first()
    }
}

/// A priced service level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateQuote {
    #[serde(rename = "rate", serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,
    pub service_level: ServiceLevel,
    #[serde(default)]
    pub rate_adjustments: Vec<RateAdjustment>,
    #[serde(default)]
    pub time_based_rate_adjustments: Vec<RateAdjustment>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RateQuote {
    /// Rewrite the service level so the quote names the pickup point it
    /// delivers to.
    ///
    /// Quotes without a description are left untouched.
    pub fn relabel_for_pickup_point(&mut self, point: &PickupPoint) {
        let Some(original) = self.service_level.description.take() else {
            return;
        };

        let company = &point.address.company;
        self.service_level.description = Some(format!(
            "{company} - {}. {}. {original}",
            point.address.entered_address, point.trading_hours
        ));
        self.service_level.code = format!(
            "{}/{}-{company}",
            self.service_level.code, point.pickup_point_id
        );
        self.service_level.pickup_point = Some(point.pickup_point_id.to_string());
    }

    /// Ids of the regular opt-ins the carrier applied to this quote.
    pub fn adjustment_ids(&self) -> impl Iterator<Item = OptInRateId> + '_ {
        self.rate_adjustments.iter().filter_map(|a| a.id)
    }

    /// Ids of the time-based opt-ins the carrier applied to this quote.
    pub fn time_based_adjustment_ids(&self) -> impl Iterator<Item = OptInRateId> + '_ {
        self.time_based_rate_adjustments.iter().filter_map(|a| a.id)
    }
}

/// Service level of a quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceLevel {
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_point: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A charge the carrier added to a quote for an applied opt-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateAdjustment {
    #[serde(default)]
    pub id: Option<OptInRateId>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::pickup_point::PickupPointAddress;

    fn address(city: &str) -> Address {
        Address::builder()
            .city(city)
            .zone("Gauteng")
            .country("ZA")
            .build()
            .unwrap()
    }

    fn request() -> ShipmentRateRequest {
        let parcel = Parcel::new(
            Decimal::TEN,
            Decimal::TEN,
            Decimal::TEN,
            "Book",
            1,
            Decimal::ONE,
        )
        .unwrap();
        ShipmentRateRequest::new(
            address("Pretoria"),
            address("Johannesburg"),
            vec![parcel],
            AccountId::new(5),
        )
    }

    fn locker() -> PickupPoint {
        PickupPoint {
            pickup_point_id: PickupPointId::Text("L42".to_string()),
            pickup_point_provider: "tcg-locker".to_string(),
            address: PickupPointAddress {
                company: "Mall Locker".to_string(),
                entered_address: "1 Mall Road".to_string(),
            },
            trading_hours: "Mon-Sun 08:00-20:00".to_string(),
        }
    }

    #[test]
    fn test_declared_value_without_insurance_is_zero() {
        let value = ShipmentRateRequest::declared_value_for(
            false,
            Some(Decimal::new(1000, 0)),
            Some(Decimal::new(900, 0)),
        );
        assert_eq!(value, Decimal::ZERO);
    }

    #[test]
    fn test_declared_value_prefers_subtotal() {
        let value =
            ShipmentRateRequest::declared_value_for(true, Some(Decimal::new(1000, 0)), None);
        assert_eq!(value, Decimal::new(1000, 0));

        let value = ShipmentRateRequest::declared_value_for(
            true,
            Some(Decimal::new(1000, 0)),
            Some(Decimal::new(900, 0)),
        );
        assert_eq!(value, Decimal::new(1000, 0));
    }

    #[test]
    fn test_declared_value_falls_back_to_contents_cost() {
        let value = ShipmentRateRequest::declared_value_for(
            true,
            Some(Decimal::ZERO),
            Some(Decimal::new(750, 0)),
        );
        assert_eq!(value, Decimal::new(750, 0));
    }

    #[test]
    fn test_declared_value_with_nothing_to_declare() {
        let value = ShipmentRateRequest::declared_value_for(true, None, None);
        assert_eq!(value, Decimal::ZERO);
    }

    #[test]
    fn test_declared_value_never_negative() {
        let value = ShipmentRateRequest::declared_value_for(true, Some(Decimal::new(-5, 0)), None);
        assert_eq!(value, Decimal::ZERO);
        assert_eq!(
            request().with_declared_value(Decimal::NEGATIVE_ONE).declared_value(),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_serialized_body_omits_empty_opt_ins() {
        let json = serde_json::to_value(request()).unwrap();

        assert!(json.get("opt_in_rates").is_none());
        assert!(json.get("opt_in_time_based_rates").is_none());
        assert_eq!(json["delivery_address"]["city"], "Johannesburg");
        assert_eq!(json["account_id"], 5);
        assert_eq!(json["declared_value"], 0.0);
    }

    #[test]
    fn test_serialized_body_includes_selected_opt_ins() {
        let body = request().with_opt_ins(vec![OptInRateId::new(3)], vec![]);
        let json = serde_json::to_value(body).unwrap();

        assert_eq!(json["opt_in_rates"], serde_json::json!([3]));
        assert!(json.get("opt_in_time_based_rates").is_none());
    }

    #[test]
    fn test_pickup_point_variant_replaces_delivery_address() {
        let body = request().for_pickup_point(&locker());
        let json = serde_json::to_value(&body).unwrap();

        assert!(json.get("delivery_address").is_none());
        assert_eq!(json["delivery_pickup_point_id"], "L42");
        assert_eq!(json["delivery_pickup_point_provider"], "tcg-locker");
        assert!(body.delivery_address().is_none());
    }

    #[test]
    fn test_numeric_pickup_point_id_stays_numeric() {
        let mut point = locker();
        point.pickup_point_id = PickupPointId::Number(901);
        let body = request().for_pickup_point(&point);

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["delivery_pickup_point_id"], 901);

        let back: ShipmentRateRequest = serde_json::from_value(json).unwrap();
        assert_eq!(back, body);
    }

    #[test]
    fn test_request_survives_session_round_trip() {
        let body = request().with_opt_ins(vec![OptInRateId::new(1)], vec![OptInRateId::new(2)]);
        let json = serde_json::to_string(&body).unwrap();
        let back: ShipmentRateRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, body);
    }

    #[test]
    fn test_relabel_for_pickup_point() {
        let mut quote: RateQuote = serde_json::from_str(
            r#"{"rate": 99.5, "service_level": {"code": "ECO", "description": "Economy"}}"#,
        )
        .unwrap();

        quote.relabel_for_pickup_point(&locker());

        assert_eq!(
            quote.service_level.description.as_deref(),
            Some("Mall Locker - 1 Mall Road. Mon-Sun 08:00-20:00. Economy")
        );
        assert_eq!(quote.service_level.code, "ECO/L42-Mall Locker");
        assert_eq!(quote.service_level.pickup_point.as_deref(), Some("L42"));
    }

    #[test]
    fn test_relabel_skips_quotes_without_description() {
        let mut quote: RateQuote =
            serde_json::from_str(r#"{"rate": 10, "service_level": {"code": "ECO"}}"#).unwrap();

        quote.relabel_for_pickup_point(&locker());

        assert_eq!(quote.service_level.code, "ECO");
        assert!(quote.service_level.pickup_point.is_none());
    }

    #[test]
    fn test_rates_response_keeps_unknown_fields() {
        let response: RatesResponse = serde_json::from_str(
            r#"{"message": "ok", "rates": [{"rate": "120.00", "rate_excluding_vat": 104.35,
                "service_level": {"code": "ECO", "description": "Economy", "id": 2},
                "rate_adjustments": [{"id": 7, "charge": 10}]}]}"#,
        )
        .unwrap();

        assert_eq!(response.extra["message"], "ok");
        let quote = response.first_quote().unwrap();
        assert_eq!(quote.price, Decimal::new(120, 0));
        assert!(quote.extra.contains_key("rate_excluding_vat"));
        assert_eq!(
            quote.adjustment_ids().collect::<Vec<_>>(),
            vec![OptInRateId::new(7)]
        );
    }
}
