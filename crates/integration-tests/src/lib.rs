//! Integration test support for the ShipLogic checkout service.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shiplogic-integration-tests
//!
//! # Live carrier tests (need SHIPLOGIC_* credentials)
//! cargo test -p shiplogic-integration-tests -- --ignored
//! ```
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot`, an
//! in-memory session store, and a [`FakeCarrier`] standing in for ShipLogic.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::sync::Mutex;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use shiplogic_checkout::carrier::{CarrierError, CarrierPayload, CarrierTransport, Operation};
use shiplogic_checkout::config::{ShippingConfig, ShopAddress};
use shiplogic_checkout::middleware::session_layer;
use shiplogic_checkout::payload::PackingSettings;
use shiplogic_checkout::state::AppState;
use shiplogic_core::{AccountId, CurrencyCode};
use tower::ServiceExt;
use tower_sessions::MemoryStore;

/// Two quotes; the first has opt-in 1 applied.
pub const RATES: &str = r#"{"rates": [
    {"rate": 120, "service_level": {"code": "ECO", "description": "Economy"},
     "rate_adjustments": [{"id": 1}], "time_based_rate_adjustments": []},
    {"rate": 180, "service_level": {"code": "ONX", "description": "Overnight"}}
]}"#;

/// One regular and one time-based opt-in.
pub const OPT_INS: &str = r#"{
    "opt_in_rates": [{"id": 1, "name": "Signature Required", "charge_value": 25}],
    "opt_in_time_based_rates": [{"id": 9, "name": "Before 10:00", "charge_value": 80}]
}"#;

/// One pickup point near the receiver.
pub const LOCKERS: &str = r#"{"pickup_points": [
    {"pickup_point_id": 901, "pickup_point_provider": "tcg-locker",
     "address": {"company": "Gateway Locker", "entered_address": "1 Palm Blvd"},
     "trading_hours": "Mon-Sun 06:00-22:00"}
]}"#;

/// What the fake answers for an operation.
#[derive(Debug, Clone)]
pub enum Reply {
    Json(String),
    Status(u16),
}

/// Carrier stand-in answering every call to an operation the same way.
///
/// Unconfigured operations fail with status 500.
#[derive(Default)]
pub struct FakeCarrier {
    replies: Mutex<HashMap<Operation, Reply>>,
    calls: Mutex<Vec<(Operation, CarrierPayload)>>,
}

impl FakeCarrier {
    /// Fake that quotes [`RATES`] and [`OPT_INS`].
    #[must_use]
    pub fn quoting() -> Self {
        Self::default()
            .with(Operation::GetRates, Reply::Json(RATES.to_string()))
            .with(Operation::GetOptInRates, Reply::Json(OPT_INS.to_string()))
    }

    #[must_use]
    pub fn with(self, operation: Operation, reply: Reply) -> Self {
        self.set(operation, reply);
        self
    }

    pub fn set(&self, operation: Operation, reply: Reply) {
        self.replies.lock().unwrap().insert(operation, reply);
    }

    pub fn count(&self, operation: Operation) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(op, _)| *op == operation)
            .count()
    }

    /// Bodies sent for an operation, parsed, in call order.
    pub fn bodies(&self, operation: Operation) -> Vec<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(op, _)| *op == operation)
            .filter_map(|(_, payload)| match payload {
                CarrierPayload::Body(body) => serde_json::from_str(body).ok(),
                CarrierPayload::Query(_) => None,
            })
            .collect()
    }
}

impl CarrierTransport for FakeCarrier {
    async fn send(
        &self,
        operation: Operation,
        payload: CarrierPayload,
    ) -> Result<String, CarrierError> {
        self.calls.lock().unwrap().push((operation, payload));
        let reply = self.replies.lock().unwrap().get(&operation).cloned();
        match reply {
            Some(Reply::Json(body)) => Ok(body),
            Some(Reply::Status(status)) => Err(CarrierError::Api {
                operation,
                status,
                message: "fake carrier failure".to_string(),
            }),
            None => Err(CarrierError::Api {
                operation,
                status: 500,
                message: "not configured".to_string(),
            }),
        }
    }
}

/// Shop in Pretoria with insurance offered from R1500.
#[must_use]
pub fn settings() -> ShippingConfig {
    ShippingConfig {
        account_id: AccountId::new(77),
        shop: ShopAddress {
            contact_name: Some("Dispatch".to_string()),
            company_name: Some("Test Shop".to_string()),
            address_1: "1 Shop St".to_string(),
            address_2: None,
            suburb: Some("Arcadia".to_string()),
            city: "Pretoria".to_string(),
            state: "GP".to_string(),
            country: "ZA".to_string(),
            postal_code: "0083".to_string(),
        },
        packing: PackingSettings::default(),
        enable_lockers: false,
        billing_insurance: true,
        insurance_min_subtotal: Decimal::new(1500, 0),
        visible_opt_ins: vec!["signature_required".to_string(), "before_10:00".to_string()],
        currency: CurrencyCode::ZAR,
    }
}

/// A one-book package to Durban.
#[must_use]
pub fn package(cart_subtotal: u32) -> Value {
    json!({
        "destination": {
            "address": "5 Beach Rd",
            "city": "Durban",
            "state": "KZN",
            "country": "ZA",
            "postcode": "4001"
        },
        "contents": [{
            "product_id": "1",
            "name": "Book",
            "quantity": 1,
            "weight": 1,
            "length": 20,
            "width": 15,
            "height": 3
        }],
        "cart_subtotal": cart_subtotal
    })
}

/// In-process client that carries the session cookie between requests.
pub struct TestClient {
    app: Router,
    state: AppState<FakeCarrier>,
    cookie: Option<String>,
}

impl TestClient {
    #[must_use]
    pub fn new(carrier: FakeCarrier, settings: ShippingConfig) -> Self {
        let state = AppState::new(carrier, settings);
        let app = shiplogic_checkout::app(state.clone(), session_layer(MemoryStore::default(), false));
        Self {
            app,
            state,
            cookie: None,
        }
    }

    #[must_use]
    pub fn carrier(&self) -> &FakeCarrier {
        self.state.carrier()
    }

    pub async fn get(&mut self, uri: &str) -> (StatusCode, Value) {
        let request = Request::get(uri);
        self.send(request, Body::empty()).await
    }

    pub async fn post(&mut self, uri: &str, body: &Value) -> (StatusCode, Value) {
        let request = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
        self.send(request, Body::from(body.to_string())).await
    }

    async fn send(
        &mut self,
        mut request: axum::http::request::Builder,
        body: Body,
    ) -> (StatusCode, Value) {
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }

        let response = self
            .app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }
}
