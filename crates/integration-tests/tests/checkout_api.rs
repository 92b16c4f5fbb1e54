//! End-to-end checkout flows through the router with a fake carrier.

use axum::http::StatusCode;
use serde_json::{Value, json};
use shiplogic_checkout::carrier::Operation;
use shiplogic_integration_tests::{FakeCarrier, Reply, TestClient, package, settings};

fn client() -> TestClient {
    TestClient::new(FakeCarrier::quoting(), settings())
}

#[tokio::test]
async fn test_health() {
    let mut client = client();
    let (status, body) = client.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("ok".to_string()));
}

// ============================================================================
// Rates
// ============================================================================

#[tokio::test]
async fn test_rates_return_quotes_and_opt_in_catalog() {
    let mut client = client();

    let (status, body) = client.post("/rates", &package(1000)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rates"]["rates"].as_array().unwrap().len(), 2);
    assert_eq!(body["opt_in_rates"]["opt_in_rates"][0]["id"], 1);
    assert!(body.get("notice").is_none());
}

#[tokio::test]
async fn test_identical_quotes_call_the_carrier_once() {
    let mut client = client();

    client.post("/rates", &package(1000)).await;
    client.post("/rates", &package(1000)).await;

    assert_eq!(client.carrier().count(Operation::GetRates), 1);
    assert_eq!(client.carrier().count(Operation::GetOptInRates), 1);
}

#[tokio::test]
async fn test_carrier_failure_returns_notice_and_no_rates() {
    let carrier = FakeCarrier::quoting().with(Operation::GetRates, Reply::Status(503));
    let mut client = TestClient::new(carrier, settings());

    let (status, body) = client.post("/rates", &package(1000)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["rates"]["rates"].as_array().unwrap().is_empty());
    assert_eq!(body["notice"]["level"], "error");
}

#[tokio::test]
async fn test_unknown_region_is_rejected() {
    let mut client = client();
    let mut package = package(1000);
    package["destination"]["state"] = json!("XX");

    let (status, body) = client.post("/rates", &package).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert_eq!(client.carrier().count(Operation::GetRates), 0);
}

#[tokio::test]
async fn test_oversized_contents_are_rejected() {
    let mut client = client();
    let mut package = package(1000);
    package["contents"][0]["length"] = json!(1e10);
    package["contents"][0]["width"] = json!(1e10);
    package["contents"][0]["height"] = json!(1e10);
    package["contents"][0]["quantity"] = json!(2);

    let (status, body) = client.post("/rates", &package).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert_eq!(client.carrier().count(Operation::GetRates), 0);
}

#[tokio::test]
async fn test_huge_quantity_is_rejected() {
    let mut client = client();
    let mut package = package(1000);
    package["contents"][0]["quantity"] = json!(4_000_000_000_u32);

    let (status, _) = client.post("/rates", &package).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(client.carrier().count(Operation::GetRates), 0);
}

#[tokio::test]
async fn test_locker_rates_are_listed_after_door_rates() {
    let mut settings = settings();
    settings.enable_lockers = true;
    let carrier = FakeCarrier::quoting().with(
        Operation::GetLockerLocations,
        Reply::Json(shiplogic_integration_tests::LOCKERS.to_string()),
    );
    let mut client = TestClient::new(carrier, settings);

    let (status, body) = client.post("/rates", &package(1000)).await;

    assert_eq!(status, StatusCode::OK);
    let rates = body["rates"]["rates"].as_array().unwrap();
    assert_eq!(rates.len(), 4);
    assert_eq!(rates[2]["service_level"]["code"], "ECO/901-Gateway Locker");

    let sent = client.carrier().bodies(Operation::GetRates);
    assert!(sent[0].get("delivery_address").is_some());
    assert_eq!(sent[1]["delivery_pickup_point_id"], 901);
}

// ============================================================================
// Opt-ins
// ============================================================================

#[tokio::test]
async fn test_shipping_options_empty_before_quoting() {
    let mut client = client();
    let (status, body) = client.get("/shipping-options").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_shipping_options_reflect_applied_adjustments() {
    let mut client = client();
    client.post("/rates", &package(1000)).await;

    let (status, body) = client.get("/shipping-options").await;

    assert_eq!(status, StatusCode::OK);
    let options = body.as_array().unwrap();
    assert_eq!(options.len(), 2);
    assert_eq!(options[0]["id"], 1);
    assert_eq!(options[0]["type"], "regular");
    assert_eq!(options[0]["checked"], true);
    assert_eq!(options[1]["id"], 9);
    assert_eq!(options[1]["type"], "time_based");
    assert_eq!(options[1]["checked"], false);
}

#[tokio::test]
async fn test_selection_update_reprices_with_opt_ins() {
    let mut client = client();
    client.post("/rates", &package(1000)).await;

    let (status, body) = client
        .post(
            "/update-shipping-options",
            &json!({"tcg_ship_logic_optins": ["1"], "tcg_ship_logic_time_based_optins": [9]}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": true,
            "message": "Shipping options updated",
            "selected_regular": [1],
            "selected_time_based": [9]
        })
    );

    // The stored result is dropped until the next quote.
    let (_, options) = client.get("/shipping-options").await;
    assert_eq!(options, json!([]));

    client.post("/rates", &package(1000)).await;
    let sent = client.carrier().bodies(Operation::GetRates);
    assert_eq!(sent.len(), 2);
    assert!(sent[0].get("opt_in_rates").is_none());
    assert_eq!(sent[1]["opt_in_rates"], json!([1]));
    assert_eq!(sent[1]["opt_in_time_based_rates"], json!([9]));

    // Ticks follow the adjustments the carrier applied, not the selection.
    let (status, options) = client.get("/shipping-options").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(options[0]["id"], 1);
    assert_eq!(options[0]["checked"], true);
    assert_eq!(options[1]["id"], 9);
    assert_eq!(options[1]["checked"], false);
}

#[tokio::test]
async fn test_invalid_opt_in_id_is_rejected() {
    let mut client = client();
    let (status, _) = client
        .post(
            "/update-shipping-options",
            &json!({"tcg_ship_logic_optins": ["abc"]}),
        )
        .await;
    assert!(status.is_client_error());
}

// ============================================================================
// Insurance
// ============================================================================

#[tokio::test]
async fn test_insurance_offered_from_threshold() {
    let mut client = client();

    let (_, body) = client.get("/insurance").await;
    assert_eq!(body, json!({"enabled": false, "checked": false, "cart_total": 0.0}));

    client.post("/rates", &package(2000)).await;
    let (_, body) = client.get("/insurance").await;
    assert_eq!(body["enabled"], true);
    assert_eq!(body["cart_total"], 2000.0);
}

#[tokio::test]
async fn test_checked_insurance_declares_cart_value() {
    let mut client = client();
    client.post("/rates", &package(2000)).await;

    let (status, body) = client.post("/insurance", &json!({"checked": true})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "checked": "1"}));

    client.post("/rates", &package(2000)).await;
    let sent = client.carrier().bodies(Operation::GetRates);
    assert_eq!(sent[0]["declared_value"].as_f64(), Some(0.0));
    assert_eq!(sent[1]["declared_value"].as_f64(), Some(2000.0));
}

#[tokio::test]
async fn test_insurance_ignored_below_threshold() {
    let mut client = client();
    client.post("/insurance", &json!({"checked": "1"})).await;

    client.post("/rates", &package(1000)).await;

    let sent = client.carrier().bodies(Operation::GetRates);
    assert_eq!(sent[0]["declared_value"].as_f64(), Some(0.0));
}

// ============================================================================
// Shipments
// ============================================================================

const CREATED: &str = r#"{"id": 4411, "short_tracking_reference": "TCG4411"}"#;

#[tokio::test]
async fn test_shipment_created_from_last_quote() {
    let carrier =
        FakeCarrier::quoting().with(Operation::CreateShipment, Reply::Json(CREATED.to_string()));
    let mut client = TestClient::new(carrier, settings());
    client.post("/rates", &package(1000)).await;

    let (status, body) = client
        .post(
            "/shipments",
            &json!({"service_level_code": "ECO", "customer_reference": "order-77"}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["short_tracking_reference"], "TCG4411");

    let sent = client.carrier().bodies(Operation::CreateShipment);
    assert_eq!(sent.len(), 1);
    assert!(sent[0].get("collection_address").is_some());
    assert_eq!(sent[0]["delivery_address"]["city"], "Durban");
    assert_eq!(sent[0]["parcels"].as_array().unwrap().len(), 1);
    assert_eq!(sent[0]["service_level_code"], "ECO");
    assert_eq!(sent[0]["customer_reference"], "order-77");
}

#[tokio::test]
async fn test_fulfilment_fields_override_quoted_fields() {
    let carrier =
        FakeCarrier::quoting().with(Operation::CreateShipment, Reply::Json(CREATED.to_string()));
    let mut client = TestClient::new(carrier, settings());
    client.post("/rates", &package(1000)).await;

    client
        .post("/shipments", &json!({"declared_value": 350.0}))
        .await;

    let sent = client.carrier().bodies(Operation::CreateShipment);
    assert_eq!(sent[0]["declared_value"].as_f64(), Some(350.0));
}

#[tokio::test]
async fn test_shipment_requires_a_quote() {
    let mut client = client();

    let (status, body) = client
        .post("/shipments", &json!({"service_level_code": "ECO"}))
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(client.carrier().count(Operation::CreateShipment), 0);
}

#[tokio::test]
async fn test_shipment_without_fulfilment_fields_is_rejected() {
    let mut client = client();
    client.post("/rates", &package(1000)).await;

    let (status, _) = client.post("/shipments", &json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(client.carrier().count(Operation::CreateShipment), 0);
}

#[tokio::test]
async fn test_shipment_carrier_failure_is_a_gateway_error() {
    let carrier = FakeCarrier::quoting().with(Operation::CreateShipment, Reply::Status(503));
    let mut client = TestClient::new(carrier, settings());
    client.post("/rates", &package(1000)).await;

    let (status, body) = client
        .post("/shipments", &json!({"service_level_code": "ECO"}))
        .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["message"], "Carrier service error");
}

// ============================================================================
// Order metadata
// ============================================================================

#[tokio::test]
async fn test_order_meta_records_selections() {
    let mut client = client();
    client
        .post(
            "/update-shipping-options",
            &json!({"tcg_ship_logic_optins": [1, 2], "tcg_ship_logic_time_based_optins": ["3"]}),
        )
        .await;
    client.post("/insurance", &json!({"checked": 1})).await;

    let (status, body) = client.get("/order-meta").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["note"],
        "TCG Shipping options selected: Regular: 1, 2 Time-based: 3"
    );
    assert_eq!(body["meta"][0], json!({"key": "_tcg_ship_logic_optins", "value": [1, 2]}));
    assert_eq!(
        body["meta"][1],
        json!({"key": "_tcg_ship_logic_time_based_optins", "value": [3]})
    );
    assert_eq!(body["meta"][2], json!({"key": "_tcg_billing_insurance", "value": "1"}));
}

#[tokio::test]
async fn test_order_meta_without_selections_has_no_note() {
    let mut client = client();
    let (_, body) = client.get("/order-meta").await;
    assert!(body.get("note").is_none());
    assert_eq!(body["meta"][2]["value"], "0");
}
