//! Shipment creation, labels and tracking.
//!
//! These calls return the carrier's raw response body; the host platform
//! stores or renders it as-is.

use serde_json::{Map, Value};
use shiplogic_core::ShipmentRateRequest;
use tracing::instrument;

use super::{CarrierError, CarrierPayload, CarrierTransport, Operation};

/// Build a `shipments` body from the last priced rate request.
///
/// Fulfilment fields supplied by the host (references, special
/// instructions, chosen service level, ...) are merged on top and win over
/// fields of the same name in the priced body.
///
/// # Errors
///
/// Returns `CarrierError::Parse` if the priced body cannot be serialized.
pub fn shipment_body(
    priced: &ShipmentRateRequest,
    fulfilment: Map<String, Value>,
) -> Result<Value, CarrierError> {
    let mut body = match serde_json::to_value(priced)? {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    body.extend(fulfilment);
    Ok(Value::Object(body))
}

/// Create a shipment.
///
/// # Errors
///
/// Returns `CarrierError` if the carrier call fails.
#[instrument(skip(transport, body))]
pub async fn create_shipment<T: CarrierTransport>(
    transport: &T,
    body: &Value,
) -> Result<String, CarrierError> {
    let body = serde_json::to_string(body)?;
    transport
        .send(Operation::CreateShipment, CarrierPayload::Body(body))
        .await
}

/// Fetch the label for a shipment.
///
/// # Errors
///
/// Returns `CarrierError` if the carrier call fails.
#[instrument(skip(transport))]
pub async fn shipment_label<T: CarrierTransport>(
    transport: &T,
    shipment_id: &str,
) -> Result<String, CarrierError> {
    transport
        .send(
            Operation::GetShipmentLabel,
            CarrierPayload::Query(shipment_id.to_string()),
        )
        .await
}

/// Tracking events for a tracking reference.
///
/// # Errors
///
/// Returns `CarrierError` if the carrier call fails.
#[instrument(skip(transport))]
pub async fn track_shipment<T: CarrierTransport>(
    transport: &T,
    tracking_reference: &str,
) -> Result<String, CarrierError> {
    transport
        .send(
            Operation::TrackShipment,
            CarrierPayload::Query(tracking_reference.to_string()),
        )
        .await
}

/// Shipments matching a tracking reference.
///
/// # Errors
///
/// Returns `CarrierError` if the carrier call fails.
#[instrument(skip(transport))]
pub async fn shipments_by_tracking_ref<T: CarrierTransport>(
    transport: &T,
    tracking_ref: &str,
) -> Result<String, CarrierError> {
    transport
        .send(
            Operation::GetShipments,
            CarrierPayload::Query(tracking_ref.to_string()),
        )
        .await
}
