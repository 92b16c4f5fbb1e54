//! Shipment creation from the last quoted cart.

use axum::{Json, extract::State};
use serde_json::{Map, Value};
use tower_sessions::Session;
use tracing::{info, instrument};

use crate::carrier::{self, CarrierTransport, shipments};
use crate::error::{AppError, Result};
use crate::models::session;
use crate::state::AppState;

/// Create a shipment for the last priced rate request.
///
/// The request body carries the fulfilment fields (service level,
/// references, collection dates). They are merged over the priced body and
/// the carrier's response is returned unchanged.
#[instrument(skip_all)]
pub async fn create<T: CarrierTransport>(
    State(state): State<AppState<T>>,
    session: Session,
    Json(fulfilment): Json<Map<String, Value>>,
) -> Result<Json<Value>> {
    if fulfilment.is_empty() {
        return Err(AppError::BadRequest(
            "No fulfilment fields supplied".to_string(),
        ));
    }

    let Some(priced) = session::rates_body(&session).await else {
        return Err(AppError::NotFound(
            "No quoted shipment in this session".to_string(),
        ));
    };

    let body = shipments::shipment_body(&priced, fulfilment)?;
    let raw = shipments::create_shipment(state.carrier(), &body).await?;
    let created: Value = carrier::decode(&raw)?;

    info!("Shipment created");
    Ok(Json(created))
}
