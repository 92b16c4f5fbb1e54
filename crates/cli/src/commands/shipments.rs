//! Shipment lookups against the carrier.
//!
//! # Usage
//!
//! ```bash
//! shiplogic-cli track TCG12345
//! shiplogic-cli shipments TCG12345
//! shiplogic-cli label 98765
//! ```

use shiplogic_checkout::carrier::{CarrierClient, shipments};
use shiplogic_checkout::config::CarrierConfig;

use super::CommandError;

fn client() -> Result<CarrierClient, CommandError> {
    Ok(CarrierClient::new(&CarrierConfig::from_env()?))
}

/// Tracking events for a tracking reference, as returned by the carrier.
///
/// # Errors
///
/// Returns an error if configuration is incomplete or the call fails.
pub async fn track(reference: &str) -> Result<String, CommandError> {
    Ok(shipments::track_shipment(&client()?, reference).await?)
}

/// Shipments matching a tracking reference.
///
/// # Errors
///
/// Returns an error if configuration is incomplete or the call fails.
pub async fn by_reference(reference: &str) -> Result<String, CommandError> {
    Ok(shipments::shipments_by_tracking_ref(&client()?, reference).await?)
}

/// Label for a shipment id.
///
/// # Errors
///
/// Returns an error if configuration is incomplete or the call fails.
pub async fn label(shipment_id: &str) -> Result<String, CommandError> {
    Ok(shipments::shipment_label(&client()?, shipment_id).await?)
}
