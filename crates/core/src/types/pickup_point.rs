//! Locker / pickup-point locations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Response body of the `pickup-points` search endpoint.
///
/// The carrier orders results by distance when `order_closest=true`, so the
/// first entry is the closest match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PickupPointsResponse {
    #[serde(default)]
    pub pickup_points: Vec<PickupPoint>,
}

impl PickupPointsResponse {
    /// The closest pickup point, if any were found.
    #[must_use]
    pub fn closest(&self) -> Option<&PickupPoint> {
        self.pickup_points.first()
    }
}

/// A single locker or pickup counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickupPoint {
    pub pickup_point_id: PickupPointId,
    pub pickup_point_provider: String,
    pub address: PickupPointAddress,
    #[serde(default)]
    pub trading_hours: String,
}

/// Display address of a pickup point.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickupPointAddress {
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub entered_address: String,
}

/// Pickup point identifier, kept in the JSON type the carrier used.
///
/// Lockers come back with numeric ids and counters with string ids; the
/// rates request must echo the id exactly as received.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PickupPointId {
    Number(i64),
    Text(String),
}

impl fmt::Display for PickupPointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_closest_is_first_entry() {
        let response: PickupPointsResponse = serde_json::from_str(
            r#"{"pickup_points": [
                {"pickup_point_id": 17, "pickup_point_provider": "tcg-locker",
                 "address": {"company": "Locker A", "entered_address": "1 Long St"},
                 "trading_hours": "24/7"},
                {"pickup_point_id": "B2", "pickup_point_provider": "tcg-locker",
                 "address": {"company": "Locker B", "entered_address": "2 Long St"}}
            ]}"#,
        )
        .unwrap();

        let closest = response.closest().unwrap();
        assert_eq!(closest.pickup_point_id, PickupPointId::Number(17));
        assert_eq!(closest.address.company, "Locker A");
        assert_eq!(
            response.pickup_points[1].pickup_point_id,
            PickupPointId::Text("B2".to_string())
        );
        assert_eq!(response.pickup_points[1].trading_hours, "");
    }

    #[test]
    fn test_id_keeps_its_json_type() {
        let numeric = serde_json::to_value(PickupPointId::Number(901)).unwrap();
        let text = serde_json::to_value(PickupPointId::Text("901".to_string())).unwrap();

        assert_eq!(numeric, serde_json::json!(901));
        assert_eq!(text, serde_json::json!("901"));
        assert_eq!(PickupPointId::Number(901).to_string(), "901");
    }

    #[test]
    fn test_non_scalar_id_is_rejected() {
        let result = serde_json::from_str::<PickupPoint>(
            r#"{"pickup_point_id": [1], "pickup_point_provider": "tcg-locker",
                "address": {}}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_response_has_no_closest() {
        let response: PickupPointsResponse = serde_json::from_str("{}").unwrap();
        assert!(response.closest().is_none());
    }
}
