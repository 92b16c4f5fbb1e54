//! Billing insurance toggle.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tower_sessions::Session;
use tracing::instrument;

use crate::carrier::CarrierTransport;
use crate::config::ShippingConfig;
use crate::error::Result;
use crate::models::session;
use crate::state::AppState;

/// Insurance is offered when the store enables it and the cart is large enough.
#[must_use]
pub fn insurance_enabled(settings: &ShippingConfig, cart_subtotal: Decimal) -> bool {
    settings.billing_insurance && cart_subtotal >= settings.insurance_min_subtotal
}

#[derive(Debug, Serialize)]
pub struct InsuranceState {
    pub enabled: bool,
    pub checked: bool,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub cart_total: Decimal,
}

/// Current insurance state for the last quoted cart.
#[instrument(skip(state, session))]
pub async fn show<T: CarrierTransport>(
    State(state): State<AppState<T>>,
    session: Session,
) -> Json<InsuranceState> {
    let cart_total = session::cart_subtotal(&session).await;
    Json(InsuranceState {
        enabled: insurance_enabled(state.shipping(), cart_total),
        checked: session::insurance_checked(&session).await,
        cart_total,
    })
}

#[derive(Debug, Deserialize)]
pub struct InsuranceForm {
    #[serde(default, deserialize_with = "deserialize_truthy")]
    pub checked: bool,
}

#[derive(Debug, Serialize)]
pub struct InsuranceUpdated {
    pub success: bool,
    pub checked: &'static str,
}

/// Tick or untick insurance. The stored rate result is dropped so the next
/// quote reprices with the new declared value.
#[instrument(skip(session))]
pub async fn update(
    session: Session,
    Json(form): Json<InsuranceForm>,
) -> Result<Json<InsuranceUpdated>> {
    session::set_insurance_checked(&session, form.checked).await?;
    session::clear_rate_result(&session).await?;

    Ok(Json(InsuranceUpdated {
        success: true,
        checked: if form.checked { "1" } else { "0" },
    }))
}

/// Accepts `true`, non-zero numbers, and non-empty strings other than `"0"`
/// and `"false"`.
fn deserialize_truthy<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !matches!(s.trim(), "" | "0" | "false"),
        Value::Null | Value::Array(_) | Value::Object(_) => false,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shiplogic_core::{AccountId, CurrencyCode};

    use super::*;
    use crate::config::ShopAddress;
    use crate::payload::PackingSettings;

    fn form(json: &str) -> InsuranceForm {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_checked_accepts_common_encodings() {
        assert!(form(r#"{"checked": true}"#).checked);
        assert!(form(r#"{"checked": 1}"#).checked);
        assert!(form(r#"{"checked": "1"}"#).checked);
        assert!(form(r#"{"checked": "on"}"#).checked);
        assert!(!form(r#"{"checked": "0"}"#).checked);
        assert!(!form(r#"{"checked": ""}"#).checked);
        assert!(!form(r#"{"checked": false}"#).checked);
        assert!(!form("{}").checked);
    }

    #[test]
    fn test_enabled_needs_setting_and_threshold() {
        let mut settings = ShippingConfig {
            account_id: AccountId::new(1),
            shop: ShopAddress::default(),
            packing: PackingSettings::default(),
            enable_lockers: false,
            billing_insurance: true,
            insurance_min_subtotal: Decimal::new(1500, 0),
            visible_opt_ins: Vec::new(),
            currency: CurrencyCode::ZAR,
        };

        assert!(insurance_enabled(&settings, Decimal::new(1500, 0)));
        assert!(!insurance_enabled(&settings, Decimal::new(1499, 0)));

        settings.billing_insurance = false;
        assert!(!insurance_enabled(&settings, Decimal::new(5000, 0)));
    }
}
