//! Checkout session state.
//!
//! Everything the shipping flow remembers between requests lives in the
//! shopper's session: their opt-in selections, the insurance toggle, and the
//! last rate result so the display list and order metadata can be rebuilt
//! without calling the carrier again.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shiplogic_core::{OptInRateId, ShipmentRateRequest};
use tower_sessions::Session;

use crate::rates::RateBundle;

/// Session keys for checkout shipping state.
pub mod keys {
    /// Regular opt-in ids the shopper selected.
    pub const SELECTED_OPT_INS: &str = "tcg_selected_optins";

    /// Time-based opt-in ids the shopper selected.
    pub const SELECTED_TIME_BASED_OPT_INS: &str = "tcg_selected_time_based_optins";

    /// Insurance toggle, stored as `"1"` or `"0"`.
    pub const BILLING_INSURANCE: &str = "tcg_billing_insurance";

    /// Subtotal of the cart last quoted.
    pub const CART_SUBTOTAL: &str = "tcg_cart_subtotal";

    /// Last `{rates, opt_in_rates}` bundle.
    pub const RATE_RESULT: &str = "tcg_ship_logic_result";

    /// Last priced `rates` request body.
    pub const RATES_BODY: &str = "tcg_ship_logic_getrates_body";
}

/// The shopper's opt-in selections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOptIns {
    pub regular: Vec<OptInRateId>,
    pub time_based: Vec<OptInRateId>,
}

impl SelectedOptIns {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regular.is_empty() && self.time_based.is_empty()
    }
}

type SessionResult<T> = Result<T, tower_sessions::session::Error>;

/// Read the selected opt-ins. Missing lists are empty.
pub async fn selected_opt_ins(session: &Session) -> SelectedOptIns {
    SelectedOptIns {
        regular: session
            .get::<Vec<OptInRateId>>(keys::SELECTED_OPT_INS)
            .await
            .ok()
            .flatten()
            .unwrap_or_default(),
        time_based: session
            .get::<Vec<OptInRateId>>(keys::SELECTED_TIME_BASED_OPT_INS)
            .await
            .ok()
            .flatten()
            .unwrap_or_default(),
    }
}

/// Replace both opt-in lists.
///
/// # Errors
///
/// Returns an error if the session store rejects the write.
pub async fn set_selected_opt_ins(session: &Session, selected: &SelectedOptIns) -> SessionResult<()> {
    session
        .insert(keys::SELECTED_OPT_INS, &selected.regular)
        .await?;
    session
        .insert(keys::SELECTED_TIME_BASED_OPT_INS, &selected.time_based)
        .await
}

/// Whether the shopper ticked insurance.
pub async fn insurance_checked(session: &Session) -> bool {
    session
        .get::<String>(keys::BILLING_INSURANCE)
        .await
        .ok()
        .flatten()
        .is_some_and(|value| value == "1")
}

/// Store the insurance toggle as `"1"` / `"0"`.
///
/// # Errors
///
/// Returns an error if the session store rejects the write.
pub async fn set_insurance_checked(session: &Session, checked: bool) -> SessionResult<()> {
    let value = if checked { "1" } else { "0" };
    session.insert(keys::BILLING_INSURANCE, value).await
}

/// Subtotal of the cart last quoted, zero if never quoted.
pub async fn cart_subtotal(session: &Session) -> Decimal {
    session
        .get::<Decimal>(keys::CART_SUBTOTAL)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// # Errors
///
/// Returns an error if the session store rejects the write.
pub async fn set_cart_subtotal(session: &Session, subtotal: Decimal) -> SessionResult<()> {
    session.insert(keys::CART_SUBTOTAL, subtotal).await
}

/// The last rate bundle, if one is stored.
pub async fn rate_result(session: &Session) -> Option<RateBundle> {
    session
        .get::<RateBundle>(keys::RATE_RESULT)
        .await
        .ok()
        .flatten()
}

/// Store the latest rate bundle and the body it was priced with.
///
/// # Errors
///
/// Returns an error if the session store rejects the write.
pub async fn set_rate_result(
    session: &Session,
    bundle: &RateBundle,
    body: &ShipmentRateRequest,
) -> SessionResult<()> {
    session.insert(keys::RATE_RESULT, bundle).await?;
    session.insert(keys::RATES_BODY, body).await
}

/// Forget the stored rate bundle so the next quote is recomputed.
///
/// # Errors
///
/// Returns an error if the session store rejects the write.
pub async fn clear_rate_result(session: &Session) -> SessionResult<()> {
    session.remove_value(keys::RATE_RESULT).await?;
    Ok(())
}

/// The last priced `rates` body, used for shipment creation.
pub async fn rates_body(session: &Session) -> Option<ShipmentRateRequest> {
    session
        .get::<ShipmentRateRequest>(keys::RATES_BODY)
        .await
        .ok()
        .flatten()
}
