//! Rate quoting endpoint.

use axum::{Json, extract::State};
use serde::Serialize;
use shiplogic_core::{OptInCatalog, RatesResponse};
use tower_sessions::Session;
use tracing::instrument;

use super::insurance::insurance_enabled;
use crate::carrier::CarrierTransport;
use crate::error::Result;
use crate::models::{RatePackage, session};
use crate::rates::{CheckoutNotice, RateContext};
use crate::state::AppState;

/// Quote response body.
#[derive(Debug, Serialize)]
pub struct RatesBody {
    pub rates: RatesResponse,
    pub opt_in_rates: OptInCatalog,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<CheckoutNotice>,
}

/// Quote a package with the shopper's current selections.
///
/// The result and the priced body are kept in the session so the opt-in
/// list and shipment creation can reuse them without calling the carrier.
#[instrument(skip_all, fields(city = %package.destination.city))]
pub async fn calculate<T: CarrierTransport>(
    State(state): State<AppState<T>>,
    session: Session,
    Json(package): Json<RatePackage>,
) -> Result<Json<RatesBody>> {
    let subtotal = package.cart_subtotal.unwrap_or_default();
    let insurance = insurance_enabled(state.shipping(), subtotal)
        && session::insurance_checked(&session).await;
    let selected = session::selected_opt_ins(&session).await;

    let context = RateContext {
        package,
        insurance,
        selected,
    };
    let outcome = state.rates().get_rates(&context).await?;

    session::set_rate_result(&session, &outcome.bundle, &outcome.request).await?;
    session::set_cart_subtotal(&session, subtotal).await?;

    Ok(Json(RatesBody {
        rates: outcome.bundle.rates,
        opt_in_rates: outcome.bundle.opt_in_rates,
        notice: outcome.notice,
    }))
}
