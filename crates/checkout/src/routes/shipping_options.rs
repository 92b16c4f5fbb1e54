//! Opt-in display list and selection updates.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use shiplogic_core::OptInRateId;
use tower_sessions::Session;
use tracing::{debug, instrument};

use crate::carrier::CarrierTransport;
use crate::error::Result;
use crate::models::{SelectedOptIns, deserialize_opt_in_ids, session};
use crate::optins::{self, OptInOption};
use crate::state::AppState;

/// Opt-ins to render for the last quote. Empty when nothing was quoted yet.
#[instrument(skip(state, session))]
pub async fn show<T: CarrierTransport>(
    State(state): State<AppState<T>>,
    session: Session,
) -> Json<Vec<OptInOption>> {
    let Some(bundle) = session::rate_result(&session).await else {
        debug!("No stored rate result");
        return Json(Vec::new());
    };

    let settings = state.shipping();
    Json(optins::reconcile(
        &bundle.opt_in_rates,
        &bundle.rates,
        &settings.visible_opt_ins,
        settings.currency,
    ))
}

/// Selection update from the checkout page.
#[derive(Debug, Deserialize)]
pub struct UpdateForm {
    #[serde(default, rename = "tcg_ship_logic_optins", deserialize_with = "deserialize_opt_in_ids")]
    pub regular: Vec<OptInRateId>,
    #[serde(
        default,
        rename = "tcg_ship_logic_time_based_optins",
        deserialize_with = "deserialize_opt_in_ids"
    )]
    pub time_based: Vec<OptInRateId>,
}

#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub success: bool,
    pub message: &'static str,
    pub selected_regular: Vec<OptInRateId>,
    pub selected_time_based: Vec<OptInRateId>,
}

/// Replace both selection lists and drop the stored rate result.
#[instrument(skip(session))]
pub async fn update(session: Session, Json(form): Json<UpdateForm>) -> Result<Json<UpdateResponse>> {
    let selected = SelectedOptIns {
        regular: form.regular,
        time_based: form.time_based,
    };
    session::set_selected_opt_ins(&session, &selected).await?;
    session::clear_rate_result(&session).await?;

    Ok(Json(UpdateResponse {
        success: true,
        message: "Shipping options updated",
        selected_regular: selected.regular,
        selected_time_based: selected.time_based,
    }))
}
