//! Order metadata endpoint.

use axum::Json;
use tower_sessions::Session;
use tracing::instrument;

use crate::models::session;
use crate::order_meta::OrderMeta;

/// Metadata and note for the order about to be placed.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Json<OrderMeta> {
    let selected = session::selected_opt_ins(&session).await;
    let insurance = session::insurance_checked(&session).await;
    Json(OrderMeta::new(&selected, insurance))
}
