//! Handler for payment gateway webhooks.
//!
//! The signature is checked against the raw body bytes before anything is
//! parsed. Once verified, every delivery is acknowledged with 200, including
//! replays and events for orders this store does not know, so the gateway
//! stops retrying.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use closet_core::error::CoreError;
use closet_core::payment::SIGNATURE_HEADER;
use serde_json::{json, Value};

use crate::checkout::{apply_payment_outcome, PaymentEffect};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /webhook/{gateway}
pub async fn receive(
    State(state): State<AppState>,
    Path(gateway): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<Value>> {
    if gateway != state.gateway.name() {
        return Err(AppError::NotFound(format!("Unknown payment gateway '{gateway}'")));
    }

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    if let Err(e) = state.gateway.verify_signature(&body, signature) {
        tracing::warn!(gateway = %gateway, error = %e, "Rejected webhook");
        return Err(CoreError::Unauthorized("Invalid webhook signature".into()).into());
    }

    let outcome = state
        .gateway
        .parse_event(&body)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    match apply_payment_outcome(&state.pool, outcome).await? {
        PaymentEffect::Paid {
            order_id,
            cleared_lines,
        } => tracing::info!(order_id, cleared_lines, "Order paid"),
        PaymentEffect::Failed {
            order_id,
            restocked,
        } => tracing::info!(order_id, restocked, "Order payment failed, stock restored"),
        PaymentEffect::AlreadySettled { order_id } => {
            tracing::debug!(order_id, "Webhook replay ignored")
        }
        PaymentEffect::UnknownOrder { order_id } => {
            tracing::warn!(order_id, "Webhook for unknown order")
        }
        PaymentEffect::Ignored { event } => tracing::debug!(event = %event, "Webhook event ignored"),
    }

    Ok(Json(json!({ "received": true })))
}
