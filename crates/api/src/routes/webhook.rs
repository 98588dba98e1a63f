use axum::routing::post;
use axum::Router;

use crate::handlers::webhook;
use crate::state::AppState;

/// Mount payment webhooks (root-level, outside `/api/v1`, no bearer auth).
pub fn router() -> Router<AppState> {
    Router::new().route("/webhook/{gateway}", post(webhook::receive))
}
