//! Route definitions for the `/admin` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// GET  /overview            -> overview
/// GET  /orders              -> list_orders
/// PUT  /orders/{id}/status  -> update_order_status
/// GET  /categories          -> list_categories
/// POST /categories/rename   -> rename_category
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/overview", get(admin::overview))
        .route("/orders", get(admin::list_orders))
        .route("/orders/{id}/status", put(admin::update_order_status))
        .route("/categories", get(admin::list_categories))
        .route("/categories/rename", post(admin::rename_category))
}
