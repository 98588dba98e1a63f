//! Route definitions for the `/orders` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::order;
use crate::state::AppState;

/// Routes mounted at `/orders`. All require auth.
///
/// ```text
/// POST /checkout -> checkout
/// GET  /mine     -> mine
/// GET  /{id}     -> get_by_id
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/checkout", post(order::checkout))
        .route("/mine", get(order::mine))
        .route("/{id}", get(order::get_by_id))
}
