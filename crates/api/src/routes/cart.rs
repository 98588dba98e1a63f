//! Route definitions for the `/cart` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::cart;
use crate::state::AppState;

/// Routes mounted at `/cart`. All require auth.
///
/// ```text
/// GET    /               -> list
/// POST   /               -> add
/// POST   /merge          -> merge
/// PUT    /{product_id}   -> update
/// DELETE /{product_id}   -> remove (?size=&color=)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::list).post(cart::add))
        .route("/merge", post(cart::merge))
        .route("/{product_id}", put(cart::update).delete(cart::remove))
}
