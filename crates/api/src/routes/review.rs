//! Route definitions for the `/reviews` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::review;
use crate::state::AppState;

/// Routes mounted at `/reviews`.
///
/// ```text
/// POST /{product_id} -> upsert (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{product_id}", post(review::upsert))
}
