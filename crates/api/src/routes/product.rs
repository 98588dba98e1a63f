//! Route definitions for the `/products` catalog.

use axum::routing::get;
use axum::Router;

use crate::handlers::product;
use crate::state::AppState;

/// Routes mounted at `/products`.
///
/// Writes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// GET    /               -> list
/// POST   /               -> create (admin)
/// GET    /categories     -> categories
/// GET    /{id}           -> get_by_id
/// PUT    /{id}           -> update (admin)
/// DELETE /{id}           -> delete (admin)
/// GET    /{id}/reviews   -> reviews
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(product::list).post(product::create))
        .route("/categories", get(product::categories))
        .route(
            "/{id}",
            get(product::get_by_id)
                .put(product::update)
                .delete(product::delete),
        )
        .route("/{id}/reviews", get(product::reviews))
}
