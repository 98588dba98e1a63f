pub mod admin;
pub mod auth;
pub mod cart;
pub mod health;
pub mod order;
pub mod product;
pub mod review;
pub mod webhook;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                       register (public)
/// /auth/login                          login (public)
/// /auth/refresh                        refresh (public)
/// /auth/logout                         logout (requires auth)
/// /auth/me                             current user (optional auth)
///
/// /products                            list (public), create (admin)
/// /products/categories                 category counts (public)
/// /products/{id}                       get (public), update, delete (admin)
/// /products/{id}/reviews               reviews (public)
///
/// /reviews/{productId}                 create or replace own review
///
/// /cart                                list, add
/// /cart/merge                          merge a local cart (POST)
/// /cart/{productId}                    update quantity, remove line
///
/// /orders/checkout                     start checkout (POST)
/// /orders/mine                         own orders
/// /orders/{id}                         own order
///
/// /admin/overview                      store totals (admin only)
/// /admin/orders                        all orders
/// /admin/orders/{id}/status            change status (PUT)
/// /admin/categories/rename             rename a category (POST)
/// ```
///
/// `/health` and `/webhook/{gateway}` are mounted at the root by
/// [`build_app_router`](crate::router::build_app_router).
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/products", product::router())
        .nest("/reviews", review::router())
        .nest("/cart", cart::router())
        .nest("/orders", order::router())
        .nest("/admin", admin::router())
}
