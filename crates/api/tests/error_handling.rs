//! Error body shape and status mapping across the API.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, get, get_auth};
use sqlx::PgPool;
use tower::ServiceExt;

#[sqlx::test(migrations = "../db/migrations")]
async fn not_found_has_error_and_code(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app, "/api/v1/products/424242").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Product with id 424242 not found");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn expired_or_forged_token_is_unauthorized(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/orders/mine", "eyJhbGciOiJIUzI1NiJ9.e30.bad").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Invalid or expired token");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn malformed_json_body_is_rejected(pool: PgPool) {
    let (_user, token) = common::customer_with_token(&pool, "json@example.com").await;
    let app = common::build_test_app(pool);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/cart")
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from("{\"productId\": "))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(json["error"].is_string());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn body_without_json_content_type_is_bad_request(pool: PgPool) {
    let app = common::build_test_app(pool);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/auth/login")
        .body(Body::from("email=a@b.c"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn non_numeric_path_id_is_bad_request(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app, "/api/v1/products/abc").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
