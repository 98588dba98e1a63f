//! Integration tests for `POST /webhook/{gateway}`.

mod common;

use axum::http::StatusCode;
use axum::Router;
use closet_db::repositories::{CartRepo, OrderRepo, ProductRepo};
use common::{body_json, post_json_auth, post_webhook, sign};
use serde_json::{json, Value};
use sqlx::PgPool;

const WEBHOOK: &str = "/webhook/paystack";

/// Put `quantity` of a fresh product in a new customer's cart and check out.
/// Returns `(user_id, product_id, order_id)`.
async fn pending_order(pool: &PgPool, app: Router, quantity: i32) -> (i64, i64, i64) {
    let (user, token) = common::customer_with_token(pool, "payer@example.com").await;
    let jacket = common::create_product(pool, "Jacket", 20_000, 5).await;

    post_json_auth(
        app.clone(),
        "/api/v1/cart",
        json!({ "productId": jacket.id, "quantity": quantity }),
        &token,
    )
    .await;
    let response = post_json_auth(
        app,
        "/api/v1/orders/checkout",
        json!({ "email": "payer@example.com" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let order_id = body_json(response).await["orderId"].as_i64().unwrap();
    (user.id, jacket.id, order_id)
}

fn event(name: &str, order_id: Value) -> Value {
    json!({
        "event": name,
        "data": {
            "reference": "ref_live_123",
            "amount": 40_000,
            "metadata": { "orderId": order_id }
        }
    })
}

async fn deliver(app: Router, body: &Value) -> axum::http::Response<axum::body::Body> {
    let (bytes, signature) = sign(body);
    post_webhook(app, WEBHOOK, bytes, Some(&signature)).await
}

async fn stock_of(pool: &PgPool, product_id: i64) -> i32 {
    ProductRepo::find_by_id(pool, product_id)
        .await
        .unwrap()
        .unwrap()
        .stock
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_bad_or_missing_signature_is_unauthorized(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_user, _product, order_id) = pending_order(&pool, app.clone(), 1).await;

    let body = event("charge.success", json!(order_id));
    let (bytes, _) = sign(&body);

    let forged = post_webhook(app.clone(), WEBHOOK, bytes.clone(), Some("deadbeef")).await;
    assert_eq!(forged.status(), StatusCode::UNAUTHORIZED);

    let unsigned = post_webhook(app, WEBHOOK, bytes, None).await;
    assert_eq!(unsigned.status(), StatusCode::UNAUTHORIZED);

    let order = OrderRepo::find_by_id(&pool, order_id).await.unwrap().unwrap();
    assert_eq!(order.status_id, 1, "order must stay pending");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_charge_success_marks_paid_and_clears_cart_once(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (user_id, product_id, order_id) = pending_order(&pool, app.clone(), 2).await;

    let body = event("charge.success", json!(order_id.to_string()));

    let first = deliver(app.clone(), &body).await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(body_json(first).await["received"], true);

    let order = OrderRepo::find_by_id(&pool, order_id).await.unwrap().unwrap();
    assert_eq!(order.status_id, 2);
    assert_eq!(order.payment_ref.as_deref(), Some("ref_live_123"));
    assert!(CartRepo::list(&pool, user_id).await.unwrap().is_empty());
    assert_eq!(stock_of(&pool, product_id).await, 3);

    // A replay is acknowledged and changes nothing.
    let replay = deliver(app.clone(), &body).await;
    assert_eq!(replay.status(), StatusCode::OK);

    // A late failure for the same order cannot undo the payment.
    let late_failure = deliver(app, &event("charge.failed", json!(order_id))).await;
    assert_eq!(late_failure.status(), StatusCode::OK);

    let order = OrderRepo::find_by_id(&pool, order_id).await.unwrap().unwrap();
    assert_eq!(order.status_id, 2);
    assert_eq!(stock_of(&pool, product_id).await, 3);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_charge_failed_restores_stock_once(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (user_id, product_id, order_id) = pending_order(&pool, app.clone(), 2).await;
    assert_eq!(stock_of(&pool, product_id).await, 3);

    let body = event("charge.failed", json!(order_id));
    for _ in 0..2 {
        let response = deliver(app.clone(), &body).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let order = OrderRepo::find_by_id(&pool, order_id).await.unwrap().unwrap();
    assert_eq!(order.status_id, 6);
    assert_eq!(stock_of(&pool, product_id).await, 5);
    // The shopper can try again with the same cart.
    assert_eq!(CartRepo::list(&pool, user_id).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_unknown_order_and_unhandled_event_are_acknowledged(pool: PgPool) {
    let app = common::build_test_app(pool);

    let unknown = deliver(app.clone(), &event("charge.success", json!(987_654))).await;
    assert_eq!(unknown.status(), StatusCode::OK);

    let transfer = deliver(app, &json!({ "event": "transfer.success", "data": {} })).await;
    assert_eq!(transfer.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_signed_but_malformed_body_is_bad_request(pool: PgPool) {
    let app = common::build_test_app(pool);

    let no_order = deliver(
        app.clone(),
        &json!({ "event": "charge.success", "data": { "reference": "r" } }),
    )
    .await;
    assert_eq!(no_order.status(), StatusCode::BAD_REQUEST);

    let bytes = b"not json".to_vec();
    let signature = closet_core::payment::compute_signature(common::TEST_SECRET, &bytes);
    let garbage = post_webhook(app, WEBHOOK, bytes, Some(&signature)).await;
    assert_eq!(garbage.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_unknown_gateway_is_not_found(pool: PgPool) {
    let app = common::build_test_app(pool);

    let (bytes, signature) = sign(&event("charge.success", json!(1)));
    let response = post_webhook(app, "/webhook/stripe", bytes, Some(&signature)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
