//! Checkouts racing each other and ordinary cart traffic.
//!
//! The gateway is stalled so the first checkout holds its locks while the
//! competing request runs.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Response, StatusCode};
use axum::Router;
use closet_db::repositories::ProductRepo;
use common::{body_json, post_json_auth, FakeGateway};
use serde_json::json;
use sqlx::PgPool;

const GATEWAY_STALL: Duration = Duration::from_millis(400);

async fn add_to_cart(app: Router, token: &str, product_id: i64, quantity: i32) -> Response<Body> {
    post_json_auth(
        app,
        "/api/v1/cart",
        json!({ "productId": product_id, "quantity": quantity }),
        token,
    )
    .await
}

async fn checkout(app: Router, token: String) -> Response<Body> {
    post_json_auth(
        app,
        "/api/v1/orders/checkout",
        json!({ "email": "race@example.com" }),
        &token,
    )
    .await
}

async fn order_count(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn stock_of(pool: &PgPool, product_id: i64) -> i32 {
    ProductRepo::find_by_id(pool, product_id)
        .await
        .unwrap()
        .unwrap()
        .stock
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_same_user_checking_out_twice_at_once_gets_one_order(pool: PgPool) {
    let (_user, token) = common::customer_with_token(&pool, "twice@example.com").await;
    let jacket = common::create_product(&pool, "Jacket", 30_000, 5).await;
    let gateway = Arc::new(FakeGateway::stalled(GATEWAY_STALL));
    let app = common::build_test_app_with_gateway(pool.clone(), gateway.clone());

    add_to_cart(app.clone(), &token, jacket.id, 1).await;

    let (first, second) = tokio::join!(
        checkout(app.clone(), token.clone()),
        checkout(app.clone(), token.clone()),
    );

    let mut statuses = [first.status().as_u16(), second.status().as_u16()];
    statuses.sort_unstable();
    assert_eq!(statuses, [200, 409]);

    let rejected = if first.status() == StatusCode::CONFLICT {
        first
    } else {
        second
    };
    assert_eq!(body_json(rejected).await["code"], "CONFLICT");

    assert_eq!(order_count(&pool).await, 1);
    assert_eq!(stock_of(&pool, jacket.id).await, 4);
    assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_two_buyers_racing_for_the_last_unit_never_oversell(pool: PgPool) {
    let (_ama, ama_token) = common::customer_with_token(&pool, "ama@example.com").await;
    let (_kofi, kofi_token) = common::customer_with_token(&pool, "kofi@example.com").await;
    let scarf = common::create_product(&pool, "Scarf", 5_000, 1).await;
    let gateway = Arc::new(FakeGateway::stalled(GATEWAY_STALL));
    let app = common::build_test_app_with_gateway(pool.clone(), gateway);

    add_to_cart(app.clone(), &ama_token, scarf.id, 1).await;
    add_to_cart(app.clone(), &kofi_token, scarf.id, 1).await;

    let (first, second) = tokio::join!(
        checkout(app.clone(), ama_token),
        checkout(app.clone(), kofi_token),
    );

    let (winner, loser) = if first.status() == StatusCode::OK {
        (first, second)
    } else {
        (second, first)
    };
    assert_eq!(winner.status(), StatusCode::OK);
    assert_eq!(loser.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(loser).await["code"], "NO_AVAILABLE_ITEMS");

    let order_id = body_json(winner).await["orderId"].as_i64().unwrap();
    let quantity: i32 =
        sqlx::query_scalar("SELECT quantity FROM order_items WHERE order_id = $1")
            .bind(order_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(quantity, 1);

    assert_eq!(order_count(&pool).await, 1);
    assert_eq!(stock_of(&pool, scarf.id).await, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_open_checkout_does_not_block_other_shoppers_adding_the_product(pool: PgPool) {
    let (_buyer, buyer_token) = common::customer_with_token(&pool, "buyer@example.com").await;
    let (_browser, browser_token) =
        common::customer_with_token(&pool, "browser@example.com").await;
    let boots = common::create_product(&pool, "Boots", 45_000, 3).await;
    let gateway = Arc::new(FakeGateway::stalled(Duration::from_millis(700)));
    let app = common::build_test_app_with_gateway(pool.clone(), gateway.clone());

    add_to_cart(app.clone(), &buyer_token, boots.id, 1).await;

    let pending = tokio::spawn(checkout(app.clone(), buyer_token));
    while gateway.calls.load(Ordering::SeqCst) == 0 {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let added = add_to_cart(app.clone(), &browser_token, boots.id, 1).await;
    assert_eq!(added.status(), StatusCode::CREATED);
    assert!(
        !pending.is_finished(),
        "cart add should not wait for the open checkout"
    );

    let started = pending.await.unwrap();
    assert_eq!(started.status(), StatusCode::OK);
    assert_eq!(stock_of(&pool, boots.id).await, 2);
}
