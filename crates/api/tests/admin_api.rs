//! Integration tests for the `/admin` endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_json_auth, put_json_auth, sign, post_webhook};
use serde_json::json;
use sqlx::PgPool;

async fn paid_order(pool: &PgPool, app: axum::Router) -> i64 {
    let (_user, token) = common::customer_with_token(pool, "paid@example.com").await;
    let boots = common::create_product(pool, "Boots", 30_000, 2).await;

    post_json_auth(
        app.clone(),
        "/api/v1/cart",
        json!({ "productId": boots.id, "quantity": 1 }),
        &token,
    )
    .await;
    let started = body_json(
        post_json_auth(
            app.clone(),
            "/api/v1/orders/checkout",
            json!({ "email": "paid@example.com" }),
            &token,
        )
        .await,
    )
    .await;
    let order_id = started["orderId"].as_i64().unwrap();

    let (bytes, signature) = sign(&json!({
        "event": "charge.success",
        "data": { "reference": "ref_paid", "metadata": { "orderId": order_id } }
    }));
    post_webhook(app, "/webhook/paystack", bytes, Some(&signature)).await;
    order_id
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_admin_routes_reject_customers(pool: PgPool) {
    let (_user, token) = common::customer_with_token(&pool, "nosy@example.com").await;
    let app = common::build_test_app(pool);

    for uri in ["/api/v1/admin/overview", "/api/v1/admin/orders"] {
        let response = get_auth(app.clone(), uri, &token).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri}");
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_overview_counts_paid_revenue(pool: PgPool) {
    let admin = common::admin_token(&pool).await;
    let app = common::build_test_app(pool.clone());
    paid_order(&pool, app.clone()).await;

    let overview = body_json(get_auth(app, "/api/v1/admin/overview", &admin).await).await;
    assert_eq!(overview["userCount"], 2);
    assert_eq!(overview["orderCount"], 1);
    assert_eq!(overview["revenueCents"], 30_000);
    assert_eq!(overview["pendingOrders"], 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_status_changes_follow_the_lifecycle(pool: PgPool) {
    let admin = common::admin_token(&pool).await;
    let app = common::build_test_app(pool.clone());
    let order_id = paid_order(&pool, app.clone()).await;
    let uri = format!("/api/v1/admin/orders/{order_id}/status");

    let skip = put_json_auth(app.clone(), &uri, json!({ "status": "completed" }), &admin).await;
    assert_eq!(skip.status(), StatusCode::CONFLICT);

    let shipped = put_json_auth(app.clone(), &uri, json!({ "status": "shipped" }), &admin).await;
    assert_eq!(shipped.status(), StatusCode::OK);
    let shipped = body_json(shipped).await;
    assert_eq!(shipped["status"], "shipped");
    assert_eq!(shipped["items"].as_array().unwrap().len(), 1);

    let orders = body_json(get_auth(app.clone(), "/api/v1/admin/orders", &admin).await).await;
    assert_eq!(orders[0]["status"], "shipped");

    let unknown = put_json_auth(
        app,
        "/api/v1/admin/orders/999999/status",
        json!({ "status": "shipped" }),
        &admin,
    )
    .await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_rename_category_reports_affected_rows(pool: PgPool) {
    let admin = common::admin_token(&pool).await;
    common::create_product(&pool, "Tee", 1_000, 1).await;
    common::create_product(&pool, "Polo", 2_000, 1).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app.clone(),
        "/api/v1/admin/categories/rename",
        json!({ "old": "Shirts", "next": "Tops" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["affected"], 2);

    let blank = post_json_auth(
        app,
        "/api/v1/admin/categories/rename",
        json!({ "old": "Tops", "next": "   " }),
        &admin,
    )
    .await;
    assert_eq!(blank.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_rename_category_still_accepts_new_field(pool: PgPool) {
    let admin = common::admin_token(&pool).await;
    common::create_product(&pool, "Tee", 1_000, 1).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/v1/admin/categories/rename",
        json!({ "old": "Shirts", "new": "Tops" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["affected"], 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_admin_categories_are_largest_first(pool: PgPool) {
    let admin = common::admin_token(&pool).await;
    let (_user, customer) = common::customer_with_token(&pool, "shopper@example.com").await;
    common::create_product(&pool, "Tee", 1_000, 1).await;
    common::create_product(&pool, "Polo", 2_000, 1).await;
    let cap = common::create_product(&pool, "Cap", 800, 1).await;
    sqlx::query("UPDATE products SET category = 'Hats' WHERE id = $1")
        .bind(cap.id)
        .execute(&pool)
        .await
        .unwrap();
    let app = common::build_test_app(pool);

    let response = get_auth(app.clone(), "/api/v1/admin/categories", &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!([
            { "category": "Shirts", "count": 2 },
            { "category": "Hats", "count": 1 }
        ])
    );

    let denied = get_auth(app, "/api/v1/admin/categories", &customer).await;
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);
}
