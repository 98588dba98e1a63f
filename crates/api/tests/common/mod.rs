//! Shared harness for HTTP-level integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use closet_api::auth::jwt::{generate_access_token, JwtConfig};
use closet_api::auth::password::hash_password;
use closet_api::config::ServerConfig;
use closet_api::payment::paystack::{self, PaystackConfig};
use closet_api::payment::{
    GatewayError, PaymentGateway, PaymentRequest, PaymentSession,
};
use closet_api::router::build_app_router;
use closet_api::state::AppState;
use closet_core::payment::{compute_signature, verify_signature, PaymentOutcome, SignatureError};
use closet_core::roles::{ROLE_ADMIN, ROLE_CUSTOMER};
use closet_core::types::DbId;
use closet_db::models::product::{CreateProduct, Product};
use closet_db::models::user::{CreateUser, User};
use closet_db::repositories::{ProductRepo, UserRepo};

/// Webhook signing secret used by [`FakeGateway`].
pub const TEST_SECRET: &str = "sk_test_integration";

pub const TEST_PASSWORD: &str = "secret123";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:4000".to_string()],
        request_timeout_secs: 30,
        db_max_connections: 5,
        client_url: "http://localhost:4000".to_string(),
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 60,
            refresh_token_expiry_days: 7,
        },
        paystack: PaystackConfig {
            secret_key: TEST_SECRET.to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
            currency: "GHS".to_string(),
            timeout_secs: 1,
        },
    }
}

/// In-process stand-in for the payment provider.
///
/// Signs and parses webhooks exactly like Paystack; `initialize` succeeds
/// unless told to fail or stall.
#[derive(Default)]
pub struct FakeGateway {
    pub fail: bool,
    pub delay: Option<Duration>,
    pub calls: AtomicUsize,
}

impl FakeGateway {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn stalled(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    fn name(&self) -> &str {
        paystack::GATEWAY_NAME
    }

    async fn initialize(&self, request: &PaymentRequest) -> Result<PaymentSession, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(GatewayError::Api {
                status: 401,
                body: r#"{"status":false,"message":"Invalid key"}"#.to_string(),
            });
        }
        Ok(PaymentSession {
            authorization_url: format!("https://checkout.test/pay/{}", request.order_id),
            reference: format!("ref_{}", request.order_id),
        })
    }

    fn verify_signature(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> Result<(), SignatureError> {
        verify_signature(TEST_SECRET, payload, signature)
    }

    fn parse_event(&self, payload: &[u8]) -> Result<PaymentOutcome, GatewayError> {
        paystack::parse_event(payload)
    }
}

pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_gateway(pool, Arc::new(FakeGateway::default()))
}

/// Build the full application router, exactly as `main.rs` does, around
/// the given gateway.
pub fn build_test_app_with_gateway(pool: PgPool, gateway: Arc<dyn PaymentGateway>) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        gateway,
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub async fn create_user(pool: &PgPool, email: &str, role: &str) -> User {
    let input = CreateUser {
        name: "Test User".to_string(),
        email: email.to_string(),
        password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
        role: role.to_string(),
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

/// A customer and a valid access token for them.
pub async fn customer_with_token(pool: &PgPool, email: &str) -> (User, String) {
    let user = create_user(pool, email, ROLE_CUSTOMER).await;
    let token = token_for(user.id, ROLE_CUSTOMER);
    (user, token)
}

pub async fn admin_token(pool: &PgPool) -> String {
    let user = create_user(pool, "admin@closet.test", ROLE_ADMIN).await;
    token_for(user.id, ROLE_ADMIN)
}

pub fn token_for(user_id: DbId, role: &str) -> String {
    generate_access_token(user_id, role, &test_config().jwt).expect("token generation")
}

pub async fn create_product(pool: &PgPool, name: &str, price_cents: i64, stock: i32) -> Product {
    let input = CreateProduct {
        name: name.to_string(),
        category: "Shirts".to_string(),
        price_cents,
        image_url: String::new(),
        images: Vec::new(),
        description: String::new(),
        stock,
        sizes: vec!["S".to_string(), "M".to_string()],
        colors: vec!["Black".to_string()],
        gender: "women".to_string(),
    };
    ProductRepo::create(pool, &input)
        .await
        .expect("product creation should succeed")
}

/// Sign a webhook body with [`TEST_SECRET`].
pub fn sign(body: &serde_json::Value) -> (Vec<u8>, String) {
    let bytes = serde_json::to_vec(body).expect("serialize webhook");
    let signature = compute_signature(TEST_SECRET, &bytes);
    (bytes, signature)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("request should complete")
}

fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, json_request(Method::GET, uri, None, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, json_request(Method::GET, uri, Some(token), None)).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, json_request(Method::POST, uri, None, Some(body))).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, json_request(Method::POST, uri, Some(token), Some(body))).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, json_request(Method::PUT, uri, Some(token), Some(body))).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, json_request(Method::DELETE, uri, Some(token), None)).await
}

/// POST raw webhook bytes with an optional signature header.
pub async fn post_webhook(
    app: Router,
    uri: &str,
    body: Vec<u8>,
    signature: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(signature) = signature {
        builder = builder.header(closet_core::payment::SIGNATURE_HEADER, signature);
    }
    send(app, builder.body(Body::from(body)).unwrap()).await
}
