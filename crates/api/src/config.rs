use closet_core::types::DbId;

use crate::auth::jwt::JwtConfig;
use crate::payment::paystack::PaystackConfig;

/// Server configuration loaded from environment variables.
///
/// Defaults suit local development; production overrides via the
/// environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Connection pool ceiling (default: `20`).
    pub db_max_connections: u32,
    /// Storefront base URL; the payment callback lands under it.
    pub client_url: String,
    pub jwt: JwtConfig,
    pub paystack: PaystackConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                 |
    /// |------------------------|-------------------------|
    /// | `HOST`                 | `0.0.0.0`               |
    /// | `PORT`                 | `3000`                  |
    /// | `CORS_ORIGINS`         | `http://localhost:4000` |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                    |
    /// | `DB_MAX_CONNECTIONS`   | `20`                    |
    /// | `CLIENT_URL`           | `http://localhost:4000` |
    ///
    /// JWT and payment settings are read by [`JwtConfig::from_env`] and
    /// [`PaystackConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:4000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let db_max_connections: u32 = std::env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "20".into())
            .parse()
            .expect("DB_MAX_CONNECTIONS must be a valid u32");

        let client_url = std::env::var("CLIENT_URL")
            .unwrap_or_else(|_| "http://localhost:4000".into())
            .trim_end_matches('/')
            .to_string();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            db_max_connections,
            client_url,
            jwt: JwtConfig::from_env(),
            paystack: PaystackConfig::from_env(),
        }
    }

    /// Where the gateway sends the shopper after paying for `order_id`.
    pub fn payment_callback_url(&self, order_id: DbId) -> String {
        format!("{}/checkout-success.html?orderId={order_id}", self.client_url)
    }

    /// Storefront page that redeems a password reset token.
    pub fn password_reset_url(&self, token: &str) -> String {
        format!("{}/reset-password.html?token={token}", self.client_url)
    }
}
