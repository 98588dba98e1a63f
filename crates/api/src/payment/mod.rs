//! Payment gateway seam.
//!
//! Checkout talks to the provider only through [`PaymentGateway`], held as a
//! trait object in [`AppState`](crate::state::AppState).
//!
//! - [`paystack`] -- the Paystack REST client and webhook event parser.

pub mod paystack;

use async_trait::async_trait;
use closet_core::checkout::PaymentMethod;
use closet_core::payment::{PaymentOutcome, SignatureError};
use closet_core::types::{Cents, DbId};

/// Everything the provider needs to open a payment for an order.
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    pub order_id: DbId,
    pub user_id: DbId,
    pub email: String,
    pub customer_name: Option<String>,
    /// Amount in the currency's minor unit.
    pub amount_cents: Cents,
    pub currency: String,
    pub payment_method: PaymentMethod,
    pub callback_url: String,
}

/// A payment opened with the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSession {
    /// Hosted payment page the shopper is redirected to.
    pub authorization_url: String,
    /// Provider reference, stored as the order's `payment_ref`.
    pub reference: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Gateway API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The provider answered but declined to open the payment.
    #[error("Gateway rejected the request: {0}")]
    Rejected(String),

    /// A webhook or API body could not be understood.
    #[error("Invalid gateway payload: {0}")]
    InvalidPayload(String),
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Name used in the webhook path, e.g. `paystack`.
    fn name(&self) -> &str;

    /// Open a payment and return where to send the shopper.
    async fn initialize(&self, request: &PaymentRequest) -> Result<PaymentSession, GatewayError>;

    /// Check a webhook body against its signature header value.
    fn verify_signature(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> Result<(), SignatureError>;

    /// Interpret a verified webhook body.
    fn parse_event(&self, payload: &[u8]) -> Result<PaymentOutcome, GatewayError>;
}
