//! Paystack REST client and webhook event parser.

use async_trait::async_trait;
use closet_core::payment::{verify_signature, PaymentOutcome, SignatureError};
use closet_core::types::DbId;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{GatewayError, PaymentGateway, PaymentRequest, PaymentSession};

pub const GATEWAY_NAME: &str = "paystack";

const DEFAULT_BASE_URL: &str = "https://api.paystack.co";
const DEFAULT_CURRENCY: &str = "GHS";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Paystack credentials and call settings.
#[derive(Debug, Clone)]
pub struct PaystackConfig {
    /// Secret key: authenticates API calls and signs webhooks.
    pub secret_key: String,
    pub base_url: String,
    /// ISO currency code sent with every transaction.
    pub currency: String,
    /// Upper bound on a payment initialisation call, in seconds.
    pub timeout_secs: u64,
}

impl PaystackConfig {
    /// Load Paystack configuration from environment variables.
    ///
    /// | Env Var                | Required | Default                   |
    /// |------------------------|----------|---------------------------|
    /// | `PAYSTACK_SECRET_KEY`  | **yes**  | --                        |
    /// | `PAYSTACK_BASE_URL`    | no       | `https://api.paystack.co` |
    /// | `PAYMENT_CURRENCY`     | no       | `GHS`                     |
    /// | `PAYMENT_TIMEOUT_SECS` | no       | `15`                      |
    ///
    /// # Panics
    ///
    /// Panics if `PAYSTACK_SECRET_KEY` is not set or is empty.
    pub fn from_env() -> Self {
        let secret_key = std::env::var("PAYSTACK_SECRET_KEY")
            .expect("PAYSTACK_SECRET_KEY must be set in the environment");
        assert!(!secret_key.is_empty(), "PAYSTACK_SECRET_KEY must not be empty");

        let base_url = std::env::var("PAYSTACK_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.into())
            .trim_end_matches('/')
            .to_string();

        let currency =
            std::env::var("PAYMENT_CURRENCY").unwrap_or_else(|_| DEFAULT_CURRENCY.into());

        let timeout_secs: u64 = std::env::var("PAYMENT_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .parse()
            .expect("PAYMENT_TIMEOUT_SECS must be a valid u64");

        Self {
            secret_key,
            base_url,
            currency,
            timeout_secs,
        }
    }
}

/// HTTP client for the Paystack transaction API.
pub struct PaystackGateway {
    client: reqwest::Client,
    config: PaystackConfig,
}

impl PaystackGateway {
    pub fn new(config: PaystackConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[derive(Debug, Deserialize)]
struct InitializeResponse {
    status: bool,
    #[serde(default)]
    message: String,
    data: Option<InitializeData>,
}

#[derive(Debug, Deserialize)]
struct InitializeData {
    authorization_url: String,
    reference: String,
}

#[async_trait]
impl PaymentGateway for PaystackGateway {
    fn name(&self) -> &str {
        GATEWAY_NAME
    }

    async fn initialize(&self, request: &PaymentRequest) -> Result<PaymentSession, GatewayError> {
        let response = self
            .client
            .post(format!("{}/transaction/initialize", self.config.base_url))
            .bearer_auth(&self.config.secret_key)
            .json(&initialize_body(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: InitializeResponse = response.json().await?;
        session_from_response(parsed)
    }

    fn verify_signature(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> Result<(), SignatureError> {
        verify_signature(&self.config.secret_key, payload, signature)
    }

    fn parse_event(&self, payload: &[u8]) -> Result<PaymentOutcome, GatewayError> {
        parse_event(payload)
    }
}

/// JSON body for `POST /transaction/initialize`.
///
/// The order and user ids travel in `metadata` and come back in webhooks.
pub fn initialize_body(request: &PaymentRequest) -> Value {
    json!({
        "email": request.email,
        "amount": request.amount_cents,
        "currency": request.currency,
        "callback_url": request.callback_url,
        "metadata": {
            "orderId": request.order_id,
            "userId": request.user_id,
            "custom_fields": [
                {
                    "display_name": "Customer Name",
                    "variable_name": "customer_name",
                    "value": request.customer_name.as_deref().unwrap_or("Customer"),
                },
                {
                    "display_name": "Payment Method",
                    "variable_name": "payment_method",
                    "value": request.payment_method.as_str(),
                },
            ],
        },
    })
}

fn session_from_response(response: InitializeResponse) -> Result<PaymentSession, GatewayError> {
    match (response.status, response.data) {
        (true, Some(data)) => Ok(PaymentSession {
            authorization_url: data.authorization_url,
            reference: data.reference,
        }),
        (true, None) => Err(GatewayError::InvalidPayload(
            "initialize response has no data".into(),
        )),
        (false, _) => Err(GatewayError::Rejected(if response.message.is_empty() {
            "unknown Paystack error".into()
        } else {
            response.message
        })),
    }
}

#[derive(Debug, Deserialize)]
struct WebhookEvent {
    event: String,
    #[serde(default)]
    data: Value,
}

/// Interpret a Paystack webhook body.
///
/// `charge.success` and `charge.failed` map to outcomes for the order named
/// in `data.metadata.orderId`; every other event is [`PaymentOutcome::Ignored`].
pub fn parse_event(payload: &[u8]) -> Result<PaymentOutcome, GatewayError> {
    let event: WebhookEvent = serde_json::from_slice(payload)
        .map_err(|e| GatewayError::InvalidPayload(e.to_string()))?;

    let reference = event
        .data
        .get("reference")
        .and_then(Value::as_str)
        .map(str::to_string);

    match event.event.as_str() {
        "charge.success" => Ok(PaymentOutcome::Succeeded {
            order_id: order_id(&event.data)?,
            reference: reference.ok_or_else(|| {
                GatewayError::InvalidPayload("charge.success without reference".into())
            })?,
        }),
        "charge.failed" => Ok(PaymentOutcome::Failed {
            order_id: order_id(&event.data)?,
            reference,
        }),
        _ => Ok(PaymentOutcome::Ignored { event: event.event }),
    }
}

/// Metadata values may come back as numbers or numeric strings.
fn order_id(data: &Value) -> Result<DbId, GatewayError> {
    let raw = data
        .get("metadata")
        .and_then(|m| m.get("orderId"))
        .ok_or_else(|| GatewayError::InvalidPayload("missing metadata.orderId".into()))?;

    raw.as_i64()
        .or_else(|| raw.as_str().and_then(|s| s.trim().parse().ok()))
        .ok_or_else(|| GatewayError::InvalidPayload(format!("bad metadata.orderId: {raw}")))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use closet_core::checkout::PaymentMethod;

    use super::*;

    fn request() -> PaymentRequest {
        PaymentRequest {
            order_id: 7,
            user_id: 3,
            email: "ama@example.com".into(),
            customer_name: None,
            amount_cents: 24_000,
            currency: "GHS".into(),
            payment_method: PaymentMethod::MtnMomo,
            callback_url: "http://localhost:4000/checkout-success.html?orderId=7".into(),
        }
    }

    #[test]
    fn initialize_body_carries_amount_in_minor_units_and_ids() {
        let body = initialize_body(&request());
        assert_eq!(body["amount"], 24_000);
        assert_eq!(body["currency"], "GHS");
        assert_eq!(body["metadata"]["orderId"], 7);
        assert_eq!(body["metadata"]["userId"], 3);
        assert_eq!(body["metadata"]["custom_fields"][0]["value"], "Customer");
        assert_eq!(body["metadata"]["custom_fields"][1]["value"], "mtn_momo");
    }

    #[test]
    fn declined_initialize_is_rejected() {
        let response = InitializeResponse {
            status: false,
            message: "Invalid key".into(),
            data: None,
        };
        assert_matches!(
            session_from_response(response),
            Err(GatewayError::Rejected(msg)) if msg == "Invalid key"
        );
    }

    #[test]
    fn successful_initialize_yields_session() {
        let response: InitializeResponse = serde_json::from_value(json!({
            "status": true,
            "message": "Authorization URL created",
            "data": {
                "authorization_url": "https://checkout.paystack.com/abc",
                "access_code": "abc",
                "reference": "ref_abc"
            }
        }))
        .unwrap();
        let session = session_from_response(response).unwrap();
        assert_eq!(session.reference, "ref_abc");
        assert_eq!(session.authorization_url, "https://checkout.paystack.com/abc");
    }

    #[test]
    fn charge_success_parses_string_order_id() {
        let body = br#"{"event":"charge.success","data":{"reference":"ref_1","metadata":{"orderId":"42"}}}"#;
        assert_eq!(
            parse_event(body).unwrap(),
            PaymentOutcome::Succeeded {
                order_id: 42,
                reference: "ref_1".into()
            }
        );
    }

    #[test]
    fn charge_failed_without_reference_is_accepted() {
        let body = br#"{"event":"charge.failed","data":{"metadata":{"orderId":5}}}"#;
        assert_eq!(
            parse_event(body).unwrap(),
            PaymentOutcome::Failed {
                order_id: 5,
                reference: None
            }
        );
    }

    #[test]
    fn other_events_are_ignored() {
        let body = br#"{"event":"transfer.success","data":{}}"#;
        assert_matches!(parse_event(body), Ok(PaymentOutcome::Ignored { event }) if event == "transfer.success");
    }

    #[test]
    fn missing_order_id_is_invalid() {
        let body = br#"{"event":"charge.success","data":{"reference":"r","metadata":{}}}"#;
        assert_matches!(parse_event(body), Err(GatewayError::InvalidPayload(_)));
    }
}
