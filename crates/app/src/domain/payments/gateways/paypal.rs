//! PayPal Orders v2.

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use zeroize::Zeroizing;

use crate::domain::payments::{
    data::{GatewayEvent, GatewayIntent, IntentConnection, IntentOrder, WebhookPayload},
    records::Gateway,
};

use super::{GatewayError, PaymentGateway, decode_response, events, expect_success};

pub const PAYPAL_SANDBOX_URL: &str = "https://api-m.sandbox.paypal.com";

const TRANSMISSION_HEADERS: [(&str, &str); 5] = [
    ("auth_algo", "paypal-auth-algo"),
    ("cert_url", "paypal-cert-url"),
    ("transmission_id", "paypal-transmission-id"),
    ("transmission_sig", "paypal-transmission-sig"),
    ("transmission_time", "paypal-transmission-time"),
];

#[derive(Clone)]
pub struct PaypalConfig {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: Zeroizing<String>,
    pub webhook_id: String,
}

impl fmt::Debug for PaypalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaypalConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("webhook_id", &self.webhook_id)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct PaypalGateway {
    http: Client,
    config: PaypalConfig,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: String,

    #[serde(default)]
    links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct Link {
    href: String,
    rel: String,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    verification_status: String,
}

impl PaypalGateway {
    #[must_use]
    pub fn new(http: Client, config: PaypalConfig) -> Self {
        Self { http, config }
    }

    async fn access_token(&self) -> Result<Zeroizing<String>, GatewayError> {
        let url = format!("{}/v1/oauth2/token", self.config.base_url);

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.config.client_id, Some(self.config.client_secret.as_str()))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let token: TokenResponse = expect_success(response).await?.json().await?;

        Ok(Zeroizing::new(token.access_token))
    }
}

/// Minor units as a two-decimal string, e.g. `4500` as `"45.00"`.
fn decimal_amount(amount: u64) -> String {
    format!("{}.{:02}", amount / 100, amount % 100)
}

#[async_trait]
impl PaymentGateway for PaypalGateway {
    fn gateway(&self) -> Gateway {
        Gateway::Paypal
    }

    async fn create_intent(&self, order: &IntentOrder) -> Result<GatewayIntent, GatewayError> {
        let token = self.access_token().await?;
        let url = format!("{}/v2/checkout/orders", self.config.base_url);

        let body = json!({
            "intent": "CAPTURE",
            "purchase_units": [{
                "reference_id": order.order_number,
                "custom_id": order.order_uuid.to_string(),
                "amount": {
                    "currency_code": order.currency.to_ascii_uppercase(),
                    "value": decimal_amount(order.amount),
                },
            }],
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(token.as_str())
            .json(&body)
            .send()
            .await?;

        let raw: Value = expect_success(response).await?.json().await?;
        let created: OrderResponse = decode_response(&raw)?;

        let approval_url = created
            .links
            .into_iter()
            .find(|link| link.rel == "approve" || link.rel == "payer-action")
            .map(|link| link.href)
            .ok_or_else(|| GatewayError::UnexpectedResponse("missing approval link".to_string()))?;

        Ok(GatewayIntent {
            gateway_payment_id: created.id.clone(),
            connection: IntentConnection::Paypal {
                paypal_order_id: created.id,
                approval_url,
            },
            raw,
        })
    }

    async fn verify_and_parse(
        &self,
        payload: &WebhookPayload,
    ) -> Result<GatewayEvent, GatewayError> {
        let mut request = serde_json::Map::new();

        for (field, header) in TRANSMISSION_HEADERS {
            let value = payload
                .header(header)
                .ok_or(GatewayError::InvalidSignature)?;

            request.insert(field.to_string(), Value::from(value));
        }

        let webhook_event: Value = serde_json::from_slice(payload.body())?;

        request.insert(
            "webhook_id".to_string(),
            Value::from(self.config.webhook_id.as_str()),
        );
        request.insert("webhook_event".to_string(), webhook_event);

        let token = self.access_token().await?;
        let url = format!(
            "{}/v1/notifications/verify-webhook-signature",
            self.config.base_url
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(token.as_str())
            .json(&request)
            .send()
            .await?;

        let verified: VerifyResponse = expect_success(response).await?.json().await?;

        if verified.verification_status != "SUCCESS" {
            return Err(GatewayError::InvalidSignature);
        }

        events::parse_event(Gateway::Paypal, payload.body())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_render_with_two_decimals() {
        assert_eq!(decimal_amount(4_500), "45.00");
        assert_eq!(decimal_amount(5), "0.05");
        assert_eq!(decimal_amount(123_456), "1234.56");
    }

    #[tokio::test]
    async fn webhook_without_transmission_headers_is_rejected() {
        let gateway = PaypalGateway::new(
            Client::new(),
            PaypalConfig {
                base_url: "http://127.0.0.1:9".to_string(),
                client_id: "client".to_string(),
                client_secret: Zeroizing::new("secret".to_string()),
                webhook_id: "WH-1".to_string(),
            },
        );

        let payload = WebhookPayload::new(
            [("paypal-transmission-id", "abc")],
            br#"{"event_type":"PAYMENT.CAPTURE.COMPLETED"}"#.to_vec(),
        );

        let result = gateway.verify_and_parse(&payload).await;

        assert!(
            matches!(result, Err(GatewayError::InvalidSignature)),
            "expected InvalidSignature, got {result:?}"
        );
    }
}
