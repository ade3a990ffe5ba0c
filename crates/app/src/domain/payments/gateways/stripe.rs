//! Stripe Payment Intents.

use std::fmt;

use async_trait::async_trait;
use jiff::Timestamp;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use zeroize::Zeroizing;

use crate::domain::payments::{
    data::{GatewayEvent, GatewayIntent, IntentConnection, IntentOrder, WebhookPayload},
    records::Gateway,
};

use super::{GatewayError, PaymentGateway, decode_response, events, expect_success, signature};

pub const STRIPE_API_URL: &str = "https://api.stripe.com";

/// Default allowed clock skew for `Stripe-Signature` timestamps.
pub const DEFAULT_STRIPE_TOLERANCE_SECONDS: i64 = 300;

#[derive(Clone)]
pub struct StripeConfig {
    pub api_url: String,
    pub secret_key: Zeroizing<String>,
    pub publishable_key: String,
    pub webhook_secret: Zeroizing<String>,
    pub webhook_tolerance_seconds: i64,
}

impl fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StripeConfig")
            .field("api_url", &self.api_url)
            .field("publishable_key", &self.publishable_key)
            .field("webhook_tolerance_seconds", &self.webhook_tolerance_seconds)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct StripeGateway {
    http: Client,
    config: StripeConfig,
}

impl StripeGateway {
    #[must_use]
    pub fn new(http: Client, config: StripeConfig) -> Self {
        Self { http, config }
    }
}

#[derive(Debug, Deserialize)]
struct PaymentIntentResponse {
    id: String,
    client_secret: String,
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    fn gateway(&self) -> Gateway {
        Gateway::Stripe
    }

    async fn create_intent(&self, order: &IntentOrder) -> Result<GatewayIntent, GatewayError> {
        let url = format!("{}/v1/payment_intents", self.config.api_url);

        let amount = order.amount.to_string();
        let currency = order.currency.to_ascii_lowercase();
        let order_uuid = order.order_uuid.to_string();

        let mut form = vec![
            ("amount", amount.as_str()),
            ("currency", currency.as_str()),
            ("metadata[order_id]", order_uuid.as_str()),
            ("metadata[order_number]", order.order_number.as_str()),
        ];

        if let Some(email) = order.email.as_deref() {
            form.push(("receipt_email", email));
        }

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.config.secret_key.as_str())
            .form(&form)
            .send()
            .await?;

        let raw: Value = expect_success(response).await?.json().await?;
        let intent: PaymentIntentResponse = decode_response(&raw)?;

        Ok(GatewayIntent {
            gateway_payment_id: intent.id,
            connection: IntentConnection::Stripe {
                client_secret: intent.client_secret,
                publishable_key: self.config.publishable_key.clone(),
            },
            raw,
        })
    }

    async fn verify_and_parse(
        &self,
        payload: &WebhookPayload,
    ) -> Result<GatewayEvent, GatewayError> {
        let header = payload
            .header("stripe-signature")
            .ok_or(GatewayError::InvalidSignature)?;

        signature::verify_stripe(
            self.config.webhook_secret.as_bytes(),
            header,
            payload.body(),
            Timestamp::now(),
            self.config.webhook_tolerance_seconds,
        )?;

        events::parse_event(Gateway::Stripe, payload.body())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn gateway() -> StripeGateway {
        StripeGateway::new(
            Client::new(),
            StripeConfig {
                api_url: "http://127.0.0.1:9".to_string(),
                secret_key: Zeroizing::new("sk_test".to_string()),
                publishable_key: "pk_test".to_string(),
                webhook_secret: Zeroizing::new("whsec_test".to_string()),
                webhook_tolerance_seconds: DEFAULT_STRIPE_TOLERANCE_SECONDS,
            },
        )
    }

    #[tokio::test]
    async fn signed_webhook_is_parsed() -> TestResult {
        let body = br#"{"type":"payment_intent.succeeded","data":{"object":{"id":"pi_123"}}}"#;
        let t = Timestamp::now().as_second().to_string();
        let v1 = signature::sign_hex(b"whsec_test", &[t.as_bytes(), b".", body])?;

        let payload = WebhookPayload::new(
            [("Stripe-Signature", format!("t={t},v1={v1}"))],
            body.to_vec(),
        );

        let event = gateway().verify_and_parse(&payload).await?;

        assert_eq!(event.gateway, Gateway::Stripe);
        assert_eq!(event.gateway_payment_id.as_deref(), Some("pi_123"));

        Ok(())
    }

    #[tokio::test]
    async fn unsigned_webhook_is_rejected() {
        let payload = WebhookPayload::new(
            std::iter::empty::<(&str, String)>(),
            br#"{"type":"payment_intent.succeeded"}"#.to_vec(),
        );

        let result = gateway().verify_and_parse(&payload).await;

        assert!(
            matches!(result, Err(GatewayError::InvalidSignature)),
            "expected InvalidSignature, got {result:?}"
        );
    }

    #[test]
    fn debug_hides_secrets() {
        let rendered = format!("{:?}", gateway().config);

        assert!(!rendered.contains("sk_test"));
        assert!(!rendered.contains("whsec_test"));
    }
}
