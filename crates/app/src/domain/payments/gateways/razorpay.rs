//! Razorpay Orders.

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

use super::{GatewayError, PaymentGateway, decode_response, events, expect_success, signature};

pub const RAZORPAY_API_URL: &str = "https://api.razorpay.com";

#[derive(Clone)]
pub struct RazorpayConfig {
    pub api_url: String,
    pub key_id: String,
    pub key_secret: Zeroizing<String>,
    pub webhook_secret: Zeroizing<String>,
}

impl fmt::Debug for RazorpayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RazorpayConfig")
            .field("api_url", &self.api_url)
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct RazorpayGateway {
    http: Client,
    config: RazorpayConfig,
}

impl RazorpayGateway {
    #[must_use]
    pub fn new(http: Client, config: RazorpayConfig) -> Self {
        Self { http, config }
    }
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: String,
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    fn gateway(&self) -> Gateway {
        Gateway::Razorpay
    }

    async fn create_intent(&self, order: &IntentOrder) -> Result<GatewayIntent, GatewayError> {
        let url = format!("{}/v1/orders", self.config.api_url);

        let body = json!({
            "amount": order.amount,
            "currency": order.currency.to_ascii_uppercase(),
            "receipt": order.order_number,
            "notes": { "order_id": order.order_uuid.to_string() },
        });

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.config.key_id, Some(self.config.key_secret.as_str()))
            .json(&body)
            .send()
            .await?;

        let raw: Value = expect_success(response).await?.json().await?;
        let created: OrderResponse = decode_response(&raw)?;

        Ok(GatewayIntent {
            gateway_payment_id: created.id.clone(),
            connection: IntentConnection::Razorpay {
                razorpay_order_id: created.id,
                key_id: self.config.key_id.clone(),
            },
            raw,
        })
    }

    async fn verify_and_parse(
        &self,
        payload: &WebhookPayload,
    ) -> Result<GatewayEvent, GatewayError> {
        let header = payload
            .header("x-razorpay-signature")
            .ok_or(GatewayError::InvalidSignature)?;

        signature::verify_hex(
            self.config.webhook_secret.as_bytes(),
            &[payload.body()],
            header,
        )?;

        events::parse_event(Gateway::Razorpay, payload.body())
    }
}
