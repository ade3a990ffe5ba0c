//! Payment gateway adapters.

use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use mockall::automock;
use reqwest::Client;
use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::domain::payments::{
    data::{GatewayEvent, GatewayIntent, IntentOrder, WebhookPayload},
    records::Gateway,
};

mod events;
mod paypal;
mod razorpay;
mod signature;
mod stripe;

pub use paypal::{PAYPAL_SANDBOX_URL, PaypalConfig, PaypalGateway};
pub use razorpay::{RAZORPAY_API_URL, RazorpayConfig, RazorpayGateway};
pub use stripe::{STRIPE_API_URL, StripeConfig, StripeGateway};

/// Default bound on a single gateway HTTP call.
pub const DEFAULT_GATEWAY_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors raised by a gateway adapter.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Transport failure or timeout. Retryable.
    #[error("gateway unavailable: {0}")]
    Unavailable(#[from] reqwest::Error),

    /// The gateway answered with a non-success status.
    #[error("gateway rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("invalid webhook signature")]
    InvalidSignature,

    /// A webhook body that cannot be classified.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// A success reply from the gateway API that lacks what we asked for.
    /// Retryable, like `Unavailable`.
    #[error("unexpected gateway response: {0}")]
    UnexpectedResponse(String),
}

impl From<serde_json::Error> for GatewayError {
    fn from(error: serde_json::Error) -> Self {
        Self::MalformedPayload(error.to_string())
    }
}

/// One payment provider.
#[automock]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    fn gateway(&self) -> Gateway;

    /// Opens a gateway-side payment for `order`.
    async fn create_intent(&self, order: &IntentOrder) -> Result<GatewayIntent, GatewayError>;

    /// Authenticates a webhook and classifies its event. Nothing in the body is
    /// trusted before the signature checks out.
    async fn verify_and_parse(&self, payload: &WebhookPayload)
    -> Result<GatewayEvent, GatewayError>;
}

/// Credentials for every gateway that should be enabled.
#[derive(Debug, Clone)]
pub struct GatewaysConfig {
    pub timeout: Duration,
    pub stripe: Option<StripeConfig>,
    pub paypal: Option<PaypalConfig>,
    pub razorpay: Option<RazorpayConfig>,
}

impl Default for GatewaysConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_GATEWAY_TIMEOUT,
            stripe: None,
            paypal: None,
            razorpay: None,
        }
    }
}

/// The configured gateways, keyed by provider.
#[derive(Clone, Default)]
pub struct GatewayRegistry {
    gateways: FxHashMap<Gateway, Arc<dyn PaymentGateway>>,
}

impl GatewayRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds HTTP adapters for every gateway with credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: GatewaysConfig) -> Result<Self, GatewayError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        let mut registry = Self::new();

        if let Some(stripe) = config.stripe {
            registry.register(Arc::new(StripeGateway::new(http.clone(), stripe)));
        }

        if let Some(paypal) = config.paypal {
            registry.register(Arc::new(PaypalGateway::new(http.clone(), paypal)));
        }

        if let Some(razorpay) = config.razorpay {
            registry.register(Arc::new(RazorpayGateway::new(http, razorpay)));
        }

        Ok(registry)
    }

    /// Adds or replaces the adapter for its gateway.
    pub fn register(&mut self, adapter: Arc<dyn PaymentGateway>) {
        self.gateways.insert(adapter.gateway(), adapter);
    }

    #[must_use]
    pub fn with(mut self, adapter: Arc<dyn PaymentGateway>) -> Self {
        self.register(adapter);
        self
    }

    #[must_use]
    pub fn get(&self, gateway: Gateway) -> Option<Arc<dyn PaymentGateway>> {
        self.gateways.get(&gateway).cloned()
    }

    /// Enabled gateways in declaration order.
    #[must_use]
    pub fn configured(&self) -> Vec<Gateway> {
        Gateway::ALL
            .into_iter()
            .filter(|gateway| self.gateways.contains_key(gateway))
            .collect()
    }
}

impl fmt::Debug for GatewayRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayRegistry")
            .field("gateways", &self.configured())
            .finish()
    }
}

/// Reads a response body, turning non-success statuses into `Rejected`.
pub(crate) async fn expect_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, GatewayError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();

    Err(GatewayError::Rejected {
        status: status.as_u16(),
        body,
    })
}

/// Decodes a gateway API reply. Unlike webhook bodies, a bad reply here is
/// the gateway's fault, not the caller's.
pub(crate) fn decode_response<T: DeserializeOwned>(raw: &Value) -> Result<T, GatewayError> {
    T::deserialize(raw).map_err(|error| GatewayError::UnexpectedResponse(error.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock(gateway: Gateway) -> Arc<dyn PaymentGateway> {
        let mut adapter = MockPaymentGateway::new();

        adapter.expect_gateway().return_const(gateway);

        Arc::new(adapter)
    }

    #[test]
    fn registry_only_lists_registered_gateways() {
        let registry = GatewayRegistry::new()
            .with(mock(Gateway::Razorpay))
            .with(mock(Gateway::Stripe));

        assert_eq!(
            registry.configured(),
            vec![Gateway::Stripe, Gateway::Razorpay]
        );
        assert!(registry.get(Gateway::Paypal).is_none());
        assert!(registry.get(Gateway::Stripe).is_some());
    }

    #[test]
    fn empty_config_registers_nothing() -> Result<(), GatewayError> {
        let registry = GatewayRegistry::from_config(GatewaysConfig::default())?;

        assert!(registry.configured().is_empty());

        Ok(())
    }

    #[test]
    fn undecodable_api_reply_is_unexpected_response() {
        let result = decode_response::<u64>(&serde_json::json!({ "status": "ok" }));

        assert!(matches!(result, Err(GatewayError::UnexpectedResponse(_))));
    }
}
