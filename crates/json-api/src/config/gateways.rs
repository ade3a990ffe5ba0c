//! Payment Gateway Config

use std::time::Duration;

use clap::Args;
use folio_app::domain::payments::gateways::{
    GatewaysConfig, PAYPAL_SANDBOX_URL, PaypalConfig, RAZORPAY_API_URL, RazorpayConfig,
    STRIPE_API_URL, StripeConfig,
};
use zeroize::Zeroizing;

/// Gateway credentials. A gateway is registered only when all of its
/// credentials are present.
#[derive(Args)]
pub struct GatewaysSettings {
    /// Timeout for outbound gateway calls in milliseconds
    #[arg(long, env = "GATEWAY_TIMEOUT_MS", default_value_t = 10_000_u64)]
    pub gateway_timeout_ms: u64,

    /// Stripe secret API key
    #[arg(long, env = "STRIPE_SECRET_KEY", hide_env_values = true)]
    pub stripe_secret_key: Option<String>,

    /// Stripe publishable key returned to clients
    #[arg(long, env = "STRIPE_PUBLISHABLE_KEY")]
    pub stripe_publishable_key: Option<String>,

    /// Stripe webhook signing secret
    #[arg(long, env = "STRIPE_WEBHOOK_SECRET", hide_env_values = true)]
    pub stripe_webhook_secret: Option<String>,

    /// Maximum age of a Stripe webhook signature in seconds
    #[arg(long, env = "STRIPE_WEBHOOK_TOLERANCE_SECONDS", default_value_t = 300_i64)]
    pub stripe_webhook_tolerance_seconds: i64,

    /// PayPal REST client id
    #[arg(long, env = "PAYPAL_CLIENT_ID")]
    pub paypal_client_id: Option<String>,

    /// PayPal REST client secret
    #[arg(long, env = "PAYPAL_CLIENT_SECRET", hide_env_values = true)]
    pub paypal_client_secret: Option<String>,

    /// PayPal webhook id used for signature verification
    #[arg(long, env = "PAYPAL_WEBHOOK_ID")]
    pub paypal_webhook_id: Option<String>,

    /// PayPal API base URL
    #[arg(long, env = "PAYPAL_BASE_URL", default_value = PAYPAL_SANDBOX_URL)]
    pub paypal_base_url: String,

    /// Razorpay key id
    #[arg(long, env = "RAZORPAY_KEY_ID")]
    pub razorpay_key_id: Option<String>,

    /// Razorpay key secret
    #[arg(long, env = "RAZORPAY_KEY_SECRET", hide_env_values = true)]
    pub razorpay_key_secret: Option<String>,

    /// Razorpay webhook secret
    #[arg(long, env = "RAZORPAY_WEBHOOK_SECRET", hide_env_values = true)]
    pub razorpay_webhook_secret: Option<String>,
}

impl std::fmt::Debug for GatewaysSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewaysSettings")
            .field("gateway_timeout_ms", &self.gateway_timeout_ms)
            .field("stripe_publishable_key", &self.stripe_publishable_key)
            .field("paypal_client_id", &self.paypal_client_id)
            .field("paypal_base_url", &self.paypal_base_url)
            .field("razorpay_key_id", &self.razorpay_key_id)
            .finish_non_exhaustive()
    }
}

impl GatewaysSettings {
    pub(crate) fn gateways_config(&self) -> GatewaysConfig {
        GatewaysConfig {
            timeout: Duration::from_millis(self.gateway_timeout_ms),
            stripe: self.stripe(),
            paypal: self.paypal(),
            razorpay: self.razorpay(),
        }
    }

    fn stripe(&self) -> Option<StripeConfig> {
        Some(StripeConfig {
            api_url: STRIPE_API_URL.to_string(),
            secret_key: secret(self.stripe_secret_key.as_ref()?),
            publishable_key: self.stripe_publishable_key.clone()?,
            webhook_secret: secret(self.stripe_webhook_secret.as_ref()?),
            webhook_tolerance_seconds: self.stripe_webhook_tolerance_seconds,
        })
    }

    fn paypal(&self) -> Option<PaypalConfig> {
        Some(PaypalConfig {
            base_url: self.paypal_base_url.clone(),
            client_id: self.paypal_client_id.clone()?,
            client_secret: secret(self.paypal_client_secret.as_ref()?),
            webhook_id: self.paypal_webhook_id.clone()?,
        })
    }

    fn razorpay(&self) -> Option<RazorpayConfig> {
        Some(RazorpayConfig {
            api_url: RAZORPAY_API_URL.to_string(),
            key_id: self.razorpay_key_id.clone()?,
            key_secret: secret(self.razorpay_key_secret.as_ref()?),
            webhook_secret: secret(self.razorpay_webhook_secret.as_ref()?),
        })
    }
}

fn secret(value: &str) -> Zeroizing<String> {
    Zeroizing::new(value.to_string())
}
