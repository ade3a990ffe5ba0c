//! Payments Data

use folio::OrderStatus;
use rustc_hash::FxHashMap;
use serde::Serialize;
use serde_json::Value;

use crate::domain::{
    orders::records::OrderUuid,
    payments::records::{Gateway, PaymentRecord, PaymentUuid},
};

/// Payment row written when an intent is created.
#[derive(Debug, Clone)]
pub(crate) struct NewPayment {
    pub uuid: PaymentUuid,
    pub order_uuid: OrderUuid,
    pub gateway: Gateway,
    pub gateway_payment_id: String,
    pub amount: u64,
    pub currency: String,
    pub raw_response: Option<Value>,
}

/// What a gateway needs to know to open a payment for an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentOrder {
    pub order_uuid: OrderUuid,
    pub order_number: String,
    pub amount: u64,
    pub currency: String,
    pub email: Option<String>,
}

/// Client-side data needed to complete a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum IntentConnection {
    Stripe {
        client_secret: String,
        publishable_key: String,
    },
    Paypal {
        paypal_order_id: String,
        approval_url: String,
    },
    Razorpay {
        razorpay_order_id: String,
        key_id: String,
    },
}

/// A gateway-side payment object.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayIntent {
    pub gateway_payment_id: String,
    pub connection: IntentConnection,
    pub raw: Value,
}

/// Returned to the caller of `create_intent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentIntent {
    pub payment_uuid: PaymentUuid,
    pub gateway: Gateway,

    #[serde(flatten)]
    pub connection: IntentConnection,
}

/// Classified webhook event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEventKind {
    PaymentCompleted,
    PaymentFailed { reason: Option<String> },
    Unknown { event_type: String },
}

/// A verified webhook, normalised across gateways.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayEvent {
    pub gateway: Gateway,
    pub kind: GatewayEventKind,
    pub gateway_payment_id: Option<String>,
    pub raw: Value,
}

/// An incoming webhook request. Header names are stored lowercase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebhookPayload {
    headers: FxHashMap<String, String>,
    body: Vec<u8>,
}

impl WebhookPayload {
    #[must_use]
    pub fn new<I, K, V>(headers: I, body: Vec<u8>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self {
            headers: headers
                .into_iter()
                .map(|(name, value)| (name.as_ref().to_ascii_lowercase(), value.into()))
                .collect(),
            body,
        }
    }

    /// Case-insensitive header lookup.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

/// Why a verified event changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    UnknownEvent,
    UnknownPayment,
    Stale,
}

/// Result of reconciling one webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Applied { payment_uuid: PaymentUuid },
    Duplicate { payment_uuid: PaymentUuid },
    Ignored(IgnoreReason),
}

impl ReconcileOutcome {
    /// Metric and log label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Applied { .. } => "applied",
            Self::Duplicate { .. } => "duplicate",
            Self::Ignored(IgnoreReason::UnknownEvent) => "ignored_unknown_event",
            Self::Ignored(IgnoreReason::UnknownPayment) => "ignored_unknown_payment",
            Self::Ignored(IgnoreReason::Stale) => "ignored_stale",
        }
    }
}

/// A payment with the state of its order.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentStatusView {
    pub payment: PaymentRecord,
    pub order_number: String,
    pub order_status: OrderStatus,
}
