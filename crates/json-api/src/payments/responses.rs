//! Payment Responses

use folio_app::domain::payments::{
    data::{IntentConnection, PaymentIntent, PaymentStatusView},
    records::PaymentRecord,
};
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Gateway-specific client data
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub(crate) enum ConnectionResponse {
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

impl From<IntentConnection> for ConnectionResponse {
    fn from(connection: IntentConnection) -> Self {
        match connection {
            IntentConnection::Stripe {
                client_secret,
                publishable_key,
            } => Self::Stripe {
                client_secret,
                publishable_key,
            },
            IntentConnection::Paypal {
                paypal_order_id,
                approval_url,
            } => Self::Paypal {
                paypal_order_id,
                approval_url,
            },
            IntentConnection::Razorpay {
                razorpay_order_id,
                key_id,
            } => Self::Razorpay {
                razorpay_order_id,
                key_id,
            },
        }
    }
}

/// Payment Intent Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PaymentIntentResponse {
    pub payment_id: Uuid,
    pub gateway: String,

    #[serde(flatten)]
    pub connection: ConnectionResponse,
}

impl From<PaymentIntent> for PaymentIntentResponse {
    fn from(intent: PaymentIntent) -> Self {
        Self {
            payment_id: intent.payment_uuid.into_uuid(),
            gateway: intent.gateway.to_string(),
            connection: intent.connection.into(),
        }
    }
}

/// Payment Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PaymentResponse {
    pub uuid: Uuid,
    pub order_uuid: Uuid,
    pub gateway: String,
    pub gateway_payment_id: String,
    pub amount: u64,
    pub currency: String,
    pub status: String,
    pub failure_reason: Option<String>,
    pub processed_at: Option<String>,
    pub created_at: String,
}

impl From<PaymentRecord> for PaymentResponse {
    fn from(payment: PaymentRecord) -> Self {
        Self {
            uuid: payment.uuid.into_uuid(),
            order_uuid: payment.order_uuid.into_uuid(),
            gateway: payment.gateway.to_string(),
            gateway_payment_id: payment.gateway_payment_id,
            amount: payment.amount,
            currency: payment.currency,
            status: payment.status.to_string(),
            failure_reason: payment.failure_reason,
            processed_at: payment.processed_at.map(|at| at.to_string()),
            created_at: payment.created_at.to_string(),
        }
    }
}

/// Payment Status Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PaymentStatusResponse {
    pub payment: PaymentResponse,
    pub order_number: String,
    pub order_status: String,
}

impl From<PaymentStatusView> for PaymentStatusResponse {
    fn from(view: PaymentStatusView) -> Self {
        Self {
            payment: view.payment.into(),
            order_number: view.order_number,
            order_status: view.order_status.to_string(),
        }
    }
}

/// Webhook Acknowledgement
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct WebhookResponse {
    /// `applied`, `duplicate` or `ignored_*`
    pub outcome: String,
}
