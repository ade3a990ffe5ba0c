//! Webhook event parsers.

use serde_json::Value;

use crate::domain::payments::{
    data::{GatewayEvent, GatewayEventKind},
    records::Gateway,
};

use super::GatewayError;

struct EventShape {
    type_pointer: &'static str,
    completed: &'static str,
    failed: &'static str,
    id_pointer: &'static str,
    reason_pointer: &'static str,
}

const STRIPE: EventShape = EventShape {
    type_pointer: "/type",
    completed: "payment_intent.succeeded",
    failed: "payment_intent.payment_failed",
    id_pointer: "/data/object/id",
    reason_pointer: "/data/object/last_payment_error/message",
};

const PAYPAL: EventShape = EventShape {
    type_pointer: "/event_type",
    completed: "PAYMENT.CAPTURE.COMPLETED",
    failed: "PAYMENT.CAPTURE.DENIED",
    id_pointer: "/resource/supplementary_data/related_ids/order_id",
    reason_pointer: "/resource/status_details/reason",
};

const RAZORPAY: EventShape = EventShape {
    type_pointer: "/event",
    completed: "payment.captured",
    failed: "payment.failed",
    id_pointer: "/payload/payment/entity/order_id",
    reason_pointer: "/payload/payment/entity/error_description",
};

/// Classifies a verified webhook body.
pub(crate) fn parse_event(gateway: Gateway, body: &[u8]) -> Result<GatewayEvent, GatewayError> {
    let raw: Value = serde_json::from_slice(body)?;

    let shape = match gateway {
        Gateway::Stripe => &STRIPE,
        Gateway::Paypal => &PAYPAL,
        Gateway::Razorpay => &RAZORPAY,
    };

    let event_type = raw
        .pointer(shape.type_pointer)
        .and_then(Value::as_str)
        .ok_or_else(|| GatewayError::MalformedPayload("missing event type".to_string()))?;

    let text_at = |pointer: &str| {
        raw.pointer(pointer)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    let kind = if event_type == shape.completed {
        GatewayEventKind::PaymentCompleted
    } else if event_type == shape.failed {
        GatewayEventKind::PaymentFailed {
            reason: text_at(shape.reason_pointer),
        }
    } else {
        GatewayEventKind::Unknown {
            event_type: event_type.to_string(),
        }
    };

    let gateway_payment_id = text_at(shape.id_pointer);

    if !matches!(kind, GatewayEventKind::Unknown { .. }) && gateway_payment_id.is_none() {
        return Err(GatewayError::MalformedPayload(
            "missing payment id".to_string(),
        ));
    }

    Ok(GatewayEvent {
        gateway,
        kind,
        gateway_payment_id,
        raw,
    })
}
