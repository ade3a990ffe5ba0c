//! Payment Webhook Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use tracing::{info, warn};

use folio_app::domain::payments::{
    PaymentsServiceError,
    data::{ReconcileOutcome, WebhookPayload},
    gateways::GatewayError,
    records::Gateway,
};

use crate::{
    extensions::*,
    observability::{WebhookOutcome, observe_webhook_event},
    payments::{errors::into_status_error, responses::WebhookResponse},
    state::State,
};

/// Payment Webhook Handler
///
/// Called by the gateways, never by clients. The signature is checked before
/// anything in the body is used. Replays are acknowledged without changes.
#[endpoint(
    tags("payments"),
    summary = "Payment Webhook",
    responses(
        (status_code = StatusCode::OK, description = "Event accepted"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid signature or payload"),
        (status_code = StatusCode::NOT_FOUND, description = "Gateway not enabled"),
    ),
)]
pub(crate) async fn handler(
    gateway: PathParam<String>,
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<WebhookResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let gateway = gateway
        .into_inner()
        .parse::<Gateway>()
        .map_err(|_unknown| StatusError::not_found().brief("Unknown gateway"))?;

    let headers: Vec<(String, String)> = req
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();

    let body = req
        .payload()
        .await
        .map_err(|error| {
            StatusError::bad_request()
                .brief("Could not read webhook body")
                .cause(error.to_string())
        })?
        .to_vec();

    let result = state
        .app
        .payments
        .reconcile(gateway, WebhookPayload::new(headers, body))
        .await;

    match result {
        Ok(outcome) => {
            let metric = match outcome {
                ReconcileOutcome::Applied { .. } => WebhookOutcome::Reconciled,
                ReconcileOutcome::Duplicate { .. } | ReconcileOutcome::Ignored(_) => {
                    WebhookOutcome::Ignored
                }
            };

            observe_webhook_event(gateway.as_str(), metric);
            info!(%gateway, outcome = outcome.as_str(), "webhook processed");

            Ok(Json(WebhookResponse {
                outcome: outcome.as_str().to_string(),
            }))
        }
        Err(
            error @ (PaymentsServiceError::GatewayNotConfigured(_)
            | PaymentsServiceError::Gateway(
                GatewayError::InvalidSignature | GatewayError::MalformedPayload(_),
            )),
        ) => {
            observe_webhook_event(gateway.as_str(), WebhookOutcome::Rejected);
            warn!(%gateway, "webhook rejected: {error}");

            Err(into_status_error(error))
        }
        Err(error) => {
            observe_webhook_event(gateway.as_str(), WebhookOutcome::Failed);

            Err(into_status_error(error))
        }
    }
}

#[cfg(test)]
mod tests {
    use folio_app::domain::payments::{
        MockPaymentsService, data::IgnoreReason, records::PaymentUuid,
    };
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::test_helpers::{Mocks, public_service};

    use super::*;

    const BODY: &str = r#"{"type":"payment_intent.succeeded","data":{"object":{"id":"pi_1"}}}"#;

    fn make_service(payments: MockPaymentsService) -> Service {
        public_service(
            Mocks {
                payments,
                ..Mocks::default()
            },
            Router::with_path("webhooks/{gateway}").post(handler),
        )
    }

    #[tokio::test]
    async fn test_applies_signed_event() -> TestResult {
        let payment_uuid = PaymentUuid::new();

        let mut payments = MockPaymentsService::new();

        payments
            .expect_reconcile()
            .once()
            .withf(|gateway, payload| {
                *gateway == Gateway::Stripe
                    && payload.header("Stripe-Signature") == Some("t=1,v1=abc")
                    && payload.body() == BODY.as_bytes()
            })
            .return_once(move |_, _| Ok(ReconcileOutcome::Applied { payment_uuid }));

        let mut res = TestClient::post("http://example.com/webhooks/stripe")
            .add_header("stripe-signature", "t=1,v1=abc", true)
            .raw_json(BODY)
            .send(&make_service(payments))
            .await;

        let body: WebhookResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.outcome, "applied");

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_payment_is_acknowledged() -> TestResult {
        let mut payments = MockPaymentsService::new();

        payments
            .expect_reconcile()
            .once()
            .return_once(|_, _| Ok(ReconcileOutcome::Ignored(IgnoreReason::UnknownPayment)));

        let mut res = TestClient::post("http://example.com/webhooks/razorpay")
            .raw_json(BODY)
            .send(&make_service(payments))
            .await;

        let body: WebhookResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.outcome, "ignored_unknown_payment");

        Ok(())
    }

    #[tokio::test]
    async fn test_bad_signature_returns_400() -> TestResult {
        let mut payments = MockPaymentsService::new();

        payments
            .expect_reconcile()
            .once()
            .return_once(|_, _| Err(PaymentsServiceError::Gateway(GatewayError::InvalidSignature)));

        let res = TestClient::post("http://example.com/webhooks/stripe")
            .add_header("stripe-signature", "t=1,v1=forged", true)
            .raw_json(BODY)
            .send(&make_service(payments))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_gateway_returns_404() -> TestResult {
        let res = TestClient::post("http://example.com/webhooks/venmo")
            .raw_json(BODY)
            .send(&make_service(MockPaymentsService::new()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
