//! Create Payment Intent Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use folio_app::domain::{orders::records::OrderUuid, payments::records::Gateway};

use crate::{
    extensions::*,
    payments::{errors::into_status_error, responses::PaymentIntentResponse},
    state::State,
};

/// Create Intent Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateIntentRequest {
    pub order_id: Uuid,
}

/// Create Payment Intent Handler
///
/// Opens a payment with `gateway` for one of the caller's unpaid orders.
#[endpoint(
    tags("payments"),
    summary = "Create Payment Intent",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Gateway payment opened"),
        (status_code = StatusCode::NOT_FOUND, description = "Order or gateway not found"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Order cannot take a payment"),
        (status_code = StatusCode::BAD_GATEWAY, description = "Gateway call failed"),
    ),
)]
pub(crate) async fn handler(
    gateway: PathParam<String>,
    json: JsonBody<CreateIntentRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<PaymentIntentResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.identity_or_401()?;

    let gateway = gateway
        .into_inner()
        .parse::<Gateway>()
        .map_err(|_unknown| StatusError::not_found().brief("Unknown gateway"))?;

    let intent = state
        .app
        .payments
        .create_intent(
            identity,
            gateway,
            OrderUuid::from_uuid(json.into_inner().order_id),
        )
        .await
        .map_err(into_status_error)?;

    info!(%gateway, payment_uuid = %intent.payment_uuid, "payment intent created");

    res.status_code(StatusCode::CREATED);

    Ok(Json(intent.into()))
}

#[cfg(test)]
mod tests {
    use folio::OrderStatus;
    use folio_app::{
        auth::Identity,
        domain::payments::{
            MockPaymentsService, PaymentsServiceError,
            data::{IntentConnection, PaymentIntent},
            gateways::GatewayError,
            records::PaymentUuid,
        },
    };
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;

    use crate::test_helpers::{Mocks, customer, service_as};

    use super::*;

    fn make_service(payments: MockPaymentsService) -> Service {
        service_as(
            Mocks {
                payments,
                ..Mocks::default()
            },
            Identity::User(customer()),
            Router::with_path("payments/{gateway}/intent").post(handler),
        )
    }

    #[tokio::test]
    async fn test_stripe_intent_fields() -> TestResult {
        let order = OrderUuid::new();
        let payment_uuid = PaymentUuid::new();

        let mut payments = MockPaymentsService::new();

        payments
            .expect_create_intent()
            .once()
            .withf(move |_, gateway, o| *gateway == Gateway::Stripe && *o == order)
            .return_once(move |_, _, _| {
                Ok(PaymentIntent {
                    payment_uuid,
                    gateway: Gateway::Stripe,
                    connection: IntentConnection::Stripe {
                        client_secret: "pi_1_secret_2".to_string(),
                        publishable_key: "pk_test".to_string(),
                    },
                })
            });

        let mut res = TestClient::post("http://example.com/payments/stripe/intent")
            .json(&json!({ "order_id": order.into_uuid() }))
            .send(&make_service(payments))
            .await;

        let body: Value = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(
            body,
            json!({
                "payment_id": payment_uuid.into_uuid(),
                "gateway": "stripe",
                "client_secret": "pi_1_secret_2",
                "publishable_key": "pk_test",
            })
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_gateway_returns_404() -> TestResult {
        let res = TestClient::post("http://example.com/payments/bitcoin/intent")
            .json(&json!({ "order_id": OrderUuid::new().into_uuid() }))
            .send(&make_service(MockPaymentsService::new()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }

    #[tokio::test]
    async fn test_paid_order_returns_422() -> TestResult {
        let mut payments = MockPaymentsService::new();

        payments
            .expect_create_intent()
            .once()
            .return_once(|_, _, _| Err(PaymentsServiceError::InvalidState(OrderStatus::Paid)));

        let res = TestClient::post("http://example.com/payments/paypal/intent")
            .json(&json!({ "order_id": OrderUuid::new().into_uuid() }))
            .send(&make_service(payments))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNPROCESSABLE_ENTITY));

        Ok(())
    }

    #[tokio::test]
    async fn test_gateway_rejection_returns_502() -> TestResult {
        let mut payments = MockPaymentsService::new();

        payments.expect_create_intent().once().return_once(|_, _, _| {
            Err(PaymentsServiceError::Gateway(GatewayError::Rejected {
                status: 401,
                body: "bad key".to_string(),
            }))
        });

        let res = TestClient::post("http://example.com/payments/razorpay/intent")
            .json(&json!({ "order_id": OrderUuid::new().into_uuid() }))
            .send(&make_service(payments))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_GATEWAY));

        Ok(())
    }

    #[tokio::test]
    async fn test_undecodable_gateway_reply_returns_502() -> TestResult {
        let mut payments = MockPaymentsService::new();

        payments.expect_create_intent().once().return_once(|_, _, _| {
            Err(PaymentsServiceError::Gateway(
                GatewayError::UnexpectedResponse("missing approval link".to_string()),
            ))
        });

        let res = TestClient::post("http://example.com/payments/paypal/intent")
            .json(&json!({ "order_id": OrderUuid::new().into_uuid() }))
            .send(&make_service(payments))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_GATEWAY));

        Ok(())
    }

    #[tokio::test]
    async fn test_disabled_gateway_returns_404() -> TestResult {
        let mut payments = MockPaymentsService::new();

        payments
            .expect_create_intent()
            .once()
            .return_once(|_, _, _| Err(PaymentsServiceError::GatewayNotConfigured(Gateway::Paypal)));

        let res = TestClient::post("http://example.com/payments/paypal/intent")
            .json(&json!({ "order_id": OrderUuid::new().into_uuid() }))
            .send(&make_service(payments))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
