//! Payment Status Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use folio_app::domain::payments::records::PaymentUuid;

use crate::{
    extensions::*,
    payments::{errors::into_status_error, responses::PaymentStatusResponse},
    state::State,
};

/// Payment Status Handler
#[endpoint(
    tags("payments"),
    summary = "Get Payment Status",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Payment with its order state"),
        (status_code = StatusCode::NOT_FOUND, description = "Payment not found"),
    ),
)]
pub(crate) async fn handler(
    payment: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<PaymentStatusResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.identity_or_401()?;

    let view = state
        .app
        .payments
        .payment_status(identity, PaymentUuid::from_uuid(payment.into_inner()))
        .await
        .map_err(into_status_error)?;

    Ok(Json(view.into()))
}

#[cfg(test)]
mod tests {
    use folio::OrderStatus;
    use folio_app::{
        auth::Identity,
        domain::{
            orders::records::OrderUuid,
            payments::{
                MockPaymentsService, PaymentsServiceError,
                data::PaymentStatusView,
                records::{Gateway, PaymentRecord, PaymentStatus},
            },
        },
    };
    use jiff::Timestamp;
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::test_helpers::{Mocks, guest, service_as};

    use super::*;

    fn make_service(payments: MockPaymentsService, identity: Identity) -> Service {
        service_as(
            Mocks {
                payments,
                ..Mocks::default()
            },
            identity,
            Router::with_path("payments/{payment}").get(handler),
        )
    }

    #[tokio::test]
    async fn test_guest_reads_own_payment() -> TestResult {
        let uuid = PaymentUuid::new();
        let identity = guest()?;
        let expected = identity.clone();

        let mut payments = MockPaymentsService::new();

        payments
            .expect_payment_status()
            .once()
            .withf(move |identity, p| *identity == expected && *p == uuid)
            .return_once(move |_, _| {
                Ok(PaymentStatusView {
                    payment: PaymentRecord {
                        uuid,
                        order_uuid: OrderUuid::new(),
                        gateway: Gateway::Razorpay,
                        gateway_payment_id: "order_9".to_string(),
                        amount: 10_825,
                        currency: "INR".to_string(),
                        status: PaymentStatus::Completed,
                        failure_reason: None,
                        raw_response: None,
                        processed_at: Some(Timestamp::UNIX_EPOCH),
                        created_at: Timestamp::UNIX_EPOCH,
                        updated_at: Timestamp::UNIX_EPOCH,
                    },
                    order_number: "FO-20260309-ABC123".to_string(),
                    order_status: OrderStatus::Paid,
                })
            });

        let mut res = TestClient::get(format!("http://example.com/payments/{uuid}"))
            .send(&make_service(payments, identity))
            .await;

        let body: PaymentStatusResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.payment.status, "completed");
        assert_eq!(body.order_status, "paid");

        Ok(())
    }

    #[tokio::test]
    async fn test_foreign_payment_returns_404() -> TestResult {
        let uuid = PaymentUuid::new();

        let mut payments = MockPaymentsService::new();

        payments
            .expect_payment_status()
            .once()
            .return_once(|_, _| Err(PaymentsServiceError::NotFound));

        let res = TestClient::get(format!("http://example.com/payments/{uuid}"))
            .send(&make_service(payments, guest()?))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
