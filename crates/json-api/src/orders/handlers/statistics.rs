//! Order Statistics Handler

use std::sync::Arc;

use salvo::{oapi::extract::QueryParam, prelude::*};

use folio_app::domain::orders::data::StatisticsRange;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, responses::OrderStatisticsResponse},
    state::State,
};

/// Order Statistics Handler
///
/// `from` and `to` are RFC 3339 timestamps; `to` is exclusive.
#[endpoint(
    tags("orders"),
    summary = "Order Statistics",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Dashboard figures"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller is not an administrator"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Unparseable timestamp"),
    ),
)]
pub(crate) async fn handler(
    from: QueryParam<String, false>,
    to: QueryParam<String, false>,
    depot: &mut Depot,
) -> Result<Json<OrderStatisticsResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let range = StatisticsRange {
        from: from.into_timestamp("from")?,
        to: to.into_timestamp("to")?,
    };

    let stats = state
        .app
        .orders
        .statistics(actor, range)
        .await
        .map_err(into_status_error)?;

    Ok(Json(stats.into()))
}

#[cfg(test)]
mod tests {
    use folio::OrderStatus;
    use folio_app::{
        auth::Identity,
        domain::orders::{
            MockOrdersService, OrdersServiceError,
            data::{OrderStatistics, StatusCount},
        },
    };
    use jiff::Timestamp;
    use rust_decimal::Decimal;
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::test_helpers::{Mocks, admin, customer, service_as};

    use super::*;

    fn make_service(orders: MockOrdersService, identity: Identity) -> Service {
        service_as(
            Mocks {
                orders,
                ..Mocks::default()
            },
            identity,
            Router::with_path("admin/statistics").get(handler),
        )
    }

    #[tokio::test]
    async fn test_statistics_for_range() -> TestResult {
        let from: Timestamp = "2026-03-01T00:00:00Z".parse()?;

        let mut orders = MockOrdersService::new();

        orders
            .expect_statistics()
            .once()
            .withf(move |actor, range| {
                *actor == admin()
                    && *range
                        == StatisticsRange {
                            from: Some(from),
                            to: None,
                        }
            })
            .return_once(|_, _| {
                Ok(OrderStatistics {
                    total_orders: 3,
                    paid_orders: 2,
                    pending_orders: 1,
                    completed_orders: 0,
                    total_revenue: 9_001,
                    average_order_value: 4_500,
                    conversion_rate: Decimal::new(6_667, 2),
                    status_breakdown: vec![
                        StatusCount {
                            status: OrderStatus::Created,
                            count: 1,
                        },
                        StatusCount {
                            status: OrderStatus::Paid,
                            count: 2,
                        },
                    ],
                })
            });

        let mut res = TestClient::get("http://example.com/admin/statistics?from=2026-03-01T00:00:00Z")
            .send(&make_service(orders, Identity::User(admin())))
            .await;

        let body: OrderStatisticsResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.conversion_rate, "66.67");
        assert_eq!(body.status_breakdown.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_bad_timestamp_returns_422() -> TestResult {
        let res = TestClient::get("http://example.com/admin/statistics?to=yesterday")
            .send(&make_service(MockOrdersService::new(), Identity::User(admin())))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNPROCESSABLE_ENTITY));

        Ok(())
    }

    #[tokio::test]
    async fn test_customer_is_forbidden() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_statistics()
            .once()
            .return_once(|_, _| Err(OrdersServiceError::Unauthorized));

        let res = TestClient::get("http://example.com/admin/statistics")
            .send(&make_service(orders, Identity::User(customer())))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }
}
