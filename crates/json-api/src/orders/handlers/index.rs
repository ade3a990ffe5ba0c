//! List Orders Handler

use std::sync::Arc;

use folio::OrderStatus;
use salvo::{oapi::extract::QueryParam, prelude::*};

use folio_app::domain::orders::data::{DEFAULT_PER_PAGE, OrderFilter};

use crate::{
    extensions::*,
    orders::{errors::into_status_error, responses::OrderPageResponse},
    state::State,
};

/// List Orders Handler
///
/// Newest first. What the caller sees depends on their role.
#[endpoint(
    tags("orders"),
    summary = "List Orders",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Page of orders"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Unknown status"),
    ),
)]
pub(crate) async fn handler(
    status: QueryParam<String, false>,
    page: QueryParam<u32, false>,
    per_page: QueryParam<u32, false>,
    depot: &mut Depot,
) -> Result<Json<OrderPageResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.identity_or_401()?;

    let filter = OrderFilter {
        status: status
            .into_inner()
            .map(|value| value.parse::<OrderStatus>())
            .transpose()
            .or_422("unknown order status")?,
        page: page.into_inner().unwrap_or(1),
        per_page: per_page.into_inner().unwrap_or(DEFAULT_PER_PAGE),
    };

    let page = state
        .app
        .orders
        .list_orders(identity, filter)
        .await
        .map_err(into_status_error)?;

    Ok(Json(page.into()))
}

#[cfg(test)]
mod tests {
    use folio_app::{
        auth::Identity,
        domain::orders::{MockOrdersService, data::OrderPage, records::OrderUuid},
    };
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::{
        orders::responses::fixtures::make_order,
        test_helpers::{EDITOR_UUID, Mocks, editor, service_as},
    };

    use super::*;

    fn make_service(orders: MockOrdersService) -> Service {
        service_as(
            Mocks {
                orders,
                ..Mocks::default()
            },
            Identity::User(editor()),
            Router::with_path("orders").get(handler),
        )
    }

    #[tokio::test]
    async fn test_list_filtered_orders() -> TestResult {
        let mut order = make_order(OrderUuid::new(), EDITOR_UUID, OrderStatus::InProgress);
        order.assigned_editor_uuid = Some(EDITOR_UUID);

        let mut orders = MockOrdersService::new();

        orders
            .expect_list_orders()
            .once()
            .withf(|_, filter| {
                *filter
                    == OrderFilter {
                        status: Some(OrderStatus::InProgress),
                        page: 2,
                        per_page: 5,
                    }
            })
            .return_once(move |_, _| {
                Ok(OrderPage {
                    orders: vec![order],
                    total: 6,
                    page: 2,
                    per_page: 5,
                })
            });

        let mut res =
            TestClient::get("http://example.com/orders?status=in_progress&page=2&per_page=5")
                .send(&make_service(orders))
                .await;

        let body: OrderPageResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.total, 6);
        assert_eq!(body.orders.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_defaults_to_first_page() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_list_orders()
            .once()
            .withf(|_, filter| *filter == OrderFilter::default())
            .return_once(|_, _| {
                Ok(OrderPage {
                    orders: Vec::new(),
                    total: 0,
                    page: 1,
                    per_page: DEFAULT_PER_PAGE,
                })
            });

        let res = TestClient::get("http://example.com/orders")
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_status_returns_422() -> TestResult {
        let res = TestClient::get("http://example.com/orders?status=lost")
            .send(&make_service(MockOrdersService::new()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNPROCESSABLE_ENTITY));

        Ok(())
    }
}
