//! Add Order Note Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use folio_app::domain::orders::records::OrderUuid;

use crate::{extensions::*, orders::errors::into_status_error, state::State};

/// Add Note Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AddNoteRequest {
    pub message: String,
}

/// Add Order Note Handler
#[endpoint(
    tags("orders"),
    summary = "Add Order Note",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Note appended to the order history"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Empty or oversized note"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    json: JsonBody<AddNoteRequest>,
    depot: &mut Depot,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.identity_or_401()?;

    state
        .app
        .orders
        .add_note(
            identity,
            OrderUuid::from_uuid(order.into_inner()),
            json.into_inner().message,
        )
        .await
        .map_err(into_status_error)?;

    Ok(StatusCode::CREATED)
}

#[cfg(test)]
mod tests {
    use folio_app::{
        auth::Identity,
        domain::orders::{MockOrdersService, OrdersServiceError},
    };
    use salvo::test::TestClient;
    use serde_json::json;
    use testresult::TestResult;

    use crate::test_helpers::{Mocks, guest, service_as};

    use super::*;

    fn make_service(orders: MockOrdersService, identity: Identity) -> Service {
        service_as(
            Mocks {
                orders,
                ..Mocks::default()
            },
            identity,
            Router::with_path("orders/{order}/notes").post(handler),
        )
    }

    #[tokio::test]
    async fn test_guest_adds_note_to_own_order() -> TestResult {
        let uuid = OrderUuid::new();

        let mut orders = MockOrdersService::new();

        orders
            .expect_add_note()
            .once()
            .withf(move |_, o, message| *o == uuid && message == "Please use British spelling")
            .return_once(|_, _, _| Ok(()));

        let res = TestClient::post(format!("http://example.com/orders/{uuid}/notes"))
            .json(&json!({ "message": "Please use British spelling" }))
            .send(&make_service(orders, guest()?))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));

        Ok(())
    }

    #[tokio::test]
    async fn test_empty_note_returns_422() -> TestResult {
        let uuid = OrderUuid::new();

        let mut orders = MockOrdersService::new();

        orders
            .expect_add_note()
            .once()
            .return_once(|_, _, _| Err(OrdersServiceError::InvalidData));

        let res = TestClient::post(format!("http://example.com/orders/{uuid}/notes"))
            .json(&json!({ "message": "" }))
            .send(&make_service(orders, guest()?))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNPROCESSABLE_ENTITY));

        Ok(())
    }
}
