//! Refund Order Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use tracing::info;
use uuid::Uuid;

use folio_app::domain::orders::records::OrderUuid;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, responses::OrderResponse},
    state::State,
};

/// Refund Order Handler
///
/// Records a refund already issued at the gateway. The completed payment is
/// marked refunded and the order moves from `paid` to `refunded`.
#[endpoint(
    tags("orders"),
    summary = "Refund Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Order refunded"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller is not an administrator"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Order is not paid"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let order = state
        .app
        .orders
        .refund(actor, OrderUuid::from_uuid(order.into_inner()))
        .await
        .map_err(into_status_error)?;

    info!(order_number = %order.order_number, "order refunded");

    Ok(Json(order.into()))
}
