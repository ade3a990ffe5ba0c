//! Update Order Status Handler

use std::sync::Arc;

use folio::OrderStatus;
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

use folio_app::domain::orders::{data::StatusChange, records::OrderUuid};

use crate::{
    extensions::*,
    orders::{errors::into_status_error, responses::OrderResponse},
    state::State,
};

/// Update Status Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateStatusRequest {
    pub status: String,

    #[serde(default)]
    pub note: Option<String>,
}

/// Update Order Status Handler
///
/// Admins may make any allowed transition except to `paid`. Editors may move
/// their assigned orders between `in_progress`, `revisions` and `completed`.
#[endpoint(
    tags("orders"),
    summary = "Update Order Status",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Status changed"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller may not change this order"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Transition not allowed"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    json: JsonBody<UpdateStatusRequest>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;
    let request = json.into_inner();

    let change = StatusChange {
        status: request
            .status
            .parse::<OrderStatus>()
            .or_422("unknown order status")?,
        note: request.note,
    };

    let order = state
        .app
        .orders
        .update_status(actor, OrderUuid::from_uuid(order.into_inner()), change)
        .await
        .map_err(into_status_error)?;

    info!(order_number = %order.order_number, status = %order.status, "order status changed");

    Ok(Json(order.into()))
}
