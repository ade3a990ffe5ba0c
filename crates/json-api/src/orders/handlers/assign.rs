//! Assign Editor Handler

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

use folio_app::{auth::UserUuid, domain::orders::records::OrderUuid};

use crate::{
    extensions::*,
    orders::{errors::into_status_error, responses::OrderResponse},
    state::State,
};

/// Assign Editor Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AssignEditorRequest {
    pub editor_uuid: Uuid,
}

/// Assign Editor Handler
#[endpoint(
    tags("orders"),
    summary = "Assign Editor",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Editor assigned"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller is not an administrator"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Assignee is not an editor"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    json: JsonBody<AssignEditorRequest>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let order = state
        .app
        .orders
        .assign_editor(
            actor,
            OrderUuid::from_uuid(order.into_inner()),
            UserUuid::from_uuid(json.into_inner().editor_uuid),
        )
        .await
        .map_err(into_status_error)?;

    Ok(Json(order.into()))
}
