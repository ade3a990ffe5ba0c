//! Update Cart Item Handler

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

use folio_app::domain::catalog::records::VariantUuid;

use crate::{
    carts::{errors::into_status_error, responses::CartResponse},
    extensions::*,
    state::State,
};

/// Update Cart Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateCartItemRequest {
    /// New quantity; zero removes the line
    pub quantity: u32,
}

/// Update Cart Item Handler
#[endpoint(
    tags("carts"),
    summary = "Update Cart Item",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Quantity replaced"),
        (status_code = StatusCode::NOT_FOUND, description = "Variant is not in the cart"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Quantity out of bounds"),
    ),
)]
pub(crate) async fn handler(
    variant: PathParam<Uuid>,
    json: JsonBody<UpdateCartItemRequest>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.identity_or_401()?;

    let summary = state
        .app
        .carts
        .update_item(
            identity,
            VariantUuid::from_uuid(variant.into_inner()),
            json.into_inner().quantity,
        )
        .await
        .map_err(into_status_error)?;

    Ok(Json(summary.into()))
}
