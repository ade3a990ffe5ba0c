//! Set Service Active Handler

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

use folio_app::domain::catalog::records::ServiceUuid;

use crate::{
    catalog::{errors::into_status_error, responses::ServiceResponse},
    extensions::*,
    state::State,
};

/// Set Service Active Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SetActiveRequest {
    pub is_active: bool,
}

/// Set Service Active Handler
///
/// Inactive services and their variants drop out of listings and carts.
#[endpoint(
    tags("catalog"),
    summary = "Activate or Deactivate Service",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Service updated"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller is not an administrator"),
        (status_code = StatusCode::NOT_FOUND, description = "Service not found"),
    ),
)]
pub(crate) async fn handler(
    service: PathParam<Uuid>,
    json: JsonBody<SetActiveRequest>,
    depot: &mut Depot,
) -> Result<Json<ServiceResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let service = state
        .app
        .catalog
        .set_service_active(
            actor,
            ServiceUuid::from_uuid(service.into_inner()),
            json.into_inner().is_active,
        )
        .await
        .map_err(into_status_error)?;

    Ok(Json(service.into()))
}
