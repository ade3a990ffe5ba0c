//! Delete Service Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use folio_app::domain::catalog::records::ServiceUuid;

use crate::{
    catalog::{errors::into_status_error, responses::RemovalResponse},
    extensions::*,
    state::State,
};

/// Delete Service Handler
///
/// Refused while open orders use any of the service's variants. Services
/// that only closed orders reference are deactivated instead.
#[endpoint(
    tags("catalog"),
    summary = "Delete Service",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Service deleted or retired"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller is not an administrator"),
        (status_code = StatusCode::NOT_FOUND, description = "Service not found"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Service has open orders"),
    ),
)]
pub(crate) async fn handler(
    service: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<RemovalResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let removal = state
        .app
        .catalog
        .delete_service(actor, ServiceUuid::from_uuid(service.into_inner()))
        .await
        .map_err(into_status_error)?;

    Ok(Json(removal.into()))
}
