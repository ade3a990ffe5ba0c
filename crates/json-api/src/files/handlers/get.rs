//! Get File Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use folio_app::domain::files::records::FileUuid;

use crate::{
    extensions::*,
    files::{errors::into_status_error, responses::FileResponse},
    state::State,
};

/// Get File Handler
#[endpoint(
    tags("files"),
    summary = "Get File",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "File metadata"),
        (status_code = StatusCode::FORBIDDEN, description = "Access denied"),
        (status_code = StatusCode::NOT_FOUND, description = "File not found"),
    ),
)]
pub(crate) async fn handler(
    file: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<FileResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let reader = depot.optional_actor();

    let file = state
        .app
        .files
        .get_file(reader, FileUuid::from_uuid(file.into_inner()))
        .await
        .map_err(into_status_error)?;

    Ok(Json(file.into()))
}
