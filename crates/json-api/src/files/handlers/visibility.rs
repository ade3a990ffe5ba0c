//! File Visibility Handler

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

use folio_app::domain::files::records::FileUuid;

use crate::{
    extensions::*,
    files::{errors::into_status_error, responses::FileResponse},
    state::State,
};

/// File Visibility Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct VisibilityRequest {
    pub is_public: bool,
}

/// File Visibility Handler
///
/// Public files can be read and downloaded without signing in.
#[endpoint(
    tags("files"),
    summary = "Set File Visibility",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Visibility updated"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller is neither owner nor administrator"),
        (status_code = StatusCode::NOT_FOUND, description = "File not found"),
    ),
)]
pub(crate) async fn handler(
    file: PathParam<Uuid>,
    json: JsonBody<VisibilityRequest>,
    depot: &mut Depot,
) -> Result<Json<FileResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let file = state
        .app
        .files
        .set_visibility(
            actor,
            FileUuid::from_uuid(file.into_inner()),
            json.into_inner().is_public,
        )
        .await
        .map_err(into_status_error)?;

    Ok(Json(file.into()))
}
