//! List Files Handler

use std::sync::Arc;

use salvo::{oapi::extract::QueryParam, prelude::*};
use uuid::Uuid;

use folio_app::domain::{
    files::{
        data::{DEFAULT_PER_PAGE, FileFilter},
        records::FileKind,
    },
    orders::records::OrderUuid,
};

use crate::{
    extensions::*,
    files::{errors::into_status_error, responses::FilePageResponse},
    state::State,
};

/// List Files Handler
///
/// The caller's own files, newest first. Administrators see every file.
#[endpoint(
    tags("files"),
    summary = "List Files",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Page of files"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Unknown file type"),
    ),
)]
pub(crate) async fn handler(
    file_type: QueryParam<String, false>,
    order_uuid: QueryParam<Uuid, false>,
    page: QueryParam<u32, false>,
    per_page: QueryParam<u32, false>,
    depot: &mut Depot,
) -> Result<Json<FilePageResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let filter = FileFilter {
        kind: file_type
            .into_inner()
            .map(|value| value.parse::<FileKind>())
            .transpose()
            .or_422("unknown file type")?,
        order_uuid: order_uuid.into_inner().map(OrderUuid::from_uuid),
        page: page.into_inner().unwrap_or(1),
        per_page: per_page.into_inner().unwrap_or(DEFAULT_PER_PAGE),
    };

    let page = state
        .app
        .files
        .list_files(actor, filter)
        .await
        .map_err(into_status_error)?;

    Ok(Json(page.into()))
}
