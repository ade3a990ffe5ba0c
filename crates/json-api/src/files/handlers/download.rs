//! Download File Handler

use std::sync::Arc;

use salvo::{
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    oapi::extract::PathParam,
    prelude::*,
};
use uuid::Uuid;

use folio_app::domain::files::records::FileUuid;

use crate::{extensions::*, files::errors::into_status_error, state::State};

/// Download File Handler
///
/// Streams the stored bytes back under the original file name.
#[endpoint(
    tags("files"),
    summary = "Download File",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "File content"),
        (status_code = StatusCode::FORBIDDEN, description = "Access denied"),
        (status_code = StatusCode::NOT_FOUND, description = "File not found"),
    ),
)]
pub(crate) async fn handler(
    file: PathParam<Uuid>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<(), StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let reader = depot.optional_actor();

    let download = state
        .app
        .files
        .download(reader, FileUuid::from_uuid(file.into_inner()))
        .await
        .map_err(into_status_error)?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        download.file.original_name.replace(['"', '\\'], "_")
    );

    res.add_header(CONTENT_TYPE, download.file.mime_type, true)
        .or_500("failed to set content type header")?
        .add_header(CONTENT_DISPOSITION, disposition, true)
        .or_500("failed to set content disposition header")?
        .body(download.bytes);

    Ok(())
}
