//! Bulk Upload Handler

use std::sync::Arc;

use salvo::prelude::*;
use tracing::info;

use folio_app::domain::files::data::{MAX_BULK_FILES, MAX_FILE_SIZE};

use crate::{
    extensions::*,
    files::{
        handlers::upload::{FORM_OVERHEAD, UploadFields},
        responses::{BulkUploadError, BulkUploadResponse},
    },
    state::State,
};

/// Bulk Upload Handler
///
/// Multipart form with up to ten `files` parts sharing one `type`,
/// `order_uuid` and `description`. Each file is stored on its own; rejected
/// files are reported next to the stored ones.
#[endpoint(
    tags("files"),
    summary = "Bulk Upload Files",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "At least one file stored"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "No file stored"),
    ),
)]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<BulkUploadResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let limit = u64::try_from(MAX_BULK_FILES)
        .map_or(u64::MAX, |count| MAX_FILE_SIZE.saturating_mul(count))
        .saturating_add(FORM_OVERHEAD);
    req.set_secure_max_size(usize::try_from(limit).unwrap_or(usize::MAX));

    let fields = UploadFields::from_request(req).await?;

    let parts: Vec<_> = req
        .files("files")
        .await
        .map(|parts| {
            parts
                .iter()
                .map(|part| {
                    (
                        part.name().unwrap_or_default().to_string(),
                        part.content_type()
                            .map(|mime| mime.essence_str().to_string())
                            .unwrap_or_default(),
                        part.path().clone(),
                    )
                })
                .collect()
        })
        .unwrap_or_default();

    if parts.is_empty() {
        return Err(StatusError::unprocessable_entity().brief("Missing \"files\" parts in upload"));
    }

    if parts.len() > MAX_BULK_FILES {
        return Err(StatusError::unprocessable_entity()
            .brief(format!("At most {MAX_BULK_FILES} files per upload")));
    }

    let mut uploaded = Vec::with_capacity(parts.len());
    let mut errors = Vec::new();

    for (original_name, mime_type, path) in parts {
        let bytes = tokio::fs::read(&path)
            .await
            .or_500("failed to read uploaded file")?;

        match state
            .app
            .files
            .upload(actor, fields.upload(original_name.clone(), mime_type, bytes))
            .await
        {
            Ok(file) => uploaded.push(file.into()),
            Err(error) => errors.push(BulkUploadError {
                original_name,
                error: error.to_string(),
            }),
        }
    }

    info!(
        uploaded = uploaded.len(),
        rejected = errors.len(),
        "bulk upload finished"
    );

    res.status_code(if uploaded.is_empty() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::CREATED
    });

    Ok(Json(BulkUploadResponse { uploaded, errors }))
}
