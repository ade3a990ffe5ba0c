//! Storage Usage Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    extensions::*,
    files::{errors::into_status_error, responses::StorageUsageResponse},
    state::State,
};

/// Storage Usage Handler
///
/// Totals for the caller's files, or for every file when called by an
/// administrator.
#[endpoint(
    tags("files"),
    summary = "Storage Usage",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Usage totals and per-type breakdown"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<StorageUsageResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let usage = state
        .app
        .files
        .storage_usage(actor)
        .await
        .map_err(into_status_error)?;

    Ok(Json(usage.into()))
}
