//! Order Files Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use folio_app::domain::orders::records::OrderUuid;

use crate::{
    extensions::*,
    files::{errors::into_status_error, responses::OrderFilesResponse},
    state::State,
};

/// Order Files Handler
///
/// Files linked to an order, grouped by type. Open to whoever can see the
/// order, guests included.
#[endpoint(
    tags("files"),
    summary = "List Order Files",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Order files"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<OrderFilesResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.identity_or_401()?.clone();

    let files = state
        .app
        .files
        .order_files(identity, OrderUuid::from_uuid(order.into_inner()))
        .await
        .map_err(into_status_error)?;

    Ok(Json(files.into()))
}
