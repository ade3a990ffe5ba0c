//! Get Cart Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    carts::{errors::into_status_error, responses::CartResponse},
    extensions::*,
    state::State,
};

/// Get Cart Handler
///
/// The caller's cart. Reading never creates one.
#[endpoint(
    tags("carts"),
    summary = "Get Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Cart summary"),
        (status_code = StatusCode::UNAUTHORIZED, description = "No bearer token or session id"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.identity_or_401()?;

    let summary = state
        .app
        .carts
        .get_summary(identity)
        .await
        .map_err(into_status_error)?;

    Ok(Json(summary.into()))
}
