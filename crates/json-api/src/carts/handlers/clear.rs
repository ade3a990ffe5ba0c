//! Clear Cart Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{carts::errors::into_status_error, extensions::*, state::State};

/// Clear Cart Handler
#[endpoint(
    tags("carts"),
    summary = "Clear Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::NO_CONTENT, description = "Cart emptied"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.identity_or_401()?;

    state
        .app
        .carts
        .clear(identity)
        .await
        .map_err(into_status_error)?;

    Ok(StatusCode::NO_CONTENT)
}
