//! Cart Totals Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    carts::{errors::into_status_error, responses::CartTotalsResponse},
    extensions::*,
    state::State,
};

/// Cart Totals Request
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartTotalsRequest {
    pub coupon_code: Option<String>,
}

/// Cart Totals Handler
///
/// Subtotal, discount, tax and total. Previewing a coupon does not use it up.
#[endpoint(
    tags("carts"),
    summary = "Calculate Cart Totals",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Cart totals"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Coupon cannot be applied"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CartTotalsRequest>,
    depot: &mut Depot,
) -> Result<Json<CartTotalsResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.identity_or_401()?;

    let coupon_code = json
        .into_inner()
        .coupon_code
        .filter(|code| !code.trim().is_empty());

    let totals = state
        .app
        .carts
        .calculate_totals(identity, coupon_code)
        .await
        .map_err(into_status_error)?;

    Ok(Json(totals.into()))
}
