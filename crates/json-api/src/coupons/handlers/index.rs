//! List Coupons Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    coupons::{errors::into_status_error, responses::CouponResponse},
    extensions::*,
    state::State,
};

/// List Coupons Handler
#[endpoint(
    tags("coupons"),
    summary = "List Coupons",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Coupons"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller is not an administrator"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<Vec<CouponResponse>>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let coupons = state
        .app
        .coupons
        .list_coupons(actor)
        .await
        .map_err(into_status_error)?;

    Ok(Json(coupons.into_iter().map(Into::into).collect()))
}
