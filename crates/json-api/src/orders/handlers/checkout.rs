//! Checkout Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use folio_app::domain::{orders::data::CheckoutRequest, payments::records::Gateway};

use crate::{
    extensions::*,
    orders::{
        errors::into_status_error,
        responses::{BillingDetailsBody, CheckoutResponse},
    },
    state::State,
};

/// Checkout Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CheckoutBody {
    pub billing_details: BillingDetailsBody,

    /// Free-form brief for the editor
    #[serde(default)]
    #[salvo(schema(value_type = Option<Object>))]
    pub requirements: Option<Value>,

    #[serde(default)]
    pub coupon_code: Option<String>,

    /// One of `stripe`, `paypal`, `razorpay`
    pub payment_method: String,
}

impl CheckoutBody {
    fn into_request(self) -> Result<CheckoutRequest, StatusError> {
        Ok(CheckoutRequest {
            billing_details: self.billing_details.into(),
            requirements: self.requirements,
            coupon_code: self
                .coupon_code
                .map(|code| code.trim().to_string())
                .filter(|code| !code.is_empty()),
            payment_method: self
                .payment_method
                .parse::<Gateway>()
                .or_422("unknown payment method")?,
        })
    }
}

/// Checkout Handler
///
/// Turns the caller's cart into an order. Prices, discounts and tax are all
/// recomputed server-side.
#[endpoint(
    tags("orders"),
    summary = "Checkout",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Order placed"),
        (status_code = StatusCode::UNAUTHORIZED, description = "No user or guest session"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Empty cart, invalid coupon or billing details"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CheckoutBody>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<CheckoutResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.identity_or_401()?;
    let request = json.into_inner().into_request()?;

    let receipt = state
        .app
        .orders
        .checkout(identity, request)
        .await
        .map_err(into_status_error)?;

    info!(
        order_number = %receipt.order_number,
        total_amount = receipt.total_amount,
        "order placed"
    );

    res.status_code(StatusCode::CREATED);

    Ok(Json(receipt.into()))
}
