//! Create Coupon Handler

use std::sync::Arc;

use folio::CouponKind;
use jiff::Timestamp;
use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use folio_app::domain::coupons::{data::NewCoupon, records::CouponUuid};

use crate::{
    coupons::{errors::into_status_error, responses::CouponResponse},
    extensions::*,
    state::State,
};

/// Create Coupon Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateCouponRequest {
    /// Client-chosen UUID; generated when absent
    pub uuid: Option<Uuid>,

    pub code: String,
    pub name: String,

    /// `fixed` or `percentage`
    pub kind: String,

    /// Minor units for `fixed`, basis points for `percentage`
    pub value: u64,

    pub minimum_amount: Option<u64>,
    pub maximum_discount: Option<u64>,

    /// RFC 3339 timestamp
    pub valid_from: String,

    /// RFC 3339 timestamp
    pub valid_to: String,

    pub usage_limit: Option<u32>,

    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

impl CreateCouponRequest {
    fn into_new_coupon(self) -> Result<NewCoupon, StatusError> {
        let kind = match self.kind.as_str() {
            "fixed" => CouponKind::Fixed { amount: self.value },
            "percentage" => CouponKind::Percentage {
                basis_points: u16::try_from(self.value)
                    .or_422("percentage must be given in basis points")?,
            },
            _ => {
                return Err(StatusError::unprocessable_entity()
                    .brief("kind must be `fixed` or `percentage`"));
            }
        };

        Ok(NewCoupon {
            uuid: self.uuid.map_or_else(CouponUuid::new, CouponUuid::from_uuid),
            code: self.code,
            name: self.name,
            kind,
            minimum_amount: self.minimum_amount,
            maximum_discount: self.maximum_discount,
            valid_from: self
                .valid_from
                .parse::<Timestamp>()
                .or_422("could not parse valid_from")?,
            valid_to: self
                .valid_to
                .parse::<Timestamp>()
                .or_422("could not parse valid_to")?,
            usage_limit: self.usage_limit,
            is_active: self.is_active,
        })
    }
}

/// Create Coupon Handler
#[endpoint(
    tags("coupons"),
    summary = "Create Coupon",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Coupon created"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller is not an administrator"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Invalid or duplicate coupon"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CreateCouponRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<CouponResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;
    let coupon = json.into_inner().into_new_coupon()?;

    let coupon = state
        .app
        .coupons
        .create_coupon(actor, coupon)
        .await
        .map_err(into_status_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(coupon.into()))
}
