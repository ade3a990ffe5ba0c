//! Errors

use folio::CouponError;
use salvo::http::StatusError;
use tracing::error;

use folio_app::domain::coupons::CouponsServiceError;

pub(crate) fn into_status_error(error: CouponsServiceError) -> StatusError {
    match error {
        CouponsServiceError::AlreadyExists => {
            StatusError::unprocessable_entity().brief("Coupon code already exists")
        }
        CouponsServiceError::NotFound => StatusError::not_found().brief("Coupon not found"),
        CouponsServiceError::MissingRequiredData | CouponsServiceError::InvalidData => {
            StatusError::unprocessable_entity().brief("Invalid coupon payload")
        }
        CouponsServiceError::Unauthorized => {
            StatusError::forbidden().brief("Only administrators may manage coupons")
        }
        CouponsServiceError::Coupon(source) => coupon_status_error(source),
        CouponsServiceError::Sql(source) => {
            error!("coupon storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}

/// A coupon the caller asked for that cannot be applied.
pub(crate) fn coupon_status_error(error: CouponError) -> StatusError {
    match error {
        CouponError::NotFound
        | CouponError::Expired
        | CouponError::BelowMinimum { .. }
        | CouponError::Exhausted => StatusError::unprocessable_entity()
            .brief("Invalid coupon")
            .cause(error.to_string()),
        CouponError::Amount(source) => {
            error!("coupon arithmetic failed: {source}");

            StatusError::internal_server_error()
        }
    }
}
