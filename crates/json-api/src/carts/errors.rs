//! Errors

use salvo::http::StatusError;
use tracing::error;

use folio_app::domain::carts::CartsServiceError;

use crate::coupons::errors::coupon_status_error;

pub(crate) fn into_status_error(error: CartsServiceError) -> StatusError {
    match error {
        CartsServiceError::AlreadyExists => {
            StatusError::unprocessable_entity().brief("Cart item already exists")
        }
        CartsServiceError::NotFound => {
            StatusError::not_found().brief("Variant or cart item not found")
        }
        CartsServiceError::InvalidReference
        | CartsServiceError::MissingRequiredData
        | CartsServiceError::InvalidData => {
            StatusError::unprocessable_entity().brief("Invalid cart payload")
        }
        CartsServiceError::VariantUnavailable(variant) => StatusError::unprocessable_entity()
            .brief(format!("Variant {variant} is no longer available")),
        CartsServiceError::Pricing(source) => {
            StatusError::unprocessable_entity().brief(source.to_string())
        }
        CartsServiceError::Coupon(source) => coupon_status_error(source),
        CartsServiceError::Amount(source) => {
            error!("cart arithmetic failed: {source}");

            StatusError::internal_server_error()
        }
        CartsServiceError::Sql(source) => {
            error!("cart storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
