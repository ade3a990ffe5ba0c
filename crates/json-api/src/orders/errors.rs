//! Errors

use salvo::http::StatusError;
use tracing::error;

use folio_app::domain::orders::OrdersServiceError;

use crate::coupons::errors::coupon_status_error;

pub(crate) fn into_status_error(error: OrdersServiceError) -> StatusError {
    match error {
        OrdersServiceError::AlreadyExists => {
            StatusError::unprocessable_entity().brief("Order already exists")
        }
        OrdersServiceError::NotFound => StatusError::not_found().brief("Order not found"),
        OrdersServiceError::InvalidReference
        | OrdersServiceError::MissingRequiredData
        | OrdersServiceError::InvalidData => {
            StatusError::unprocessable_entity().brief("Invalid order payload")
        }
        OrdersServiceError::Unauthorized => {
            StatusError::forbidden().brief("Not allowed to change this order")
        }
        OrdersServiceError::EmptyCart => StatusError::unprocessable_entity().brief("Cart is empty"),
        OrdersServiceError::VariantUnavailable(variant) => StatusError::unprocessable_entity()
            .brief(format!("Variant {variant} is no longer available")),
        OrdersServiceError::InvalidBillingDetails(source) => {
            StatusError::unprocessable_entity().brief(source.to_string())
        }
        OrdersServiceError::InvalidEditor => {
            StatusError::unprocessable_entity().brief("Assignee is not an editor")
        }
        OrdersServiceError::NoCompletedPayment => {
            StatusError::unprocessable_entity().brief("Order has no completed payment")
        }
        OrdersServiceError::Transition(source) => StatusError::unprocessable_entity()
            .brief("Status change not allowed")
            .cause(source.to_string()),
        OrdersServiceError::Pricing(source) => {
            StatusError::unprocessable_entity().brief(source.to_string())
        }
        OrdersServiceError::Coupon(source) => coupon_status_error(source),
        OrdersServiceError::OrderNumberExhausted => {
            error!("order number space exhausted");

            StatusError::internal_server_error()
        }
        OrdersServiceError::Amount(source) => {
            error!("order arithmetic failed: {source}");

            StatusError::internal_server_error()
        }
        OrdersServiceError::Sql(source) => {
            error!("order storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
