//! Orders service errors.

use folio::{AmountError, CouponError, PricingError, TransitionError};
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::domain::{catalog::records::VariantUuid, orders::data::InvalidBillingDetails};

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error("order already exists")]
    AlreadyExists,

    #[error("order not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("not allowed to change this order")]
    Unauthorized,

    #[error("cart is empty")]
    EmptyCart,

    #[error("variant {0} is no longer available")]
    VariantUnavailable(VariantUuid),

    #[error(transparent)]
    InvalidBillingDetails(#[from] InvalidBillingDetails),

    #[error("assignee is not an editor")]
    InvalidEditor,

    #[error("order has no completed payment")]
    NoCompletedPayment,

    #[error("could not allocate a unique order number")]
    OrderNumberExhausted,

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Coupon(#[from] CouponError),

    #[error(transparent)]
    Amount(#[from] AmountError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for OrdersServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
