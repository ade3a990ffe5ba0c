//! Payments service errors.

use folio::{OrderStatus, TransitionError};
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::domain::payments::{gateways::GatewayError, records::Gateway};

#[derive(Debug, Error)]
pub enum PaymentsServiceError {
    #[error("payment already exists")]
    AlreadyExists,

    #[error("payment not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("order is already paid")]
    AlreadyPaid,

    #[error("order in status {0} cannot take a payment")]
    InvalidState(OrderStatus),

    #[error("gateway {0} is not configured")]
    GatewayNotConfigured(Gateway),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for PaymentsServiceError {
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
