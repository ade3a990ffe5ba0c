//! Errors

use salvo::http::StatusError;
use tracing::{error, warn};

use folio_app::domain::payments::{PaymentsServiceError, gateways::GatewayError};

pub(crate) fn into_status_error(error: PaymentsServiceError) -> StatusError {
    match error {
        PaymentsServiceError::AlreadyExists => {
            StatusError::unprocessable_entity().brief("Payment already exists")
        }
        PaymentsServiceError::NotFound => {
            StatusError::not_found().brief("Payment or order not found")
        }
        PaymentsServiceError::InvalidReference
        | PaymentsServiceError::MissingRequiredData
        | PaymentsServiceError::InvalidData => {
            StatusError::unprocessable_entity().brief("Invalid payment payload")
        }
        PaymentsServiceError::AlreadyPaid => {
            StatusError::unprocessable_entity().brief("Order is already paid")
        }
        PaymentsServiceError::InvalidState(status) => StatusError::unprocessable_entity()
            .brief(format!("Order in status {status} cannot take a payment")),
        PaymentsServiceError::GatewayNotConfigured(gateway) => {
            StatusError::not_found().brief(format!("Gateway {gateway} is not enabled"))
        }
        PaymentsServiceError::Gateway(source) => gateway_status_error(source),
        PaymentsServiceError::Transition(source) => {
            error!("payment transition rejected: {source}");

            StatusError::internal_server_error()
        }
        PaymentsServiceError::Sql(source) => {
            error!("payment storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}

fn gateway_status_error(error: GatewayError) -> StatusError {
    match error {
        GatewayError::InvalidSignature => {
            StatusError::bad_request().brief("Invalid webhook signature")
        }
        GatewayError::MalformedPayload(reason) => StatusError::bad_request()
            .brief("Malformed webhook payload")
            .cause(reason),
        GatewayError::Unavailable(_)
        | GatewayError::Rejected { .. }
        | GatewayError::UnexpectedResponse(_) => {
            warn!("payment gateway call failed: {error}");

            StatusError::bad_gateway().brief("Payment gateway unavailable")
        }
    }
}
