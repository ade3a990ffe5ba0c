//! Errors

use salvo::http::StatusError;
use tracing::error;

use folio_app::domain::catalog::CatalogServiceError;

pub(crate) fn into_status_error(error: CatalogServiceError) -> StatusError {
    match error {
        CatalogServiceError::AlreadyExists => {
            StatusError::unprocessable_entity().brief("Service or variant already exists")
        }
        CatalogServiceError::NotFound => StatusError::not_found().brief("Service not found"),
        CatalogServiceError::InvalidReference
        | CatalogServiceError::MissingRequiredData
        | CatalogServiceError::InvalidData => {
            StatusError::unprocessable_entity().brief("Invalid catalog payload")
        }
        CatalogServiceError::InUse(open_orders) => StatusError::unprocessable_entity()
            .brief(format!("Still used by {open_orders} open orders")),
        CatalogServiceError::Unauthorized => {
            StatusError::forbidden().brief("Only administrators may manage the catalog")
        }
        CatalogServiceError::Pricing(source) => {
            StatusError::unprocessable_entity().brief(source.to_string())
        }
        CatalogServiceError::Sql(source) => {
            error!("catalog storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
