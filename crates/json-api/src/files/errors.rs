//! Errors

use salvo::http::StatusError;
use tracing::error;

use folio_app::domain::files::FilesServiceError;

pub(crate) fn into_status_error(error: FilesServiceError) -> StatusError {
    match error {
        FilesServiceError::AlreadyExists => {
            StatusError::unprocessable_entity().brief("File already exists")
        }
        FilesServiceError::NotFound => StatusError::not_found().brief("File not found"),
        FilesServiceError::InvalidReference => {
            StatusError::unprocessable_entity().brief("Linked order not found")
        }
        FilesServiceError::MissingRequiredData | FilesServiceError::InvalidData => {
            StatusError::unprocessable_entity().brief("Invalid file payload")
        }
        FilesServiceError::Unauthorized => StatusError::forbidden().brief("Access denied"),
        FilesServiceError::InvalidUpload(source) => StatusError::unprocessable_entity()
            .brief("Upload rejected")
            .cause(source.to_string()),
        FilesServiceError::Blob(source) => {
            error!("blob storage error: {source}");

            StatusError::internal_server_error()
        }
        FilesServiceError::Sql(source) => {
            error!("file storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
