//! Files service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::domain::files::{blob::BlobError, data::InvalidUpload};

#[derive(Debug, Error)]
pub enum FilesServiceError {
    #[error("file already exists")]
    AlreadyExists,

    #[error("file not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("access denied")]
    Unauthorized,

    #[error(transparent)]
    InvalidUpload(#[from] InvalidUpload),

    #[error("blob storage error")]
    Blob(#[source] BlobError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<BlobError> for FilesServiceError {
    fn from(error: BlobError) -> Self {
        match error {
            BlobError::NotFound => Self::NotFound,
            BlobError::InvalidPath | BlobError::Io(_) => Self::Blob(error),
        }
    }
}

impl From<Error> for FilesServiceError {
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
