//! Delete File Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use tracing::info;
use uuid::Uuid;

use folio_app::domain::files::records::FileUuid;

use crate::{extensions::*, files::errors::into_status_error, state::State};

/// Delete File Handler
///
/// Owner or administrator only.
#[endpoint(
    tags("files"),
    summary = "Delete File",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::NO_CONTENT, description = "File deleted"),
        (status_code = StatusCode::FORBIDDEN, description = "Access denied"),
        (status_code = StatusCode::NOT_FOUND, description = "File not found"),
    ),
)]
pub(crate) async fn handler(
    file: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;
    let file = FileUuid::from_uuid(file.into_inner());

    state
        .app
        .files
        .delete_file(actor, file)
        .await
        .map_err(into_status_error)?;

    info!(file_uuid = %file, "file deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use folio_app::{
        auth::Identity,
        domain::files::{FilesServiceError, MockFilesService},
    };
    use salvo::test::TestClient;
    use testresult::TestResult;

    use crate::test_helpers::{Mocks, editor, service_as};

    use super::*;

    fn make_service(files: MockFilesService) -> Service {
        service_as(
            Mocks {
                files,
                ..Mocks::default()
            },
            Identity::User(editor()),
            Router::with_path("files/{file}").delete(handler),
        )
    }

    #[tokio::test]
    async fn test_delete_own_file() -> TestResult {
        let uuid = FileUuid::new();

        let mut files = MockFilesService::new();

        files
            .expect_delete_file()
            .once()
            .withf(move |actor, f| *actor == editor() && *f == uuid)
            .return_once(|_, _| Ok(()));

        let res = TestClient::delete(format!("http://example.com/files/{uuid}"))
            .send(&make_service(files))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NO_CONTENT));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_foreign_file_returns_403() -> TestResult {
        let uuid = FileUuid::new();

        let mut files = MockFilesService::new();

        files
            .expect_delete_file()
            .once()
            .return_once(|_, _| Err(FilesServiceError::Unauthorized));

        let res = TestClient::delete(format!("http://example.com/files/{uuid}"))
            .send(&make_service(files))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }
}
