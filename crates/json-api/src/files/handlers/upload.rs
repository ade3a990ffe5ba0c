//! Upload File Handler

use std::sync::Arc;

use salvo::prelude::*;
use tracing::info;
use uuid::Uuid;

use folio_app::domain::{
    files::{
        data::{FileUpload, MAX_FILE_SIZE},
        records::FileKind,
    },
    orders::records::OrderUuid,
};

use crate::{
    extensions::*,
    files::{errors::into_status_error, responses::FileResponse},
    state::State,
};

/// Room for multipart framing and the text fields around the file.
pub(crate) const FORM_OVERHEAD: u64 = 64 * 1024;

/// Form fields shared by every file of an upload.
#[derive(Debug, Clone, Default)]
pub(crate) struct UploadFields {
    kind: FileKind,
    order_uuid: Option<OrderUuid>,
    description: Option<String>,
}

impl UploadFields {
    pub(crate) async fn from_request(req: &mut Request) -> Result<Self, StatusError> {
        let kind = req
            .form::<String>("type")
            .await
            .map(|value| value.parse::<FileKind>())
            .transpose()
            .or_422("unknown file type")?
            .unwrap_or_default();

        let order_uuid = req
            .form::<String>("order_uuid")
            .await
            .filter(|value| !value.is_empty())
            .map(|value| value.parse::<Uuid>())
            .transpose()
            .or_422("invalid order uuid")?
            .map(OrderUuid::from_uuid);

        let description = req
            .form::<String>("description")
            .await
            .filter(|value| !value.trim().is_empty());

        Ok(Self {
            kind,
            order_uuid,
            description,
        })
    }

    pub(crate) fn upload(
        &self,
        original_name: String,
        mime_type: String,
        bytes: Vec<u8>,
    ) -> FileUpload {
        FileUpload {
            original_name,
            mime_type,
            kind: self.kind,
            order_uuid: self.order_uuid,
            description: self.description.clone(),
            bytes,
        }
    }
}

/// Upload File Handler
///
/// Multipart form with a `file` part and optional `type`, `order_uuid` and
/// `description` fields.
#[endpoint(
    tags("files"),
    summary = "Upload File",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "File stored"),
        (status_code = StatusCode::FORBIDDEN, description = "Linked order is not accessible"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Upload rejected"),
    ),
)]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<FileResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    req.set_secure_max_size(usize::try_from(MAX_FILE_SIZE + FORM_OVERHEAD).unwrap_or(usize::MAX));

    let fields = UploadFields::from_request(req).await?;

    let file = req.file("file").await.ok_or_else(|| {
        StatusError::unprocessable_entity().brief("Missing \"file\" part in upload")
    })?;

    let original_name = file.name().unwrap_or_default().to_string();
    let mime_type = file
        .content_type()
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_default();
    let path = file.path().clone();

    let bytes = tokio::fs::read(&path)
        .await
        .or_500("failed to read uploaded file")?;

    let upload = fields.upload(original_name, mime_type, bytes);

    let file = state
        .app
        .files
        .upload(actor, upload)
        .await
        .map_err(into_status_error)?;

    info!(file_uuid = %file.uuid, size = file.size, kind = %file.kind, "file uploaded");

    res.status_code(StatusCode::CREATED);

    Ok(Json(file.into()))
}

#[cfg(test)]
mod tests {
    use folio_app::{
        auth::Identity,
        domain::files::{
            FilesServiceError, MockFilesService, data::InvalidUpload, records::FileUuid,
        },
    };
    use salvo::{
        http::header::CONTENT_TYPE,
        test::{ResponseExt, TestClient},
    };
    use testresult::TestResult;

    use crate::{
        files::responses::fixtures::make_file,
        test_helpers::{CUSTOMER_UUID, Mocks, customer, guest, service_as},
    };

    use super::*;

    const BOUNDARY: &str = "folio-test-boundary";

    fn multipart(fields: &[(&str, &str)], file: Option<(&str, &str, &str)>) -> String {
        let mut body = String::new();

        for (name, value) in fields {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }

        if let Some((filename, mime, content)) = file {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: {mime}\r\n\r\n{content}\r\n"
            ));
        }

        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        body
    }

    fn make_service(files: MockFilesService, identity: Identity) -> Service {
        service_as(
            Mocks {
                files,
                ..Mocks::default()
            },
            identity,
            Router::with_path("files").post(handler),
        )
    }

    fn upload_request(body: String) -> salvo::test::RequestBuilder {
        TestClient::post("http://example.com/files")
            .add_header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
                true,
            )
            .body(body)
    }

    #[tokio::test]
    async fn test_upload_manuscript() -> TestResult {
        let order = OrderUuid::new();
        let record = make_file(FileUuid::new(), CUSTOMER_UUID);

        let mut files = MockFilesService::new();

        files
            .expect_upload()
            .once()
            .withf(move |actor, upload| {
                *actor == customer()
                    && upload.original_name == "Chapter One.txt"
                    && upload.mime_type == "text/plain"
                    && upload.kind == FileKind::Manuscript
                    && upload.order_uuid == Some(order)
                    && upload.description.as_deref() == Some("first draft")
                    && upload.bytes == b"It was a dark and stormy night."
            })
            .return_once(move |_, _| Ok(record));

        let body = multipart(
            &[
                ("type", "manuscript"),
                ("order_uuid", &order.to_string()),
                ("description", "first draft"),
            ],
            Some(("Chapter One.txt", "text/plain", "It was a dark and stormy night.")),
        );

        let mut res = upload_request(body)
            .send(&make_service(files, Identity::User(customer())))
            .await;

        let file: FileResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(file.kind, "manuscript");

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_file_part_returns_422() -> TestResult {
        let body = multipart(&[("type", "document")], None);

        let res = upload_request(body)
            .send(&make_service(MockFilesService::new(), Identity::User(customer())))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNPROCESSABLE_ENTITY));

        Ok(())
    }

    #[tokio::test]
    async fn test_blocked_extension_returns_422() -> TestResult {
        let mut files = MockFilesService::new();

        files.expect_upload().once().return_once(|_, _| {
            Err(FilesServiceError::InvalidUpload(InvalidUpload::Extension(
                "js".to_string(),
            )))
        });

        let body = multipart(&[], Some(("payload.js", "text/plain", "alert(1)")));

        let res = upload_request(body)
            .send(&make_service(files, Identity::User(customer())))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNPROCESSABLE_ENTITY));

        Ok(())
    }

    #[tokio::test]
    async fn test_guest_cannot_upload() -> TestResult {
        let body = multipart(&[], Some(("notes.txt", "text/plain", "hello")));

        let res = upload_request(body)
            .send(&make_service(MockFilesService::new(), guest()?))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }
}
