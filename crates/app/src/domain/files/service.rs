//! Files service.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use serde_json::{Map, Value};
use tracing::{Span, info, warn};

use crate::{
    auth::{Actor, Identity},
    database::Db,
    domain::{
        files::{
            blob::BlobStore,
            data::{
                FileDownload, FileFilter, FilePage, FileUpload, NewFile, StorageUsage,
                content_hash, storage_path, stored_filename,
            },
            errors::FilesServiceError,
            records::{FileRecord, FileUuid},
            repository::{FileQuery, PgFilesRepository},
        },
        orders::{records::OrderUuid, repositories::PgOrdersRepository},
    },
};

#[derive(Clone)]
pub struct PgFilesService {
    db: Db,
    blobs: Arc<dyn BlobStore>,
    files: PgFilesRepository,
    orders: PgOrdersRepository,
}

impl fmt::Debug for PgFilesService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgFilesService")
            .field("db", &self.db)
            .finish_non_exhaustive()
    }
}

impl PgFilesService {
    #[must_use]
    pub fn new(db: Db, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            db,
            blobs,
            files: PgFilesRepository::new(),
            orders: PgOrdersRepository::new(),
        }
    }

    async fn readable_file(
        &self,
        reader: Option<&Actor>,
        file: FileUuid,
    ) -> Result<FileRecord, FilesServiceError> {
        let mut tx = self.db.begin().await?;
        let record = self.files.find_file(&mut tx, file).await?;
        tx.commit().await?;

        if record.is_readable_by(reader) {
            Ok(record)
        } else {
            Err(FilesServiceError::Unauthorized)
        }
    }
}

#[async_trait]
impl FilesService for PgFilesService {
    #[tracing::instrument(
        name = "files.service.upload",
        skip(self, upload),
        fields(
            user_uuid = %actor.user,
            kind = %upload.kind,
            size = upload.bytes.len(),
            file_uuid = tracing::field::Empty
        ),
        err
    )]
    async fn upload(&self, actor: Actor, upload: FileUpload) -> Result<FileRecord, FilesServiceError> {
        upload.validate()?;

        let now = Timestamp::now();
        let filename = stored_filename(&upload.original_name);
        let path = storage_path(upload.kind, now, actor.user, &filename);

        let mut metadata = Map::new();
        metadata.insert("uploaded_at".to_string(), Value::from(now.to_string()));

        if let Some(description) = upload.description.as_deref() {
            metadata.insert("description".to_string(), Value::from(description));
        }

        let new_file = NewFile {
            uuid: FileUuid::new(),
            user_uuid: actor.user,
            order_uuid: upload.order_uuid,
            original_name: upload.original_name.clone(),
            filename,
            path,
            mime_type: upload.mime_type.clone(),
            size: upload.size(),
            hash: content_hash(&upload.bytes),
            kind: upload.kind,
            metadata: Value::Object(metadata),
        };

        let mut tx = self.db.begin().await?;

        if let Some(order) = upload.order_uuid {
            let record = self.orders.find_order(&mut tx, order, false).await?;

            if !record.is_visible_to(&Identity::User(actor)) {
                return Err(FilesServiceError::NotFound);
            }
        }

        self.blobs.put(&new_file.path, &upload.bytes).await?;

        let stored = match self.files.create_file(&mut tx, &new_file).await {
            Ok(record) => tx.commit().await.map(|()| record),
            Err(error) => Err(error),
        };

        let record = match stored {
            Ok(record) => record,
            Err(error) => {
                if let Err(cleanup) = self.blobs.delete(&new_file.path).await {
                    warn!(path = %new_file.path, error = %cleanup, "orphaned blob after failed upload");
                }

                return Err(error.into());
            }
        };

        Span::current().record("file_uuid", tracing::field::display(record.uuid));

        info!(
            file_uuid = %record.uuid,
            order_uuid = ?record.order_uuid,
            size = record.size,
            "uploaded file"
        );

        Ok(record)
    }

    async fn list_files(
        &self,
        actor: Actor,
        filter: FileFilter,
    ) -> Result<FilePage, FilesServiceError> {
        let query = FileQuery {
            owner: (!actor.is_admin()).then_some(actor.user),
            kind: filter.kind,
            order: filter.order_uuid,
        };

        let (limit, offset) = filter.limit_offset();

        let mut tx = self.db.begin().await?;

        let files = self.files.list_files(&mut tx, query, limit, offset).await?;
        let total = self.files.count_files(&mut tx, query).await?;

        tx.commit().await?;

        Ok(FilePage {
            files,
            total,
            page: filter.page.max(1),
            per_page: u32::try_from(limit).unwrap_or(filter.per_page),
        })
    }

    async fn get_file(
        &self,
        reader: Option<Actor>,
        file: FileUuid,
    ) -> Result<FileRecord, FilesServiceError> {
        self.readable_file(reader.as_ref(), file).await
    }

    #[tracing::instrument(
        name = "files.service.download",
        skip(self, reader),
        fields(user_uuid = ?reader.map(|actor| actor.user), file_uuid = %file),
        err
    )]
    async fn download(
        &self,
        reader: Option<Actor>,
        file: FileUuid,
    ) -> Result<FileDownload, FilesServiceError> {
        let record = self.readable_file(reader.as_ref(), file).await?;
        let bytes = self.blobs.get(&record.path).await?;

        info!(file_uuid = %record.uuid, "downloaded file");

        Ok(FileDownload {
            file: record,
            bytes,
        })
    }

    #[tracing::instrument(
        name = "files.service.delete",
        skip(self),
        fields(user_uuid = %actor.user, file_uuid = %file),
        err
    )]
    async fn delete_file(&self, actor: Actor, file: FileUuid) -> Result<(), FilesServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.files.find_file(&mut tx, file).await?;

        if !record.is_managed_by(&actor) {
            return Err(FilesServiceError::Unauthorized);
        }

        self.blobs.delete(&record.path).await?;
        self.files.delete_file(&mut tx, file).await?;

        tx.commit().await?;

        info!(file_uuid = %file, "deleted file");

        Ok(())
    }

    #[tracing::instrument(
        name = "files.service.set_visibility",
        skip(self),
        fields(user_uuid = %actor.user, file_uuid = %file),
        err
    )]
    async fn set_visibility(
        &self,
        actor: Actor,
        file: FileUuid,
        is_public: bool,
    ) -> Result<FileRecord, FilesServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.files.find_file(&mut tx, file).await?;

        if !record.is_managed_by(&actor) {
            return Err(FilesServiceError::Unauthorized);
        }

        self.files.set_visibility(&mut tx, file, is_public).await?;

        let record = self.files.find_file(&mut tx, file).await?;

        tx.commit().await?;

        info!(file_uuid = %file, is_public, "changed file visibility");

        Ok(record)
    }

    async fn order_files(
        &self,
        identity: Identity,
        order: OrderUuid,
    ) -> Result<Vec<FileRecord>, FilesServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.orders.find_order(&mut tx, order, false).await?;

        if !record.is_visible_to(&identity) {
            return Err(FilesServiceError::NotFound);
        }

        let files = self.files.order_files(&mut tx, order).await?;

        tx.commit().await?;

        Ok(files)
    }

    async fn storage_usage(&self, actor: Actor) -> Result<StorageUsage, FilesServiceError> {
        let mut tx = self.db.begin().await?;

        let breakdown = self.files.storage_usage(&mut tx, Some(actor.user)).await?;

        tx.commit().await?;

        Ok(StorageUsage::from_breakdown(breakdown))
    }
}

#[automock]
#[async_trait]
pub trait FilesService: Send + Sync {
    /// Validates and stores an upload, optionally linked to an order the
    /// caller can see.
    async fn upload(&self, actor: Actor, upload: FileUpload) -> Result<FileRecord, FilesServiceError>;

    /// Own files, or every file for admins.
    async fn list_files(&self, actor: Actor, filter: FileFilter)
    -> Result<FilePage, FilesServiceError>;

    /// `reader` is `None` for guests and anonymous callers, who only see
    /// public files.
    async fn get_file(
        &self,
        reader: Option<Actor>,
        file: FileUuid,
    ) -> Result<FileRecord, FilesServiceError>;

    async fn download(
        &self,
        reader: Option<Actor>,
        file: FileUuid,
    ) -> Result<FileDownload, FilesServiceError>;

    /// Owner or admin only. The blob goes first, then the row.
    async fn delete_file(&self, actor: Actor, file: FileUuid) -> Result<(), FilesServiceError>;

    /// Owner or admin only.
    async fn set_visibility(
        &self,
        actor: Actor,
        file: FileUuid,
        is_public: bool,
    ) -> Result<FileRecord, FilesServiceError>;

    /// Every file linked to an order, for anyone who can see the order.
    /// Ordered by kind, then upload time.
    async fn order_files(
        &self,
        identity: Identity,
        order: OrderUuid,
    ) -> Result<Vec<FileRecord>, FilesServiceError>;

    async fn storage_usage(&self, actor: Actor) -> Result<StorageUsage, FilesServiceError>;
}
