//! File Responses

use std::collections::BTreeMap;

use folio_app::domain::files::{
    data::{FilePage, KindUsage, StorageUsage},
    records::FileRecord,
};
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// File Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct FileResponse {
    pub uuid: Uuid,
    pub user_uuid: Uuid,
    pub order_uuid: Option<Uuid>,
    pub original_name: String,
    pub filename: String,
    pub mime_type: String,
    pub size: u64,

    /// Hex SHA-256 of the content
    pub hash: String,

    #[serde(rename = "type")]
    pub kind: String,

    pub is_processed: bool,
    pub is_public: bool,

    #[salvo(schema(value_type = Object))]
    pub metadata: Value,

    pub created_at: String,
}

impl From<FileRecord> for FileResponse {
    fn from(file: FileRecord) -> Self {
        Self {
            uuid: file.uuid.into_uuid(),
            user_uuid: file.user_uuid.into_uuid(),
            order_uuid: file.order_uuid.map(|uuid| uuid.into_uuid()),
            original_name: file.original_name,
            filename: file.filename,
            mime_type: file.mime_type,
            size: file.size,
            hash: file.hash,
            kind: file.kind.to_string(),
            is_processed: file.is_processed,
            is_public: file.is_public,
            metadata: file.metadata,
            created_at: file.created_at.to_string(),
        }
    }
}

/// File Page Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct FilePageResponse {
    pub files: Vec<FileResponse>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

impl From<FilePage> for FilePageResponse {
    fn from(page: FilePage) -> Self {
        Self {
            files: page.files.into_iter().map(Into::into).collect(),
            total: page.total,
            page: page.page,
            per_page: page.per_page,
        }
    }
}

/// Order Files Response
///
/// Files linked to one order, keyed by file type.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderFilesResponse {
    pub total: usize,
    pub files: BTreeMap<String, Vec<FileResponse>>,
}

impl From<Vec<FileRecord>> for OrderFilesResponse {
    fn from(records: Vec<FileRecord>) -> Self {
        let total = records.len();
        let mut files: BTreeMap<String, Vec<FileResponse>> = BTreeMap::new();

        for record in records {
            files
                .entry(record.kind.to_string())
                .or_default()
                .push(record.into());
        }

        Self { total, files }
    }
}

/// One rejected file of a bulk upload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct BulkUploadError {
    pub original_name: String,
    pub error: String,
}

/// Bulk Upload Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct BulkUploadResponse {
    pub uploaded: Vec<FileResponse>,
    pub errors: Vec<BulkUploadError>,
}

/// Usage For One File Type
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct KindUsageResponse {
    #[serde(rename = "type")]
    pub kind: String,
    pub count: u64,
    pub size: u64,
}

impl From<KindUsage> for KindUsageResponse {
    fn from(usage: KindUsage) -> Self {
        Self {
            kind: usage.kind.to_string(),
            count: usage.count,
            size: usage.size,
        }
    }
}

/// Storage Usage Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct StorageUsageResponse {
    pub total_size: u64,
    pub total_files: u64,
    pub type_breakdown: Vec<KindUsageResponse>,
}

impl From<StorageUsage> for StorageUsageResponse {
    fn from(usage: StorageUsage) -> Self {
        Self {
            total_size: usage.total_size,
            total_files: usage.total_files,
            type_breakdown: usage.type_breakdown.into_iter().map(Into::into).collect(),
        }
    }
}
