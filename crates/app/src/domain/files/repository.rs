//! Files Repository

use serde_json::Value;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::{
    auth::UserUuid,
    database::columns::{
        try_get_amount, try_get_optional_uuid, try_get_parsed, try_get_timestamp, try_get_uuid,
        try_i64_from_u64,
    },
    domain::{
        files::{
            data::{KindUsage, NewFile},
            records::{FileKind, FileRecord, FileUuid},
        },
        orders::records::OrderUuid,
    },
};

const CREATE_FILE_SQL: &str = include_str!("sql/create_file.sql");
const FIND_FILE_SQL: &str = include_str!("sql/find_file.sql");
const LIST_FILES_SQL: &str = include_str!("sql/list_files.sql");
const COUNT_FILES_SQL: &str = include_str!("sql/count_files.sql");
const DELETE_FILE_SQL: &str = include_str!("sql/delete_file.sql");
const STORAGE_USAGE_SQL: &str = include_str!("sql/storage_usage.sql");
const SET_FILE_VISIBILITY_SQL: &str = include_str!("sql/set_file_visibility.sql");
const ORDER_FILES_SQL: &str = include_str!("sql/order_files.sql");

/// Listing restrictions. `None` fields do not restrict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct FileQuery {
    pub owner: Option<UserUuid>,
    pub kind: Option<FileKind>,
    pub order: Option<OrderUuid>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgFilesRepository;

impl PgFilesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_file(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        file: &NewFile,
    ) -> Result<FileRecord, sqlx::Error> {
        query_as::<Postgres, FileRecord>(CREATE_FILE_SQL)
            .bind(file.uuid.into_uuid())
            .bind(file.user_uuid.into_uuid())
            .bind(file.order_uuid.map(OrderUuid::into_uuid))
            .bind(&file.original_name)
            .bind(&file.filename)
            .bind(&file.path)
            .bind(&file.mime_type)
            .bind(try_i64_from_u64(file.size, "size")?)
            .bind(&file.hash)
            .bind(file.kind.as_str())
            .bind(&file.metadata)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_file(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        file: FileUuid,
    ) -> Result<FileRecord, sqlx::Error> {
        query_as::<Postgres, FileRecord>(FIND_FILE_SQL)
            .bind(file.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_files(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        filter: FileQuery,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FileRecord>, sqlx::Error> {
        query_as::<Postgres, FileRecord>(LIST_FILES_SQL)
            .bind(filter.owner.map(UserUuid::into_uuid))
            .bind(filter.kind.map(FileKind::as_str))
            .bind(filter.order.map(OrderUuid::into_uuid))
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn count_files(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        filter: FileQuery,
    ) -> Result<u64, sqlx::Error> {
        let row = query(COUNT_FILES_SQL)
            .bind(filter.owner.map(UserUuid::into_uuid))
            .bind(filter.kind.map(FileKind::as_str))
            .bind(filter.order.map(OrderUuid::into_uuid))
            .fetch_one(&mut **tx)
            .await?;

        try_get_amount(&row, "count")
    }

    pub(crate) async fn delete_file(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        file: FileUuid,
    ) -> Result<(), sqlx::Error> {
        let result = query(DELETE_FILE_SQL)
            .bind(file.into_uuid())
            .execute(&mut **tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        Ok(())
    }

    pub(crate) async fn set_visibility(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        file: FileUuid,
        is_public: bool,
    ) -> Result<(), sqlx::Error> {
        let result = query(SET_FILE_VISIBILITY_SQL)
            .bind(file.into_uuid())
            .bind(is_public)
            .execute(&mut **tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        Ok(())
    }

    pub(crate) async fn order_files(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Vec<FileRecord>, sqlx::Error> {
        query_as::<Postgres, FileRecord>(ORDER_FILES_SQL)
            .bind(order.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    /// Per-kind totals, for one owner or everyone.
    pub(crate) async fn storage_usage(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: Option<UserUuid>,
    ) -> Result<Vec<KindUsage>, sqlx::Error> {
        let rows = query(STORAGE_USAGE_SQL)
            .bind(owner.map(UserUuid::into_uuid))
            .fetch_all(&mut **tx)
            .await?;

        rows.iter()
            .map(|row| {
                Ok(KindUsage {
                    kind: try_get_parsed(row, "kind")?,
                    count: try_get_amount(row, "count")?,
                    size: try_get_amount(row, "size")?,
                })
            })
            .collect()
    }
}

impl<'r> FromRow<'r, PgRow> for FileRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let metadata: Value = row.try_get("metadata")?;

        Ok(Self {
            uuid: try_get_uuid(row, "uuid")?,
            user_uuid: try_get_uuid(row, "user_uuid")?,
            order_uuid: try_get_optional_uuid(row, "order_uuid")?,
            original_name: row.try_get("original_name")?,
            filename: row.try_get("filename")?,
            path: row.try_get("path")?,
            mime_type: row.try_get("mime_type")?,
            size: try_get_amount(row, "size")?,
            hash: row.try_get("hash")?,
            kind: try_get_parsed(row, "kind")?,
            is_processed: row.try_get("is_processed")?,
            is_public: row.try_get("is_public")?,
            metadata,
            order_editor_uuid: try_get_optional_uuid(row, "order_editor_uuid")?,
            created_at: try_get_timestamp(row, "created_at")?,
            updated_at: try_get_timestamp(row, "updated_at")?,
        })
    }
}
