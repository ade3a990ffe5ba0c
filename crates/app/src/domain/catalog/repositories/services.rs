//! Services Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::{
    database::columns::{
        try_get_amount, try_get_parsed, try_get_timestamp, try_get_uuid, try_i64_from_u64,
    },
    domain::catalog::{
        data::{NewService, ServiceFilter, ServiceUpdate},
        records::{ServiceRecord, ServiceUuid},
    },
};

const LIST_SERVICES_SQL: &str = include_str!("../sql/list_services.sql");
const GET_ACTIVE_SERVICE_BY_SLUG_SQL: &str = include_str!("../sql/get_active_service_by_slug.sql");
const CREATE_SERVICE_SQL: &str = include_str!("../sql/create_service.sql");
const SET_SERVICE_ACTIVE_SQL: &str = include_str!("../sql/set_service_active.sql");
const UPDATE_SERVICE_SQL: &str = include_str!("../sql/update_service.sql");
const DELETE_SERVICE_SQL: &str = include_str!("../sql/delete_service.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgServicesRepository;

impl PgServicesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_services(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        filter: ServiceFilter,
    ) -> Result<Vec<ServiceRecord>, sqlx::Error> {
        query_as::<Postgres, ServiceRecord>(LIST_SERVICES_SQL)
            .bind(filter.service_type.map(|service_type| service_type.as_str()))
            .bind(filter.featured_only)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn get_active_service_by_slug(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        slug: &str,
    ) -> Result<ServiceRecord, sqlx::Error> {
        query_as::<Postgres, ServiceRecord>(GET_ACTIVE_SERVICE_BY_SLUG_SQL)
            .bind(slug)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_service(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        service: &NewService,
    ) -> Result<ServiceRecord, sqlx::Error> {
        query_as::<Postgres, ServiceRecord>(CREATE_SERVICE_SQL)
            .bind(service.uuid.into_uuid())
            .bind(&service.slug)
            .bind(&service.title)
            .bind(&service.description)
            .bind(service.service_type.as_str())
            .bind(try_i64_from_u64(service.base_price, "base_price")?)
            .bind(&service.features)
            .bind(service.sort_order)
            .bind(service.is_featured)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn set_service_active(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        service: ServiceUuid,
        is_active: bool,
    ) -> Result<ServiceRecord, sqlx::Error> {
        query_as::<Postgres, ServiceRecord>(SET_SERVICE_ACTIVE_SQL)
            .bind(service.into_uuid())
            .bind(is_active)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_service(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        service: ServiceUuid,
        update: &ServiceUpdate,
    ) -> Result<ServiceRecord, sqlx::Error> {
        query_as::<Postgres, ServiceRecord>(UPDATE_SERVICE_SQL)
            .bind(service.into_uuid())
            .bind(&update.slug)
            .bind(&update.title)
            .bind(&update.description)
            .bind(update.service_type.as_str())
            .bind(try_i64_from_u64(update.base_price, "base_price")?)
            .bind(&update.features)
            .bind(update.sort_order)
            .bind(update.is_active)
            .bind(update.is_featured)
            .fetch_one(&mut **tx)
            .await
    }

    /// Variants and cart lines go with the service.
    pub(crate) async fn delete_service(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        service: ServiceUuid,
    ) -> Result<(), sqlx::Error> {
        let result = query(DELETE_SERVICE_SQL)
            .bind(service.into_uuid())
            .execute(&mut **tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        Ok(())
    }
}

impl<'r> FromRow<'r, PgRow> for ServiceRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: try_get_uuid(row, "uuid")?,
            slug: row.try_get("slug")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            service_type: try_get_parsed(row, "type")?,
            base_price: try_get_amount(row, "base_price")?,
            features: row.try_get("features")?,
            sort_order: row.try_get("sort_order")?,
            is_active: row.try_get("is_active")?,
            is_featured: row.try_get("is_featured")?,
            created_at: try_get_timestamp(row, "created_at")?,
            updated_at: try_get_timestamp(row, "updated_at")?,
        })
    }
}
