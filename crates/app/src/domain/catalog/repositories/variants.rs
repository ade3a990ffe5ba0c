//! Variants Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::{
    database::columns::{
        try_get_amount, try_get_count, try_get_optional_count, try_get_parsed, try_get_timestamp,
        try_get_uuid, try_i32_from_u32, try_i64_from_u64, try_optional_i32_from_u32,
    },
    domain::catalog::{
        data::{NewVariant, VariantUpdate},
        records::{ServiceUuid, VariantRecord, VariantUuid},
    },
};

const LIST_ACTIVE_VARIANTS_SQL: &str = include_str!("../sql/list_active_variants.sql");
const GET_ACTIVE_VARIANT_SQL: &str = include_str!("../sql/get_active_variant.sql");
const CREATE_VARIANT_SQL: &str = include_str!("../sql/create_variant.sql");
const UPDATE_VARIANT_SQL: &str = include_str!("../sql/update_variant.sql");
const DELETE_VARIANT_SQL: &str = include_str!("../sql/delete_variant.sql");
const RETIRE_VARIANT_SQL: &str = include_str!("../sql/retire_variant.sql");
const ORDER_REFERENCES_SQL: &str = include_str!("../sql/order_references.sql");

#[cfg(test)]
const SET_VARIANT_PRICE_SQL: &str = include_str!("../sql/set_variant_price.sql");

/// Orders whose lines point at a service's or a variant's rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct OrderReferences {
    /// Not yet completed, delivered, cancelled or refunded.
    pub open: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgVariantsRepository;

impl PgVariantsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_active_variants(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        service: ServiceUuid,
    ) -> Result<Vec<VariantRecord>, sqlx::Error> {
        query_as::<Postgres, VariantRecord>(LIST_ACTIVE_VARIANTS_SQL)
            .bind(service.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    /// Variant that is active and belongs to an active service.
    pub(crate) async fn get_active_variant(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        variant: VariantUuid,
    ) -> Result<Option<VariantRecord>, sqlx::Error> {
        query_as::<Postgres, VariantRecord>(GET_ACTIVE_VARIANT_SQL)
            .bind(variant.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn create_variant(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        service: ServiceUuid,
        variant: &NewVariant,
    ) -> Result<VariantRecord, sqlx::Error> {
        query_as::<Postgres, VariantRecord>(CREATE_VARIANT_SQL)
            .bind(variant.uuid.into_uuid())
            .bind(service.into_uuid())
            .bind(&variant.title)
            .bind(try_i64_from_u64(variant.price, "price")?)
            .bind(variant.unit_type.as_str())
            .bind(try_i32_from_u32(variant.turnaround_days, "turnaround_days")?)
            .bind(try_i32_from_u32(variant.min_quantity, "min_quantity")?)
            .bind(try_optional_i32_from_u32(variant.max_quantity, "max_quantity")?)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_variant(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        variant: VariantUuid,
        update: &VariantUpdate,
    ) -> Result<VariantRecord, sqlx::Error> {
        query_as::<Postgres, VariantRecord>(UPDATE_VARIANT_SQL)
            .bind(variant.into_uuid())
            .bind(&update.title)
            .bind(try_i64_from_u64(update.price, "price")?)
            .bind(update.unit_type.as_str())
            .bind(try_i32_from_u32(update.turnaround_days, "turnaround_days")?)
            .bind(try_i32_from_u32(update.min_quantity, "min_quantity")?)
            .bind(try_optional_i32_from_u32(update.max_quantity, "max_quantity")?)
            .bind(update.is_active)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_variant(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        variant: VariantUuid,
    ) -> Result<(), sqlx::Error> {
        let result = query(DELETE_VARIANT_SQL)
            .bind(variant.into_uuid())
            .execute(&mut **tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        Ok(())
    }

    pub(crate) async fn retire_variant(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        variant: VariantUuid,
    ) -> Result<(), sqlx::Error> {
        let result = query(RETIRE_VARIANT_SQL)
            .bind(variant.into_uuid())
            .execute(&mut **tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        Ok(())
    }

    /// Counts orders referencing the variants of `service`, or the single
    /// `variant`. `None` does not restrict.
    pub(crate) async fn order_references(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        service: Option<ServiceUuid>,
        variant: Option<VariantUuid>,
    ) -> Result<OrderReferences, sqlx::Error> {
        let row = query(ORDER_REFERENCES_SQL)
            .bind(service.map(ServiceUuid::into_uuid))
            .bind(variant.map(VariantUuid::into_uuid))
            .fetch_one(&mut **tx)
            .await?;

        Ok(OrderReferences {
            open: try_get_amount(&row, "open_orders")?,
            total: try_get_amount(&row, "orders")?,
        })
    }

    #[cfg(test)]
    pub(crate) async fn set_variant_price(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        variant: VariantUuid,
        price: u64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(SET_VARIANT_PRICE_SQL)
            .bind(variant.into_uuid())
            .bind(try_i64_from_u64(price, "price")?)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}

impl<'r> FromRow<'r, PgRow> for VariantRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: try_get_uuid(row, "uuid")?,
            service_uuid: try_get_uuid(row, "service_uuid")?,
            service_title: row.try_get("service_title")?,
            title: row.try_get("title")?,
            price: try_get_amount(row, "price")?,
            unit_type: try_get_parsed(row, "unit_type")?,
            turnaround_days: try_get_count(row, "turnaround_days")?,
            min_quantity: try_get_count(row, "min_quantity")?,
            max_quantity: try_get_optional_count(row, "max_quantity")?,
            is_active: row.try_get("is_active")?,
            created_at: try_get_timestamp(row, "created_at")?,
            updated_at: try_get_timestamp(row, "updated_at")?,
        })
    }
}
