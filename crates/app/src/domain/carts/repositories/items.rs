//! Cart Items Repository

use folio::VariantTerms;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, types::Json};
use uuid::Uuid;

use crate::{
    database::columns::{
        try_get_amount, try_get_count, try_get_optional_count, try_get_parsed, try_get_uuid,
        try_i32_from_u32,
    },
    domain::{
        carts::records::{CartItemMeta, CartLineRecord, CartUuid},
        catalog::records::VariantUuid,
    },
};

const UPSERT_CART_ITEM_SQL: &str = include_str!("../sql/upsert_cart_item.sql");
const UPDATE_CART_ITEM_QUANTITY_SQL: &str = include_str!("../sql/update_cart_item_quantity.sql");
const DELETE_CART_ITEM_SQL: &str = include_str!("../sql/delete_cart_item.sql");
const CLEAR_CART_ITEMS_SQL: &str = include_str!("../sql/clear_cart_items.sql");
const LIST_CART_LINES_SQL: &str = include_str!("../sql/list_cart_lines.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartItemsRepository;

impl PgCartItemsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Insert the item or add `quantity` to the existing one. Returns the
    /// resulting quantity.
    pub(crate) async fn upsert_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        variant: VariantUuid,
        quantity: u32,
        meta: &CartItemMeta,
    ) -> Result<u32, sqlx::Error> {
        let (quantity,): (i32,) = query_as(UPSERT_CART_ITEM_SQL)
            .bind(Uuid::now_v7())
            .bind(cart.into_uuid())
            .bind(variant.into_uuid())
            .bind(try_i32_from_u32(quantity, "quantity")?)
            .bind(Json(meta))
            .fetch_one(&mut **tx)
            .await?;

        u32::try_from(quantity).map_err(|e| sqlx::Error::ColumnDecode {
            index: "quantity".to_string(),
            source: Box::new(e),
        })
    }

    pub(crate) async fn update_quantity(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        variant: VariantUuid,
        quantity: u32,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(UPDATE_CART_ITEM_QUANTITY_SQL)
            .bind(cart.into_uuid())
            .bind(variant.into_uuid())
            .bind(try_i32_from_u32(quantity, "quantity")?)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn delete_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        variant: VariantUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_CART_ITEM_SQL)
            .bind(cart.into_uuid())
            .bind(variant.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn clear_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(CLEAR_CART_ITEMS_SQL)
            .bind(cart.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn list_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<Vec<CartLineRecord>, sqlx::Error> {
        query_as::<Postgres, CartLineRecord>(LIST_CART_LINES_SQL)
            .bind(cart.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for CartLineRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let Json(meta): Json<CartItemMeta> = row.try_get("meta")?;

        Ok(Self {
            variant_uuid: try_get_uuid(row, "variant_uuid")?,
            service_title: row.try_get("service_title")?,
            variant_title: row.try_get("variant_title")?,
            quantity: try_get_count(row, "quantity")?,
            meta,
            terms: VariantTerms {
                price: try_get_amount(row, "price")?,
                unit_type: try_get_parsed(row, "unit_type")?,
                turnaround_days: try_get_count(row, "turnaround_days")?,
                min_quantity: try_get_count(row, "min_quantity")?,
                max_quantity: try_get_optional_count(row, "max_quantity")?,
            },
            is_available: row.try_get("is_available")?,
        })
    }
}
