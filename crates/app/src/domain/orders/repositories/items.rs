//! Order Items Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, types::Json};

use crate::{
    database::columns::{
        try_get_amount, try_get_count, try_get_uuid, try_i32_from_u32, try_i64_from_u64,
    },
    domain::{
        carts::{data::CartSummaryItem, records::CartItemMeta},
        orders::records::{OrderItemRecord, OrderItemUuid, OrderUuid},
    },
};

const CREATE_ORDER_ITEM_SQL: &str = include_str!("../sql/create_order_item.sql");
const LIST_ORDER_ITEMS_SQL: &str = include_str!("../sql/list_order_items.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrderItemsRepository;

impl PgOrderItemsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Snapshots a priced cart line onto the order.
    pub(crate) async fn create_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        line: &CartSummaryItem,
    ) -> Result<(), sqlx::Error> {
        query(CREATE_ORDER_ITEM_SQL)
            .bind(OrderItemUuid::new().into_uuid())
            .bind(order.into_uuid())
            .bind(line.variant_uuid.into_uuid())
            .bind(&line.service_title)
            .bind(&line.variant_title)
            .bind(try_i32_from_u32(line.quantity, "quantity")?)
            .bind(try_i64_from_u64(line.unit_price, "unit_price")?)
            .bind(try_i64_from_u64(line.subtotal, "subtotal")?)
            .bind(Json(&line.meta))
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn list_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Vec<OrderItemRecord>, sqlx::Error> {
        query_as::<Postgres, OrderItemRecord>(LIST_ORDER_ITEMS_SQL)
            .bind(order.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for OrderItemRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let item_meta: Json<CartItemMeta> = row.try_get("item_meta")?;

        Ok(Self {
            uuid: try_get_uuid(row, "uuid")?,
            variant_uuid: try_get_uuid(row, "variant_uuid")?,
            service_title: row.try_get("service_title")?,
            variant_title: row.try_get("variant_title")?,
            quantity: try_get_count(row, "quantity")?,
            unit_price: try_get_amount(row, "unit_price")?,
            subtotal: try_get_amount(row, "subtotal")?,
            item_meta: item_meta.0,
        })
    }
}
