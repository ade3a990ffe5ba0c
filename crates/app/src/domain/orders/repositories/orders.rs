//! Orders Repository

use folio::OrderStatus;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use serde_json::Value;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, types::Json};

use crate::{
    auth::UserUuid,
    database::columns::{
        try_get_amount, try_get_optional_timestamp, try_get_optional_uuid, try_get_parsed,
        try_get_timestamp, try_get_uuid, try_i64_from_u64,
    },
    domain::{
        coupons::records::CouponUuid,
        orders::{
            data::{BillingDetails, NewOrder, OrderCounts, StatisticsRange, StatusCount},
            records::{OrderRecord, OrderUuid},
        },
    },
};

const CREATE_ORDER_SQL: &str = include_str!("../sql/create_order.sql");
const FIND_ORDER_SQL: &str = include_str!("../sql/find_order.sql");
const LOCK_ORDER_SQL: &str = include_str!("../sql/lock_order.sql");
const LIST_ORDERS_SQL: &str = include_str!("../sql/list_orders.sql");
const COUNT_ORDERS_SQL: &str = include_str!("../sql/count_orders.sql");
const UPDATE_ORDER_STATUS_SQL: &str = include_str!("../sql/update_order_status.sql");
const ASSIGN_ORDER_EDITOR_SQL: &str = include_str!("../sql/assign_order_editor.sql");
const ORDER_STATISTICS_SQL: &str = include_str!("../sql/order_statistics.sql");
const ORDER_STATUS_BREAKDOWN_SQL: &str = include_str!("../sql/order_status_breakdown.sql");

/// Which orders a listing may return. `None` fields do not restrict.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct OrderScope {
    pub user: Option<UserUuid>,
    pub session_key: Option<String>,
    pub editor: Option<UserUuid>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &NewOrder,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(CREATE_ORDER_SQL)
            .bind(order.uuid.into_uuid())
            .bind(&order.order_number)
            .bind(order.user_uuid.map(UserUuid::into_uuid))
            .bind(order.guest_email.as_deref())
            .bind(order.guest_session_key.as_deref())
            .bind(try_i64_from_u64(order.totals.subtotal, "subtotal")?)
            .bind(try_i64_from_u64(order.totals.tax, "tax_amount")?)
            .bind(try_i64_from_u64(order.totals.discount, "discount_amount")?)
            .bind(try_i64_from_u64(order.totals.total, "total_amount")?)
            .bind(&order.currency)
            .bind(order.coupon_uuid.map(CouponUuid::into_uuid))
            .bind(order.payment_method.as_str())
            .bind(Json(&order.billing_details))
            .bind(order.requirements.as_ref())
            .bind(order.estimated_delivery_at.map(SqlxTimestamp::from))
            .fetch_one(&mut **tx)
            .await
    }

    /// With `lock` set the row is held `FOR UPDATE` until the transaction ends.
    pub(crate) async fn find_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        lock: bool,
    ) -> Result<OrderRecord, sqlx::Error> {
        let sql = if lock { LOCK_ORDER_SQL } else { FIND_ORDER_SQL };

        query_as::<Postgres, OrderRecord>(sql)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        scope: &OrderScope,
        status: Option<OrderStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(LIST_ORDERS_SQL)
            .bind(scope.user.map(UserUuid::into_uuid))
            .bind(scope.session_key.as_deref())
            .bind(scope.editor.map(UserUuid::into_uuid))
            .bind(status.map(OrderStatus::as_str))
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn count_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        scope: &OrderScope,
        status: Option<OrderStatus>,
    ) -> Result<u64, sqlx::Error> {
        let (total,): (i64,) = query_as(COUNT_ORDERS_SQL)
            .bind(scope.user.map(UserUuid::into_uuid))
            .bind(scope.session_key.as_deref())
            .bind(scope.editor.map(UserUuid::into_uuid))
            .bind(status.map(OrderStatus::as_str))
            .fetch_one(&mut **tx)
            .await?;

        u64::try_from(total).map_err(|e| sqlx::Error::ColumnDecode {
            index: "total".to_string(),
            source: Box::new(e),
        })
    }

    /// Sets the status; entering `delivered` also stamps `delivered_at`.
    pub(crate) async fn update_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(UPDATE_ORDER_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(status.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn assign_editor(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        editor: UserUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(ASSIGN_ORDER_EDITOR_SQL)
            .bind(order.into_uuid())
            .bind(editor.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn order_counts(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        range: StatisticsRange,
    ) -> Result<OrderCounts, sqlx::Error> {
        let row = sqlx::query(ORDER_STATISTICS_SQL)
            .bind(range.from.map(SqlxTimestamp::from))
            .bind(range.to.map(SqlxTimestamp::from))
            .fetch_one(&mut **tx)
            .await?;

        Ok(OrderCounts {
            total_orders: try_get_amount(&row, "total_orders")?,
            paid_orders: try_get_amount(&row, "paid_orders")?,
            pending_orders: try_get_amount(&row, "pending_orders")?,
            completed_orders: try_get_amount(&row, "completed_orders")?,
            total_revenue: try_get_amount(&row, "total_revenue")?,
        })
    }

    pub(crate) async fn status_breakdown(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        range: StatisticsRange,
    ) -> Result<Vec<StatusCount>, sqlx::Error> {
        let rows = sqlx::query(ORDER_STATUS_BREAKDOWN_SQL)
            .bind(range.from.map(SqlxTimestamp::from))
            .bind(range.to.map(SqlxTimestamp::from))
            .fetch_all(&mut **tx)
            .await?;

        rows.iter()
            .map(|row| {
                Ok(StatusCount {
                    status: try_get_parsed(row, "status")?,
                    count: try_get_amount(row, "count")?,
                })
            })
            .collect()
    }
}

impl<'r> FromRow<'r, PgRow> for OrderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let billing_details: Json<BillingDetails> = row.try_get("billing_details")?;
        let requirements: Option<Value> = row.try_get("requirements")?;

        Ok(Self {
            uuid: try_get_uuid(row, "uuid")?,
            order_number: row.try_get("order_number")?,
            user_uuid: try_get_optional_uuid(row, "user_uuid")?,
            guest_email: row.try_get("guest_email")?,
            guest_session_key: row.try_get("guest_session_key")?,
            status: try_get_parsed(row, "status")?,
            subtotal: try_get_amount(row, "subtotal")?,
            tax_amount: try_get_amount(row, "tax_amount")?,
            discount_amount: try_get_amount(row, "discount_amount")?,
            total_amount: try_get_amount(row, "total_amount")?,
            currency: row.try_get("currency")?,
            coupon_uuid: try_get_optional_uuid(row, "coupon_uuid")?,
            payment_method: try_get_parsed(row, "payment_method")?,
            billing_details: billing_details.0,
            requirements,
            assigned_editor_uuid: try_get_optional_uuid(row, "assigned_editor_uuid")?,
            estimated_delivery_at: try_get_optional_timestamp(row, "estimated_delivery_at")?,
            delivered_at: try_get_optional_timestamp(row, "delivered_at")?,
            created_at: try_get_timestamp(row, "created_at")?,
            updated_at: try_get_timestamp(row, "updated_at")?,
        })
    }
}
