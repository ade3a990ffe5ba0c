//! Payments Repository

use serde_json::Value;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};
use uuid::Uuid;

use crate::{
    database::columns::{
        try_get_amount, try_get_optional_timestamp, try_get_parsed, try_get_timestamp,
        try_get_uuid, try_i64_from_u64,
    },
    domain::{
        orders::records::OrderUuid,
        payments::{
            data::NewPayment,
            records::{Gateway, PaymentRecord, PaymentStatus, PaymentUuid},
        },
    },
};

const CREATE_PAYMENT_SQL: &str = include_str!("sql/create_payment.sql");
const FIND_PAYMENT_SQL: &str = include_str!("sql/find_payment.sql");
const LOCK_PAYMENT_BY_GATEWAY_ID_SQL: &str = include_str!("sql/lock_payment_by_gateway_id.sql");
const HAS_COMPLETED_PAYMENT_SQL: &str = include_str!("sql/has_completed_payment.sql");
const UPDATE_PAYMENT_STATUS_SQL: &str = include_str!("sql/update_payment_status.sql");
const REFUND_COMPLETED_PAYMENT_SQL: &str = include_str!("sql/refund_completed_payment.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgPaymentsRepository;

impl PgPaymentsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: &NewPayment,
    ) -> Result<PaymentRecord, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(CREATE_PAYMENT_SQL)
            .bind(payment.uuid.into_uuid())
            .bind(payment.order_uuid.into_uuid())
            .bind(payment.gateway.as_str())
            .bind(&payment.gateway_payment_id)
            .bind(try_i64_from_u64(payment.amount, "amount")?)
            .bind(&payment.currency)
            .bind(payment.raw_response.as_ref())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
    ) -> Result<PaymentRecord, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(FIND_PAYMENT_SQL)
            .bind(payment.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Locks the payment a gateway event refers to, if it is ours.
    pub(crate) async fn lock_by_gateway_id(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        gateway: Gateway,
        gateway_payment_id: &str,
    ) -> Result<Option<PaymentRecord>, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(LOCK_PAYMENT_BY_GATEWAY_ID_SQL)
            .bind(gateway.as_str())
            .bind(gateway_payment_id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Whether any payment for `order` completed.
    pub(crate) async fn has_completed_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = query_as(HAS_COMPLETED_PAYMENT_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        Ok(exists)
    }

    pub(crate) async fn update_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
        status: PaymentStatus,
        failure_reason: Option<&str>,
        raw_response: &Value,
    ) -> Result<PaymentRecord, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(UPDATE_PAYMENT_STATUS_SQL)
            .bind(payment.into_uuid())
            .bind(status.as_str())
            .bind(failure_reason)
            .bind(raw_response)
            .fetch_one(&mut **tx)
            .await
    }

    /// Marks the latest completed payment of `order` refunded.
    pub(crate) async fn refund_completed_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Option<PaymentUuid>, sqlx::Error> {
        let refunded: Option<(Uuid,)> = query_as(REFUND_COMPLETED_PAYMENT_SQL)
            .bind(order.into_uuid())
            .fetch_optional(&mut **tx)
            .await?;

        Ok(refunded.map(|(uuid,)| PaymentUuid::from_uuid(uuid)))
    }
}

impl<'r> FromRow<'r, PgRow> for PaymentRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: try_get_uuid(row, "uuid")?,
            order_uuid: try_get_uuid(row, "order_uuid")?,
            gateway: try_get_parsed(row, "gateway")?,
            gateway_payment_id: row.try_get("gateway_payment_id")?,
            amount: try_get_amount(row, "amount")?,
            currency: row.try_get("currency")?,
            status: try_get_parsed(row, "status")?,
            failure_reason: row.try_get("failure_reason")?,
            raw_response: row.try_get("raw_response")?,
            processed_at: try_get_optional_timestamp(row, "processed_at")?,
            created_at: try_get_timestamp(row, "created_at")?,
            updated_at: try_get_timestamp(row, "updated_at")?,
        })
    }
}
