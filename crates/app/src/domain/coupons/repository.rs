//! Coupons Repository

use folio::{CouponKind, CouponTerms};
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::{
    database::columns::{
        try_get_amount, try_get_count, try_get_optional_amount, try_get_optional_count,
        try_get_timestamp, try_get_uuid, try_i64_from_u64, try_optional_i32_from_u32,
        try_optional_i64_from_u64,
    },
    domain::coupons::{
        data::NewCoupon,
        records::{CouponRecord, CouponUuid},
    },
};

const CREATE_COUPON_SQL: &str = include_str!("sql/create_coupon.sql");
const FIND_COUPON_BY_CODE_SQL: &str = include_str!("sql/find_coupon_by_code.sql");
const LOCK_COUPON_BY_CODE_SQL: &str = include_str!("sql/lock_coupon_by_code.sql");
const INCREMENT_COUPON_USAGE_SQL: &str = include_str!("sql/increment_coupon_usage.sql");
const LIST_COUPONS_SQL: &str = include_str!("sql/list_coupons.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCouponsRepository;

impl PgCouponsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: &NewCoupon,
    ) -> Result<CouponRecord, sqlx::Error> {
        let value = match coupon.kind {
            CouponKind::Fixed { amount } => try_i64_from_u64(amount, "value")?,
            CouponKind::Percentage { basis_points } => i64::from(basis_points),
        };

        query_as::<Postgres, CouponRecord>(CREATE_COUPON_SQL)
            .bind(coupon.uuid.into_uuid())
            .bind(&coupon.code)
            .bind(&coupon.name)
            .bind(coupon.kind.as_str())
            .bind(value)
            .bind(try_optional_i64_from_u64(coupon.minimum_amount, "minimum_amount")?)
            .bind(try_optional_i64_from_u64(coupon.maximum_discount, "maximum_discount")?)
            .bind(SqlxTimestamp::from(coupon.valid_from))
            .bind(SqlxTimestamp::from(coupon.valid_to))
            .bind(try_optional_i32_from_u32(coupon.usage_limit, "usage_limit")?)
            .bind(coupon.is_active)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_coupons(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<CouponRecord>, sqlx::Error> {
        query_as::<Postgres, CouponRecord>(LIST_COUPONS_SQL)
            .fetch_all(&mut **tx)
            .await
    }

    /// Look a coupon up by its normalised code, optionally locking the row
    /// until the transaction ends.
    pub(crate) async fn find_coupon_by_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
        lock: bool,
    ) -> Result<Option<CouponRecord>, sqlx::Error> {
        let sql = if lock {
            LOCK_COUPON_BY_CODE_SQL
        } else {
            FIND_COUPON_BY_CODE_SQL
        };

        query_as::<Postgres, CouponRecord>(sql)
            .bind(code)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Returns `false` when the usage limit has been reached.
    pub(crate) async fn increment_usage(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: CouponUuid,
    ) -> Result<bool, sqlx::Error> {
        let rows_affected = query(INCREMENT_COUPON_USAGE_SQL)
            .bind(coupon.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected == 1)
    }
}

fn try_get_kind(row: &PgRow) -> Result<CouponKind, sqlx::Error> {
    let kind: String = row.try_get("kind")?;
    let value = try_get_amount(row, "value")?;

    let decode_error = |source: Box<dyn std::error::Error + Send + Sync>| {
        sqlx::Error::ColumnDecode {
            index: "kind".to_string(),
            source,
        }
    };

    match kind.as_str() {
        "fixed" => Ok(CouponKind::Fixed { amount: value }),
        "percentage" => u16::try_from(value)
            .map(|basis_points| CouponKind::Percentage { basis_points })
            .map_err(|e| decode_error(Box::new(e))),
        other => Err(decode_error(
            format!("unknown coupon kind {other}").into(),
        )),
    }
}

impl<'r> FromRow<'r, PgRow> for CouponRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: try_get_uuid(row, "uuid")?,
            code: row.try_get("code")?,
            name: row.try_get("name")?,
            terms: CouponTerms {
                kind: try_get_kind(row)?,
                minimum_amount: try_get_optional_amount(row, "minimum_amount")?,
                maximum_discount: try_get_optional_amount(row, "maximum_discount")?,
                valid_from: try_get_timestamp(row, "valid_from")?,
                valid_to: try_get_timestamp(row, "valid_to")?,
                usage_limit: try_get_optional_count(row, "usage_limit")?,
                used_count: try_get_count(row, "used_count")?,
                is_active: row.try_get("is_active")?,
            },
            created_at: try_get_timestamp(row, "created_at")?,
        })
    }
}
