//! Coupons service.

use async_trait::async_trait;
use folio::CouponError;
use jiff::Timestamp;
use mockall::automock;
use sqlx::{Postgres, Transaction};
use tracing::info;

use crate::{
    auth::Actor,
    database::Db,
    domain::coupons::{
        data::{AppliedCoupon, COUPON_CODE_MAX_LEN, NewCoupon, normalize_code},
        errors::CouponsServiceError,
        records::CouponRecord,
        repository::PgCouponsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgCouponsService {
    db: Db,
    repository: PgCouponsRepository,
}

impl PgCouponsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCouponsRepository::new(),
        }
    }
}

/// Evaluate `code` against `subtotal` inside an open transaction.
///
/// With `lock` set the coupon row stays locked until the transaction ends, so
/// a following usage increment cannot race another checkout.
pub(crate) async fn evaluate_code<E>(
    repository: &PgCouponsRepository,
    tx: &mut Transaction<'_, Postgres>,
    code: &str,
    subtotal: u64,
    now: Timestamp,
    lock: bool,
) -> Result<AppliedCoupon, E>
where
    E: From<sqlx::Error> + From<CouponError>,
{
    let code = normalize_code(code);

    if code.is_empty() || code.chars().count() > COUPON_CODE_MAX_LEN {
        return Err(CouponError::NotFound.into());
    }

    let coupon = repository
        .find_coupon_by_code(tx, &code, lock)
        .await?
        .ok_or(CouponError::NotFound)?;

    let discount = coupon.terms.apply(subtotal, now)?;

    Ok(AppliedCoupon {
        uuid: coupon.uuid,
        code: coupon.code,
        discount,
    })
}

#[async_trait]
impl CouponsService for PgCouponsService {
    #[tracing::instrument(
        name = "coupons.service.create_coupon",
        skip(self, coupon),
        fields(user_uuid = %actor.user, coupon_uuid = %coupon.uuid),
        err
    )]
    async fn create_coupon(
        &self,
        actor: Actor,
        coupon: NewCoupon,
    ) -> Result<CouponRecord, CouponsServiceError> {
        if !actor.is_admin() {
            return Err(CouponsServiceError::Unauthorized);
        }

        let code = normalize_code(&coupon.code);

        if code.is_empty() || code.chars().count() > COUPON_CODE_MAX_LEN {
            return Err(CouponsServiceError::InvalidData);
        }

        let coupon = NewCoupon { code, ..coupon };

        let mut tx = self.db.begin().await?;

        let record = self.repository.create_coupon(&mut tx, &coupon).await?;

        tx.commit().await?;

        info!(coupon_uuid = %record.uuid, code = %record.code, "created coupon");

        Ok(record)
    }

    async fn list_coupons(&self, actor: Actor) -> Result<Vec<CouponRecord>, CouponsServiceError> {
        if !actor.is_admin() {
            return Err(CouponsServiceError::Unauthorized);
        }

        let mut tx = self.db.begin().await?;

        let coupons = self.repository.list_coupons(&mut tx).await?;

        tx.commit().await?;

        Ok(coupons)
    }

    async fn apply(&self, code: &str, subtotal: u64) -> Result<AppliedCoupon, CouponsServiceError> {
        let mut tx = self.db.begin().await?;

        let applied = evaluate_code::<CouponsServiceError>(
            &self.repository,
            &mut tx,
            code,
            subtotal,
            Timestamp::now(),
            false,
        )
        .await?;

        tx.commit().await?;

        Ok(applied)
    }
}

#[automock]
#[async_trait]
pub trait CouponsService: Send + Sync {
    async fn create_coupon(
        &self,
        actor: Actor,
        coupon: NewCoupon,
    ) -> Result<CouponRecord, CouponsServiceError>;

    async fn list_coupons(&self, actor: Actor) -> Result<Vec<CouponRecord>, CouponsServiceError>;

    /// Discount `code` would give on `subtotal`. Never records usage.
    async fn apply(&self, code: &str, subtotal: u64) -> Result<AppliedCoupon, CouponsServiceError>;
}

#[cfg(test)]
mod tests {
    use folio::CouponKind;
    use jiff::{SignedDuration, Timestamp};
    use testresult::TestResult;

    use crate::{
        domain::coupons::records::CouponUuid,
        test::{TestContext, helpers},
    };

    use super::*;

    #[tokio::test]
    async fn percentage_coupon_discounts_subtotal() -> TestResult {
        let ctx = TestContext::new().await;

        helpers::create_percentage_coupon(&ctx, "save10", 1_000).await?;

        let applied = ctx.coupons.apply("SAVE10", 5_000).await?;

        assert_eq!(applied.code, "SAVE10");
        assert_eq!(applied.discount, 500);

        Ok(())
    }

    #[tokio::test]
    async fn codes_match_case_insensitively() -> TestResult {
        let ctx = TestContext::new().await;

        helpers::create_percentage_coupon(&ctx, "Spring", 2_500).await?;

        let applied = ctx.coupons.apply(" spring ", 1_000).await?;

        assert_eq!(applied.discount, 250);

        Ok(())
    }

    #[tokio::test]
    async fn unknown_code_is_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.coupons.apply("MISSING", 1_000).await;

        assert!(
            matches!(result, Err(CouponsServiceError::Coupon(CouponError::NotFound))),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn expired_coupon_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let now = Timestamp::now();

        ctx.coupons
            .create_coupon(
                ctx.admin,
                NewCoupon {
                    uuid: CouponUuid::new(),
                    code: "OLD".to_string(),
                    name: "Old".to_string(),
                    kind: CouponKind::Fixed { amount: 100 },
                    minimum_amount: None,
                    maximum_discount: None,
                    valid_from: now - SignedDuration::from_hours(48),
                    valid_to: now - SignedDuration::from_hours(24),
                    usage_limit: None,
                    is_active: true,
                },
            )
            .await?;

        let result = ctx.coupons.apply("OLD", 1_000).await;

        assert!(
            matches!(result, Err(CouponsServiceError::Coupon(CouponError::Expired))),
            "expected Expired, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_code_returns_already_exists() -> TestResult {
        let ctx = TestContext::new().await;

        helpers::create_percentage_coupon(&ctx, "DUP", 500).await?;

        let result = helpers::create_percentage_coupon(&ctx, "dup", 500).await;

        assert!(
            matches!(result, Err(CouponsServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn customers_cannot_create_coupons() {
        let ctx = TestContext::new().await;
        let now = Timestamp::now();

        let result = ctx
            .coupons
            .create_coupon(
                ctx.customer,
                NewCoupon {
                    uuid: CouponUuid::new(),
                    code: "MINE".to_string(),
                    name: "Mine".to_string(),
                    kind: CouponKind::Fixed { amount: 100 },
                    minimum_amount: None,
                    maximum_discount: None,
                    valid_from: now,
                    valid_to: now,
                    usage_limit: None,
                    is_active: true,
                },
            )
            .await;

        assert!(
            matches!(result, Err(CouponsServiceError::Unauthorized)),
            "expected Unauthorized, got {result:?}"
        );
    }
}
