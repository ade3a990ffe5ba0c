//! Coupon Responses

use folio::CouponKind;
use folio_app::domain::coupons::records::CouponRecord;
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Coupon Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CouponResponse {
    pub uuid: Uuid,
    pub code: String,
    pub name: String,

    /// `fixed` or `percentage`
    pub kind: String,

    /// Minor units for `fixed`, basis points for `percentage`
    pub value: u64,

    pub minimum_amount: Option<u64>,
    pub maximum_discount: Option<u64>,
    pub valid_from: String,
    pub valid_to: String,
    pub usage_limit: Option<u32>,
    pub used_count: u32,
    pub is_active: bool,
    pub created_at: String,
}

impl From<CouponRecord> for CouponResponse {
    fn from(coupon: CouponRecord) -> Self {
        let terms = coupon.terms;

        let (kind, value) = match terms.kind {
            CouponKind::Fixed { amount } => ("fixed", amount),
            CouponKind::Percentage { basis_points } => ("percentage", u64::from(basis_points)),
        };

        Self {
            uuid: coupon.uuid.into_uuid(),
            code: coupon.code,
            name: coupon.name,
            kind: kind.to_string(),
            value,
            minimum_amount: terms.minimum_amount,
            maximum_discount: terms.maximum_discount,
            valid_from: terms.valid_from.to_string(),
            valid_to: terms.valid_to.to_string(),
            usage_limit: terms.usage_limit,
            used_count: terms.used_count,
            is_active: terms.is_active,
            created_at: coupon.created_at.to_string(),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use folio::{CouponKind, CouponTerms};
    use folio_app::domain::coupons::records::{CouponRecord, CouponUuid};
    use jiff::Timestamp;

    pub(crate) fn make_coupon(uuid: CouponUuid, code: &str) -> CouponRecord {
        CouponRecord {
            uuid,
            code: code.to_string(),
            name: format!("{code} coupon"),
            terms: CouponTerms {
                kind: CouponKind::Percentage { basis_points: 1_000 },
                minimum_amount: None,
                maximum_discount: Some(5_000),
                valid_from: Timestamp::UNIX_EPOCH,
                valid_to: Timestamp::MAX,
                usage_limit: None,
                used_count: 0,
                is_active: true,
            },
            created_at: Timestamp::UNIX_EPOCH,
        }
    }
}
