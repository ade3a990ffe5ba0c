//! Coupon Records

use folio::CouponTerms;
use jiff::Timestamp;

use crate::uuids::TypedUuid;

/// Coupon UUID
pub type CouponUuid = TypedUuid<CouponRecord>;

/// Coupon Record
#[derive(Debug, Clone)]
pub struct CouponRecord {
    pub uuid: CouponUuid,
    pub code: String,
    pub name: String,
    pub terms: CouponTerms,
    pub created_at: Timestamp,
}
