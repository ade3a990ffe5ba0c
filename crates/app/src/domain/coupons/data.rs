//! Coupons Data

use folio::CouponKind;
use jiff::Timestamp;
use serde::Serialize;

use crate::domain::coupons::records::CouponUuid;

/// Longest accepted coupon code.
pub const COUPON_CODE_MAX_LEN: usize = 50;

/// Canonical form of a user-entered code.
#[must_use]
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// New Coupon Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCoupon {
    pub uuid: CouponUuid,
    pub code: String,
    pub name: String,
    pub kind: CouponKind,
    pub minimum_amount: Option<u64>,
    pub maximum_discount: Option<u64>,
    pub valid_from: Timestamp,
    pub valid_to: Timestamp,
    pub usage_limit: Option<u32>,
    pub is_active: bool,
}

/// A coupon accepted against a subtotal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedCoupon {
    pub uuid: CouponUuid,
    pub code: String,
    pub discount: u64,
}
