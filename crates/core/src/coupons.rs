//! Coupons

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::amounts::{self, AmountError, percentage_from_basis_points};

/// Reasons a coupon cannot be applied.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CouponError {
    /// The code is unknown or the coupon is inactive.
    #[error("coupon not found")]
    NotFound,

    /// The current time is outside the validity window.
    #[error("coupon has expired or is not yet valid")]
    Expired,

    /// The subtotal does not reach the coupon minimum.
    #[error("subtotal is below the coupon minimum of {minimum}")]
    BelowMinimum {
        /// Minimum subtotal in minor units.
        minimum: u64,
    },

    /// The usage limit has been reached.
    #[error("coupon usage limit reached")]
    Exhausted,

    /// Discount arithmetic failed.
    #[error(transparent)]
    Amount(#[from] AmountError),
}

/// What a coupon takes off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CouponKind {
    /// A fixed amount in minor units.
    Fixed {
        /// Amount off.
        amount: u64,
    },
    /// A share of the subtotal, in basis points (`1_000` is 10%).
    Percentage {
        /// Basis points off.
        basis_points: u16,
    },
}

impl CouponKind {
    /// Storage name of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fixed { .. } => "fixed",
            Self::Percentage { .. } => "percentage",
        }
    }
}

/// The terms of a stored coupon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponTerms {
    /// Discount kind and value.
    pub kind: CouponKind,
    /// Minimum subtotal required.
    pub minimum_amount: Option<u64>,
    /// Cap on the discount.
    pub maximum_discount: Option<u64>,
    /// Start of validity, inclusive.
    pub valid_from: Timestamp,
    /// End of validity, inclusive.
    pub valid_to: Timestamp,
    /// Maximum number of redemptions.
    pub usage_limit: Option<u32>,
    /// Redemptions so far.
    pub used_count: u32,
    /// Whether the coupon is enabled.
    pub is_active: bool,
}

impl CouponTerms {
    /// Checks applicability at `now` and computes the discount on `subtotal`.
    ///
    /// Checks run in order: active, validity window, minimum, usage limit.
    ///
    /// # Errors
    ///
    /// Returns the first [`CouponError`] that applies.
    pub fn apply(&self, subtotal: u64, now: Timestamp) -> Result<u64, CouponError> {
        if !self.is_active {
            return Err(CouponError::NotFound);
        }

        if now < self.valid_from || now > self.valid_to {
            return Err(CouponError::Expired);
        }

        if let Some(minimum) = self.minimum_amount
            && subtotal < minimum
        {
            return Err(CouponError::BelowMinimum { minimum });
        }

        if self.is_exhausted() {
            return Err(CouponError::Exhausted);
        }

        self.discount_on(subtotal)
    }

    /// Whether the usage limit has been reached.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.usage_limit
            .is_some_and(|limit| self.used_count >= limit)
    }

    /// Discount on `subtotal`, capped at `maximum_discount` and never above `subtotal`.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::Amount`] when percentage arithmetic overflows.
    pub fn discount_on(&self, subtotal: u64) -> Result<u64, CouponError> {
        let raw = match self.kind {
            CouponKind::Fixed { amount } => amount,
            CouponKind::Percentage { basis_points } => amounts::percent_of_minor(
                percentage_from_basis_points(u32::from(basis_points)),
                subtotal,
            )?,
        };

        let capped = self
            .maximum_discount
            .map_or(raw, |maximum| raw.min(maximum));

        Ok(capped.min(subtotal))
    }
}
