//! Totals

use serde::{Deserialize, Serialize};

use crate::amounts::{self, AmountError, percentage_from_basis_points};

/// A flat tax rate in basis points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate {
    basis_points: u16,
}

impl TaxRate {
    /// No tax.
    pub const ZERO: Self = Self { basis_points: 0 };

    /// Creates a rate from basis points (`825` is 8.25%).
    #[must_use]
    pub const fn from_basis_points(basis_points: u16) -> Self {
        Self { basis_points }
    }

    /// Rate in basis points.
    #[must_use]
    pub const fn basis_points(self) -> u16 {
        self.basis_points
    }
}

/// Subtotal, discount, tax and total of a cart or order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Sum of line subtotals.
    pub subtotal: u64,
    /// Coupon discount.
    pub discount: u64,
    /// Tax on the discounted subtotal.
    pub tax: u64,
    /// `subtotal - discount + tax`.
    pub total: u64,
}

impl Totals {
    /// Computes totals. The discount is clamped to the subtotal and tax is
    /// charged on the discounted amount.
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::Overflow`] when tax or total overflow.
    pub fn compute(subtotal: u64, discount: u64, tax_rate: TaxRate) -> Result<Self, AmountError> {
        let discount = discount.min(subtotal);
        let taxable = subtotal - discount;

        let tax = amounts::percent_of_minor(
            percentage_from_basis_points(u32::from(tax_rate.basis_points)),
            taxable,
        )?;

        let total = taxable.checked_add(tax).ok_or(AmountError::Overflow)?;

        Ok(Self {
            subtotal,
            discount,
            tax,
            total,
        })
    }
}
