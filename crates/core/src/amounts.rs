//! Minor-unit amount arithmetic

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use thiserror::Error;

/// Errors raised by amount arithmetic.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AmountError {
    /// The result did not fit in a minor-unit amount.
    #[error("amount arithmetic overflowed")]
    Overflow,
}

/// Builds a fractional percentage from basis points (`1_000` is 10%).
#[must_use]
pub fn percentage_from_basis_points(basis_points: u32) -> Percentage {
    Percentage::from(Decimal::new(i64::from(basis_points), 4))
}

/// Applies `percent` to a minor-unit amount, rounding half away from zero.
///
/// # Errors
///
/// Returns [`AmountError::Overflow`] when the product cannot be represented.
pub fn percent_of_minor(percent: Percentage, minor: u64) -> Result<u64, AmountError> {
    let applied = percent * Decimal::from(minor);

    applied
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .ok_or(AmountError::Overflow)
}

/// Multiplies a minor-unit amount by a quantity.
///
/// # Errors
///
/// Returns [`AmountError::Overflow`] when the product does not fit in a `u64`.
pub fn checked_mul(minor: u64, quantity: u32) -> Result<u64, AmountError> {
    minor
        .checked_mul(u64::from(quantity))
        .ok_or(AmountError::Overflow)
}

/// Sums minor-unit amounts.
///
/// # Errors
///
/// Returns [`AmountError::Overflow`] when the sum does not fit in a `u64`.
pub fn checked_sum<I>(amounts: I) -> Result<u64, AmountError>
where
    I: IntoIterator<Item = u64>,
{
    amounts
        .into_iter()
        .try_fold(0_u64, |acc, amount| acc.checked_add(amount))
        .ok_or(AmountError::Overflow)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn percent_of_minor_rounds_half_away_from_zero() -> TestResult {
        // 12.5 rounds to 13
        assert_eq!(percent_of_minor(percentage_from_basis_points(1_250), 100)?, 13);
        assert_eq!(percent_of_minor(percentage_from_basis_points(1_000), 5_000)?, 500);

        Ok(())
    }

    #[test]
    fn percent_of_minor_supports_multipliers_above_one() -> TestResult {
        assert_eq!(percent_of_minor(percentage_from_basis_points(15_000), 333)?, 500);

        Ok(())
    }

    #[test]
    fn checked_mul_reports_overflow() {
        assert_eq!(checked_mul(u64::MAX, 2), Err(AmountError::Overflow));
    }

    #[test]
    fn checked_sum_adds_every_amount() -> TestResult {
        assert_eq!(checked_sum([100, 250, 5])?, 355);
        assert_eq!(checked_sum([u64::MAX, 1]), Err(AmountError::Overflow));

        Ok(())
    }
}
