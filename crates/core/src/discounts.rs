//! Discounts

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use thiserror::Error;

/// Errors that can occur when building or applying a discount rule.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscountError {
    /// Percentage conversion failed.
    #[error("percentage conversion failed")]
    PercentConversion,

    /// Percentage points were outside `0..=100`.
    #[error("percentage must be between 0 and 100, got {0}")]
    PercentOutOfRange(Decimal),
}

/// A rule associated with a promo code.
#[derive(Debug, Clone, Copy)]
pub enum DiscountRule {
    /// Take a percentage off the subtotal, e.g. `Percentage::from(0.10)` for 10%.
    PercentOff(Percentage),

    /// Take a fixed amount in minor units off the subtotal, capped at the subtotal.
    AmountOff(u64),
}

impl DiscountRule {
    /// Build a percent-off rule from percentage points, e.g. `10` for 10%.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountError::PercentOutOfRange`] when `points` is outside `0..=100`.
    pub fn percent_off(points: Decimal) -> Result<Self, DiscountError> {
        if points < Decimal::ZERO || points > Decimal::ONE_HUNDRED {
            return Err(DiscountError::PercentOutOfRange(points));
        }

        let fraction = points
            .checked_div(Decimal::ONE_HUNDRED)
            .ok_or(DiscountError::PercentConversion)?;

        Ok(Self::PercentOff(Percentage::from(fraction)))
    }

    /// Discount in minor units this rule grants on `subtotal`.
    ///
    /// The result never exceeds the subtotal.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountError::PercentConversion`] if the percentage cannot be applied.
    pub fn discount_on(&self, subtotal: u64) -> Result<u64, DiscountError> {
        let discount = match self {
            Self::PercentOff(percent) => percent_of_minor(percent, subtotal)?,
            Self::AmountOff(amount) => *amount,
        };

        Ok(discount.min(subtotal))
    }
}

/// Calculate `percent` of a minor-unit amount, rounding half away from zero.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] on overflow or if the result
/// is not representable.
pub fn percent_of_minor(percent: &Percentage, minor: u64) -> Result<u64, DiscountError> {
    let minor = Decimal::from(minor);

    ((*percent) * Decimal::ONE) // Percentage does not expose its inner Decimal
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .ok_or(DiscountError::PercentConversion)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn percent_of_minor_calculates_correctly() -> TestResult {
        let percent = Percentage::from(0.25);
        let result = percent_of_minor(&percent, 200)?;

        assert_eq!(result, 50);

        Ok(())
    }

    #[test]
    fn percent_of_minor_rounds_half_away_from_zero() -> TestResult {
        // 10% of 0.05 is half a cent
        let percent = Percentage::from(0.1);

        assert_eq!(percent_of_minor(&percent, 5)?, 1);
        assert_eq!(percent_of_minor(&percent, 4)?, 0);

        Ok(())
    }

    #[test]
    fn percent_of_minor_overflow_returns_error() {
        let percent = Percentage::from(2.0);
        let result = percent_of_minor(&percent, u64::MAX);

        assert!(
            matches!(result, Err(DiscountError::PercentConversion)),
            "expected PercentConversion, got {result:?}"
        );
    }

    #[test]
    fn percent_off_accepts_whole_range() -> TestResult {
        assert_eq!(DiscountRule::percent_off(Decimal::ZERO)?.discount_on(100)?, 0);
        assert_eq!(DiscountRule::percent_off(Decimal::ONE_HUNDRED)?.discount_on(100)?, 100);

        Ok(())
    }

    #[test]
    fn percent_off_rejects_out_of_range_points() {
        let result = DiscountRule::percent_off(Decimal::from(101));

        assert!(
            matches!(result, Err(DiscountError::PercentOutOfRange(points)) if points == Decimal::from(101)),
            "expected PercentOutOfRange(101), got {result:?}"
        );

        let result = DiscountRule::percent_off(Decimal::NEGATIVE_ONE);

        assert!(
            matches!(result, Err(DiscountError::PercentOutOfRange(_))),
            "expected PercentOutOfRange, got {result:?}"
        );
    }

    #[test]
    fn ten_percent_off_matches_reference_totals() -> TestResult {
        let rule = DiscountRule::percent_off(Decimal::TEN)?;

        assert_eq!(rule.discount_on(250_00)?, 25_00);

        Ok(())
    }

    #[test]
    fn amount_off_is_capped_at_subtotal() -> TestResult {
        let rule = DiscountRule::AmountOff(5_00);

        assert_eq!(rule.discount_on(20_00)?, 5_00);
        assert_eq!(rule.discount_on(3_00)?, 3_00);
        assert_eq!(rule.discount_on(0)?, 0);

        Ok(())
    }
}
