//! Pricing
//!
//! Computes the subtotal, discount, and total of a list of line items with an
//! optional promo code. Both the cart store and the order writer price with
//! this module so the client preview and the persisted order agree.

use serde::Serialize;
use thiserror::Error;

use crate::{
    discounts::DiscountError,
    items::LineItem,
    promo_codes::{PromoCodes, normalise_code},
};

/// Errors that can occur while pricing line items.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// The subtotal does not fit in the minor unit range.
    #[error("subtotal overflowed")]
    Overflow,

    /// The discount rule could not be applied.
    #[error(transparent)]
    Discount(#[from] DiscountError),
}

/// Priced view of a set of line items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PriceSummary {
    /// Sum of `unit_price × quantity` over all lines.
    pub subtotal: u64,

    /// Amount taken off by the applied promo code, at most `subtotal`.
    pub discount: u64,

    /// `subtotal - discount`.
    pub total: u64,

    /// The normalised promo code, present only when it matched a rule.
    pub promo_code: Option<String>,
}

/// Sum of line totals in minor units.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if any line or the running sum overflows.
pub fn subtotal(items: &[LineItem]) -> Result<u64, PricingError> {
    items.iter().try_fold(0_u64, |sum, item| {
        item.line_total()
            .and_then(|line| sum.checked_add(line))
            .ok_or(PricingError::Overflow)
    })
}

/// Price `items`, applying `promo_code` if it is known in `codes`.
///
/// Unknown and blank codes leave the discount at zero; they are not an error.
///
/// # Errors
///
/// Returns an error if the subtotal overflows or the rule cannot be applied.
pub fn price(
    items: &[LineItem],
    promo_code: Option<&str>,
    codes: &PromoCodes,
) -> Result<PriceSummary, PricingError> {
    let subtotal = subtotal(items)?;

    let matched = promo_code.and_then(|code| {
        codes
            .lookup(code)
            .map(|rule| (normalise_code(code), rule))
    });

    let (discount, promo_code) = match matched {
        Some((code, rule)) => (rule.discount_on(subtotal)?, code),
        None => (0, None),
    };

    Ok(PriceSummary {
        subtotal,
        discount,
        total: subtotal.saturating_sub(discount),
        promo_code,
    })
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::items::{ItemKind, ItemSnapshot};

    use super::*;

    fn line(reference: &str, unit_price: u64, quantity: u32) -> LineItem {
        ItemSnapshot::new(reference, ItemKind::Product, reference, unit_price).into_line_item(quantity)
    }

    #[test]
    fn empty_items_price_to_zero() -> TestResult {
        let summary = price(&[], Some("BINARY10"), &PromoCodes::reference())?;

        assert_eq!(summary.subtotal, 0);
        assert_eq!(summary.discount, 0);
        assert_eq!(summary.total, 0);

        Ok(())
    }

    #[test]
    fn reference_code_takes_ten_percent() -> TestResult {
        let items = [line("p1", 100_00, 2), line("s1", 50_00, 1)];
        let summary = price(&items, Some("BINARY10"), &PromoCodes::reference())?;

        assert_eq!(summary.subtotal, 250_00);
        assert_eq!(summary.discount, 25_00);
        assert_eq!(summary.total, 225_00);
        assert_eq!(summary.promo_code.as_deref(), Some("BINARY10"));

        Ok(())
    }

    #[test]
    fn codes_are_trimmed_and_case_insensitive() -> TestResult {
        let items = [line("p1", 100_00, 1)];
        let summary = price(&items, Some("  binary10 "), &PromoCodes::reference())?;

        assert_eq!(summary.discount, 10_00);
        assert_eq!(summary.promo_code.as_deref(), Some("BINARY10"));

        Ok(())
    }

    #[test]
    fn unknown_code_gives_no_discount() -> TestResult {
        let items = [line("p1", 100_00, 1)];
        let summary = price(&items, Some("INVALID"), &PromoCodes::reference())?;

        assert_eq!(summary.discount, 0);
        assert_eq!(summary.total, 100_00);
        assert_eq!(summary.promo_code, None);

        Ok(())
    }

    #[test]
    fn discount_rounds_half_away_from_zero() -> TestResult {
        let items = [line("p1", 5, 1)];
        let summary = price(&items, Some("BINARY10"), &PromoCodes::reference())?;

        assert_eq!(summary.discount, 1);
        assert_eq!(summary.total, 4);

        Ok(())
    }

    #[test]
    fn subtotal_overflow_is_reported() {
        let items = [line("p1", u64::MAX, 1), line("p2", 1, 1)];
        let result = price(&items, None, &PromoCodes::reference());

        assert_eq!(result, Err(PricingError::Overflow));
    }
}
