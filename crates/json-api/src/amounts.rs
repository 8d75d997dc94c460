//! Amounts and item kinds at the HTTP boundary.
//!
//! Amounts travel as decimal strings in major units, e.g. `"12.50"`.

use std::str::FromStr;

use rust_decimal::Decimal;
use salvo::prelude::StatusError;

use binary_craft::{
    items::ItemKind,
    money::{Currency, to_major_units},
};

use crate::extensions::*;

/// Render minor units as a major-unit decimal string.
pub(crate) fn format_amount(minor: u64, currency: &Currency) -> Result<String, StatusError> {
    to_major_units(minor, currency)
        .map(|amount| amount.to_string())
        .or_500("failed to format amount")
}

/// Parse a major-unit decimal string.
pub(crate) fn parse_amount(value: &str, field: &str) -> Result<Decimal, StatusError> {
    Decimal::from_str(value.trim()).or_400(format!("{field} must be a decimal amount"))
}

/// Parse `product` or `service`.
pub(crate) fn parse_kind(value: &str, field: &str) -> Result<ItemKind, StatusError> {
    ItemKind::from_str(value.trim()).or_400(format!("{field} must be \"product\" or \"service\""))
}

#[cfg(test)]
mod tests {
    use binary_craft::money::currency;
    use salvo::http::StatusCode;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn test_format_amount_uses_currency_exponent() -> TestResult {
        let usd = currency("USD")?;

        assert_eq!(format_amount(1_250, usd)?, "12.50");
        assert_eq!(format_amount(0, usd)?, "0.00");
        assert_eq!(format_amount(1_250, currency("JPY")?)?, "1250");

        Ok(())
    }

    #[test]
    fn test_parse_amount_rejects_garbage() -> TestResult {
        assert_eq!(parse_amount(" 12.5 ", "price")?, Decimal::new(125, 1));

        let result = parse_amount("twelve", "price");

        assert!(
            result.is_err_and(|error| error.code == StatusCode::BAD_REQUEST),
            "expected 400"
        );

        Ok(())
    }

    #[test]
    fn test_parse_kind() -> TestResult {
        assert_eq!(parse_kind("service", "kind")?, ItemKind::Service);
        assert!(parse_kind("gift", "kind").is_err(), "unknown kind accepted");

        Ok(())
    }
}
