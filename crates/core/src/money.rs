//! Money
//!
//! Amounts are kept as non-negative minor units internally. These helpers
//! convert between minor units and exact decimal major units of an ISO
//! currency at the boundaries.

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{Money, iso};
use thiserror::Error;

pub use rusty_money::iso::Currency;

/// Errors converting an amount into minor units.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    /// The amount was below zero.
    #[error("amount must not be negative")]
    Negative,

    /// The amount had more fractional digits than the currency allows.
    #[error("amount has more than {0} fractional digits")]
    TooPrecise(u32),

    /// The amount does not fit the minor unit range.
    #[error("amount is out of range")]
    Overflow,
}

/// Error returned for an unknown ISO currency code.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown currency code: {0}")]
pub struct UnknownCurrency(pub String);

/// Look up an ISO-4217 currency by its alphabetic code.
///
/// # Errors
///
/// Returns [`UnknownCurrency`] when the code is not in the ISO table.
pub fn currency(code: &str) -> Result<&'static Currency, UnknownCurrency> {
    iso::find(&code.trim().to_ascii_uppercase()).ok_or_else(|| UnknownCurrency(code.to_string()))
}

/// Convert a decimal major-unit amount into minor units.
///
/// # Errors
///
/// - [`AmountError::Negative`]: the amount is below zero.
/// - [`AmountError::TooPrecise`]: the amount has sub-minor-unit digits.
/// - [`AmountError::Overflow`]: the amount does not fit in `u64` minor units.
pub fn to_minor_units(amount: Decimal, currency: &Currency) -> Result<u64, AmountError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(AmountError::Negative);
    }

    let exponent = currency.exponent;
    let normalised = amount.normalize();

    if normalised.scale() > exponent {
        return Err(AmountError::TooPrecise(exponent));
    }

    let factor = 10_u64
        .checked_pow(exponent)
        .map(Decimal::from)
        .ok_or(AmountError::Overflow)?;

    normalised
        .checked_mul(factor)
        .and_then(|minor| minor.to_u64())
        .ok_or(AmountError::Overflow)
}

/// Convert minor units back into an exact decimal major-unit amount.
///
/// # Errors
///
/// Returns [`AmountError::Overflow`] when the value cannot be represented.
pub fn to_major_units(minor: u64, currency: &Currency) -> Result<Decimal, AmountError> {
    Decimal::try_from_i128_with_scale(i128::from(minor), currency.exponent)
        .map_err(|_overflow| AmountError::Overflow)
}

/// Human-readable rendering of an amount, e.g. `$225.00`.
///
/// # Errors
///
/// Returns [`AmountError::Overflow`] when the amount exceeds `i64` minor units.
pub fn display(minor: u64, currency: &'static Currency) -> Result<String, AmountError> {
    let minor = i64::try_from(minor).map_err(|_overflow| AmountError::Overflow)?;

    Ok(Money::from_minor(minor, currency).to_string())
}
