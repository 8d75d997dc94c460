//! Promo Codes
//!
//! A table of promo codes and the discount rule each one grants. Codes are
//! matched after trimming surrounding whitespace and ignoring case.

use std::{fs, path::Path};

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    discounts::{DiscountError, DiscountRule},
    money::{AmountError, Currency, to_minor_units},
};

/// The promo code every deployment knows about: 10% off the subtotal.
pub const REFERENCE_PROMO_CODE: &str = "BINARY10";

/// Promo code table loading errors
#[derive(Debug, Error)]
pub enum PromoCodesError {
    /// IO error reading the promo code file
    #[error("failed to read promo code file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// A code was empty after trimming
    #[error("promo codes must not be blank")]
    BlankCode,

    /// A percent-off rule was out of range
    #[error("invalid percentage for {code}: {source}")]
    InvalidPercentage {
        /// Offending code
        code: String,

        /// Underlying error
        source: DiscountError,
    },

    /// An amount-off rule was not a valid amount
    #[error("invalid amount for {code}: {source}")]
    InvalidAmount {
        /// Offending code
        code: String,

        /// Underlying error
        source: AmountError,
    },
}

/// Wrapper for promo codes in YAML
#[derive(Debug, Deserialize)]
struct PromoCodesFixture {
    codes: FxHashMap<String, PromoRuleFixture>,
}

/// A single promo rule in YAML
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum PromoRuleFixture {
    /// Percentage points off the subtotal, e.g. `10`
    PercentOff { value: Decimal },

    /// Major-unit amount off the subtotal, e.g. `"5.00"`
    AmountOff { value: Decimal },
}

/// Normalise a user-supplied code for lookup.
///
/// Returns `None` for a code that is blank after trimming.
pub fn normalise_code(code: &str) -> Option<String> {
    let trimmed = code.trim();

    (!trimmed.is_empty()).then(|| trimmed.to_uppercase())
}

/// Known promo codes and the rule each grants.
#[derive(Debug, Clone, Default)]
pub struct PromoCodes {
    rules: FxHashMap<String, DiscountRule>,
}

impl PromoCodes {
    /// An empty table; every code is unknown.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The reference table containing only [`REFERENCE_PROMO_CODE`].
    pub fn reference() -> Self {
        let mut codes = Self::empty();

        codes.rules.insert(
            REFERENCE_PROMO_CODE.to_string(),
            DiscountRule::PercentOff(decimal_percentage::Percentage::from(Decimal::new(10, 2))),
        );

        codes
    }

    /// Add or replace a code.
    ///
    /// # Errors
    ///
    /// Returns [`PromoCodesError::BlankCode`] if the code is blank.
    pub fn insert(&mut self, code: &str, rule: DiscountRule) -> Result<(), PromoCodesError> {
        let code = normalise_code(code).ok_or(PromoCodesError::BlankCode)?;

        self.rules.insert(code, rule);

        Ok(())
    }

    /// Find the rule for a user-supplied code.
    pub fn lookup(&self, code: &str) -> Option<&DiscountRule> {
        normalise_code(code).and_then(|code| self.rules.get(&code))
    }

    /// Number of known codes.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no codes are known.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Parse a promo code table from YAML.
    ///
    /// Amount-off values are major units of `currency`.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or any rule is invalid.
    pub fn from_yaml_str(yaml: &str, currency: &Currency) -> Result<Self, PromoCodesError> {
        let fixture: PromoCodesFixture = serde_norway::from_str(yaml)?;
        let mut codes = Self::empty();

        for (code, rule) in fixture.codes {
            let rule = match rule {
                PromoRuleFixture::PercentOff { value } => DiscountRule::percent_off(value)
                    .map_err(|source| PromoCodesError::InvalidPercentage {
                        code: code.clone(),
                        source,
                    })?,
                PromoRuleFixture::AmountOff { value } => to_minor_units(value, currency)
                    .map(DiscountRule::AmountOff)
                    .map_err(|source| PromoCodesError::InvalidAmount {
                        code: code.clone(),
                        source,
                    })?,
            };

            codes.insert(&code, rule)?;
        }

        Ok(codes)
    }

    /// Load a promo code table from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>, currency: &Currency) -> Result<Self, PromoCodesError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml_str(&contents, currency)
    }
}
