//! Input Validation
//!
//! Turns caller-supplied items into core line items. Carts and orders share
//! these checks so a cart that previews cleanly also checks out cleanly.

use binary_craft::{
    items::{ItemKind, ItemSnapshot, LineItem},
    money::{AmountError, Currency, to_minor_units},
    pricing::PriceSummary,
};
use rust_decimal::Decimal;
use thiserror::Error;

/// Largest amount a single persisted money column can hold.
const MAX_STORED_AMOUNT: u64 = i64::MAX.unsigned_abs();

/// Rejected caller input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("at least one item is required")]
    EmptyItems,

    #[error("item {index} has a blank reference")]
    BlankReference { index: usize },

    #[error("item {index} has a blank title")]
    BlankTitle { index: usize },

    #[error("item {index} has quantity {quantity}, expected at least 1")]
    QuantityOutOfRange { index: usize, quantity: i64 },

    #[error("item {index} has an invalid unit price")]
    InvalidPrice {
        index: usize,
        #[source]
        source: AmountError,
    },

    #[error("order amounts are out of range")]
    AmountOutOfRange,

    #[error("no status or payment status was given")]
    EmptyUpdate,

    #[error("page must be at least 1")]
    PageOutOfRange,

    #[error("limit must be between 1 and {max}")]
    LimitOutOfRange { max: u32 },
}

/// A catalog item as submitted by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    /// Opaque catalog identifier.
    pub reference: String,

    /// Product or service.
    pub kind: ItemKind,

    /// Display name.
    pub title: String,

    /// Unit price in major units of the configured currency.
    pub unit_price: Decimal,

    /// Optional display image.
    pub image: Option<String>,
}

impl NewItem {
    /// Validate the item and capture it as a snapshot.
    ///
    /// `index` is the item's position in the submitted list and is reported
    /// back in errors.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the first problem found.
    pub fn into_snapshot(
        self,
        index: usize,
        currency: &Currency,
    ) -> Result<ItemSnapshot, ValidationError> {
        let reference = self.reference.trim();
        if reference.is_empty() {
            return Err(ValidationError::BlankReference { index });
        }

        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::BlankTitle { index });
        }

        let unit_price = to_minor_units(self.unit_price, currency)
            .map_err(|source| ValidationError::InvalidPrice { index, source })?;

        let snapshot = ItemSnapshot::new(reference, self.kind, title, unit_price);

        Ok(match self.image.as_deref().map(str::trim) {
            Some(image) if !image.is_empty() => snapshot.with_image(image),
            Some(_) | None => snapshot,
        })
    }

    /// Validate the item together with a requested quantity.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the item is malformed or the quantity
    /// is not in `1..=u32::MAX`.
    pub fn into_line_item(
        self,
        index: usize,
        quantity: i64,
        currency: &Currency,
    ) -> Result<LineItem, ValidationError> {
        let checked = u32::try_from(quantity)
            .ok()
            .filter(|quantity| *quantity >= 1)
            .ok_or(ValidationError::QuantityOutOfRange { index, quantity })?;

        Ok(self.into_snapshot(index, currency)?.into_line_item(checked))
    }
}

/// Ensure every priced amount fits the storage columns.
///
/// # Errors
///
/// Returns [`ValidationError::AmountOutOfRange`] if any amount is too large.
pub fn ensure_storable(summary: &PriceSummary, items: &[LineItem]) -> Result<(), ValidationError> {
    let amounts = [summary.subtotal, summary.discount, summary.total]
        .into_iter()
        .chain(items.iter().map(|item| item.unit_price));

    for amount in amounts {
        if amount > MAX_STORED_AMOUNT {
            return Err(ValidationError::AmountOutOfRange);
        }
    }

    Ok(())
}
