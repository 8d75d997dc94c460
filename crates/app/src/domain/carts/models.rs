//! Cart Models

use binary_craft::{
    cart::Cart,
    items::LineItem,
    pricing::{PriceSummary, PricingError, price},
    promo_codes::PromoCodes,
};

pub use crate::domain::validation::NewItem as NewCartItem;

/// A user's cart priced for display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartView {
    /// Lines in insertion order.
    pub items: Vec<LineItem>,

    /// Total units across all lines.
    pub item_count: u64,

    /// Subtotal, discount, and total for the requested promo code.
    pub summary: PriceSummary,
}

impl CartView {
    /// Price `cart` with an optional promo code.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be priced.
    pub fn priced(
        cart: Cart,
        promo_code: Option<&str>,
        promo_codes: &PromoCodes,
    ) -> Result<Self, PricingError> {
        let summary = price(cart.items(), promo_code, promo_codes)?;
        let item_count = cart.item_count();

        Ok(Self {
            items: cart.into_items(),
            item_count,
            summary,
        })
    }
}
