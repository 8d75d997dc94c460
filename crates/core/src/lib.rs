//! Binary Craft
//!
//! Cart and order domain for the Binary Craft storefront: line items, the
//! client-held cart store, the pricing engine with promo code rules, money
//! conversion, and the order status state machine.

pub mod cart;
pub mod discounts;
pub mod items;
pub mod money;
pub mod orders;
pub mod pricing;
pub mod promo_codes;
