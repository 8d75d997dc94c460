//! Order Records

use binary_craft::{
    items::LineItem,
    orders::{OrderStatus, PaymentStatus},
};
use jiff::Timestamp;

use crate::{domain::users::records::UserUuid, uuids::TypedUuid};

/// Order UUID
pub type OrderUuid = TypedUuid<OrderRecord>;

/// Where an order is shipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShippingAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

/// A placed order.
///
/// Items and amounts are frozen at creation; only the two status fields and
/// `updated_at` change afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    pub uuid: OrderUuid,

    /// The customer who placed the order.
    pub user: UserUuid,

    /// Line items in submission order.
    pub items: Vec<LineItem>,

    /// Sum of line totals, in minor units.
    pub subtotal: u64,

    /// Promo code discount, in minor units.
    pub discount: u64,

    /// Amount charged, in minor units.
    pub total_amount: u64,

    /// The promo code that was applied, if any.
    pub promo_code: Option<String>,

    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: String,
    pub shipping_address: ShippingAddress,
    pub notes: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl OrderRecord {
    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}

/// One page of an admin order listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPage {
    /// Orders on this page, newest first.
    pub orders: Vec<OrderRecord>,

    /// Number of orders matching the filter across all pages.
    pub total: u64,
}
