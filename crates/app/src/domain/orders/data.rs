//! Order Data

use binary_craft::{
    items::LineItem,
    orders::{OrderStatus, PaymentStatus},
    pricing::PriceSummary,
};

use crate::domain::{
    orders::records::{OrderUuid, ShippingAddress},
    users::records::UserUuid,
    validation::NewItem,
};

/// Default number of orders per admin listing page.
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Largest number of orders per admin listing page.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// One requested order line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub item: NewItem,

    /// Requested units; must be at least one.
    pub quantity: i64,
}

/// An order as submitted by a customer.
///
/// There is no total here: the server prices the items itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub items: Vec<NewOrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    pub notes: String,
    pub promo_code: Option<String>,
}

/// Validated, priced order ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOrder {
    pub uuid: OrderUuid,
    pub user: UserUuid,
    pub items: Vec<LineItem>,
    pub summary: PriceSummary,
    pub payment_method: String,
    pub shipping_address: ShippingAddress,
    pub notes: String,
}

/// Requested status change. At least one field must be set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
}

impl StatusUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.status.is_none() && self.payment_status.is_none()
    }
}

/// The statuses an order must still have for a status write to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusGuard {
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
}

/// Admin order listing filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderFilter {
    /// Only orders with this fulfilment status.
    pub status: Option<OrderStatus>,

    /// One-based page number.
    pub page: u32,

    /// Orders per page.
    pub limit: u32,
}

impl Default for OrderFilter {
    fn default() -> Self {
        Self {
            status: None,
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl OrderFilter {
    /// Number of orders skipped before this page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}
