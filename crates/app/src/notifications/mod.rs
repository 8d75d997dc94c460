//! Order Notifications
//!
//! Sending a confirmation is best-effort: callers log a failed notification
//! and carry on, the order is already placed.

use std::time::Duration;

use async_trait::async_trait;
use binary_craft::money::{AmountError, Currency, display, to_major_units};
use jiff::Timestamp;
use mockall::automock;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::domain::orders::records::OrderRecord;

/// Time allowed for a webhook delivery.
pub const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Details of a newly placed order, sent to the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub order_uuid: Uuid,
    pub user_uuid: Uuid,
    pub item_count: u64,
    pub total: Decimal,
    pub display_total: String,
    pub currency: &'static str,
    pub created_at: Timestamp,
}

impl OrderConfirmation {
    /// Build the confirmation for a persisted order.
    ///
    /// # Errors
    ///
    /// Returns an error if the order total cannot be expressed in `currency`.
    pub fn for_order(order: &OrderRecord, currency: &'static Currency) -> Result<Self, AmountError> {
        Ok(Self {
            order_uuid: order.uuid.into_uuid(),
            user_uuid: order.user.into_uuid(),
            item_count: order.item_count(),
            total: to_major_units(order.total_amount, currency)?,
            display_total: display(order.total_amount, currency)?,
            currency: currency.iso_alpha_code,
            created_at: order.created_at,
        })
    }
}

/// Errors that can occur while delivering a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The HTTP request failed or returned a non-success status.
    #[error("notification delivery failed")]
    Http(#[from] reqwest::Error),
}

#[automock]
#[async_trait]
pub trait OrderNotifier: Send + Sync {
    /// Tell the customer their order was placed.
    async fn notify_order_created(&self, confirmation: &OrderConfirmation)
    -> Result<(), NotifyError>;
}

/// Writes confirmations to the log instead of delivering them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl OrderNotifier for LogNotifier {
    async fn notify_order_created(
        &self,
        confirmation: &OrderConfirmation,
    ) -> Result<(), NotifyError> {
        info!(
            order_uuid = %confirmation.order_uuid,
            user_uuid = %confirmation.user_uuid,
            item_count = confirmation.item_count,
            total = %confirmation.display_total,
            "order confirmation"
        );

        Ok(())
    }
}

/// Posts confirmations as JSON to a webhook.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    url: String,
    http: Client,
}

impl WebhookNotifier {
    /// Create a notifier for the given webhook URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>) -> Result<Self, NotifyError> {
        let http = Client::builder().timeout(WEBHOOK_TIMEOUT).build()?;

        Ok(Self {
            url: url.into(),
            http,
        })
    }
}

#[async_trait]
impl OrderNotifier for WebhookNotifier {
    async fn notify_order_created(
        &self,
        confirmation: &OrderConfirmation,
    ) -> Result<(), NotifyError> {
        self.http
            .post(&self.url)
            .json(confirmation)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use binary_craft::{
        items::{ItemKind, ItemSnapshot},
        orders::{OrderStatus, PaymentStatus},
    };
    use testresult::TestResult;

    use crate::domain::{
        orders::records::{OrderUuid, ShippingAddress},
        users::records::UserUuid,
    };

    use super::*;

    fn order(total_amount: u64) -> OrderRecord {
        OrderRecord {
            uuid: OrderUuid::new(),
            user: UserUuid::new(),
            items: vec![
                ItemSnapshot::new("a", ItemKind::Product, "A", 100).into_line_item(2),
                ItemSnapshot::new("b", ItemKind::Service, "B", 50).into_line_item(1),
            ],
            subtotal: total_amount,
            discount: 0,
            total_amount,
            promo_code: None,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            payment_method: "card".to_string(),
            shipping_address: ShippingAddress::default(),
            notes: String::new(),
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    #[test]
    fn confirmation_counts_units_and_formats_total() -> TestResult {
        let confirmation = OrderConfirmation::for_order(&order(250), rusty_money::iso::USD)?;

        assert_eq!(confirmation.item_count, 3);
        assert_eq!(confirmation.total, Decimal::new(250, 2));
        assert_eq!(confirmation.currency, "USD");

        Ok(())
    }

    #[test]
    fn confirmation_serializes_camel_case() -> TestResult {
        let confirmation = OrderConfirmation::for_order(&order(250), rusty_money::iso::USD)?;
        let json = serde_json::to_value(&confirmation)?;

        assert_eq!(json["itemCount"], 3);
        assert_eq!(json["total"], "2.50");
        assert!(json.get("orderUuid").is_some());

        Ok(())
    }

    #[tokio::test]
    async fn log_notifier_always_succeeds() -> TestResult {
        let confirmation = OrderConfirmation::for_order(&order(0), rusty_money::iso::USD)?;

        LogNotifier.notify_order_created(&confirmation).await?;

        Ok(())
    }
}
