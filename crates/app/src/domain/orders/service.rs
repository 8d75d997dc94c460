//! Orders service.

use std::sync::Arc;

use async_trait::async_trait;
use binary_craft::{items::LineItem, pricing::price};
use mockall::automock;
use sqlx::PgPool;
use tracing::{debug, info, warn};

use crate::{
    auth::Principal,
    domain::{
        carts::{CartsRepository, PgCartsRepository},
        orders::{
            data::{MAX_PAGE_LIMIT, NewOrder, OrderFilter, PendingOrder, StatusGuard, StatusUpdate},
            errors::OrdersServiceError,
            records::{OrderPage, OrderRecord, OrderUuid},
            repository::{OrdersRepository, PgOrdersRepository},
        },
        validation::{ValidationError, ensure_storable},
    },
    notifications::{OrderConfirmation, OrderNotifier},
    settings::CommerceSettings,
};

/// Times a guarded status write is re-checked after losing a race.
const STATUS_UPDATE_ATTEMPTS: usize = 3;

#[derive(Clone)]
pub struct PgOrdersService {
    repository: Arc<dyn OrdersRepository>,
    carts: Arc<dyn CartsRepository>,
    notifier: Arc<dyn OrderNotifier>,
    settings: CommerceSettings,
}

impl std::fmt::Debug for PgOrdersService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgOrdersService")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl PgOrdersService {
    #[must_use]
    pub fn new(pool: PgPool, notifier: Arc<dyn OrderNotifier>, settings: CommerceSettings) -> Self {
        Self::with_repositories(
            Arc::new(PgOrdersRepository::new(pool.clone())),
            Arc::new(PgCartsRepository::new(pool)),
            notifier,
            settings,
        )
    }

    #[must_use]
    pub fn with_repositories(
        repository: Arc<dyn OrdersRepository>,
        carts: Arc<dyn CartsRepository>,
        notifier: Arc<dyn OrderNotifier>,
        settings: CommerceSettings,
    ) -> Self {
        Self {
            repository,
            carts,
            notifier,
            settings,
        }
    }

    fn check_transition(&self, order: &OrderRecord, update: StatusUpdate) -> Result<(), OrdersServiceError> {
        let policy = self.settings.transition_policy;

        if let Some(to) = update.status
            && !policy.allows_status(order.status, to)
        {
            return Err(OrdersServiceError::InvalidTransition {
                field: "status",
                from: order.status.as_str(),
                to: to.as_str(),
            });
        }

        if let Some(to) = update.payment_status
            && !policy.allows_payment(order.payment_status, to)
        {
            return Err(OrdersServiceError::InvalidTransition {
                field: "payment status",
                from: order.payment_status.as_str(),
                to: to.as_str(),
            });
        }

        Ok(())
    }

    /// Side effects after an order is placed. Failures are logged, never returned.
    async fn after_order_placed(&self, order: &OrderRecord) {
        if let Err(error) = self.carts.clear_cart(order.user).await {
            warn!(order_uuid = %order.uuid, user_uuid = %order.user, %error, "failed to clear cart after order");
        }

        let confirmation = match OrderConfirmation::for_order(order, self.settings.currency) {
            Ok(confirmation) => confirmation,
            Err(error) => {
                warn!(order_uuid = %order.uuid, %error, "failed to build order confirmation");
                return;
            }
        };

        if let Err(error) = self.notifier.notify_order_created(&confirmation).await {
            warn!(order_uuid = %order.uuid, %error, "failed to send order confirmation");
        }
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    async fn create_order(
        &self,
        principal: Principal,
        order: NewOrder,
    ) -> Result<OrderRecord, OrdersServiceError> {
        if order.items.is_empty() {
            return Err(ValidationError::EmptyItems.into());
        }

        let items = order
            .items
            .into_iter()
            .enumerate()
            .map(|(index, line)| line.item.into_line_item(index, line.quantity, self.settings.currency))
            .collect::<Result<Vec<LineItem>, ValidationError>>()?;

        let summary = price(&items, order.promo_code.as_deref(), &self.settings.promo_codes)?;

        ensure_storable(&summary, &items)?;

        let created = self
            .repository
            .create_order(PendingOrder {
                uuid: OrderUuid::new(),
                user: principal.user,
                items,
                summary,
                payment_method: order.payment_method,
                shipping_address: order.shipping_address,
                notes: order.notes,
            })
            .await?;

        info!(
            order_uuid = %created.uuid,
            user_uuid = %created.user,
            total_amount = created.total_amount,
            "order placed"
        );

        self.after_order_placed(&created).await;

        Ok(created)
    }

    async fn get_order(
        &self,
        principal: Principal,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let found = self
            .settings
            .read_retry
            .run("find_order", || self.repository.find_order(order))
            .await?
            .ok_or(OrdersServiceError::NotFound)?;

        if found.user != principal.user && !principal.is_admin() {
            return Err(OrdersServiceError::Forbidden);
        }

        Ok(found)
    }

    async fn list_own_orders(
        &self,
        principal: Principal,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        Ok(self
            .settings
            .read_retry
            .run("list_orders_by_user", || {
                self.repository.list_orders_by_user(principal.user)
            })
            .await?)
    }

    async fn list_orders(
        &self,
        principal: Principal,
        filter: OrderFilter,
    ) -> Result<OrderPage, OrdersServiceError> {
        if !principal.is_admin() {
            return Err(OrdersServiceError::Forbidden);
        }

        if filter.page < 1 {
            return Err(ValidationError::PageOutOfRange.into());
        }

        if !(1..=MAX_PAGE_LIMIT).contains(&filter.limit) {
            return Err(ValidationError::LimitOutOfRange { max: MAX_PAGE_LIMIT }.into());
        }

        let orders = self
            .settings
            .read_retry
            .run("list_orders", || {
                self.repository
                    .list_orders(filter.status, filter.limit, filter.offset())
            })
            .await?;

        let total = self
            .settings
            .read_retry
            .run("count_orders", || self.repository.count_orders(filter.status))
            .await?;

        Ok(OrderPage { orders, total })
    }

    async fn update_status(
        &self,
        principal: Principal,
        order: OrderUuid,
        update: StatusUpdate,
    ) -> Result<OrderRecord, OrdersServiceError> {
        if !principal.is_admin() {
            return Err(OrdersServiceError::Forbidden);
        }

        if update.is_empty() {
            return Err(ValidationError::EmptyUpdate.into());
        }

        let guarded = self.settings.transition_policy.depends_on_current_state();

        for _ in 0..STATUS_UPDATE_ATTEMPTS {
            let current = self
                .repository
                .find_order(order)
                .await?
                .ok_or(OrdersServiceError::NotFound)?;

            self.check_transition(&current, update)?;

            let guard = guarded.then_some(StatusGuard {
                status: current.status,
                payment_status: current.payment_status,
            });

            let Some(updated) = self
                .repository
                .update_status(order, guard, update.status, update.payment_status)
                .await?
            else {
                if guard.is_none() {
                    return Err(OrdersServiceError::NotFound);
                }

                debug!(order_uuid = %order, "order status changed concurrently, re-checking");
                continue;
            };

            info!(
                order_uuid = %updated.uuid,
                admin_uuid = %principal.user,
                status = %updated.status,
                payment_status = %updated.payment_status,
                "order status updated"
            );

            return Ok(updated);
        }

        Err(OrdersServiceError::Conflict)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Validate, price, and persist a new order for the caller.
    async fn create_order(
        &self,
        principal: Principal,
        order: NewOrder,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Retrieve one order. Customers may only read their own.
    async fn get_order(
        &self,
        principal: Principal,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// The caller's orders, newest first.
    async fn list_own_orders(
        &self,
        principal: Principal,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError>;

    /// One page of all orders. Admin only.
    async fn list_orders(
        &self,
        principal: Principal,
        filter: OrderFilter,
    ) -> Result<OrderPage, OrdersServiceError>;

    /// Change an order's status and/or payment status. Admin only.
    async fn update_status(
        &self,
        principal: Principal,
        order: OrderUuid,
        update: StatusUpdate,
    ) -> Result<OrderRecord, OrdersServiceError>;
}
