//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};
use uuid::Uuid;

use binary_craft::{
    items::{ItemKind, ItemSnapshot},
    orders::{OrderStatus, PaymentStatus},
    pricing::PriceSummary,
};
use binary_craft_app::{
    auth::{MockAuthService, Principal},
    context::AppContext,
    domain::{
        carts::{MockCartsService, models::CartView},
        orders::{
            MockOrdersService,
            records::{OrderRecord, OrderUuid, ShippingAddress},
        },
        users::records::{Role, UserUuid},
    },
    settings::CommerceSettings,
};

use crate::{extensions::*, state::State};

pub(crate) const TEST_USER_UUID: UserUuid = UserUuid::from_uuid(Uuid::nil());

pub(crate) const CUSTOMER: Principal = Principal::new(TEST_USER_UUID, Role::Customer);

pub(crate) const ADMIN: Principal = Principal::new(
    UserUuid::from_uuid(Uuid::from_u128(1)),
    Role::Admin,
);

/// Stands in for the auth middleware with a fixed caller.
#[derive(Debug, Clone, Copy)]
pub(crate) struct InjectPrincipal(pub(crate) Principal);

#[salvo::handler]
impl InjectPrincipal {
    async fn handle(
        &self,
        req: &mut Request,
        depot: &mut Depot,
        res: &mut Response,
        ctrl: &mut FlowCtrl,
    ) {
        depot.insert_principal(self.0);
        ctrl.call_next(req, depot, res).await;
    }
}

fn strict_orders_mock() -> MockOrdersService {
    let mut orders = MockOrdersService::new();

    orders.expect_create_order().never();
    orders.expect_get_order().never();
    orders.expect_list_own_orders().never();
    orders.expect_list_orders().never();
    orders.expect_update_status().never();

    orders
}

fn strict_carts_mock() -> MockCartsService {
    let mut carts = MockCartsService::new();

    carts.expect_get_cart().never();
    carts.expect_add_item().never();
    carts.expect_change_quantity().never();
    carts.expect_remove_item().never();
    carts.expect_clear_cart().never();

    carts
}

fn strict_auth_mock() -> MockAuthService {
    let mut auth = MockAuthService::new();

    auth.expect_authenticate_bearer().never();

    auth
}

fn state(orders: MockOrdersService, carts: MockCartsService, auth: MockAuthService) -> Arc<State> {
    State::from_app_context(AppContext {
        orders: Arc::new(orders),
        carts: Arc::new(carts),
        auth: Arc::new(auth),
        settings: CommerceSettings::default(),
    })
}

pub(crate) fn state_with_auth(auth: MockAuthService) -> Arc<State> {
    state(strict_orders_mock(), strict_carts_mock(), auth)
}

pub(crate) fn orders_service(orders: MockOrdersService, principal: Principal, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state(orders, strict_carts_mock(), strict_auth_mock())))
            .hoop(InjectPrincipal(principal))
            .push(route),
    )
}

pub(crate) fn carts_service(carts: MockCartsService, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state(strict_orders_mock(), carts, strict_auth_mock())))
            .hoop(InjectPrincipal(CUSTOMER))
            .push(route),
    )
}

/// A two-line order owned by `user`: 2 × 12.50 keyboard and 1 × 40.00 setup.
pub(crate) fn make_order(uuid: OrderUuid, user: UserUuid) -> OrderRecord {
    OrderRecord {
        uuid,
        user,
        items: vec![
            ItemSnapshot::new("kb-1", ItemKind::Product, "Keyboard", 1_250)
                .with_image("https://cdn.example.com/kb-1.png")
                .into_line_item(2),
            ItemSnapshot::new("setup", ItemKind::Service, "Setup", 4_000).into_line_item(1),
        ],
        subtotal: 6_500,
        discount: 0,
        total_amount: 6_500,
        promo_code: None,
        status: OrderStatus::Pending,
        payment_status: PaymentStatus::Unpaid,
        payment_method: "card".to_string(),
        shipping_address: ShippingAddress {
            street: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            zip: "62701".to_string(),
            country: "US".to_string(),
        },
        notes: String::new(),
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

/// One keyboard line of `quantity` units at 100.00 each, priced with BINARY10.
pub(crate) fn make_cart_view(quantity: u32) -> CartView {
    let subtotal = 10_000 * u64::from(quantity);
    let discount = subtotal / 10;

    CartView {
        items: vec![
            ItemSnapshot::new("kb-1", ItemKind::Product, "Keyboard", 10_000)
                .into_line_item(quantity),
        ],
        item_count: u64::from(quantity),
        summary: PriceSummary {
            subtotal,
            discount,
            total: subtotal - discount,
            promo_code: Some("BINARY10".to_string()),
        },
    }
}
