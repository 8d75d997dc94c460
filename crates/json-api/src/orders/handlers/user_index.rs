//! User Order Index Handler

use std::sync::Arc;

use salvo::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    extensions::*,
    orders::{errors::into_status_error, models::OrderResponse},
    state::State,
};

/// User Orders Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UserOrdersResponse {
    /// The caller's orders, newest first
    pub orders: Vec<OrderResponse>,
}

/// User Order Index Handler
///
/// Returns every order the caller has placed.
#[endpoint(
    tags("orders"),
    summary = "List My Orders",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<UserOrdersResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let orders = state
        .app
        .orders
        .list_own_orders(principal)
        .await
        .map_err(into_status_error)?;

    Ok(Json(UserOrdersResponse {
        orders: OrderResponse::from_records(orders, state.app.settings.currency)?,
    }))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use binary_craft_app::domain::orders::{
        MockOrdersService, OrdersServiceError, records::OrderUuid,
    };

    use crate::test_helpers::{CUSTOMER, TEST_USER_UUID, make_order, orders_service};

    use super::*;

    fn make_service(orders: MockOrdersService) -> Service {
        orders_service(
            orders,
            CUSTOMER,
            Router::with_path("users/orders").get(handler),
        )
    }

    #[tokio::test]
    async fn test_user_index_returns_own_orders() -> TestResult {
        let mut orders = MockOrdersService::new();
        let newest = OrderUuid::new();
        let oldest = OrderUuid::new();

        orders
            .expect_list_own_orders()
            .once()
            .withf(|principal| *principal == CUSTOMER)
            .return_once(move |_| {
                Ok(vec![
                    make_order(newest, TEST_USER_UUID),
                    make_order(oldest, TEST_USER_UUID),
                ])
            });

        let mut res = TestClient::get("http://example.com/users/orders")
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body: UserOrdersResponse = res.take_json().await?;
        let uuids: Vec<_> = body.orders.iter().map(|order| order.uuid).collect();

        assert_eq!(uuids, vec![newest.into_uuid(), oldest.into_uuid()]);

        Ok(())
    }

    #[tokio::test]
    async fn test_user_index_with_no_orders_returns_empty_list() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_list_own_orders()
            .once()
            .return_once(|_| Ok(Vec::new()));

        let mut res = TestClient::get("http://example.com/users/orders")
            .send(&make_service(orders))
            .await;

        let body: UserOrdersResponse = res.take_json().await?;

        assert!(body.orders.is_empty(), "expected no orders");

        Ok(())
    }

    #[tokio::test]
    async fn test_user_index_unavailable_returns_503() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_list_own_orders()
            .once()
            .return_once(|_| Err(OrdersServiceError::Unavailable));

        let res = TestClient::get("http://example.com/users/orders")
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::SERVICE_UNAVAILABLE));

        Ok(())
    }
}
