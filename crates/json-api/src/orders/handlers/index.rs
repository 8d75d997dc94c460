//! Order Index Handler

use std::{str::FromStr, sync::Arc};

use salvo::{oapi::extract::QueryParam, prelude::*};
use serde::{Deserialize, Serialize};

use binary_craft::orders::OrderStatus;
use binary_craft_app::domain::orders::data::{DEFAULT_PAGE_LIMIT, OrderFilter};

use crate::{
    extensions::*,
    orders::{errors::into_status_error, models::OrderResponse},
    state::State,
};

/// Order Page Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderPageResponse {
    /// Orders on this page, newest first
    pub orders: Vec<OrderResponse>,

    /// Orders matching the filter across all pages
    pub total: u64,

    /// One-based page number
    pub page: u32,

    /// Orders per page
    pub limit: u32,
}

/// Order Index Handler
///
/// Returns one page of all orders, optionally filtered by status. Admin only.
#[endpoint(
    tags("orders"),
    summary = "List All Orders",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Orders listed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller is not an admin"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Storage unavailable"),
    ),
)]
pub(crate) async fn handler(
    status: QueryParam<String, false>,
    page: QueryParam<u32, false>,
    limit: QueryParam<u32, false>,
    depot: &mut Depot,
) -> Result<Json<OrderPageResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let filter = OrderFilter {
        status: status
            .into_inner()
            .as_deref()
            .map(OrderStatus::from_str)
            .transpose()
            .map_err(|source| StatusError::bad_request().brief(source.to_string()))?,
        page: page.into_inner().unwrap_or(1),
        limit: limit.into_inner().unwrap_or(DEFAULT_PAGE_LIMIT),
    };

    let page = state
        .app
        .orders
        .list_orders(principal, filter)
        .await
        .map_err(into_status_error)?;

    Ok(Json(OrderPageResponse {
        orders: OrderResponse::from_records(page.orders, state.app.settings.currency)?,
        total: page.total,
        page: filter.page,
        limit: filter.limit,
    }))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use binary_craft_app::{
        auth::Principal,
        domain::{
            orders::{
                MockOrdersService, OrdersServiceError,
                records::{OrderPage, OrderUuid},
            },
            validation::ValidationError,
        },
    };

    use crate::test_helpers::{ADMIN, CUSTOMER, TEST_USER_UUID, make_order, orders_service};

    use super::*;

    fn make_service(orders: MockOrdersService, principal: Principal) -> Service {
        orders_service(
            orders,
            principal,
            Router::with_path("admin/orders").get(handler),
        )
    }

    #[tokio::test]
    async fn test_index_defaults_to_first_page() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_list_orders()
            .once()
            .withf(|principal, filter| *principal == ADMIN && *filter == OrderFilter::default())
            .return_once(|_, _| {
                Ok(OrderPage {
                    orders: vec![make_order(OrderUuid::new(), TEST_USER_UUID)],
                    total: 1,
                })
            });

        let mut res = TestClient::get("http://example.com/admin/orders")
            .send(&make_service(orders, ADMIN))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body: OrderPageResponse = res.take_json().await?;

        assert_eq!(body.orders.len(), 1);
        assert_eq!(body.total, 1);
        assert_eq!(body.page, 1);
        assert_eq!(body.limit, DEFAULT_PAGE_LIMIT);

        Ok(())
    }

    #[tokio::test]
    async fn test_index_forwards_filter() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_list_orders()
            .once()
            .withf(|_, filter| {
                *filter
                    == OrderFilter {
                        status: Some(OrderStatus::Cancelled),
                        page: 3,
                        limit: 5,
                    }
            })
            .return_once(|_, _| {
                Ok(OrderPage {
                    orders: Vec::new(),
                    total: 11,
                })
            });

        let mut res =
            TestClient::get("http://example.com/admin/orders?status=cancelled&page=3&limit=5")
                .send(&make_service(orders, ADMIN))
                .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body: OrderPageResponse = res.take_json().await?;

        assert!(body.orders.is_empty(), "expected an empty page");
        assert_eq!(body.total, 11);

        Ok(())
    }

    #[tokio::test]
    async fn test_index_unknown_status_returns_400() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders.expect_list_orders().never();

        let res = TestClient::get("http://example.com/admin/orders?status=lost")
            .send(&make_service(orders, ADMIN))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_index_limit_out_of_range_returns_400() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders.expect_list_orders().once().return_once(|_, _| {
            Err(OrdersServiceError::Validation(
                ValidationError::LimitOutOfRange { max: 100 },
            ))
        });

        let res = TestClient::get("http://example.com/admin/orders?limit=500")
            .send(&make_service(orders, ADMIN))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_index_as_customer_returns_403() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_list_orders()
            .once()
            .return_once(|_, _| Err(OrdersServiceError::Forbidden));

        let res = TestClient::get("http://example.com/admin/orders")
            .send(&make_service(orders, CUSTOMER))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }
}
