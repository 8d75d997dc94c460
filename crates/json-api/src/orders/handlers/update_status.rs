//! Update Order Status Handler

use std::{str::FromStr, sync::Arc};

use salvo::{
    oapi::extract::{JsonBody, PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use binary_craft::orders::{OrderStatus, PaymentStatus};
use binary_craft_app::domain::orders::{
    OrdersServiceError, data::StatusUpdate, records::OrderUuid,
};

use crate::{
    extensions::*,
    orders::{errors::into_status_error, models::OrderEnvelope},
    state::State,
};

/// Update Order Status Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateOrderStatusRequest {
    /// `pending`, `processing`, `completed` or `cancelled`
    #[serde(default)]
    pub status: Option<String>,

    /// `unpaid`, `paid` or `refunded`
    #[serde(default)]
    pub payment_status: Option<String>,
}

impl TryFrom<UpdateOrderStatusRequest> for StatusUpdate {
    type Error = StatusError;

    fn try_from(request: UpdateOrderStatusRequest) -> Result<Self, Self::Error> {
        let status = request
            .status
            .as_deref()
            .map(OrderStatus::from_str)
            .transpose()
            .map_err(|source| StatusError::bad_request().brief(source.to_string()))?;

        let payment_status = request
            .payment_status
            .as_deref()
            .map(PaymentStatus::from_str)
            .transpose()
            .map_err(|source| StatusError::bad_request().brief(source.to_string()))?;

        Ok(StatusUpdate {
            status,
            payment_status,
        })
    }
}

/// Update Order Status Handler
///
/// Changes an order's status and/or payment status. Admin only.
#[endpoint(
    tags("orders"),
    summary = "Update Order Status",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Order updated"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller is not an admin"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::CONFLICT, description = "Transition not allowed"),
    ),
)]
#[tracing::instrument(
    name = "orders.update_status",
    skip(order, json, depot),
    fields(
        user_uuid = tracing::field::Empty,
        order_uuid = tracing::field::Empty,
        status = tracing::field::Empty,
        payment_status = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    json: JsonBody<UpdateOrderStatusRequest>,
    depot: &mut Depot,
) -> Result<Json<OrderEnvelope>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    if !principal.is_admin() {
        return Err(into_status_error(OrdersServiceError::Forbidden));
    }

    let order = OrderUuid::from_uuid(order.into_inner());
    let update = StatusUpdate::try_from(json.into_inner())?;

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(principal.user));
    span.record("order_uuid", tracing::field::display(order));

    if let Some(status) = update.status {
        span.record("status", status.as_str());
    }

    if let Some(payment_status) = update.payment_status {
        span.record("payment_status", payment_status.as_str());
    }

    let order = state
        .app
        .orders
        .update_status(principal, order, update)
        .await
        .map_err(into_status_error)?;

    Ok(Json(OrderEnvelope::from_record(
        order,
        state.app.settings.currency,
    )?))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;

    use binary_craft_app::{
        auth::Principal,
        domain::{
            orders::{MockOrdersService, OrdersServiceError},
            validation::ValidationError,
        },
    };

    use crate::test_helpers::{ADMIN, CUSTOMER, TEST_USER_UUID, make_order, orders_service};

    use super::*;

    fn make_service(orders: MockOrdersService, principal: Principal) -> Service {
        orders_service(
            orders,
            principal,
            Router::with_path("orders/{order}/status").put(handler),
        )
    }

    #[tokio::test]
    async fn test_update_status_returns_200() -> TestResult {
        let mut orders = MockOrdersService::new();
        let uuid = OrderUuid::new();

        orders
            .expect_update_status()
            .once()
            .withf(move |principal, order, update| {
                *principal == ADMIN
                    && *order == uuid
                    && update.status == Some(OrderStatus::Processing)
                    && update.payment_status == Some(PaymentStatus::Paid)
            })
            .return_once(move |_, _, _| {
                let mut order = make_order(uuid, TEST_USER_UUID);
                order.status = OrderStatus::Processing;
                order.payment_status = PaymentStatus::Paid;
                Ok(order)
            });

        let mut res = TestClient::put(format!("http://example.com/orders/{uuid}/status"))
            .json(&json!({ "status": "processing", "paymentStatus": "paid" }))
            .send(&make_service(orders, ADMIN))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body: Value = res.take_json().await?;

        assert_eq!(body["order"]["status"], "processing");
        assert_eq!(body["order"]["paymentStatus"], "paid");

        Ok(())
    }

    #[tokio::test]
    async fn test_update_payment_status_only() -> TestResult {
        let mut orders = MockOrdersService::new();
        let uuid = OrderUuid::new();

        orders
            .expect_update_status()
            .once()
            .withf(|_, _, update| {
                update.status.is_none() && update.payment_status == Some(PaymentStatus::Refunded)
            })
            .return_once(move |_, _, _| Ok(make_order(uuid, TEST_USER_UUID)));

        let res = TestClient::put(format!("http://example.com/orders/{uuid}/status"))
            .json(&json!({ "paymentStatus": "refunded" }))
            .send(&make_service(orders, ADMIN))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_status_returns_400() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders.expect_update_status().never();

        let res = TestClient::put(format!(
            "http://example.com/orders/{}/status",
            OrderUuid::new()
        ))
        .json(&json!({ "status": "shipped" }))
        .send(&make_service(orders, ADMIN))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_empty_update_returns_400() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_update_status()
            .once()
            .return_once(|_, _, _| Err(OrdersServiceError::Validation(ValidationError::EmptyUpdate)));

        let res = TestClient::put(format!(
            "http://example.com/orders/{}/status",
            OrderUuid::new()
        ))
        .json(&json!({}))
        .send(&make_service(orders, ADMIN))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_customer_update_returns_403() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders.expect_update_status().never();

        let res = TestClient::put(format!(
            "http://example.com/orders/{}/status",
            OrderUuid::new()
        ))
        .json(&json!({ "status": "completed" }))
        .send(&make_service(orders, CUSTOMER))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }

    #[tokio::test]
    async fn test_customer_with_unknown_status_returns_403() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders.expect_update_status().never();

        let res = TestClient::put(format!(
            "http://example.com/orders/{}/status",
            OrderUuid::new()
        ))
        .json(&json!({ "status": "bogus" }))
        .send(&make_service(orders, CUSTOMER))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }

    #[tokio::test]
    async fn test_disallowed_transition_returns_409() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders.expect_update_status().once().return_once(|_, _, _| {
            Err(OrdersServiceError::InvalidTransition {
                field: "status",
                from: "completed",
                to: "pending",
            })
        });

        let res = TestClient::put(format!(
            "http://example.com/orders/{}/status",
            OrderUuid::new()
        ))
        .json(&json!({ "status": "pending" }))
        .send(&make_service(orders, ADMIN))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }
}
