//! Add Cart Item Handler

use std::sync::Arc;

use salvo::{oapi::extract::JsonBody, prelude::*};
use serde::{Deserialize, Serialize};

use binary_craft_app::domain::carts::models::NewCartItem;

use crate::{
    amounts::{parse_amount, parse_kind},
    carts::{
        errors::into_status_error,
        models::{CartEnvelope, requested_promo_code},
    },
    extensions::*,
    state::State,
};

/// Add Cart Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddCartItemRequest {
    /// Catalog identifier of the product or service
    pub reference_id: String,

    /// `product` or `service`
    pub kind: String,

    /// Title shown to the customer
    pub title: String,

    /// Unit price in major units, e.g. `"12.50"`
    pub unit_price: String,

    /// Display image
    #[serde(default)]
    pub image: Option<String>,
}

impl TryFrom<AddCartItemRequest> for NewCartItem {
    type Error = StatusError;

    fn try_from(request: AddCartItemRequest) -> Result<Self, Self::Error> {
        Ok(NewCartItem {
            kind: parse_kind(&request.kind, "kind")?,
            unit_price: parse_amount(&request.unit_price, "unitPrice")?,
            reference: request.reference_id,
            title: request.title,
            image: request.image,
        })
    }
}

/// Add Cart Item Handler
///
/// Adds one unit of an item to the caller's cart. Adding an item that is
/// already in the cart increments its quantity.
#[endpoint(
    tags("carts"),
    summary = "Add Item to Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Item added"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "carts.items.add",
    skip(req, json, depot),
    fields(
        user_uuid = tracing::field::Empty,
        reference = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    req: &mut Request,
    json: JsonBody<AddCartItemRequest>,
    depot: &mut Depot,
) -> Result<Json<CartEnvelope>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;
    let item = NewCartItem::try_from(json.into_inner())?;

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(principal.user));
    span.record("reference", item.reference.as_str());

    let cart = state
        .app
        .carts
        .add_item(principal.user, item, requested_promo_code(req))
        .await
        .map_err(into_status_error)?;

    Ok(Json(CartEnvelope::from_view(
        cart,
        state.app.settings.currency,
    )?))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use binary_craft::items::ItemKind;
    use binary_craft_app::domain::{
        carts::{CartsServiceError, MockCartsService},
        validation::ValidationError,
    };

    use crate::test_helpers::{TEST_USER_UUID, carts_service, make_cart_view};

    use super::*;

    fn make_service(carts: MockCartsService) -> Service {
        carts_service(carts, Router::with_path("cart/items").post(handler))
    }

    #[tokio::test]
    async fn test_add_item_returns_updated_cart() -> TestResult {
        let mut carts = MockCartsService::new();

        carts
            .expect_add_item()
            .once()
            .withf(|user, item, promo_code| {
                *user == TEST_USER_UUID
                    && item.reference == "kb-1"
                    && item.kind == ItemKind::Product
                    && item.unit_price == Decimal::new(100, 0)
                    && item.image.is_none()
                    && promo_code.is_none()
            })
            .return_once(|_, _, _| Ok(make_cart_view(1)));

        let mut res = TestClient::post("http://example.com/cart/items")
            .json(&json!({
                "referenceId": "kb-1",
                "kind": "product",
                "title": "Keyboard",
                "unitPrice": "100"
            }))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body = res.take_json::<CartEnvelope>().await?.cart;

        assert_eq!(body.item_count, 1);
        assert_eq!(body.items.first().map(|item| item.quantity), Some(1));

        Ok(())
    }

    #[tokio::test]
    async fn test_add_item_with_unknown_kind_returns_400() -> TestResult {
        let mut carts = MockCartsService::new();

        carts.expect_add_item().never();

        let res = TestClient::post("http://example.com/cart/items")
            .json(&json!({
                "referenceId": "kb-1",
                "kind": "bundle",
                "title": "Keyboard",
                "unitPrice": "100"
            }))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_add_item_with_negative_price_returns_400() -> TestResult {
        let mut carts = MockCartsService::new();

        carts.expect_add_item().once().return_once(|_, _, _| {
            Err(CartsServiceError::Validation(ValidationError::InvalidPrice {
                index: 0,
                source: binary_craft::money::AmountError::Negative,
            }))
        });

        let res = TestClient::post("http://example.com/cart/items")
            .json(&json!({
                "referenceId": "kb-1",
                "kind": "product",
                "title": "Keyboard",
                "unitPrice": "-1"
            }))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_add_item_missing_title_returns_400() -> TestResult {
        let mut carts = MockCartsService::new();

        carts.expect_add_item().never();

        let res = TestClient::post("http://example.com/cart/items")
            .json(&json!({ "referenceId": "kb-1", "kind": "product", "unitPrice": "1" }))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
