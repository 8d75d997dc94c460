//! Get Cart Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    carts::{
        errors::into_status_error,
        models::{CartEnvelope, requested_promo_code},
    },
    extensions::*,
    state::State,
};

/// Get Cart Handler
///
/// Returns the caller's cart priced with the optional `promoCode` query
/// parameter.
#[endpoint(
    tags("carts"),
    summary = "Get Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Cart found"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Storage unavailable"),
    ),
)]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<CartEnvelope>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let cart = state
        .app
        .carts
        .get_cart(principal.user, requested_promo_code(req))
        .await
        .map_err(into_status_error)?;

    Ok(Json(CartEnvelope::from_view(
        cart,
        state.app.settings.currency,
    )?))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::Value;
    use testresult::TestResult;

    use binary_craft_app::domain::carts::{CartsServiceError, MockCartsService, models::CartView};

    use crate::test_helpers::{TEST_USER_UUID, carts_service, make_cart_view};

    use super::*;

    fn make_service(carts: MockCartsService) -> Service {
        carts_service(carts, Router::with_path("cart").get(handler))
    }

    #[tokio::test]
    async fn test_get_returns_priced_cart() -> TestResult {
        let mut carts = MockCartsService::new();

        carts
            .expect_get_cart()
            .once()
            .withf(|user, promo_code| {
                *user == TEST_USER_UUID && promo_code.as_deref() == Some("binary10")
            })
            .return_once(|_, _| Ok(make_cart_view(2)));

        let mut res = TestClient::get("http://example.com/cart?promoCode=binary10")
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body: Value = res.take_json().await?;

        assert_eq!(body["cart"]["itemCount"], 2);
        assert_eq!(body["cart"]["subtotal"], "200.00");
        assert_eq!(body["cart"]["discount"], "20.00");
        assert_eq!(body["cart"]["total"], "180.00");
        assert_eq!(body["cart"]["promoCode"], "BINARY10");
        assert_eq!(body["cart"]["items"][0]["referenceId"], "kb-1");
        assert_eq!(body["cart"]["items"][0]["lineTotal"], "200.00");

        Ok(())
    }

    #[tokio::test]
    async fn test_get_without_promo_code() -> TestResult {
        let mut carts = MockCartsService::new();

        carts
            .expect_get_cart()
            .once()
            .withf(|_, promo_code| promo_code.is_none())
            .return_once(|_, _| Ok(CartView::default()));

        let mut res = TestClient::get("http://example.com/cart")
            .send(&make_service(carts))
            .await;

        let body = res.take_json::<CartEnvelope>().await?.cart;

        assert!(body.items.is_empty(), "expected an empty cart");
        assert_eq!(body.total, "0.00");
        assert_eq!(body.promo_code, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_unavailable_returns_503() -> TestResult {
        let mut carts = MockCartsService::new();

        carts
            .expect_get_cart()
            .once()
            .return_once(|_, _| Err(CartsServiceError::Unavailable));

        let res = TestClient::get("http://example.com/cart")
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::SERVICE_UNAVAILABLE));

        Ok(())
    }
}
