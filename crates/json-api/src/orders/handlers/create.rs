//! Create Order Handler

use std::sync::Arc;

use salvo::{http::header::LOCATION, oapi::extract::JsonBody, prelude::*};
use serde::{Deserialize, Serialize};

use binary_craft_app::domain::orders::data::NewOrder;

use crate::{
    extensions::*,
    observability::record_order_placed,
    orders::{
        errors::into_status_error,
        models::{OrderEnvelope, OrderItemRequest, ShippingAddressBody},
    },
    state::State,
};

/// Create Order Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateOrderRequest {
    /// Items to order, priced as shown to the customer
    pub items: Vec<OrderItemRequest>,

    /// Where the order ships to
    #[serde(default)]
    pub shipping_address: ShippingAddressBody,

    /// Customer notes
    #[serde(default)]
    pub notes: String,

    /// Payment method chosen at checkout
    #[serde(default)]
    pub payment_method: String,

    /// Promo code to apply
    #[serde(default)]
    pub promo_code: Option<String>,
}

impl CreateOrderRequest {
    fn into_new_order(self) -> Result<NewOrder, StatusError> {
        Ok(NewOrder {
            items: self
                .items
                .into_iter()
                .map(OrderItemRequest::into_new_order_item)
                .collect::<Result<_, _>>()?,
            shipping_address: self.shipping_address.into(),
            payment_method: self.payment_method,
            notes: self.notes,
            promo_code: self.promo_code,
        })
    }
}

/// Create Order Handler
///
/// Places an order for the caller and clears their server-side cart.
#[endpoint(
    tags("orders"),
    summary = "Create Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Order created"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Unauthorized"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "orders.create",
    skip(json, depot, res),
    fields(
        user_uuid = tracing::field::Empty,
        item_lines = tracing::field::Empty,
        order_uuid = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<CreateOrderRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<OrderEnvelope>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;
    let request = json.into_inner();

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(principal.user));
    span.record("item_lines", request.items.len());

    let order = state
        .app
        .orders
        .create_order(principal, request.into_new_order()?)
        .await
        .map_err(into_status_error)?;

    let uuid = order.uuid;

    span.record("order_uuid", tracing::field::display(uuid));
    record_order_placed(order.discount > 0);

    let response = OrderEnvelope::from_record(order, state.app.settings.currency)?;

    res.add_header(LOCATION, format!("/orders/{uuid}"), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(response))
}
