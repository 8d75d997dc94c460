//! Change Cart Item Quantity Handler

use std::sync::Arc;

use salvo::{
    oapi::extract::{JsonBody, PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    carts::{
        errors::into_status_error,
        models::{CartEnvelope, requested_promo_code},
    },
    extensions::*,
    state::State,
};

/// Change Cart Item Quantity Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ChangeQuantityRequest {
    /// Units to add (positive) or take away (negative)
    pub delta: i64,
}

/// Change Cart Item Quantity Handler
///
/// Adjusts a line's quantity. A line that drops below one unit is removed;
/// an unknown reference leaves the cart unchanged.
#[endpoint(
    tags("carts"),
    summary = "Change Cart Item Quantity",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Quantity changed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "carts.items.change_quantity",
    skip(req, reference, json, depot),
    fields(
        user_uuid = tracing::field::Empty,
        reference = tracing::field::Empty,
        delta = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    req: &mut Request,
    reference: PathParam<String>,
    json: JsonBody<ChangeQuantityRequest>,
    depot: &mut Depot,
) -> Result<Json<CartEnvelope>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;
    let reference = reference.into_inner();
    let delta = json.into_inner().delta;

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(principal.user));
    span.record("reference", reference.as_str());
    span.record("delta", delta);

    let cart = state
        .app
        .carts
        .change_quantity(principal.user, reference, delta, requested_promo_code(req))
        .await
        .map_err(into_status_error)?;

    Ok(Json(CartEnvelope::from_view(
        cart,
        state.app.settings.currency,
    )?))
}
