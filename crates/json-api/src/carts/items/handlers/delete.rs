//! Remove Cart Item Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};

use crate::{
    carts::{
        errors::into_status_error,
        models::{CartEnvelope, requested_promo_code},
    },
    extensions::*,
    state::State,
};

/// Remove Cart Item Handler
///
/// Removes a line regardless of its quantity.
#[endpoint(
    tags("carts"),
    summary = "Remove Item from Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Item removed"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "carts.items.remove",
    skip(req, reference, depot),
    fields(
        user_uuid = tracing::field::Empty,
        reference = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    req: &mut Request,
    reference: PathParam<String>,
    depot: &mut Depot,
) -> Result<Json<CartEnvelope>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;
    let reference = reference.into_inner();

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(principal.user));
    span.record("reference", reference.as_str());

    let cart = state
        .app
        .carts
        .remove_item(principal.user, reference, requested_promo_code(req))
        .await
        .map_err(into_status_error)?;

    Ok(Json(CartEnvelope::from_view(
        cart,
        state.app.settings.currency,
    )?))
}
