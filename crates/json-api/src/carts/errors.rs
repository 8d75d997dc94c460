//! Errors

use salvo::http::StatusError;
use tracing::{error, warn};

use binary_craft::pricing::PricingError;
use binary_craft_app::domain::carts::CartsServiceError;

pub(crate) fn into_status_error(error: CartsServiceError) -> StatusError {
    match error {
        CartsServiceError::Validation(source) => {
            StatusError::bad_request().brief(source.to_string())
        }
        CartsServiceError::Pricing(PricingError::Overflow) => {
            StatusError::bad_request().brief("Cart amounts are out of range")
        }
        CartsServiceError::Pricing(source @ PricingError::Discount(_)) => {
            error!("failed to apply promo code: {source}");

            StatusError::internal_server_error()
        }
        CartsServiceError::Unavailable => {
            warn!("cart storage unavailable after retries");

            StatusError::service_unavailable().brief("Carts are temporarily unavailable")
        }
        CartsServiceError::Sql(source) => {
            error!("cart storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
