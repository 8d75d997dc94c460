//! Errors

use salvo::http::StatusError;
use tracing::{error, warn};

use binary_craft::pricing::PricingError;
use binary_craft_app::domain::orders::OrdersServiceError;

pub(crate) fn into_status_error(error: OrdersServiceError) -> StatusError {
    match error {
        OrdersServiceError::Validation(source) => {
            StatusError::bad_request().brief(source.to_string())
        }
        OrdersServiceError::NotFound => StatusError::not_found().brief("Order not found"),
        OrdersServiceError::Forbidden => {
            StatusError::forbidden().brief("Not allowed to access this order")
        }
        conflict @ OrdersServiceError::InvalidTransition { .. } => {
            StatusError::conflict().brief(conflict.to_string())
        }
        OrdersServiceError::Conflict => {
            warn!("order status kept changing during an update");

            StatusError::conflict().brief("Order changed while it was being updated; retry")
        }
        OrdersServiceError::Pricing(PricingError::Overflow) => {
            StatusError::bad_request().brief("Order amounts are out of range")
        }
        OrdersServiceError::Pricing(source @ PricingError::Discount(_)) => {
            error!("failed to apply promo code: {source}");

            StatusError::internal_server_error()
        }
        OrdersServiceError::Unavailable => {
            warn!("order storage unavailable after retries");

            StatusError::service_unavailable().brief("Orders are temporarily unavailable")
        }
        OrdersServiceError::Sql(source) => {
            error!("order storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}

#[cfg(test)]
mod tests {
    use binary_craft_app::domain::validation::ValidationError;
    use salvo::http::StatusCode;

    use super::*;

    #[test]
    fn test_service_errors_map_to_status_codes() {
        let cases = [
            (
                OrdersServiceError::Validation(ValidationError::EmptyItems),
                StatusCode::BAD_REQUEST,
            ),
            (OrdersServiceError::NotFound, StatusCode::NOT_FOUND),
            (OrdersServiceError::Forbidden, StatusCode::FORBIDDEN),
            (
                OrdersServiceError::InvalidTransition {
                    field: "status",
                    from: "completed",
                    to: "pending",
                },
                StatusCode::CONFLICT,
            ),
            (OrdersServiceError::Conflict, StatusCode::CONFLICT),
            (
                OrdersServiceError::Pricing(PricingError::Overflow),
                StatusCode::BAD_REQUEST,
            ),
            (OrdersServiceError::Unavailable, StatusCode::SERVICE_UNAVAILABLE),
            (
                OrdersServiceError::Sql(binary_craft_app::database::Error::PoolClosed),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            let label = format!("{error:?}");

            assert_eq!(into_status_error(error).code, expected, "{label}");
        }
    }

    #[test]
    fn test_validation_brief_names_the_problem() {
        let status = into_status_error(OrdersServiceError::Validation(
            ValidationError::QuantityOutOfRange {
                index: 1,
                quantity: 0,
            },
        ));

        assert_eq!(
            status.brief,
            "item 1 has quantity 0, expected at least 1",
            "brief should carry the validation message"
        );
    }
}
