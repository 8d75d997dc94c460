//! Orders service errors.

use binary_craft::pricing::PricingError;
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::{domain::validation::ValidationError, retry::ReadError};

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("order not found")]
    NotFound,

    #[error("not allowed to access this order")]
    Forbidden,

    #[error("cannot change {field} from {from} to {to}")]
    InvalidTransition {
        field: &'static str,
        from: &'static str,
        to: &'static str,
    },

    #[error("order changed while it was being updated")]
    Conflict,

    #[error("order could not be priced")]
    Pricing(#[from] PricingError),

    #[error("orders are temporarily unavailable")]
    Unavailable,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for OrdersServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::CheckViolation) => Self::Validation(ValidationError::AmountOutOfRange),
            Some(_) | None => Self::Sql(error),
        }
    }
}

impl From<ReadError<Error>> for OrdersServiceError {
    fn from(error: ReadError<Error>) -> Self {
        match error {
            ReadError::Unavailable => Self::Unavailable,
            ReadError::Failed(error) => error.into(),
        }
    }
}
