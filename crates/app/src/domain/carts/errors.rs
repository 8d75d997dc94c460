//! Carts service errors.

use binary_craft::pricing::PricingError;
use sqlx::Error;
use thiserror::Error;

use crate::{domain::validation::ValidationError, retry::ReadError};

#[derive(Debug, Error)]
pub enum CartsServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("cart could not be priced")]
    Pricing(#[from] PricingError),

    #[error("carts are temporarily unavailable")]
    Unavailable,

    #[error("storage error")]
    Sql(#[from] Error),
}

impl From<ReadError<Error>> for CartsServiceError {
    fn from(error: ReadError<Error>) -> Self {
        match error {
            ReadError::Unavailable => Self::Unavailable,
            ReadError::Failed(error) => Self::Sql(error),
        }
    }
}
