//! Auth service errors.

use thiserror::Error;

use crate::{auth::ApiTokenError, database};

/// Why a bearer token could not be resolved to a caller.
#[derive(Debug, Error)]
pub enum AuthServiceError {
    /// The token is malformed, unknown, revoked, expired or does not match.
    #[error("token not found")]
    NotFound,

    #[error("storage error")]
    Sql(#[from] database::Error),

    #[error("token processing error")]
    Token(#[from] ApiTokenError),
}
