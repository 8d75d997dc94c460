//! Result and Option helpers for HTTP handlers.

use std::fmt::Display;

use salvo::prelude::StatusError;
use tracing::error;

pub(crate) trait ResultExt<T> {
    /// Log the error under `context` and answer 500.
    fn or_500(self, context: &str) -> Result<T, StatusError>;

    /// Answer 400 with `brief`; the caller's input was at fault.
    fn or_400(self, brief: impl Into<String>) -> Result<T, StatusError>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Display,
{
    fn or_500(self, context: &str) -> Result<T, StatusError> {
        self.map_err(|error| {
            error!("{context}: {error}");

            StatusError::internal_server_error()
        })
    }

    fn or_400(self, brief: impl Into<String>) -> Result<T, StatusError> {
        self.map_err(|_ignored| StatusError::bad_request().brief(brief))
    }
}

pub(crate) trait OptionExt<T> {
    /// Log `context` and answer 500 when the value is missing.
    fn or_500(self, context: &str) -> Result<T, StatusError>;
}

impl<T> OptionExt<T> for Option<T> {
    fn or_500(self, context: &str) -> Result<T, StatusError> {
        self.ok_or_else(|| {
            error!("{context}");

            StatusError::internal_server_error()
        })
    }
}
