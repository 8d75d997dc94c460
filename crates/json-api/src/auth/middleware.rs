//! Bearer token authentication.
//!
//! Resolves `Authorization: Bearer <token>` to a [`Principal`] and stores it in
//! the depot for handlers. Requests without a usable token never reach them.

use std::sync::Arc;

use salvo::{
    http::{
        HeaderValue,
        header::{AUTHORIZATION, WWW_AUTHENTICATE},
    },
    prelude::*,
};
use tracing::{debug, error};

use binary_craft_app::auth::{AuthServiceError, Principal};

use crate::{extensions::*, state::State};

#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    match authenticate(req, depot).await {
        Ok(principal) => {
            debug!(user_uuid = %principal.user, role = %principal.role, "authenticated request");

            depot.insert_principal(principal);

            ctrl.call_next(req, depot, res).await;
        }
        Err(rejection) => {
            if rejection.code == StatusCode::UNAUTHORIZED {
                res.headers_mut()
                    .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
            }

            res.render(rejection);
        }
    }
}

async fn authenticate(req: &Request, depot: &Depot) -> Result<Principal, StatusError> {
    let token = extract_bearer_token(req).ok_or_else(|| {
        StatusError::unauthorized().brief("Missing or invalid Authorization header")
    })?;

    let state = depot.obtain_or_500::<Arc<State>>()?;

    state
        .app
        .auth
        .authenticate_bearer(token)
        .await
        .map_err(into_status_error)
}

fn into_status_error(error: AuthServiceError) -> StatusError {
    match error {
        AuthServiceError::NotFound => StatusError::unauthorized().brief("Invalid API token"),
        AuthServiceError::Sql(source) => {
            error!("failed to validate api token: {source}");

            StatusError::internal_server_error()
        }
        AuthServiceError::Token(source) => {
            error!("failed to process api token: {source}");

            StatusError::internal_server_error()
        }
    }
}

fn extract_bearer_token(req: &Request) -> Option<&str> {
    let (scheme, token) = req
        .headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .split_once(' ')?;

    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
