//! App Router

use salvo::{
    Router,
    rate_limiter::{BasicQuota, FixedGuard, MokaStore, RateLimiter, RemoteIpIssuer},
};

use crate::{auth, carts, orders};

/// Authenticated API routes, limited to `rate_limit_per_minute` requests per
/// client IP.
pub(crate) fn app_router(rate_limit_per_minute: usize) -> Router {
    let limiter = RateLimiter::new(
        FixedGuard::new(),
        MokaStore::new(),
        RemoteIpIssuer,
        BasicQuota::per_minute(rate_limit_per_minute),
    );

    Router::new().hoop(limiter).push(api_routes())
}

fn api_routes() -> Router {
    Router::new()
        .hoop(auth::middleware::handler)
        .push(
            Router::with_path("orders")
                .post(orders::create::handler)
                .push(
                    Router::with_path("{order}")
                        .get(orders::get::handler)
                        .push(Router::with_path("status").put(orders::update_status::handler)),
                ),
        )
        .push(Router::with_path("users/orders").get(orders::user_index::handler))
        .push(Router::with_path("admin/orders").get(orders::index::handler))
        .push(
            Router::with_path("cart")
                .get(carts::get::handler)
                .delete(carts::clear::handler)
                .push(
                    Router::with_path("items")
                        .post(carts::items::create::handler)
                        .push(
                            Router::with_path("{reference}")
                                .patch(carts::items::update::handler)
                                .delete(carts::items::delete::handler),
                        ),
                ),
        )
}
