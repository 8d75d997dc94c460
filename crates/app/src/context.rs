//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    auth::{AuthService, PgAuthService},
    database,
    domain::{
        carts::{CartsService, PgCartsService},
        orders::{OrdersService, PgOrdersService},
    },
    notifications::OrderNotifier,
    settings::CommerceSettings,
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

#[derive(Clone)]
pub struct AppContext {
    pub orders: Arc<dyn OrdersService>,
    pub carts: Arc<dyn CartsService>,
    pub auth: Arc<dyn AuthService>,
    pub settings: CommerceSettings,
}

impl AppContext {
    /// Build application context from a database URL, keeping at most
    /// `max_connections` pooled connections.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_database_url(
        url: &str,
        max_connections: u32,
        settings: CommerceSettings,
        notifier: Arc<dyn OrderNotifier>,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect_with_max_connections(url, max_connections)
            .await
            .map_err(AppInitError::Database)?;

        Ok(Self {
            orders: Arc::new(PgOrdersService::new(
                pool.clone(),
                notifier,
                settings.clone(),
            )),
            carts: Arc::new(PgCartsService::new(pool.clone(), settings.clone())),
            auth: Arc::new(PgAuthService::new(pool)),
            settings,
        })
    }
}
