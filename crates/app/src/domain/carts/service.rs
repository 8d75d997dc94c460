//! Carts service.
//!
//! Each operation loads the user's cart, applies one cart mutation, prices
//! the result and saves it back. Requests for the same user are assumed not to race; the last save
//! wins.

use std::sync::Arc;

use async_trait::async_trait;
use binary_craft::cart::Cart;
use mockall::automock;
use sqlx::PgPool;

use crate::{
    domain::{
        carts::{
            errors::CartsServiceError,
            models::{CartView, NewCartItem},
            repository::{CartsRepository, PgCartsRepository},
        },
        users::records::UserUuid,
    },
    settings::CommerceSettings,
};

#[derive(Clone)]
pub struct PgCartsService {
    repository: Arc<dyn CartsRepository>,
    settings: CommerceSettings,
}

impl std::fmt::Debug for PgCartsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgCartsService")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl PgCartsService {
    #[must_use]
    pub fn new(pool: PgPool, settings: CommerceSettings) -> Self {
        Self::with_repository(Arc::new(PgCartsRepository::new(pool)), settings)
    }

    #[must_use]
    pub fn with_repository(repository: Arc<dyn CartsRepository>, settings: CommerceSettings) -> Self {
        Self {
            repository,
            settings,
        }
    }

    fn view(&self, cart: Cart, promo_code: Option<&str>) -> Result<CartView, CartsServiceError> {
        Ok(CartView::priced(
            cart,
            promo_code,
            &self.settings.promo_codes,
        )?)
    }

    async fn mutate<F>(
        &self,
        user: UserUuid,
        promo_code: Option<&str>,
        mutation: F,
    ) -> Result<CartView, CartsServiceError>
    where
        F: FnOnce(&mut Cart) + Send,
    {
        let mut cart = self.repository.load_cart(user).await?;

        mutation(&mut cart);

        // A cart that cannot be priced is never stored.
        let view = self.view(cart.clone(), promo_code)?;

        self.repository.save_cart(user, &cart).await?;

        Ok(view)
    }
}

#[async_trait]
impl CartsService for PgCartsService {
    async fn get_cart(
        &self,
        user: UserUuid,
        promo_code: Option<String>,
    ) -> Result<CartView, CartsServiceError> {
        let cart = self
            .settings
            .read_retry
            .run("load_cart", || self.repository.load_cart(user))
            .await?;

        self.view(cart, promo_code.as_deref())
    }

    async fn add_item(
        &self,
        user: UserUuid,
        item: NewCartItem,
        promo_code: Option<String>,
    ) -> Result<CartView, CartsServiceError> {
        let snapshot = item.into_snapshot(0, self.settings.currency)?;

        self.mutate(user, promo_code.as_deref(), |cart| cart.add_item(snapshot))
            .await
    }

    async fn change_quantity(
        &self,
        user: UserUuid,
        reference: String,
        delta: i64,
        promo_code: Option<String>,
    ) -> Result<CartView, CartsServiceError> {
        self.mutate(user, promo_code.as_deref(), |cart| {
            cart.change_quantity(&reference, delta);
        })
        .await
    }

    async fn remove_item(
        &self,
        user: UserUuid,
        reference: String,
        promo_code: Option<String>,
    ) -> Result<CartView, CartsServiceError> {
        self.mutate(user, promo_code.as_deref(), |cart| {
            cart.remove_item(&reference);
        })
        .await
    }

    async fn clear_cart(&self, user: UserUuid) -> Result<CartView, CartsServiceError> {
        self.repository.clear_cart(user).await?;

        self.view(Cart::new(), None)
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Retrieve a user's cart priced with an optional promo code.
    async fn get_cart(
        &self,
        user: UserUuid,
        promo_code: Option<String>,
    ) -> Result<CartView, CartsServiceError>;

    /// Add one unit of an item to the user's cart.
    async fn add_item(
        &self,
        user: UserUuid,
        item: NewCartItem,
        promo_code: Option<String>,
    ) -> Result<CartView, CartsServiceError>;

    /// Change a line's quantity by `delta`, removing it below one unit.
    async fn change_quantity(
        &self,
        user: UserUuid,
        reference: String,
        delta: i64,
        promo_code: Option<String>,
    ) -> Result<CartView, CartsServiceError>;

    /// Remove a line regardless of quantity.
    async fn remove_item(
        &self,
        user: UserUuid,
        reference: String,
        promo_code: Option<String>,
    ) -> Result<CartView, CartsServiceError>;

    /// Empty the user's cart.
    async fn clear_cart(&self, user: UserUuid) -> Result<CartView, CartsServiceError>;
}
