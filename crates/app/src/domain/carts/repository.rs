//! Carts Repository

use async_trait::async_trait;
use binary_craft::cart::Cart;
use mockall::automock;
use sqlx::{PgPool, query, query_scalar, types::Json};

use crate::domain::users::records::UserUuid;

const LOAD_CART_SQL: &str = include_str!("sql/load_cart.sql");
const SAVE_CART_SQL: &str = include_str!("sql/save_cart.sql");
const CLEAR_CART_SQL: &str = include_str!("sql/clear_cart.sql");

#[automock]
#[async_trait]
/// Per-user cart persistence.
pub trait CartsRepository: Send + Sync {
    /// Load a user's cart; a user without one has an empty cart.
    async fn load_cart(&self, user: UserUuid) -> Result<Cart, sqlx::Error>;

    /// Replace a user's cart.
    async fn save_cart(&self, user: UserUuid, cart: &Cart) -> Result<(), sqlx::Error>;

    /// Forget a user's cart.
    async fn clear_cart(&self, user: UserUuid) -> Result<(), sqlx::Error>;
}

#[derive(Debug, Clone)]
/// PostgreSQL-backed cart repository storing lines as JSONB.
pub struct PgCartsRepository {
    pool: PgPool,
}

impl PgCartsRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartsRepository for PgCartsRepository {
    async fn load_cart(&self, user: UserUuid) -> Result<Cart, sqlx::Error> {
        let stored: Option<Json<Cart>> = query_scalar(LOAD_CART_SQL)
            .bind(user.into_uuid())
            .fetch_optional(&self.pool)
            .await?;

        Ok(stored.map(|Json(cart)| cart).unwrap_or_default())
    }

    async fn save_cart(&self, user: UserUuid, cart: &Cart) -> Result<(), sqlx::Error> {
        query(SAVE_CART_SQL)
            .bind(user.into_uuid())
            .bind(Json(cart))
            .execute(&self.pool)
            .await
            .map(|_result| ())
    }

    async fn clear_cart(&self, user: UserUuid) -> Result<(), sqlx::Error> {
        query(CLEAR_CART_SQL)
            .bind(user.into_uuid())
            .execute(&self.pool)
            .await
            .map(|_result| ())
    }
}

#[cfg(test)]
mod tests {
    use binary_craft::items::{ItemKind, ItemSnapshot};
    use testresult::TestResult;
    use uuid::Uuid;

    use crate::{
        domain::users::{PgUsersService, UsersService, data::NewUser, records::Role},
        test::TestDb,
    };

    use super::*;

    #[tokio::test]
    #[ignore = "requires a Docker daemon for testcontainers"]
    async fn saved_cart_loads_back_and_clears() -> TestResult {
        let db = TestDb::new().await;
        let repository = PgCartsRepository::new(db.pool().clone());

        let user = PgUsersService::new(db.pool().clone())
            .create_user(NewUser {
                uuid: UserUuid::new(),
                email: format!("{}@example.com", Uuid::now_v7()),
                role: Role::Customer,
            })
            .await?
            .uuid;

        assert!(repository.load_cart(user).await?.is_empty());

        let mut cart = Cart::new();
        cart.add_item(ItemSnapshot::new("a", ItemKind::Product, "A", 1000));
        cart.add_item(ItemSnapshot::new("a", ItemKind::Product, "A", 1000));

        repository.save_cart(user, &cart).await?;

        assert_eq!(repository.load_cart(user).await?, cart);

        repository.clear_cart(user).await?;

        assert!(repository.load_cart(user).await?.is_empty());

        Ok(())
    }
}
