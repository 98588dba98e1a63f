//! PostgreSQL-backed [`CartRepository`] used for cart reconciliation.

use closet_core::cart::{CartKey, CartRepository};
use closet_core::types::DbId;
use sqlx::PgPool;

use crate::models::cart::CartLine;
use crate::repositories::{CartRepo, ProductRepo};

/// Persisted per-user cart. Cloning shares the underlying pool.
#[derive(Debug, Clone)]
pub struct ServerCartRepository {
    pool: PgPool,
}

impl ServerCartRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl CartRepository for ServerCartRepository {
    type Line = CartLine;
    type Error = sqlx::Error;

    async fn product_exists(&self, product_id: DbId) -> Result<bool, sqlx::Error> {
        ProductRepo::exists(&self.pool, product_id).await
    }

    async fn add_quantity(
        &self,
        owner_id: DbId,
        key: &CartKey,
        quantity: i32,
    ) -> Result<CartLine, sqlx::Error> {
        let (line, _) = CartRepo::add(&self.pool, owner_id, key, quantity).await?;
        Ok(line)
    }

    async fn lines(&self, owner_id: DbId) -> Result<Vec<CartLine>, sqlx::Error> {
        CartRepo::list(&self.pool, owner_id).await
    }
}
