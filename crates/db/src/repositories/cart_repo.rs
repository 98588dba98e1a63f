//! Repository for the `cart_items` table.
//!
//! Lines are addressed by owner plus [`CartKey`]. Size and color are
//! nullable, so lookups compare them with `IS NOT DISTINCT FROM`.

use std::collections::HashMap;

use closet_core::cart::CartKey;
use closet_core::checkout::CheckoutLine;
use closet_core::types::{Cents, DbId};
use sqlx::{FromRow, PgConnection, PgPool};

use crate::models::cart::{CartLine, CartLineWithProduct};
use crate::models::product::Product;
use crate::repositories::ProductRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, product_id, quantity, size, color, created_at, updated_at";

/// Matches one line of one owner: `$1` owner, `$2` product, `$3` size, `$4` color.
const KEY_MATCH: &str = "user_id = $1 AND product_id = $2 \
                          AND size IS NOT DISTINCT FROM $3 \
                          AND color IS NOT DISTINCT FROM $4";

#[derive(FromRow)]
struct UpsertedLine {
    #[sqlx(flatten)]
    line: CartLine,
    inserted: bool,
}

/// Provides cart line operations for authenticated users.
pub struct CartRepo;

impl CartRepo {
    /// All lines for `user_id` in insertion order.
    pub async fn list(pool: &PgPool, user_id: DbId) -> Result<Vec<CartLine>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cart_items WHERE user_id = $1 ORDER BY id");
        sqlx::query_as::<_, CartLine>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// All lines for `user_id`, each with its product.
    pub async fn list_with_products(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<CartLineWithProduct>, sqlx::Error> {
        let lines = Self::list(pool, user_id).await?;
        Self::attach_products(pool, lines).await
    }

    /// Pair each line with its product row.
    ///
    /// A line whose product vanished between the two reads is dropped.
    pub async fn attach_products(
        pool: &PgPool,
        lines: Vec<CartLine>,
    ) -> Result<Vec<CartLineWithProduct>, sqlx::Error> {
        let mut ids: Vec<DbId> = lines.iter().map(|l| l.product_id).collect();
        ids.sort_unstable();
        ids.dedup();

        let products: HashMap<DbId, Product> = ProductRepo::find_by_ids(pool, &ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        Ok(lines
            .into_iter()
            .filter_map(|line| {
                let product = products.get(&line.product_id)?.clone();
                Some(CartLineWithProduct { line, product })
            })
            .collect())
    }

    /// Find the line at `key`.
    pub async fn find(
        pool: &PgPool,
        user_id: DbId,
        key: &CartKey,
    ) -> Result<Option<CartLine>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cart_items WHERE {KEY_MATCH}");
        sqlx::query_as::<_, CartLine>(&query)
            .bind(user_id)
            .bind(key.product_id)
            .bind(&key.size)
            .bind(&key.color)
            .fetch_optional(pool)
            .await
    }

    /// Add `quantity` to the line at `key`, creating it if absent.
    ///
    /// A single upsert, so concurrent adds to one key both land. The summed
    /// quantity saturates at `i32::MAX`. Returns the resulting line and
    /// whether it was newly inserted.
    pub async fn add(
        pool: &PgPool,
        user_id: DbId,
        key: &CartKey,
        quantity: i32,
    ) -> Result<(CartLine, bool), sqlx::Error> {
        let query = format!(
            "INSERT INTO cart_items (user_id, product_id, quantity, size, color)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT ON CONSTRAINT uq_cart_items_line
             DO UPDATE SET quantity =
                 LEAST(cart_items.quantity::BIGINT + EXCLUDED.quantity, 2147483647)::INTEGER
             RETURNING {COLUMNS}, (xmax = 0) AS inserted"
        );
        let row = sqlx::query_as::<_, UpsertedLine>(&query)
            .bind(user_id)
            .bind(key.product_id)
            .bind(quantity)
            .bind(&key.size)
            .bind(&key.color)
            .fetch_one(pool)
            .await?;
        Ok((row.line, row.inserted))
    }

    /// Overwrite the quantity of the line at `key`.
    ///
    /// Returns `None` if there is no such line.
    pub async fn set_quantity(
        pool: &PgPool,
        user_id: DbId,
        key: &CartKey,
        quantity: i32,
    ) -> Result<Option<CartLine>, sqlx::Error> {
        let query = format!(
            "UPDATE cart_items SET quantity = $5
             WHERE {KEY_MATCH}
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CartLine>(&query)
            .bind(user_id)
            .bind(key.product_id)
            .bind(&key.size)
            .bind(&key.color)
            .bind(quantity)
            .fetch_optional(pool)
            .await
    }

    /// Delete the line at `key`. Returns `true` if a row was removed.
    pub async fn remove(pool: &PgPool, user_id: DbId, key: &CartKey) -> Result<bool, sqlx::Error> {
        let query = format!("DELETE FROM cart_items WHERE {KEY_MATCH}");
        let result = sqlx::query(&query)
            .bind(user_id)
            .bind(key.product_id)
            .bind(&key.size)
            .bind(&key.color)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every line of `user_id`. Returns the count removed.
    pub async fn clear(conn: &mut PgConnection, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }

    /// Lock and read the cart of `user_id` for checkout.
    ///
    /// Product rows are locked first, in id order, so that two checkouts
    /// sharing products always acquire locks in the same order. The lock is
    /// `FOR NO KEY UPDATE`: it serialises stock changes but not the foreign
    /// key checks of rows inserted elsewhere that reference the product. The cart
    /// lines are then locked and returned joined with current stock and
    /// price, in insertion order.
    pub async fn lock_for_checkout(
        conn: &mut PgConnection,
        user_id: DbId,
    ) -> Result<Vec<CheckoutLine>, sqlx::Error> {
        sqlx::query(
            "SELECT id FROM products
             WHERE id IN (SELECT product_id FROM cart_items WHERE user_id = $1)
             ORDER BY id
             FOR NO KEY UPDATE",
        )
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

        let rows: Vec<(DbId, String, i32, i32, Cents)> = sqlx::query_as(
            "SELECT c.product_id, p.name, c.quantity, p.stock, p.price_cents
             FROM cart_items c
             JOIN products p ON p.id = c.product_id
             WHERE c.user_id = $1
             ORDER BY c.id
             FOR UPDATE OF c",
        )
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(product_id, product_name, requested_quantity, stock, unit_price_cents)| {
                    CheckoutLine {
                        product_id,
                        product_name,
                        requested_quantity,
                        stock,
                        unit_price_cents,
                    }
                },
            )
            .collect())
    }
}
