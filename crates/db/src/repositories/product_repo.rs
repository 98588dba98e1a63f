//! Repository for the `products` table.

use closet_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::product::{
    CategoryCount, CreateProduct, Product, ProductFilter, ProductWithRating, UpdateProduct,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, category, price_cents, image_url, images, description, \
                        stock, sizes, colors, gender, created_at, updated_at";

/// Product columns qualified for the review join, plus the rating aggregate.
const RATED_SELECT: &str = "SELECT p.id, p.name, p.category, p.price_cents, p.image_url, \
        p.images, p.description, p.stock, p.sizes, p.colors, p.gender, \
        p.created_at, p.updated_at, \
        AVG(r.rating)::float8 AS avg_rating, COUNT(r.id) AS review_count \
     FROM products p \
     LEFT JOIN reviews r ON r.product_id = p.id";

/// Provides CRUD and stock operations for catalog products.
pub struct ProductRepo;

impl ProductRepo {
    /// Insert a new product, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateProduct) -> Result<Product, sqlx::Error> {
        let query = format!(
            "INSERT INTO products
                (name, category, price_cents, image_url, images, description,
                 stock, sizes, colors, gender)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(&input.name)
            .bind(&input.category)
            .bind(input.price_cents)
            .bind(&input.image_url)
            .bind(&input.images)
            .bind(&input.description)
            .bind(input.stock)
            .bind(&input.sizes)
            .bind(&input.colors)
            .bind(&input.gender)
            .fetch_one(pool)
            .await
    }

    /// Find a product by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE id = $1");
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a product with its review summary.
    pub async fn find_rated(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ProductWithRating>, sqlx::Error> {
        let query = format!("{RATED_SELECT} WHERE p.id = $1 GROUP BY p.id");
        sqlx::query_as::<_, ProductWithRating>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List products matching `filter`, ordered by id.
    pub async fn list(
        pool: &PgPool,
        filter: &ProductFilter,
    ) -> Result<Vec<ProductWithRating>, sqlx::Error> {
        let query = format!(
            "{RATED_SELECT}
             WHERE ($1::text IS NULL OR p.gender = $1)
               AND ($2::text IS NULL OR p.category = $2)
               AND ($3::text IS NULL
                    OR p.name ILIKE '%' || $3 || '%'
                    OR p.description ILIKE '%' || $3 || '%')
               AND ($4::bigint IS NULL OR p.price_cents >= $4)
               AND ($5::bigint IS NULL OR p.price_cents <= $5)
               AND ($6::text IS NULL OR $6 = ANY(p.sizes))
               AND ($7::text IS NULL OR $7 = ANY(p.colors))
             GROUP BY p.id
             ORDER BY p.id"
        );
        sqlx::query_as::<_, ProductWithRating>(&query)
            .bind(&filter.gender)
            .bind(&filter.category)
            .bind(&filter.search)
            .bind(filter.min_price)
            .bind(filter.max_price)
            .bind(&filter.size)
            .bind(&filter.color)
            .fetch_all(pool)
            .await
    }

    /// Fetch every product whose id is in `ids`.
    pub async fn find_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE id = ANY($1) ORDER BY id");
        sqlx::query_as::<_, Product>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Update a product. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProduct,
    ) -> Result<Option<Product>, sqlx::Error> {
        let query = format!(
            "UPDATE products SET
                name = COALESCE($2, name),
                category = COALESCE($3, category),
                price_cents = COALESCE($4, price_cents),
                image_url = COALESCE($5, image_url),
                images = COALESCE($6, images),
                description = COALESCE($7, description),
                stock = COALESCE($8, stock),
                sizes = COALESCE($9, sizes),
                colors = COALESCE($10, colors),
                gender = COALESCE($11, gender)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.category)
            .bind(input.price_cents)
            .bind(&input.image_url)
            .bind(&input.images)
            .bind(&input.description)
            .bind(input.stock)
            .bind(&input.sizes)
            .bind(&input.colors)
            .bind(&input.gender)
            .fetch_optional(pool)
            .await
    }

    /// Delete a product. Cart lines and reviews cascade; order items keep
    /// their snapshot with a null product reference.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Distinct categories with their product counts, alphabetically.
    pub async fn categories(pool: &PgPool) -> Result<Vec<CategoryCount>, sqlx::Error> {
        sqlx::query_as::<_, CategoryCount>(
            "SELECT category, COUNT(*) AS count FROM products
             GROUP BY category
             ORDER BY category",
        )
        .fetch_all(pool)
        .await
    }

    /// Categories ordered by product count, largest first. Ties sort by name.
    pub async fn categories_by_count(pool: &PgPool) -> Result<Vec<CategoryCount>, sqlx::Error> {
        sqlx::query_as::<_, CategoryCount>(
            "SELECT category, COUNT(*) AS count FROM products
             GROUP BY category
             ORDER BY count DESC, category",
        )
        .fetch_all(pool)
        .await
    }

    /// Move every product in category `from` to `to`. Returns rows changed.
    pub async fn rename_category(pool: &PgPool, from: &str, to: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE products SET category = $2 WHERE category = $1")
            .bind(from)
            .bind(to)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    // -----------------------------------------------------------------------
    // Stock (transaction-scoped)
    // -----------------------------------------------------------------------

    /// Take `quantity` units of stock. The caller must hold the row lock.
    ///
    /// Fails with a check violation if stock would go negative.
    pub async fn take_stock(
        conn: &mut PgConnection,
        id: DbId,
        quantity: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE products SET stock = stock - $2 WHERE id = $1")
            .bind(id)
            .bind(quantity)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Return the stock taken by every item of an order to its product.
    ///
    /// Items whose product has since been deleted are ignored. Returns the
    /// number of products updated.
    pub async fn restore_stock_for_order(
        conn: &mut PgConnection,
        order_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE products p SET stock = p.stock + taken.quantity
             FROM (
                 SELECT product_id, SUM(quantity)::int AS quantity
                 FROM order_items
                 WHERE order_id = $1 AND product_id IS NOT NULL
                 GROUP BY product_id
             ) taken
             WHERE p.id = taken.product_id",
        )
        .bind(order_id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }
}
