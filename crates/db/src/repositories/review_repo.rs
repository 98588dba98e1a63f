//! Repository for the `reviews` table.

use closet_core::types::DbId;
use sqlx::{FromRow, PgPool};

use crate::models::review::{Review, ReviewWithAuthor, UpsertReview};

const COLUMNS: &str = "id, user_id, product_id, rating, comment, created_at, updated_at";

#[derive(FromRow)]
struct UpsertedReview {
    #[sqlx(flatten)]
    review: Review,
    inserted: bool,
}

pub struct ReviewRepo;

impl ReviewRepo {
    /// Create the user's review of a product, or replace the existing one.
    ///
    /// Returns the stored review and whether it was newly inserted.
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        product_id: DbId,
        input: &UpsertReview,
    ) -> Result<(Review, bool), sqlx::Error> {
        let query = format!(
            "INSERT INTO reviews (user_id, product_id, rating, comment)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT ON CONSTRAINT uq_reviews_user_product
             DO UPDATE SET rating = EXCLUDED.rating, comment = EXCLUDED.comment
             RETURNING {COLUMNS}, (xmax = 0) AS inserted"
        );
        let row = sqlx::query_as::<_, UpsertedReview>(&query)
            .bind(user_id)
            .bind(product_id)
            .bind(input.rating)
            .bind(&input.comment)
            .fetch_one(pool)
            .await?;
        Ok((row.review, row.inserted))
    }

    /// Reviews of a product with author names, newest first.
    pub async fn list_for_product(
        pool: &PgPool,
        product_id: DbId,
    ) -> Result<Vec<ReviewWithAuthor>, sqlx::Error> {
        sqlx::query_as::<_, ReviewWithAuthor>(
            "SELECT r.id, r.user_id, r.product_id, r.rating, r.comment,
                    r.created_at, r.updated_at, u.name AS author_name
             FROM reviews r
             JOIN users u ON u.id = r.user_id
             WHERE r.product_id = $1
             ORDER BY r.created_at DESC, r.id DESC",
        )
        .bind(product_id)
        .fetch_all(pool)
        .await
    }
}
