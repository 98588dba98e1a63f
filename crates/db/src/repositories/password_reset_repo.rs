//! Repository for the `password_resets` table.

use closet_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::password_reset::{CreatePasswordReset, PasswordReset};

const COLUMNS: &str = "id, user_id, token_hash, expires_at, used_at, created_at, updated_at";

pub struct PasswordResetRepo;

impl PasswordResetRepo {
    /// Store a new token for a user, retiring any token still open for them.
    pub async fn replace(
        conn: &mut PgConnection,
        input: &CreatePasswordReset,
    ) -> Result<PasswordReset, sqlx::Error> {
        sqlx::query(
            "UPDATE password_resets SET used_at = NOW()
             WHERE user_id = $1 AND used_at IS NULL",
        )
        .bind(input.user_id)
        .execute(&mut *conn)
        .await?;

        let query = format!(
            "INSERT INTO password_resets (user_id, token_hash, expires_at)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PasswordReset>(&query)
            .bind(input.user_id)
            .bind(&input.token_hash)
            .bind(input.expires_at)
            .fetch_one(&mut *conn)
            .await
    }

    /// Redeem a live token by hash, marking it used.
    ///
    /// Returns `None` for an unknown, expired or already used token. The
    /// single conditional update means a token can be redeemed only once.
    pub async fn redeem(
        conn: &mut PgConnection,
        token_hash: &str,
    ) -> Result<Option<PasswordReset>, sqlx::Error> {
        let query = format!(
            "UPDATE password_resets SET used_at = NOW()
             WHERE token_hash = $1
               AND used_at IS NULL
               AND expires_at > NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PasswordReset>(&query)
            .bind(token_hash)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Tokens issued to a user, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<PasswordReset>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM password_resets
             WHERE user_id = $1
             ORDER BY id DESC"
        );
        sqlx::query_as::<_, PasswordReset>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
