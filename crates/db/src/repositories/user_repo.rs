//! Repository for the `users` table.

use closet_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, email, password_hash, role, created_at, updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    ///
    /// A duplicate email violates `uq_users_email`.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (name, email, password_hash, role)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.role)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email. Emails are stored lowercased.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Claim the checkout lock on a user for the rest of the transaction.
    ///
    /// Uses `FOR NO KEY UPDATE SKIP LOCKED`, so a second checkout for the
    /// same user sees [`UserLock::Busy`] instead of queueing behind the
    /// first. The weaker row lock still lets other transactions insert rows
    /// that reference this user.
    pub async fn lock_for_checkout(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<UserLock, sqlx::Error> {
        let claimed: Option<(DbId,)> =
            sqlx::query_as("SELECT id FROM users WHERE id = $1 FOR NO KEY UPDATE SKIP LOCKED")
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?;
        if claimed.is_some() {
            return Ok(UserLock::Acquired);
        }

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *conn)
            .await?;
        Ok(if exists {
            UserLock::Busy
        } else {
            UserLock::Missing
        })
    }

    /// Replace the stored password hash. Returns `false` if no row matched.
    pub async fn update_password(
        conn: &mut PgConnection,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Result of [`UserRepo::lock_for_checkout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserLock {
    Acquired,
    /// Another open transaction holds the lock.
    Busy,
    Missing,
}
