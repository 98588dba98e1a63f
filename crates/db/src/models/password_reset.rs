//! Password reset token model.

use closet_core::types::{DbId, Timestamp};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct PasswordReset {
    pub id: DbId,
    pub user_id: DbId,
    /// SHA-256 hex of the emailed token.
    pub token_hash: String,
    pub expires_at: Timestamp,
    /// Set once the token has been redeemed or superseded.
    pub used_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug)]
pub struct CreatePasswordReset {
    pub user_id: DbId,
    pub token_hash: String,
    pub expires_at: Timestamp,
}
