//! Password reset tokens.
//!
//! A reset token is 64 hex characters of randomness. Like refresh tokens,
//! only its SHA-256 hash is stored.

use uuid::Uuid;

use crate::auth::jwt::hash_refresh_token;

/// How long an issued reset link stays valid.
pub const RESET_TOKEN_TTL_MINS: i64 = 60;

/// Returns `(plaintext_token, sha256_hex_hash)`.
pub fn generate_reset_token() -> (String, String) {
    let plaintext = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
    let hash = hash_reset_token(&plaintext);
    (plaintext, hash)
}

pub fn hash_reset_token(token: &str) -> String {
    hash_refresh_token(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_tokens_are_long_hex_and_unique() {
        let (first, first_hash) = generate_reset_token();
        let (second, _) = generate_reset_token();

        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(first, second);
        assert_eq!(first_hash, hash_reset_token(&first));
    }
}
