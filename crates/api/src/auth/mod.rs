//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- access-token signing/validation and refresh-token helpers.
//! - [`reset`] -- single-use password reset tokens.

pub mod jwt;
pub mod password;
pub mod reset;
