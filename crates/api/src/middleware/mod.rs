//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the caller from a JWT Bearer token.
//! - [`auth::MaybeAuthUser`] -- the caller if a valid token is present.
//! - [`rbac::RequireAdmin`] -- requires the `admin` role.

pub mod auth;
pub mod rbac;
