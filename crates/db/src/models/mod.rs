//! Row models and DTOs.
//!
//! Each submodule holds a `FromRow` entity matching its table plus the
//! input structs the repositories accept.

pub mod cart;
pub mod order;
pub mod password_reset;
pub mod product;
pub mod review;
pub mod session;
pub mod stats;
pub mod user;
