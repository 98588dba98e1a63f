//! Domain logic for the closet storefront.
//!
//! This crate has no I/O: persistence lives in `closet-db` and HTTP in
//! `closet-api`. Everything here is unit-testable in isolation.

pub mod cart;
pub mod checkout;
pub mod error;
pub mod order_status;
pub mod payment;
pub mod roles;
pub mod types;
pub mod validation;
