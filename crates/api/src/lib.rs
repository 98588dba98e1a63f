//! Closet storefront API server library.
//!
//! Exposes config, state, error handling, routes and the checkout service
//! so integration tests and the binary entrypoint share them.

pub mod auth;
pub mod checkout;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod payment;
pub mod router;
pub mod routes;
pub mod state;
