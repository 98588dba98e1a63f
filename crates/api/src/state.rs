use std::sync::Arc;

use crate::config::ServerConfig;
use crate::payment::PaymentGateway;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: the pool is reference-counted and the rest sits behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub pool: closet_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Payment provider used at checkout. Tests swap in a fake.
    pub gateway: Arc<dyn PaymentGateway>,
}
