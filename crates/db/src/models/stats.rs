//! Aggregates for the admin overview.

use closet_core::types::Cents;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreOverview {
    pub user_count: i64,
    pub product_count: i64,
    pub order_count: i64,
    /// Sum of paid, shipped and completed order totals.
    pub revenue_cents: Cents,
    pub pending_orders: i64,
    pub shipped_orders: i64,
    pub in_stock_products: i64,
    pub review_count: i64,
    pub average_rating: Option<f64>,
}
