//! Store-wide aggregates for the admin overview.

use closet_core::order_status::{OrderStatus, StatusId};
use sqlx::PgPool;

use crate::models::stats::StoreOverview;

/// Statuses whose totals count as revenue.
const REVENUE_STATUSES: [OrderStatus; 3] =
    [OrderStatus::Paid, OrderStatus::Shipped, OrderStatus::Completed];

pub struct StatsRepo;

impl StatsRepo {
    pub async fn overview(pool: &PgPool) -> Result<StoreOverview, sqlx::Error> {
        let revenue: Vec<StatusId> = REVENUE_STATUSES.iter().map(|s| s.id()).collect();
        sqlx::query_as::<_, StoreOverview>(
            "SELECT
                (SELECT COUNT(*) FROM users) AS user_count,
                (SELECT COUNT(*) FROM products) AS product_count,
                (SELECT COUNT(*) FROM orders) AS order_count,
                (SELECT COALESCE(SUM(total_cents), 0)::bigint
                   FROM orders WHERE status_id = ANY($1)) AS revenue_cents,
                (SELECT COUNT(*) FROM orders WHERE status_id = $2) AS pending_orders,
                (SELECT COUNT(*) FROM orders WHERE status_id = $3) AS shipped_orders,
                (SELECT COUNT(*) FROM products WHERE stock > 0) AS in_stock_products,
                (SELECT COUNT(*) FROM reviews) AS review_count,
                (SELECT AVG(rating)::float8 FROM reviews) AS average_rating",
        )
        .bind(&revenue)
        .bind(OrderStatus::Pending.id())
        .bind(OrderStatus::Shipped.id())
        .fetch_one(pool)
        .await
    }
}
