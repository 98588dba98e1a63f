//! Repository for the `orders` and `order_items` tables.

use std::collections::HashMap;

use closet_core::checkout::PlannedItem;
use closet_core::order_status::{OrderStatus, StatusId};
use closet_core::types::{Cents, DbId};
use sqlx::{PgConnection, PgPool};

use crate::models::order::{CreateOrder, Order, OrderItem, OrderWithItems};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, status_id, total_cents, payment_method, payment_ref, \
                        customer_name, customer_email, shipping_address, shipping_city, \
                        shipping_country, shipping_zip, created_at, updated_at";

const ITEM_COLUMNS: &str =
    "id, order_id, product_id, product_name, quantity, unit_price_cents, created_at";

/// Provides order persistence and status transitions.
pub struct OrderRepo;

impl OrderRepo {
    // -----------------------------------------------------------------------
    // Checkout (transaction-scoped)
    // -----------------------------------------------------------------------

    /// Open a `pending` order with a zero total.
    pub async fn create(conn: &mut PgConnection, input: &CreateOrder) -> Result<Order, sqlx::Error> {
        let query = format!(
            "INSERT INTO orders
                (user_id, status_id, total_cents, payment_method, customer_name,
                 customer_email, shipping_address, shipping_city, shipping_country, shipping_zip)
             VALUES ($1, $2, 0, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(input.user_id)
            .bind(OrderStatus::Pending.id())
            .bind(input.payment_method.as_str())
            .bind(&input.customer.name)
            .bind(&input.customer.email)
            .bind(&input.customer.address)
            .bind(&input.customer.city)
            .bind(&input.customer.country)
            .bind(&input.customer.zip)
            .fetch_one(&mut *conn)
            .await
    }

    /// Write one item snapshot for `order_id`.
    pub async fn add_item(
        conn: &mut PgConnection,
        order_id: DbId,
        item: &PlannedItem,
    ) -> Result<OrderItem, sqlx::Error> {
        let query = format!(
            "INSERT INTO order_items (order_id, product_id, product_name, quantity, unit_price_cents)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {ITEM_COLUMNS}"
        );
        sqlx::query_as::<_, OrderItem>(&query)
            .bind(order_id)
            .bind(item.product_id)
            .bind(&item.product_name)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .fetch_one(&mut *conn)
            .await
    }

    pub async fn set_total(
        conn: &mut PgConnection,
        id: DbId,
        total_cents: Cents,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE orders SET total_cents = $2 WHERE id = $1")
            .bind(id)
            .bind(total_cents)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Record the gateway's reference for the payment attempt.
    pub async fn set_payment_ref(
        conn: &mut PgConnection,
        id: DbId,
        reference: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE orders SET payment_ref = $2 WHERE id = $1")
            .bind(id)
            .bind(reference)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Status changes
    // -----------------------------------------------------------------------

    /// Move the order from `from` to `to` only if it is still in `from`.
    ///
    /// The status guard makes the change happen at most once: a replay
    /// finds no matching row and gets `None`. A `Some` reference replaces
    /// the stored `payment_ref`.
    pub async fn transition(
        conn: &mut PgConnection,
        id: DbId,
        from: OrderStatus,
        to: OrderStatus,
        reference: Option<&str>,
    ) -> Result<Option<Order>, sqlx::Error> {
        let query = format!(
            "UPDATE orders SET
                status_id = $3,
                payment_ref = COALESCE($4, payment_ref)
             WHERE id = $1 AND status_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .bind(from.id())
            .bind(to.id())
            .bind(reference)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Read an order and hold its row lock for the rest of the transaction.
    pub async fn find_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Order>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM orders WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Unconditionally set the status. Callers validate the transition.
    pub async fn set_status(
        conn: &mut PgConnection,
        id: DbId,
        status: OrderStatus,
    ) -> Result<Order, sqlx::Error> {
        let query = format!("UPDATE orders SET status_id = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .bind(StatusId::from(status))
            .fetch_one(&mut *conn)
            .await
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Order>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM orders WHERE id = $1");
        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an order owned by `user_id`, with its items.
    pub async fn find_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<OrderWithItems>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM orders WHERE id = $1 AND user_id = $2");
        let order = sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
        match order {
            Some(order) => Ok(Self::with_items(pool, vec![order]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Orders of `user_id`, newest first, with items.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<OrderWithItems>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        let orders = sqlx::query_as::<_, Order>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await?;
        Self::with_items(pool, orders).await
    }

    /// Every order, newest first, with items.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<OrderWithItems>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM orders ORDER BY created_at DESC, id DESC");
        let orders = sqlx::query_as::<_, Order>(&query).fetch_all(pool).await?;
        Self::with_items(pool, orders).await
    }

    pub async fn items_for_order(
        pool: &PgPool,
        order_id: DbId,
    ) -> Result<Vec<OrderItem>, sqlx::Error> {
        let query = format!("SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY id");
        sqlx::query_as::<_, OrderItem>(&query)
            .bind(order_id)
            .fetch_all(pool)
            .await
    }

    /// Load items for all `orders` in one query, keeping the input order.
    async fn with_items(
        pool: &PgPool,
        orders: Vec<Order>,
    ) -> Result<Vec<OrderWithItems>, sqlx::Error> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<DbId> = orders.iter().map(|o| o.id).collect();
        let query = format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = ANY($1) ORDER BY id"
        );
        let items = sqlx::query_as::<_, OrderItem>(&query)
            .bind(&ids)
            .fetch_all(pool)
            .await?;

        let mut by_order: HashMap<DbId, Vec<OrderItem>> = HashMap::new();
        for item in items {
            by_order.entry(item.order_id).or_default().push(item);
        }

        Ok(orders
            .into_iter()
            .map(|order| {
                let items = by_order.remove(&order.id).unwrap_or_default();
                OrderWithItems::new(order, items)
            })
            .collect())
    }
}
