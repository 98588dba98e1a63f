//! Order and order item models and DTOs.

use closet_core::checkout::PaymentMethod;
use closet_core::order_status::{OrderStatus, StatusId};
use closet_core::types::{Cents, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `orders` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: DbId,
    pub user_id: DbId,
    pub status_id: StatusId,
    pub total_cents: Cents,
    pub payment_method: String,
    pub payment_ref: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: String,
    pub shipping_address: Option<String>,
    pub shipping_city: Option<String>,
    pub shipping_country: Option<String>,
    pub shipping_zip: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Order {
    /// Decoded status. `None` only if the lookup table and the enum disagree.
    pub fn status(&self) -> Option<OrderStatus> {
        OrderStatus::from_id(self.status_id)
    }
}

/// Immutable snapshot of one purchased product.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: DbId,
    pub order_id: DbId,
    /// Cleared when the product is deleted from the catalog.
    pub product_id: Option<DbId>,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price_cents: Cents,
    pub created_at: Timestamp,
}

/// An order with its decoded status and line items, as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub status: Option<OrderStatus>,
    pub items: Vec<OrderItem>,
}

impl OrderWithItems {
    pub fn new(order: Order, items: Vec<OrderItem>) -> Self {
        Self {
            status: order.status(),
            order,
            items,
        }
    }
}

/// Customer and shipping snapshot taken at checkout.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CustomerDetails {
    pub name: Option<String>,
    pub email: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub zip: Option<String>,
}

/// DTO for opening a pending order.
#[derive(Debug, Clone)]
pub struct CreateOrder {
    pub user_id: DbId,
    pub payment_method: PaymentMethod,
    pub customer: CustomerDetails,
}
