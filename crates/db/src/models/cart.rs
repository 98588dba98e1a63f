//! Persisted cart line model.

use closet_core::cart::CartLineRef;
use closet_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use super::product::Product;

/// A row from the `cart_items` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: DbId,
    pub user_id: DbId,
    pub product_id: DbId,
    pub quantity: i32,
    pub size: Option<String>,
    pub color: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CartLineRef for CartLine {
    fn product_id(&self) -> DbId {
        self.product_id
    }

    fn quantity(&self) -> i32 {
        self.quantity
    }

    fn size(&self) -> Option<&str> {
        self.size.as_deref()
    }

    fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }
}

/// A cart line together with the product it refers to.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineWithProduct {
    #[serde(flatten)]
    pub line: CartLine,
    pub product: Product,
}
