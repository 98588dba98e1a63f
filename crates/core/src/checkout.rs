//! Checkout planning: turn locked cart lines into order item snapshots.
//!
//! Pure logic -- no database access. The caller reads the cart lines and
//! product rows inside its transaction, passes them in, and persists the
//! resulting [`CheckoutPlan`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{Cents, DbId};

/// Payment channels offered at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Visa,
    MtnMomo,
    TelecelCash,
    AirteltigoCash,
    Express,
}

impl PaymentMethod {
    /// Database / wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Visa => "visa",
            Self::MtnMomo => "mtn_momo",
            Self::TelecelCash => "telecel_cash",
            Self::AirteltigoCash => "airteltigo_cash",
            Self::Express => "express",
        }
    }
}

/// A cart line joined with its (locked) product row.
#[derive(Debug, Clone)]
pub struct CheckoutLine {
    pub product_id: DbId,
    pub product_name: String,
    pub requested_quantity: i32,
    pub stock: i32,
    pub unit_price_cents: Cents,
}

/// One order item to be written, with stock to take for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedItem {
    pub product_id: DbId,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price_cents: Cents,
}

/// The items and total an order will be created with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutPlan {
    pub items: Vec<PlannedItem>,
    pub total_cents: Cents,
    /// Products dropped because nothing was in stock.
    pub unavailable: Vec<DbId>,
}

/// Quantity that can actually be sold: the request capped at current stock.
pub fn effective_quantity(requested: i32, stock: i32) -> i32 {
    requested.min(stock).max(0)
}

/// Build the order snapshot for `lines`.
///
/// Several lines may share a product (different size or color); they draw
/// on the same stock in input order. Lines with no available stock are
/// skipped. Fails with
/// [`CoreError::EmptyCart`] when there are no lines and with
/// [`CoreError::NoAvailableItems`] when the resulting total is zero.
pub fn plan_checkout(lines: &[CheckoutLine]) -> Result<CheckoutPlan, CoreError> {
    if lines.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    let mut items = Vec::with_capacity(lines.len());
    let mut unavailable = Vec::new();
    let mut total_cents: Cents = 0;
    let mut remaining: HashMap<DbId, i32> = HashMap::new();

    for line in lines {
        let stock = remaining.entry(line.product_id).or_insert(line.stock);
        let quantity = effective_quantity(line.requested_quantity, *stock);
        if quantity <= 0 {
            unavailable.push(line.product_id);
            continue;
        }
        *stock -= quantity;

        total_cents = line
            .unit_price_cents
            .checked_mul(Cents::from(quantity))
            .and_then(|line_total| total_cents.checked_add(line_total))
            .ok_or_else(|| CoreError::Internal("order total overflow".into()))?;

        items.push(PlannedItem {
            product_id: line.product_id,
            product_name: line.product_name.clone(),
            quantity,
            unit_price_cents: line.unit_price_cents,
        });
    }

    if total_cents <= 0 {
        return Err(CoreError::NoAvailableItems);
    }

    Ok(CheckoutPlan {
        items,
        total_cents,
        unavailable,
    })
}
