//! Checkout and payment confirmation.
//!
//! [`start_checkout`] turns a user's cart into a pending order inside one
//! transaction and opens a payment with the gateway before committing.
//! [`apply_payment_outcome`] settles that order when the gateway reports
//! back through its webhook.

use std::time::Duration;

use closet_core::checkout::{plan_checkout, PaymentMethod};
use closet_core::error::CoreError;
use closet_core::order_status::OrderStatus;
use closet_core::payment::PaymentOutcome;
use closet_core::types::DbId;
use closet_db::models::order::{CreateOrder, CustomerDetails};
use closet_db::repositories::{CartRepo, OrderRepo, ProductRepo, UserLock, UserRepo};
use closet_db::DbPool;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::payment::PaymentRequest;
use crate::state::AppState;

/// Response to a started checkout: where to pay, and for which order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutStarted {
    pub url: String,
    pub order_id: DbId,
}

/// Create a pending order from the cart of `user_id` and open its payment.
///
/// Locks the user row, the cart lines and their product rows for the whole
/// transaction. A second checkout for the same user while one is open gets
/// `Conflict` at once rather than waiting. Stock is taken per item; if the gateway call fails or times
/// out the transaction is dropped uncommitted, so no order, item or stock
/// change survives. The cart itself is left alone until payment succeeds.
pub async fn start_checkout(
    state: &AppState,
    user_id: DbId,
    payment_method: PaymentMethod,
    customer: CustomerDetails,
) -> AppResult<CheckoutStarted> {
    let mut tx = state.pool.begin().await?;

    match UserRepo::lock_for_checkout(&mut tx, user_id).await? {
        UserLock::Acquired => {}
        UserLock::Busy => {
            return Err(CoreError::Conflict(
                "A checkout is already in progress for this account".into(),
            )
            .into());
        }
        UserLock::Missing => {
            return Err(CoreError::Unauthorized("User no longer exists".into()).into());
        }
    }

    let lines = CartRepo::lock_for_checkout(&mut tx, user_id).await?;
    let plan = plan_checkout(&lines)?;
    if !plan.unavailable.is_empty() {
        tracing::warn!(
            user_id,
            unavailable = ?plan.unavailable,
            "Skipping out-of-stock cart lines at checkout"
        );
    }

    let order = OrderRepo::create(
        &mut tx,
        &CreateOrder {
            user_id,
            payment_method,
            customer: customer.clone(),
        },
    )
    .await?;

    for item in &plan.items {
        OrderRepo::add_item(&mut tx, order.id, item).await?;
        ProductRepo::take_stock(&mut tx, item.product_id, item.quantity).await?;
    }
    OrderRepo::set_total(&mut tx, order.id, plan.total_cents).await?;

    let request = PaymentRequest {
        order_id: order.id,
        user_id,
        email: customer.email,
        customer_name: customer.name,
        amount_cents: plan.total_cents,
        currency: state.config.paystack.currency.clone(),
        payment_method,
        callback_url: state.config.payment_callback_url(order.id),
    };

    let timeout = Duration::from_secs(state.config.paystack.timeout_secs);
    let session = match tokio::time::timeout(timeout, state.gateway.initialize(&request)).await {
        Ok(Ok(session)) => session,
        Ok(Err(e)) => {
            return Err(CoreError::PaymentInitiationFailed(e.to_string()).into());
        }
        Err(_) => {
            return Err(CoreError::PaymentInitiationFailed(format!(
                "gateway did not answer within {}s",
                timeout.as_secs()
            ))
            .into());
        }
    };

    OrderRepo::set_payment_ref(&mut tx, order.id, &session.reference).await?;
    tx.commit().await?;

    tracing::info!(
        user_id,
        order_id = order.id,
        total_cents = plan.total_cents,
        items = plan.items.len(),
        reference = %session.reference,
        "Checkout started"
    );

    Ok(CheckoutStarted {
        url: session.authorization_url,
        order_id: order.id,
    })
}

/// What a webhook delivery did to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentEffect {
    /// Order moved to `paid` and its owner's cart was emptied.
    Paid { order_id: DbId, cleared_lines: u64 },
    /// Order moved to `failed` and its stock was returned.
    Failed { order_id: DbId, restocked: u64 },
    /// The order exists but was no longer pending; nothing changed.
    AlreadySettled { order_id: DbId },
    UnknownOrder { order_id: DbId },
    Ignored { event: String },
}

/// Apply a verified gateway outcome exactly once.
///
/// The `pending` status guard on the order is the idempotency marker: a
/// replayed event finds the order already settled and changes nothing.
pub async fn apply_payment_outcome(
    pool: &DbPool,
    outcome: PaymentOutcome,
) -> Result<PaymentEffect, AppError> {
    match outcome {
        PaymentOutcome::Succeeded {
            order_id,
            reference,
        } => {
            let mut tx = pool.begin().await?;
            let paid = OrderRepo::transition(
                &mut tx,
                order_id,
                OrderStatus::Pending,
                OrderStatus::Paid,
                Some(&reference),
            )
            .await?;
            let Some(order) = paid else {
                return unsettled(pool, order_id).await;
            };
            let cleared_lines = CartRepo::clear(&mut tx, order.user_id).await?;
            tx.commit().await?;
            Ok(PaymentEffect::Paid {
                order_id,
                cleared_lines,
            })
        }
        PaymentOutcome::Failed {
            order_id,
            reference,
        } => {
            let mut tx = pool.begin().await?;
            let failed = OrderRepo::transition(
                &mut tx,
                order_id,
                OrderStatus::Pending,
                OrderStatus::Failed,
                reference.as_deref(),
            )
            .await?;
            if failed.is_none() {
                return unsettled(pool, order_id).await;
            }
            let restocked = ProductRepo::restore_stock_for_order(&mut tx, order_id).await?;
            tx.commit().await?;
            Ok(PaymentEffect::Failed {
                order_id,
                restocked,
            })
        }
        PaymentOutcome::Ignored { event } => Ok(PaymentEffect::Ignored { event }),
    }
}

/// Tell a replay apart from an event for an order that does not exist.
async fn unsettled(pool: &DbPool, order_id: DbId) -> Result<PaymentEffect, AppError> {
    Ok(match OrderRepo::find_by_id(pool, order_id).await? {
        Some(_) => PaymentEffect::AlreadySettled { order_id },
        None => PaymentEffect::UnknownOrder { order_id },
    })
}
