//! Handlers for the `/orders` resource (checkout and order history).

use axum::extract::{Path, State};
use axum::Json;
use closet_core::checkout::PaymentMethod;
use closet_core::error::CoreError;
use closet_core::types::DbId;
use closet_core::validation::validate_request;
use closet_db::models::order::{CustomerDetails, OrderWithItems};
use closet_db::repositories::OrderRepo;
use serde::Deserialize;
use validator::Validate;

use crate::checkout::{start_checkout, CheckoutStarted};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Request body for `POST /orders/checkout`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub name: Option<String>,
    #[validate(email(message = "is required for payment"))]
    pub email: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub zip: Option<String>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

/// POST /api/v1/orders/checkout
pub async fn checkout(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(input): AppJson<CheckoutRequest>,
) -> AppResult<Json<CheckoutStarted>> {
    validate_request(&input)?;

    let customer = CustomerDetails {
        name: input.name,
        email: input.email.trim().to_string(),
        address: input.address,
        city: input.city,
        country: input.country,
        zip: input.zip,
    };
    let started = start_checkout(&state, auth.user_id, input.payment_method, customer).await?;
    Ok(Json(started))
}

/// GET /api/v1/orders/mine
pub async fn mine(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Vec<OrderWithItems>>> {
    let orders = OrderRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(orders))
}

/// GET /api/v1/orders/{id}
///
/// Another user's order is reported as not found.
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<OrderWithItems>> {
    let order = OrderRepo::find_for_user(&state.pool, id, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Order",
            id,
        }))?;
    Ok(Json(order))
}
