//! Handlers for the `/admin` resource.
//!
//! Every handler takes [`RequireAdmin`], so non-admins get 403 before any
//! query runs.

use axum::extract::{Path, State};
use axum::Json;
use closet_core::error::CoreError;
use closet_core::order_status::OrderStatus;
use closet_core::types::DbId;
use closet_core::validation::validate_request;
use closet_db::models::order::OrderWithItems;
use closet_db::models::product::CategoryCount;
use closet_db::models::stats::StoreOverview;
use closet_db::repositories::{OrderRepo, ProductRepo, StatsRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RenameCategoryRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub old: String,
    #[serde(alias = "new")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub next: String,
}

#[derive(Debug, Serialize)]
pub struct RenameCategoryResponse {
    pub success: bool,
    pub affected: u64,
}

/// GET /api/v1/admin/overview
pub async fn overview(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<StoreOverview>> {
    Ok(Json(StatsRepo::overview(&state.pool).await?))
}

/// GET /api/v1/admin/orders
pub async fn list_orders(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<Vec<OrderWithItems>>> {
    Ok(Json(OrderRepo::list_all(&state.pool).await?))
}

/// PUT /api/v1/admin/orders/{id}/status
///
/// Holds the order row lock while checking the transition so a concurrent
/// webhook cannot settle the order in between.
pub async fn update_order_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateOrderStatusRequest>,
) -> AppResult<Json<OrderWithItems>> {
    let mut tx = state.pool.begin().await?;

    let order = OrderRepo::find_for_update(&mut tx, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Order",
            id,
        })?;
    let current = order
        .status()
        .ok_or_else(|| AppError::InternalError(format!("Unknown status id {}", order.status_id)))?;

    if !current.can_transition_to(input.status) {
        return Err(CoreError::Conflict(format!(
            "Cannot move order from {} to {}",
            current.as_str(),
            input.status.as_str()
        ))
        .into());
    }

    let order = OrderRepo::set_status(&mut tx, id, input.status).await?;
    tx.commit().await?;

    tracing::info!(
        admin_id = admin.user_id,
        order_id = id,
        from = current.as_str(),
        to = input.status.as_str(),
        "Order status changed"
    );

    let items = OrderRepo::items_for_order(&state.pool, id).await?;
    Ok(Json(OrderWithItems::new(order, items)))
}

/// GET /api/v1/admin/categories
///
/// Largest category first, for the back-office category manager.
pub async fn list_categories(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<Vec<CategoryCount>>> {
    Ok(Json(ProductRepo::categories_by_count(&state.pool).await?))
}

/// POST /api/v1/admin/categories/rename
pub async fn rename_category(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppJson(input): AppJson<RenameCategoryRequest>,
) -> AppResult<Json<RenameCategoryResponse>> {
    validate_request(&input)?;
    let old = input.old.trim();
    let next = input.next.trim();
    if old.is_empty() || next.is_empty() {
        return Err(CoreError::Validation("old and next must not be blank".into()).into());
    }

    let affected = ProductRepo::rename_category(&state.pool, old, next).await?;
    tracing::info!(admin_id = admin.user_id, old, next, affected, "Category renamed");
    Ok(Json(RenameCategoryResponse {
        success: true,
        affected,
    }))
}
