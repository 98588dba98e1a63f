//! Handlers for the `/cart` resource.
//!
//! Every route acts on the caller's own cart. A line is addressed by
//! product id plus optional size and color.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use closet_core::cart::{reconcile, validate_quantity, CartEntry, CartKey};
use closet_core::error::CoreError;
use closet_core::types::DbId;
use closet_db::models::cart::{CartLine, CartLineWithProduct};
use closet_db::repositories::{CartRepo, ProductRepo};
use closet_db::ServerCartRepository;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: DbId,
    pub quantity: i32,
    pub size: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub quantity: i32,
    pub size: Option<String>,
    pub color: Option<String>,
}

/// Variant selector for `DELETE /cart/{productId}`.
#[derive(Debug, Default, Deserialize)]
pub struct VariantQuery {
    pub size: Option<String>,
    pub color: Option<String>,
}

/// Body of `POST /cart/merge`.
///
/// Items stay raw JSON so one malformed entry from client storage cannot
/// sink the rest of the batch.
#[derive(Debug, Deserialize)]
pub struct MergeCartRequest {
    #[serde(default)]
    pub items: Vec<Value>,
}

/// Split raw merge items into usable entries and a count of the rest.
fn parse_entries(items: Vec<Value>) -> (Vec<CartEntry>, usize) {
    let total = items.len();
    let entries: Vec<CartEntry> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    let malformed = total - entries.len();
    (entries, malformed)
}

fn line_not_found(product_id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "CartLine",
        id: product_id,
    })
}

/// GET /api/v1/cart
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Vec<CartLineWithProduct>>> {
    let lines = CartRepo::list_with_products(&state.pool, auth.user_id).await?;
    Ok(Json(lines))
}

/// POST /api/v1/cart
///
/// Adds to an existing line with the same variant (200) or creates one (201).
pub async fn add(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(input): AppJson<AddToCartRequest>,
) -> AppResult<(StatusCode, Json<CartLine>)> {
    validate_quantity(input.quantity)?;
    if !ProductRepo::exists(&state.pool, input.product_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Product",
            id: input.product_id,
        }));
    }

    let key = CartKey::new(input.product_id, input.size, input.color);
    let (line, inserted) = CartRepo::add(&state.pool, auth.user_id, &key, input.quantity).await?;

    let status = if inserted {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(line)))
}

/// PUT /api/v1/cart/{productId}
///
/// Overwrites the quantity of an existing line.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(product_id): Path<DbId>,
    AppJson(input): AppJson<UpdateCartRequest>,
) -> AppResult<Json<CartLine>> {
    validate_quantity(input.quantity)?;
    let key = CartKey::new(product_id, input.size, input.color);

    let line = CartRepo::set_quantity(&state.pool, auth.user_id, &key, input.quantity)
        .await?
        .ok_or_else(|| line_not_found(product_id))?;
    Ok(Json(line))
}

/// DELETE /api/v1/cart/{productId}?size=&color=
pub async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(product_id): Path<DbId>,
    Query(variant): Query<VariantQuery>,
) -> AppResult<Json<Value>> {
    let key = CartKey::new(product_id, variant.size, variant.color);
    if !CartRepo::remove(&state.pool, auth.user_id, &key).await? {
        return Err(line_not_found(product_id));
    }
    Ok(Json(json!({ "success": true })))
}

/// POST /api/v1/cart/merge
///
/// Folds the client-held cart into the caller's cart and returns the result.
/// Bad entries, including ones that are not valid cart entries at all, are
/// skipped rather than failing the batch.
pub async fn merge(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(input): AppJson<MergeCartRequest>,
) -> AppResult<Json<Vec<CartLineWithProduct>>> {
    let (entries, malformed) = parse_entries(input.items);
    let repo = ServerCartRepository::new(state.pool.clone());
    let merged = reconcile(&repo, auth.user_id, &entries).await?;

    let skipped = merged.skipped + malformed;
    if skipped > 0 {
        tracing::warn!(
            user_id = auth.user_id,
            skipped,
            malformed,
            "Skipped invalid entries while merging cart"
        );
    }
    tracing::info!(
        user_id = auth.user_id,
        applied = merged.applied,
        lines = merged.lines.len(),
        "Merged local cart"
    );

    let lines = CartRepo::attach_products(&state.pool, merged.lines).await?;
    Ok(Json(lines))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parse_entries_keeps_valid_items_and_counts_the_rest() {
        let items = vec![
            json!({ "productId": 1, "quantity": 2, "size": "M" }),
            json!({ "productId": 1 }),
            json!(null),
            json!({ "productId": 2, "quantity": "3" }),
            json!({ "productId": 3, "quantity": 1.5 }),
            json!({ "productId": 4, "quantity": 1 }),
        ];

        let (entries, malformed) = parse_entries(items);

        assert_eq!(malformed, 4);
        assert_eq!(
            entries,
            vec![
                CartEntry::new(1, 2, Some("M".into()), None),
                CartEntry::new(4, 1, None, None),
            ]
        );
    }
}
