//! Handler for `POST /reviews/{productId}`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use closet_core::error::CoreError;
use closet_core::types::DbId;
use closet_core::validation::validate_request;
use closet_db::models::review::{Review, UpsertReview};
use closet_db::repositories::{ProductRepo, ReviewRepo};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct ReviewRequest {
    #[validate(range(min = 1, max = 5, message = "must be between 1 and 5"))]
    pub rating: i16,
    #[validate(length(max = 2000, message = "must be at most 2000 characters"))]
    pub comment: Option<String>,
}

/// POST /api/v1/reviews/{productId}
///
/// One review per user and product: a second post replaces the first (200).
pub async fn upsert(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(product_id): Path<DbId>,
    AppJson(input): AppJson<ReviewRequest>,
) -> AppResult<(StatusCode, Json<Review>)> {
    validate_request(&input)?;
    if !ProductRepo::exists(&state.pool, product_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Product",
            id: product_id,
        }));
    }

    let comment = input
        .comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());
    let (review, inserted) = ReviewRepo::upsert(
        &state.pool,
        auth.user_id,
        product_id,
        &UpsertReview {
            rating: input.rating,
            comment,
        },
    )
    .await?;

    let status = if inserted {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(review)))
}
