//! Handlers for the `/products` catalog.
//!
//! Reads are public. Writes require the admin role.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use closet_core::error::CoreError;
use closet_core::types::{Cents, DbId};
use closet_core::validation::validate_request;
use closet_db::models::product::{
    CategoryCount, CreateProduct, Product, ProductFilter, ProductWithRating, UpdateProduct,
    GENDERS,
};
use closet_db::models::review::ReviewWithAuthor;
use closet_db::repositories::{ProductRepo, ReviewRepo};
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

fn validate_gender(gender: &str) -> Result<(), ValidationError> {
    if GENDERS.contains(&gender) {
        Ok(())
    } else {
        Err(ValidationError::new("gender")
            .with_message("must be one of men, women, boys, girls".into()))
    }
}

/// Request body for `POST /products`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub category: String,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub price_cents: Cents,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub stock: i32,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[validate(custom(function = "validate_gender"))]
    pub gender: String,
}

impl CreateProductRequest {
    /// Strip surrounding whitespace from the text fields that must not be
    /// blank, so validation sees what will be stored.
    fn trimmed(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.category = self.category.trim().to_string();
        self
    }
}

impl From<CreateProductRequest> for CreateProduct {
    fn from(r: CreateProductRequest) -> Self {
        Self {
            name: r.name,
            category: r.category,
            price_cents: r.price_cents,
            image_url: r.image_url,
            images: r.images,
            description: r.description,
            stock: r.stock,
            sizes: r.sizes,
            colors: r.colors,
            gender: r.gender,
        }
    }
}

/// Request body for `PUT /products/{id}`. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub category: Option<String>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub price_cents: Option<Cents>,
    pub image_url: Option<String>,
    pub images: Option<Vec<String>>,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub stock: Option<i32>,
    pub sizes: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
    #[validate(custom(function = "validate_gender"))]
    pub gender: Option<String>,
}

impl UpdateProductRequest {
    fn trimmed(mut self) -> Self {
        self.name = self.name.map(|name| name.trim().to_string());
        self.category = self.category.map(|category| category.trim().to_string());
        self
    }
}

impl From<UpdateProductRequest> for UpdateProduct {
    fn from(r: UpdateProductRequest) -> Self {
        Self {
            name: r.name,
            category: r.category,
            price_cents: r.price_cents,
            image_url: r.image_url,
            images: r.images,
            description: r.description,
            stock: r.stock,
            sizes: r.sizes,
            colors: r.colors,
            gender: r.gender,
        }
    }
}

fn product_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Product",
        id,
    })
}

/// GET /api/v1/products
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> AppResult<Json<Vec<ProductWithRating>>> {
    let products = ProductRepo::list(&state.pool, &filter).await?;
    Ok(Json(products))
}

/// GET /api/v1/products/categories
pub async fn categories(State(state): State<AppState>) -> AppResult<Json<Vec<CategoryCount>>> {
    Ok(Json(ProductRepo::categories(&state.pool).await?))
}

/// GET /api/v1/products/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ProductWithRating>> {
    let product = ProductRepo::find_rated(&state.pool, id)
        .await?
        .ok_or_else(|| product_not_found(id))?;
    Ok(Json(product))
}

/// GET /api/v1/products/{id}/reviews
pub async fn reviews(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<ReviewWithAuthor>>> {
    if !ProductRepo::exists(&state.pool, id).await? {
        return Err(product_not_found(id));
    }
    Ok(Json(ReviewRepo::list_for_product(&state.pool, id).await?))
}

/// POST /api/v1/products (admin)
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppJson(input): AppJson<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let input = input.trimmed();
    validate_request(&input)?;
    let product = ProductRepo::create(&state.pool, &input.into()).await?;
    tracing::info!(admin_id = admin.user_id, product_id = product.id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /api/v1/products/{id} (admin)
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateProductRequest>,
) -> AppResult<Json<Product>> {
    let input = input.trimmed();
    validate_request(&input)?;
    let product = ProductRepo::update(&state.pool, id, &input.into())
        .await?
        .ok_or_else(|| product_not_found(id))?;
    tracing::info!(admin_id = admin.user_id, product_id = id, "Product updated");
    Ok(Json(product))
}

/// DELETE /api/v1/products/{id} (admin)
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !ProductRepo::delete(&state.pool, id).await? {
        return Err(product_not_found(id));
    }
    tracing::info!(admin_id = admin.user_id, product_id = id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}
