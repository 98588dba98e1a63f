//! Catalog product model and DTOs.

use closet_core::types::{Cents, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Audience a product is listed under.
pub const GENDERS: [&str; 4] = ["men", "women", "boys", "girls"];

/// A row from the `products` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: DbId,
    pub name: String,
    pub category: String,
    pub price_cents: Cents,
    pub image_url: String,
    pub images: Vec<String>,
    pub description: String,
    pub stock: i32,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub gender: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A product with its aggregated review score.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductWithRating {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub product: Product,
    /// Mean rating, `None` when the product has no reviews.
    pub avg_rating: Option<f64>,
    pub review_count: i64,
}

/// DTO for creating a product.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProduct {
    pub name: String,
    pub category: String,
    pub price_cents: Cents,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    pub gender: String,
}

/// DTO for updating a product. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price_cents: Option<Cents>,
    pub image_url: Option<String>,
    pub images: Option<Vec<String>>,
    pub description: Option<String>,
    pub stock: Option<i32>,
    pub sizes: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
    pub gender: Option<String>,
}

/// Catalog listing filters. Every field narrows the result when present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    pub gender: Option<String>,
    pub category: Option<String>,
    /// Case-insensitive substring of name or description.
    pub search: Option<String>,
    pub min_price: Option<Cents>,
    pub max_price: Option<Cents>,
    pub size: Option<String>,
    pub color: Option<String>,
}

/// A category name with the number of products in it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}
