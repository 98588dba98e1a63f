//! Shared fixtures for repository tests.

#![allow(dead_code)]

use closet_db::models::product::{CreateProduct, Product};
use closet_db::models::user::{CreateUser, User};
use closet_db::repositories::{ProductRepo, UserRepo};
use sqlx::PgPool;

pub async fn customer(pool: &PgPool, email: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            name: "Test Customer".to_string(),
            email: email.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            role: "customer".to_string(),
        },
    )
    .await
    .unwrap()
}

pub fn new_product(name: &str, price_cents: i64, stock: i32) -> CreateProduct {
    CreateProduct {
        name: name.to_string(),
        category: "Shirts".to_string(),
        price_cents,
        image_url: String::new(),
        images: Vec::new(),
        description: format!("{name} description"),
        stock,
        sizes: vec!["S".to_string(), "M".to_string()],
        colors: vec!["Black".to_string()],
        gender: "men".to_string(),
    }
}

pub async fn product(pool: &PgPool, name: &str, price_cents: i64, stock: i32) -> Product {
    ProductRepo::create(pool, &new_product(name, price_cents, stock))
        .await
        .unwrap()
}
