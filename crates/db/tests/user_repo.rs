//! Integration tests for the checkout lock and credential updates on users.

mod common;

use std::time::Duration;

use closet_core::cart::CartKey;
use closet_db::repositories::{CartRepo, UserLock, UserRepo};
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn test_checkout_lock_is_exclusive_per_user(pool: PgPool) {
    let ama = common::customer(&pool, "ama@example.com").await;
    let kofi = common::customer(&pool, "kofi@example.com").await;

    let mut holder = pool.begin().await.unwrap();
    assert_eq!(
        UserRepo::lock_for_checkout(&mut holder, ama.id).await.unwrap(),
        UserLock::Acquired
    );

    let mut rival = pool.begin().await.unwrap();
    assert_eq!(
        UserRepo::lock_for_checkout(&mut rival, ama.id).await.unwrap(),
        UserLock::Busy
    );
    assert_eq!(
        UserRepo::lock_for_checkout(&mut rival, kofi.id).await.unwrap(),
        UserLock::Acquired
    );
    assert_eq!(
        UserRepo::lock_for_checkout(&mut rival, 424_242).await.unwrap(),
        UserLock::Missing
    );
    rival.rollback().await.unwrap();

    holder.commit().await.unwrap();

    let mut next = pool.begin().await.unwrap();
    assert_eq!(
        UserRepo::lock_for_checkout(&mut next, ama.id).await.unwrap(),
        UserLock::Acquired
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_checkout_lock_allows_rows_referencing_the_user(pool: PgPool) {
    let ama = common::customer(&pool, "ama@example.com").await;
    let tee = common::product(&pool, "Tee", 1500, 4).await;

    let mut holder = pool.begin().await.unwrap();
    UserRepo::lock_for_checkout(&mut holder, ama.id).await.unwrap();

    let key = CartKey::new(tee.id, None, None);
    let inserted = tokio::time::timeout(
        Duration::from_secs(2),
        CartRepo::add(&pool, ama.id, &key, 1),
    )
    .await
    .expect("insert should not wait for the lock holder");
    assert!(inserted.unwrap().1);

    holder.rollback().await.unwrap();
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_password_replaces_hash(pool: PgPool) {
    let ama = common::customer(&pool, "ama@example.com").await;

    let mut tx = pool.begin().await.unwrap();
    assert!(UserRepo::update_password(&mut tx, ama.id, "new-hash").await.unwrap());
    assert!(!UserRepo::update_password(&mut tx, 424_242, "x").await.unwrap());
    tx.commit().await.unwrap();

    let stored = UserRepo::find_by_id(&pool, ama.id).await.unwrap().unwrap();
    assert_eq!(stored.password_hash, "new-hash");
}
