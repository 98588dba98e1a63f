//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument, or `&mut PgConnection` for
//! statements that must run inside a caller-owned transaction.

pub mod cart_repo;
pub mod order_repo;
pub mod password_reset_repo;
pub mod product_repo;
pub mod review_repo;
pub mod session_repo;
pub mod stats_repo;
pub mod user_repo;

pub use cart_repo::CartRepo;
pub use order_repo::OrderRepo;
pub use password_reset_repo::PasswordResetRepo;
pub use product_repo::ProductRepo;
pub use review_repo::ReviewRepo;
pub use session_repo::SessionRepo;
pub use stats_repo::StatsRepo;
pub use user_repo::{UserLock, UserRepo};
