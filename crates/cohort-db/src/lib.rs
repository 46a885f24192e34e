//! # Cohort DB
//!
//! Database pool and locking utilities for the Cohort API.
//!
//! - [`init_db_pool`]: PostgreSQL pool from `DATABASE_URL`
//! - [`locks`]: transaction-scoped advisory locks that serialize work per
//!   student and per scheduling date
//!
//! # Example
//!
//! ```ignore
//! use cohort_db::{init_db_pool, locks::{LockScope, acquire}};
//!
//! let pool = init_db_pool().await;
//! let mut tx = pool.begin().await?;
//! acquire(&mut tx, LockScope::Student(student_id)).await?;
//! // ... reads and writes for this student ...
//! tx.commit().await?;
//! ```

pub mod locks;

use std::env;

/// Initializes a PostgreSQL connection pool.
///
/// # Panics
///
/// Panics if `DATABASE_URL` is not set or the connection fails.
pub async fn init_db_pool() -> sqlx::PgPool {
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    sqlx::PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to database")
}

/// Applies the migrations embedded from `./migrations`.
pub async fn run_migrations(pool: &sqlx::PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}

pub use sqlx::PgPool;
