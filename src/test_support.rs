use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::db::transaction_queries;

/// A fresh in-memory store. One connection, so every query sees the same database.
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    transaction_queries::create_table(&pool)
        .await
        .expect("create transactions table");
    pool
}
