//! Database migration system
//!
//! Handles schema versioning. Version 1 is the initial schema.

use sqlx::SqlitePool;

use super::schema::{SCHEMA, SCHEMA_VERSION};
use crate::data::error::DataError;

/// Apply the schema unless the database is already at the current version
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), DataError> {
    let table_exists: bool = sqlx::query_scalar(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='schema_version'",
    )
    .fetch_one(pool)
    .await?;

    if table_exists {
        let current_version: i32 =
            sqlx::query_scalar("SELECT version FROM schema_version WHERE id = 1")
                .fetch_optional(pool)
                .await?
                .unwrap_or(0);

        if current_version >= SCHEMA_VERSION {
            tracing::debug!(
                "Database schema is up to date (version {})",
                current_version
            );
            return Ok(());
        }
    }

    apply_schema(pool).await
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), DataError> {
    let start = std::time::Instant::now();

    let mut tx = pool.begin().await?;

    for statement in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        sqlx::query(statement).execute(&mut *tx).await?;
    }

    sqlx::query(
        "INSERT OR REPLACE INTO schema_version (id, version, applied_at) \
         VALUES (1, ?, CAST(strftime('%s', 'now') AS INTEGER))",
    )
    .bind(SCHEMA_VERSION)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::debug!(
        "Applied schema version {} in {}ms",
        SCHEMA_VERSION,
        start.elapsed().as_millis()
    );
    Ok(())
}
