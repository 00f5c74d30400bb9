//! SQLite incident store
//!
//! Relational backend for the incident list. Filter requests compile to a
//! parameterized WHERE clause over a `LEFT JOIN` of incidents and their
//! attribute rows. File databases run with:
//! - WAL mode for concurrent reads during writes
//! - In-memory temp storage for fast queries
//!
//! The path `:memory:` opens a private in-process database on a single
//! connection.

mod migrations;
pub mod repositories;
mod repository_impl;
pub mod schema;

pub use sqlx::SqlitePool;

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::ConnectOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use tracing::log::LevelFilter;

use crate::core::constants::{
    SQLITE_BUSY_TIMEOUT_SECS, SQLITE_CACHE_SIZE, SQLITE_MAX_CONNECTIONS, SQLITE_MEMORY_PATH,
};
use crate::data::error::DataError;
use crate::data::filters::FilterSemantics;

/// SQLite database service
///
/// Should be created once at startup and shared through the incident store.
pub struct SqliteService {
    pool: SqlitePool,
    semantics: FilterSemantics,
}

impl SqliteService {
    /// Initialize the database service
    ///
    /// Creates the database file if it doesn't exist, configures connection
    /// options and applies the schema.
    pub async fn init(path: &Path, semantics: FilterSemantics) -> Result<Self, DataError> {
        let pool = if path.as_os_str() == SQLITE_MEMORY_PATH {
            let options = SqliteConnectOptions::from_str("sqlite::memory:")?
                .foreign_keys(true)
                .log_statements(LevelFilter::Trace);
            // Every connection to :memory: is a separate database
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            let options = SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .foreign_keys(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                .busy_timeout(Duration::from_secs(SQLITE_BUSY_TIMEOUT_SECS))
                .pragma("cache_size", SQLITE_CACHE_SIZE)
                .pragma("temp_store", "MEMORY")
                .log_statements(LevelFilter::Trace);

            SqlitePoolOptions::new()
                .max_connections(SQLITE_MAX_CONNECTIONS)
                .connect_with(options)
                .await?
        };

        migrations::run_migrations(&pool).await?;

        tracing::debug!(path = %path.display(), %semantics, "SqliteService initialized");
        Ok(Self { pool, semantics })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn semantics(&self) -> FilterSemantics {
        self.semantics
    }

    /// Create a SqliteService from an existing pool (primarily for testing)
    #[cfg(test)]
    pub fn from_pool(pool: SqlitePool, semantics: FilterSemantics) -> Self {
        Self { pool, semantics }
    }

    /// Close the connection pool gracefully
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("SQLite pool closed");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::data::filters::{ComplexFilter, Filter, FilterRequest, Junction};
    use crate::data::traits::IncidentRepository;
    use crate::data::types::NewIncident;

    #[tokio::test]
    async fn test_init_in_memory() {
        let service = SqliteService::init(Path::new(SQLITE_MEMORY_PATH), FilterSemantics::Legacy)
            .await
            .unwrap();
        let service = Arc::new(service);

        let created = service
            .add_incident(NewIncident::new("Sally", "Open"))
            .await
            .unwrap();
        let fetched = service.get_incident(created.id).await.unwrap();

        assert_eq!(fetched, Some(created));
        assert_eq!(service.backend_name(), "sqlite");
        service.close().await;
    }

    #[tokio::test]
    async fn test_from_pool_uses_configured_semantics() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        let service = Arc::new(SqliteService::from_pool(pool, FilterSemantics::Consistent));

        service
            .add_incident(NewIncident::new("Sally", "Open"))
            .await
            .unwrap();
        service
            .add_incident(NewIncident::new("Jake", "Closed"))
            .await
            .unwrap();

        // Or is honored under consistent semantics, ignored under legacy
        let request = FilterRequest::new(
            Junction::Or,
            vec![
                ComplexFilter::leaves(Junction::And, vec![Filter::equals("reporter", "Sally")]),
                ComplexFilter::leaves(Junction::And, vec![Filter::equals("reporter", "Jake")]),
            ],
        );
        let listed = service.list_incidents(Some(&request)).await.unwrap();
        assert_eq!(listed.len(), 2);
    }

    #[tokio::test]
    async fn test_init_file_database() {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("incidents-test-{}", nanos));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("incidents.db");

        {
            let service = Arc::new(
                SqliteService::init(&path, FilterSemantics::Legacy)
                    .await
                    .unwrap(),
            );
            service
                .add_incident(NewIncident::new("Sally", "Open"))
                .await
                .unwrap();
            service.close().await;
        }

        let reopened = Arc::new(
            SqliteService::init(&path, FilterSemantics::Legacy)
                .await
                .unwrap(),
        );
        assert_eq!(reopened.list_incidents(None).await.unwrap().len(), 1);
        reopened.close().await;

        std::fs::remove_dir_all(&dir).ok();
    }
}
