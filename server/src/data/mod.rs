//! Data storage layer
//!
//! Provides the incident stores and the predicate filter engine:
//! - `filters` - Filter AST, evaluator and SQL/DynamoDB compilers
//! - `memory` - In-process store evaluated with the filter engine
//! - `sqlite` - Relational store (filters compile to a WHERE clause)
//! - `dynamodb` - Wide-column store (filters compile to a Scan FilterExpression)
//! - `types` - Entity types shared by all backends
//! - `traits` - Repository trait implemented by every store
//! - `error` - Unified error type for all backends
//!
//! ## Backend Support
//!
//! `IncidentStore` selects one backend from configuration and hands out an
//! `IncidentRepository` trait object, so callers never match on the backend.

pub mod dynamodb;
pub mod error;
pub mod filters;
pub mod memory;
pub mod sqlite;
pub mod traits;
pub mod types;

pub use dynamodb::DynamodbService;
pub use error::DataError;
pub use memory::MemoryService;
pub use sqlite::SqliteService;
pub use traits::IncidentRepository;

use std::sync::Arc;

use crate::core::config::{StorageBackend, StorageConfig};
use filters::FilterSemantics;

/// Incident store wrapping the configured backend
#[derive(Clone)]
pub enum IncidentStore {
    /// In-process store (default, nothing persisted)
    Memory(Arc<MemoryService>),
    /// SQLite backend (embedded, file or `:memory:`)
    Sqlite(Arc<SqliteService>),
    /// DynamoDB backend (AWS or DynamoDB Local)
    Dynamodb(Arc<DynamodbService>),
}

impl IncidentStore {
    /// Initialize the incident store based on configuration
    ///
    /// For DynamoDB, requires `storage.dynamodb` to be populated.
    pub async fn init(config: &StorageConfig, semantics: FilterSemantics) -> Result<Self, DataError> {
        tracing::debug!(backend = %config.backend, %semantics, "Initializing incident store");
        match config.backend {
            StorageBackend::Memory => Ok(Self::Memory(Arc::new(MemoryService::new()))),
            StorageBackend::Sqlite => {
                let service = SqliteService::init(&config.sqlite.path, semantics).await?;
                Ok(Self::Sqlite(Arc::new(service)))
            }
            StorageBackend::Dynamodb => {
                let dynamodb = config.dynamodb.as_ref().ok_or_else(|| {
                    DataError::Config("DynamoDB configuration required".to_string())
                })?;
                let service = DynamodbService::init(
                    dynamodb.region.clone(),
                    dynamodb.incident_table.clone(),
                    dynamodb.endpoint.clone(),
                    semantics,
                )
                .await?;
                Ok(Self::Dynamodb(Arc::new(service)))
            }
        }
    }

    /// Get the backend type
    pub fn backend(&self) -> StorageBackend {
        match self {
            Self::Memory(_) => StorageBackend::Memory,
            Self::Sqlite(_) => StorageBackend::Sqlite,
            Self::Dynamodb(_) => StorageBackend::Dynamodb,
        }
    }

    /// Get the repository trait object for data operations
    pub fn repository(&self) -> Box<dyn IncidentRepository + Send + Sync> {
        match self {
            Self::Memory(m) => Box::new(Arc::clone(m)),
            Self::Sqlite(s) => Box::new(Arc::clone(s)),
            Self::Dynamodb(d) => Box::new(Arc::clone(d)),
        }
    }

    /// Release backend resources (closes the SQLite pool)
    pub async fn close(&self) {
        if let Self::Sqlite(s) = self {
            s.close().await;
        }
    }
}
