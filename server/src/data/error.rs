//! Unified error type for the data layer
//!
//! Wraps errors from every incident store (memory, SQLite, DynamoDB) while
//! preserving which backend produced them.

use thiserror::Error;

/// Unified error type for data layer operations
#[derive(Error, Debug)]
pub enum DataError {
    /// SQLite database error (relational backend)
    #[error("SQLite error: {0}")]
    Sqlite(#[from] sqlx::Error),

    /// DynamoDB request error (wide-column backend)
    #[error("DynamoDB error: {0}")]
    Dynamodb(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A stored item could not be converted into an incident
    #[error("Invalid item: {0}")]
    InvalidItem(String),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DataError {
    /// Create a DynamoDB error from any SDK error
    pub fn dynamodb(e: impl std::fmt::Display) -> Self {
        Self::Dynamodb(e.to_string())
    }

    /// Create an invalid item error
    pub fn invalid_item(reason: impl Into<String>) -> Self {
        Self::InvalidItem(reason.into())
    }

    /// Check if this is a connection-related error that might be transient
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Sqlite(e) => matches!(
                e,
                sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
            ),
            Self::Dynamodb(msg) => {
                msg.contains("timeout") || msg.contains("dispatch") || msg.contains("throttl")
            }
            _ => false,
        }
    }

    /// Get the backend name that generated this error
    pub fn backend(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "sqlite",
            Self::Dynamodb(_) | Self::InvalidItem(_) => "dynamodb",
            Self::Config(_) | Self::Serialization(_) => "unknown",
        }
    }
}
