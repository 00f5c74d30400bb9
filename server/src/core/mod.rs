//! Core application infrastructure

pub mod cli;
pub mod config;
pub mod constants;

pub use crate::app::CoreApp;
pub use cli::{CliConfig, Commands};
pub use config::{AppConfig, StorageBackend, StorageConfig};

// Re-export the incident store from the data layer
pub use crate::data::IncidentStore;
