use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::filters::FilterSemantics;

use super::cli::CliConfig;
use super::constants::{CONFIG_FILE_NAME, DEFAULT_INCIDENT_TABLE, DEFAULT_SQLITE_PATH};

// =============================================================================
// Storage Backend Enum
// =============================================================================

/// Incident store backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Sqlite,
    Dynamodb,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Memory => write!(f, "memory"),
            StorageBackend::Sqlite => write!(f, "sqlite"),
            StorageBackend::Dynamodb => write!(f, "dynamodb"),
        }
    }
}

// =============================================================================
// File Configuration (all fields optional)
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct SqliteFileConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DynamodbFileConfig {
    pub region: Option<String>,
    pub incident_table: Option<String>,
    pub endpoint: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StorageFileConfig {
    pub backend: Option<StorageBackend>,
    pub sqlite: Option<SqliteFileConfig>,
    pub dynamodb: Option<DynamodbFileConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FiltersFileConfig {
    pub semantics: Option<FilterSemantics>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub storage: Option<StorageFileConfig>,
    pub filters: Option<FiltersFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }
}

// =============================================================================
// Runtime Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamodbConfig {
    pub region: String,
    pub incident_table: String,
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub sqlite: SqliteConfig,
    /// Present when the backend is DynamoDB
    pub dynamodb: Option<DynamodbConfig>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FiltersConfig {
    pub semantics: FilterSemantics,
}

/// Final merged application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub filters: FiltersConfig,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Local directory config OR CLI-specified config path
    /// 3. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let config_path = if let Some(ref path) = cli.config {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Some(path.clone())
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        let file_config = match config_path {
            Some(path) => {
                let config = FileConfig::load_from_file(&path)?;
                config.warn_unknown_fields();
                config
            }
            None => FileConfig::default(),
        };

        Self::from_sources(file_config, cli)
    }

    /// Layer configs: defaults -> file config -> CLI/env overrides
    fn from_sources(file_config: FileConfig, cli: &CliConfig) -> Result<Self> {
        let file_storage = file_config.storage.unwrap_or_default();
        let file_sqlite = file_storage.sqlite.unwrap_or_default();
        let file_dynamodb = file_storage.dynamodb.unwrap_or_default();
        let file_filters = file_config.filters.unwrap_or_default();

        let backend = cli.backend.or(file_storage.backend).unwrap_or_default();

        let sqlite = SqliteConfig {
            path: cli
                .sqlite_path
                .clone()
                .or(file_sqlite.path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SQLITE_PATH)),
        };

        let dynamodb = if backend == StorageBackend::Dynamodb {
            let region = cli
                .dynamodb_region
                .clone()
                .or(file_dynamodb.region)
                .filter(|r| !r.is_empty())
                .context("storage.dynamodb.region is required for the dynamodb backend")?;
            Some(DynamodbConfig {
                region,
                incident_table: cli
                    .dynamodb_table
                    .clone()
                    .or(file_dynamodb.incident_table)
                    .unwrap_or_else(|| DEFAULT_INCIDENT_TABLE.to_string()),
                endpoint: cli.dynamodb_endpoint.clone().or(file_dynamodb.endpoint),
            })
        } else {
            None
        };

        let semantics = cli
            .filter_semantics
            .or(file_filters.semantics)
            .unwrap_or_default();

        let config = Self {
            storage: StorageConfig {
                backend,
                sqlite,
                dynamodb,
            },
            filters: FiltersConfig { semantics },
        };
        tracing::debug!(
            backend = %config.storage.backend,
            semantics = %config.filters.semantics,
            "Configuration loaded"
        );
        Ok(config)
    }
}
