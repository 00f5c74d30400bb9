use clap::{Parser, Subcommand};

use std::path::PathBuf;

use crate::data::filters::FilterSemantics;
use crate::utils::string::parse_key_value;

use super::config::StorageBackend;
use super::constants::{
    APP_NAME_LOWER, DEFAULT_INCIDENT_TYPE, ENV_BACKEND, ENV_CONFIG, ENV_DYNAMODB_ENDPOINT,
    ENV_DYNAMODB_REGION, ENV_DYNAMODB_TABLE, ENV_FILTER_SEMANTICS, ENV_SQLITE_PATH,
};

#[derive(Parser)]
#[command(name = APP_NAME_LOWER)]
#[command(version, about = "Incident tracker with predicate filtering", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Incident store backend (memory, sqlite or dynamodb)
    ///
    /// `memory` (the default) starts empty in every process and keeps nothing
    /// after it exits, so incidents added in one run are not listed by the
    /// next. Use `sqlite` or `dynamodb` to keep them.
    #[arg(long, global = true, env = ENV_BACKEND, value_parser = parse_storage_backend)]
    pub backend: Option<StorageBackend>,

    /// SQLite database path (`:memory:` for an in-process database)
    #[arg(long, global = true, env = ENV_SQLITE_PATH)]
    pub sqlite_path: Option<PathBuf>,

    /// DynamoDB region (when using dynamodb backend)
    #[arg(long, global = true, env = ENV_DYNAMODB_REGION)]
    pub dynamodb_region: Option<String>,

    /// DynamoDB incident table
    #[arg(long, global = true, env = ENV_DYNAMODB_TABLE)]
    pub dynamodb_table: Option<String>,

    /// Custom DynamoDB endpoint (e.g. DynamoDB Local)
    #[arg(long, global = true, env = ENV_DYNAMODB_ENDPOINT)]
    pub dynamodb_endpoint: Option<String>,

    /// Filter compilation semantics (legacy or consistent)
    #[arg(long, global = true, env = ENV_FILTER_SEMANTICS, value_parser = parse_filter_semantics)]
    pub filter_semantics: Option<FilterSemantics>,
}

/// Parse storage backend from CLI/env string
fn parse_storage_backend(s: &str) -> Result<StorageBackend, String> {
    match s.to_lowercase().as_str() {
        "memory" => Ok(StorageBackend::Memory),
        "sqlite" => Ok(StorageBackend::Sqlite),
        "dynamodb" | "dynamo" => Ok(StorageBackend::Dynamodb),
        _ => Err(format!(
            "Invalid backend '{}'. Valid options: memory, sqlite, dynamodb",
            s
        )),
    }
}

/// Parse filter semantics from CLI/env string
fn parse_filter_semantics(s: &str) -> Result<FilterSemantics, String> {
    match s.to_lowercase().as_str() {
        "legacy" => Ok(FilterSemantics::Legacy),
        "consistent" => Ok(FilterSemantics::Consistent),
        _ => Err(format!(
            "Invalid filter semantics '{}'. Valid options: legacy, consistent",
            s
        )),
    }
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// List incidents as JSON, ascending by id
    List {
        /// Filter request JSON ({"complexfilters": [...], "union": "and"})
        #[arg(long, short = 'f')]
        filter: Option<String>,
    },
    /// Create an incident
    Add {
        #[arg(long)]
        reporter: String,
        #[arg(long)]
        state: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long = "type", default_value = DEFAULT_INCIDENT_TYPE)]
        kind: String,
        /// Free-form attribute, repeatable
        #[arg(long = "attr", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        attributes: Vec<(String, String)>,
    },
    /// Show the compiled SQL and DynamoDB forms of a filter
    Explain {
        #[arg(long, short = 'f')]
        filter: String,
    },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub config: Option<PathBuf>,
    pub backend: Option<StorageBackend>,
    pub sqlite_path: Option<PathBuf>,
    pub dynamodb_region: Option<String>,
    pub dynamodb_table: Option<String>,
    pub dynamodb_endpoint: Option<String>,
    pub filter_semantics: Option<FilterSemantics>,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Commands) {
    from_cli(Cli::parse())
}

fn from_cli(cli: Cli) -> (CliConfig, Commands) {
    let config = CliConfig {
        config: cli.config,
        backend: cli.backend,
        sqlite_path: cli.sqlite_path,
        dynamodb_region: cli.dynamodb_region,
        dynamodb_table: cli.dynamodb_table,
        dynamodb_endpoint: cli.dynamodb_endpoint,
        filter_semantics: cli.filter_semantics,
    };
    (config, cli.command)
}
