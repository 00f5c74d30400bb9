//! Core application

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;

use crate::core::cli::{self, CliConfig, Commands};
use crate::core::config::AppConfig;
use crate::core::constants::{DEFAULT_LOG_FILTER, ENV_LOG};
use crate::data::IncidentStore;
use crate::data::filters::dynamodb::{self as dynamodb_filter, DynamoScan};
use crate::data::filters::{
    FilterError, FilterRequest, FilterSemantics, parse_filter_param, parse_filter_request, sql,
};
use crate::data::types::NewIncident;
use crate::domain::IncidentService;

pub struct CoreApp {
    pub config: AppConfig,
    pub store: IncidentStore,
    pub incidents: IncidentService,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        match command {
            Commands::Explain { filter } => {
                let config = AppConfig::load(&cli_config)?;
                let request = parse_filter_request(&filter).map_err(filter_error)?;
                print_json(&explain(&request, config.filters.semantics))
            }
            Commands::List { filter } => {
                let request = parse_filter_param(filter.as_deref()).map_err(filter_error)?;
                let app = Self::init(&cli_config).await?;
                let incidents = app
                    .incidents
                    .list(request.as_ref())
                    .await
                    .context("Failed to list incidents")?;
                app.store.close().await;
                print_json(&incidents)
            }
            Commands::Add {
                reporter,
                state,
                description,
                kind,
                attributes,
            } => {
                let new = attributes.into_iter().fold(
                    NewIncident::new(reporter, state)
                        .with_kind(kind)
                        .with_description(description),
                    |new, (name, value)| new.with_attribute(name, value),
                );
                let app = Self::init(&cli_config).await?;
                let incident = app
                    .incidents
                    .add(new)
                    .await
                    .context("Failed to add incident")?;
                app.store.close().await;
                print_json(&incident)
            }
        }
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;
        let store = IncidentStore::init(&config.storage, config.filters.semantics)
            .await
            .with_context(|| {
                format!("Failed to initialize {} incident store", config.storage.backend)
            })?;
        let incidents = IncidentService::new(&store);

        tracing::debug!(
            backend = incidents.backend_name(),
            semantics = %config.filters.semantics,
            "Incident store ready"
        );

        Ok(Self {
            config,
            store,
            incidents,
        })
    }

    fn init_logging() {
        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());

        // Logs go to stderr so command output stays machine readable
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }
}

fn filter_error(e: FilterError) -> anyhow::Error {
    anyhow::anyhow!("{} ({})", e, e.code())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let output = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", output);
    Ok(())
}

/// Compiled forms of `request` for both query backends
fn explain(request: &FilterRequest, semantics: FilterSemantics) -> serde_json::Value {
    let clause = sql::compile(Some(request), semantics);
    let dynamodb = match dynamodb_filter::compile(Some(request), semantics) {
        DynamoScan::All => json!({ "scan": "all" }),
        DynamoScan::Nothing => json!({ "scan": "none" }),
        DynamoScan::Filtered(filter) => json!({ "scan": "filtered", "filter": filter }),
    };

    json!({
        "semantics": semantics,
        "leaves": request.leaf_count(),
        "sql": {
            "clause": clause.sql,
            "args": clause.params.values,
        },
        "dynamodb": dynamodb,
    })
}
