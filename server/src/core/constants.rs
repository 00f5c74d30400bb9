// =============================================================================
// Application Identity
// =============================================================================

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "incidents";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "incidents.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "INCIDENTS_CONFIG";

// =============================================================================
// Environment Variables - Logging
// =============================================================================

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "INCIDENTS_LOG";

/// Log filter used when neither ENV_LOG nor RUST_LOG is set
pub const DEFAULT_LOG_FILTER: &str = "info,incidents=info";

// =============================================================================
// Environment Variables - Storage
// =============================================================================

/// Environment variable for the incident store backend (memory, sqlite, dynamodb)
pub const ENV_BACKEND: &str = "INCIDENTS_BACKEND";

/// Environment variable for the SQLite database path
pub const ENV_SQLITE_PATH: &str = "INCIDENTS_SQLITE_PATH";

/// Environment variable for the DynamoDB region
pub const ENV_DYNAMODB_REGION: &str = "INCIDENTS_DYNAMODB_REGION";

/// Environment variable for the DynamoDB incident table
pub const ENV_DYNAMODB_TABLE: &str = "INCIDENTS_DYNAMODB_TABLE";

/// Environment variable for a custom DynamoDB endpoint (DynamoDB Local)
pub const ENV_DYNAMODB_ENDPOINT: &str = "INCIDENTS_DYNAMODB_ENDPOINT";

// =============================================================================
// Environment Variables - Filters
// =============================================================================

/// Environment variable for filter compilation semantics (legacy, consistent)
pub const ENV_FILTER_SEMANTICS: &str = "INCIDENTS_FILTER_SEMANTICS";

// =============================================================================
// Incidents
// =============================================================================

/// Incident type used by `add` when none is given (DynamoDB hash keys cannot be empty)
pub const DEFAULT_INCIDENT_TYPE: &str = "Incident";

// =============================================================================
// SQLite Configuration
// =============================================================================

/// Default SQLite database path
pub const DEFAULT_SQLITE_PATH: &str = "incidents.db";

/// Path that selects a private in-process database
pub const SQLITE_MEMORY_PATH: &str = ":memory:";

/// Maximum connections in the SQLite pool
pub const SQLITE_MAX_CONNECTIONS: u32 = 5;

/// Busy timeout in seconds for SQLite operations
pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 30;

/// SQLite page cache size (negative = KiB)
pub const SQLITE_CACHE_SIZE: &str = "-16000";

// =============================================================================
// DynamoDB Configuration
// =============================================================================

/// Default DynamoDB incident table
pub const DEFAULT_INCIDENT_TABLE: &str = "Incidents";
