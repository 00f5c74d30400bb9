//! SQLite schema definitions

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Complete schema SQL
pub const SCHEMA: &str = r#"
-- =============================================================================
-- Infrastructure: Schema version tracking
-- =============================================================================
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL,
    applied_at INTEGER NOT NULL
);

-- =============================================================================
-- 1. Incidents
-- =============================================================================
CREATE TABLE IF NOT EXISTS Incidents (
    Id INTEGER PRIMARY KEY AUTOINCREMENT,
    Type TEXT NOT NULL DEFAULT '',
    Description TEXT NOT NULL DEFAULT '',
    Reporter TEXT NOT NULL DEFAULT '',
    State TEXT NOT NULL DEFAULT ''
);

-- =============================================================================
-- 2. Incident attributes (free-form key/value pairs)
-- =============================================================================
CREATE TABLE IF NOT EXISTS IncidentAttributes (
    IncidentId INTEGER NOT NULL REFERENCES Incidents(Id) ON DELETE CASCADE,
    AttributeName TEXT NOT NULL,
    AttributeValue TEXT NOT NULL DEFAULT '',
    PRIMARY KEY (IncidentId, AttributeName)
);

CREATE INDEX IF NOT EXISTS idx_incident_attributes_name
    ON IncidentAttributes(IncidentId, AttributeName COLLATE NOCASE);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_contains_required_tables() {
        let required_tables = ["schema_version", "Incidents", "IncidentAttributes"];

        for table in required_tables {
            assert!(
                SCHEMA.contains(&format!("CREATE TABLE IF NOT EXISTS {} (", table)),
                "Schema missing table: {}",
                table
            );
        }
    }

    #[test]
    fn test_schema_statements_split_cleanly() {
        let statements: Vec<&str> = SCHEMA
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        assert_eq!(statements.len(), 4);
    }
}
