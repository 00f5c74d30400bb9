//! Incident repository for SQLite operations

use std::collections::BTreeMap;

use sqlx::SqlitePool;

use crate::data::error::DataError;
use crate::data::filters::{FilterRequest, FilterSemantics, sql};
use crate::data::types::{Incident, NewIncident};

/// Incident columns joined with their attribute rows
const SELECT_INCIDENTS: &str = r#"
    SELECT i.Id, i.Type, i.Description, i.Reporter, i.State, a.AttributeName, a.AttributeValue
    FROM Incidents i
    LEFT JOIN IncidentAttributes a ON a.IncidentId = i.Id
"#;

type IncidentJoinRow = (
    i64,
    String,
    String,
    String,
    String,
    Option<String>,
    Option<String>,
);

/// Insert an incident and its attributes; the database assigns the id
pub async fn create_incident(
    pool: &SqlitePool,
    incident: NewIncident,
) -> Result<Incident, DataError> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        INSERT INTO Incidents (Type, Description, Reporter, State)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&incident.kind)
    .bind(&incident.description)
    .bind(&incident.reporter)
    .bind(&incident.state)
    .execute(&mut *tx)
    .await?;
    let id = result.last_insert_rowid();

    for (name, value) in &incident.attributes {
        sqlx::query(
            r#"
            INSERT INTO IncidentAttributes (IncidentId, AttributeName, AttributeValue)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(value)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::debug!(id, attributes = incident.attributes.len(), "Created incident");
    Ok(incident.into_incident(id))
}

/// Get a single incident with its attributes
pub async fn get_incident(pool: &SqlitePool, id: i64) -> Result<Option<Incident>, DataError> {
    let query = format!("{} WHERE i.Id = ?", SELECT_INCIDENTS);
    let rows: Vec<IncidentJoinRow> = sqlx::query_as(&query).bind(id).fetch_all(pool).await?;

    Ok(fold_rows(rows).into_iter().next())
}

/// List incidents matching `filter`, ascending by id
pub async fn list_incidents(
    pool: &SqlitePool,
    filter: Option<&FilterRequest>,
    semantics: FilterSemantics,
) -> Result<Vec<Incident>, DataError> {
    let clause = sql::compile(filter, semantics);
    let query = format!("{} {} ORDER BY i.Id", SELECT_INCIDENTS, clause.sql);

    let mut q = sqlx::query_as::<_, IncidentJoinRow>(&query);
    for value in &clause.params.values {
        q = q.bind(value);
    }
    let rows = q.fetch_all(pool).await?;

    Ok(fold_rows(rows))
}

/// Fold joined rows (one per attribute) into incidents, keeping id order
fn fold_rows(rows: Vec<IncidentJoinRow>) -> Vec<Incident> {
    let mut incidents: BTreeMap<i64, Incident> = BTreeMap::new();
    for (id, kind, description, reporter, state, name, value) in rows {
        let incident = incidents.entry(id).or_insert_with(|| Incident {
            kind,
            id,
            description,
            reporter,
            state,
            attributes: BTreeMap::new(),
        });
        if let (Some(name), Some(value)) = (name, value) {
            incident.attributes.insert(name, value);
        }
    }
    incidents.into_values().collect()
}
