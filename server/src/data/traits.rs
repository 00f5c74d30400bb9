//! Repository trait for incident stores
//!
//! Each backend (memory, SQLite, DynamoDB) implements this trait with its own
//! execution model for the predicate filter engine.

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::filters::FilterRequest;
use crate::data::types::{Incident, NewIncident};

/// Repository trait for incident operations
#[async_trait]
pub trait IncidentRepository: Send + Sync {
    /// Store a new incident and return it with its assigned id
    async fn add_incident(&self, incident: NewIncident) -> Result<Incident, DataError>;

    /// Get a single incident by id
    async fn get_incident(&self, id: i64) -> Result<Option<Incident>, DataError>;

    /// List incidents passing `filter`; `None` lists everything
    async fn list_incidents(
        &self,
        filter: Option<&FilterRequest>,
    ) -> Result<Vec<Incident>, DataError>;

    /// Backend name for logging
    fn backend_name(&self) -> &'static str;
}
