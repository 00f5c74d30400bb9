//! IncidentRepository trait implementation for SQLite

use std::sync::Arc;

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::filters::FilterRequest;
use crate::data::traits::IncidentRepository;
use crate::data::types::{Incident, NewIncident};

use super::SqliteService;
use super::repositories::incident;

#[async_trait]
impl IncidentRepository for Arc<SqliteService> {
    async fn add_incident(&self, new: NewIncident) -> Result<Incident, DataError> {
        incident::create_incident(self.pool(), new).await
    }

    async fn get_incident(&self, id: i64) -> Result<Option<Incident>, DataError> {
        incident::get_incident(self.pool(), id).await
    }

    async fn list_incidents(
        &self,
        filter: Option<&FilterRequest>,
    ) -> Result<Vec<Incident>, DataError> {
        incident::list_incidents(self.pool(), filter, self.semantics()).await
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
