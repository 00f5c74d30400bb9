//! Incident query façade
//!
//! Callers hand a filter request to `IncidentService::list` without knowing
//! which backend answers it. The store compiles or evaluates the predicate;
//! the façade guarantees ascending id order on the way out.

use crate::data::filters::FilterRequest;
use crate::data::types::{Incident, NewIncident};
use crate::data::{DataError, IncidentRepository, IncidentStore};

/// Incident service built once from the configured store
pub struct IncidentService {
    repository: Box<dyn IncidentRepository + Send + Sync>,
}

impl IncidentService {
    pub fn new(store: &IncidentStore) -> Self {
        Self::from_repository(store.repository())
    }

    pub fn from_repository(repository: Box<dyn IncidentRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    /// List incidents passing `filter`, ascending by id
    ///
    /// `None` lists every incident.
    pub async fn list(&self, filter: Option<&FilterRequest>) -> Result<Vec<Incident>, DataError> {
        let mut incidents = self.repository.list_incidents(filter).await?;
        incidents.sort_by_key(|incident| incident.id);
        tracing::debug!(
            backend = self.repository.backend_name(),
            filtered = filter.is_some(),
            count = incidents.len(),
            "Listed incidents"
        );
        Ok(incidents)
    }

    pub async fn add(&self, incident: NewIncident) -> Result<Incident, DataError> {
        let incident = self.repository.add_incident(incident).await?;
        tracing::debug!(
            backend = self.repository.backend_name(),
            id = incident.id,
            "Added incident"
        );
        Ok(incident)
    }

    pub async fn get(&self, id: i64) -> Result<Option<Incident>, DataError> {
        self.repository.get_incident(id).await
    }

    pub fn backend_name(&self) -> &'static str {
        self.repository.backend_name()
    }
}
