//! In-memory incident store
//!
//! Incidents live in an ordered map keyed by id. Listing evaluates the
//! predicate tree against every stored incident.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::data::error::DataError;
use crate::data::filters::{self, FilterRequest};
use crate::data::traits::IncidentRepository;
use crate::data::types::{Incident, NewIncident};

/// In-memory incident store
///
/// Ids are assigned densely starting at 0.
#[derive(Default)]
pub struct MemoryService {
    incidents: RwLock<BTreeMap<i64, Incident>>,
}

impl MemoryService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.incidents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.incidents.read().is_empty()
    }
}

#[async_trait]
impl IncidentRepository for Arc<MemoryService> {
    async fn add_incident(&self, incident: NewIncident) -> Result<Incident, DataError> {
        let mut incidents = self.incidents.write();
        let id = incidents.len() as i64;
        let incident = incident.into_incident(id);
        incidents.insert(id, incident.clone());
        tracing::debug!(id, "Stored incident in memory");
        Ok(incident)
    }

    async fn get_incident(&self, id: i64) -> Result<Option<Incident>, DataError> {
        Ok(self.incidents.read().get(&id).cloned())
    }

    async fn list_incidents(
        &self,
        filter: Option<&FilterRequest>,
    ) -> Result<Vec<Incident>, DataError> {
        let incidents = self.incidents.read();
        let matched: Vec<Incident> = incidents
            .values()
            .filter(|incident| filters::matches(*incident, filter))
            .cloned()
            .collect();
        tracing::trace!(
            scanned = incidents.len(),
            matched = matched.len(),
            "Evaluated filter in memory"
        );
        Ok(matched)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
