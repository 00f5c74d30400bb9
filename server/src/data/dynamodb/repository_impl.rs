//! IncidentRepository trait implementation for DynamoDB

use std::sync::Arc;

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::filters::FilterRequest;
use crate::data::filters::dynamodb::{self, DynamoScan};
use crate::data::traits::IncidentRepository;
use crate::data::types::{Incident, NewIncident};

use super::{DynamodbService, items};

#[async_trait]
impl IncidentRepository for Arc<DynamodbService> {
    async fn add_incident(&self, new: NewIncident) -> Result<Incident, DataError> {
        items::check_hash_key(&new)?;
        let id = self.next_id().await?;
        let incident = new.into_incident(id);
        self.put_incident(&incident).await?;
        tracing::debug!(id, "Stored incident in DynamoDB");
        Ok(incident)
    }

    async fn get_incident(&self, id: i64) -> Result<Option<Incident>, DataError> {
        self.find_by_id(id).await
    }

    async fn list_incidents(
        &self,
        filter: Option<&FilterRequest>,
    ) -> Result<Vec<Incident>, DataError> {
        match dynamodb::compile(filter, self.semantics()) {
            DynamoScan::All => self.scan_incidents(None).await,
            DynamoScan::Filtered(compiled) => self.scan_incidents(Some(compiled)).await,
            DynamoScan::Nothing => {
                tracing::debug!("Filter can never match, skipping scan");
                Ok(Vec::new())
            }
        }
    }

    fn backend_name(&self) -> &'static str {
        "dynamodb"
    }
}
