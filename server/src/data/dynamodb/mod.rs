//! DynamoDB incident store
//!
//! Wide-column backend for the incident list. Filter requests compile to a
//! Scan `FilterExpression` with placeholder maps; pages are followed until the
//! table is exhausted and results are re-sorted by id, since Scan order is
//! unspecified.
//!
//! The incident table is keyed by `type` (hash) and `id` (range) and is
//! created on startup when missing.

pub mod items;
mod repository_impl;

use std::collections::HashMap;

use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, KeySchemaElement, KeyType, ProvisionedThroughput,
    ScalarAttributeType,
};

use crate::data::error::DataError;
use crate::data::filters::FilterSemantics;
use crate::data::filters::dynamodb::DynamoFilter;
use crate::data::types::Incident;

use items::{ATTR_ID, ATTR_TYPE, Item};

/// Provisioned throughput for a newly created incident table
const TABLE_CAPACITY_UNITS: i64 = 5;

/// DynamoDB incident service
#[derive(Debug, Clone)]
pub struct DynamodbService {
    client: Client,
    table: String,
    semantics: FilterSemantics,
}

impl DynamodbService {
    /// Create the service and make sure the incident table exists
    pub async fn init(
        region: String,
        table: String,
        endpoint: Option<String>,
        semantics: FilterSemantics,
    ) -> Result<Self, DataError> {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_sdk_dynamodb::config::Region::new(region.clone()))
            .load()
            .await;

        // Build DynamoDB client with optional custom endpoint (DynamoDB Local)
        let mut dynamo_config = aws_sdk_dynamodb::config::Builder::from(&config);
        if let Some(endpoint_url) = endpoint {
            dynamo_config = dynamo_config.endpoint_url(endpoint_url);
        }

        let service = Self {
            client: Client::from_conf(dynamo_config.build()),
            table,
            semantics,
        };
        service.ensure_table().await?;

        tracing::debug!(
            region = %region,
            table = %service.table,
            %semantics,
            "DynamoDB service initialized"
        );
        Ok(service)
    }

    pub fn semantics(&self) -> FilterSemantics {
        self.semantics
    }

    async fn ensure_table(&self) -> Result<(), DataError> {
        match self
            .client
            .describe_table()
            .table_name(&self.table)
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(e) => {
                let e = e.into_service_error();
                if e.is_resource_not_found_exception() {
                    self.create_table().await
                } else {
                    Err(DataError::dynamodb(e))
                }
            }
        }
    }

    async fn create_table(&self) -> Result<(), DataError> {
        let type_definition = AttributeDefinition::builder()
            .attribute_name(ATTR_TYPE)
            .attribute_type(ScalarAttributeType::S)
            .build()
            .map_err(DataError::dynamodb)?;
        let id_definition = AttributeDefinition::builder()
            .attribute_name(ATTR_ID)
            .attribute_type(ScalarAttributeType::N)
            .build()
            .map_err(DataError::dynamodb)?;
        let hash_key = KeySchemaElement::builder()
            .attribute_name(ATTR_TYPE)
            .key_type(KeyType::Hash)
            .build()
            .map_err(DataError::dynamodb)?;
        let range_key = KeySchemaElement::builder()
            .attribute_name(ATTR_ID)
            .key_type(KeyType::Range)
            .build()
            .map_err(DataError::dynamodb)?;
        let throughput = ProvisionedThroughput::builder()
            .read_capacity_units(TABLE_CAPACITY_UNITS)
            .write_capacity_units(TABLE_CAPACITY_UNITS)
            .build()
            .map_err(DataError::dynamodb)?;

        self.client
            .create_table()
            .table_name(&self.table)
            .attribute_definitions(type_definition)
            .attribute_definitions(id_definition)
            .key_schema(hash_key)
            .key_schema(range_key)
            .provisioned_throughput(throughput)
            .send()
            .await
            .map_err(DataError::dynamodb)?;

        tracing::info!(table = %self.table, "Created DynamoDB incident table");
        Ok(())
    }

    /// Scan the whole table, following pagination
    async fn scan(&self, filter: Option<DynamoFilter>) -> Result<Vec<Item>, DataError> {
        let (expression, names, values) = match filter {
            Some(filter) => (
                Some(filter.expression),
                Some(filter.names.into_iter().collect::<HashMap<_, _>>()),
                Some(items::expression_values(filter.values)),
            ),
            None => (None, None, None),
        };

        let mut stream = self
            .client
            .scan()
            .table_name(&self.table)
            .set_filter_expression(expression)
            .set_expression_attribute_names(names)
            .set_expression_attribute_values(values)
            .into_paginator()
            .items()
            .send();

        let mut scanned = Vec::new();
        while let Some(item) = stream.next().await {
            scanned.push(item.map_err(DataError::dynamodb)?);
        }
        Ok(scanned)
    }

    /// Scan and convert items into incidents ordered by id
    async fn scan_incidents(&self, filter: Option<DynamoFilter>) -> Result<Vec<Incident>, DataError> {
        let mut incidents = self
            .scan(filter)
            .await?
            .iter()
            .map(items::item_to_incident)
            .collect::<Result<Vec<_>, _>>()?;
        incidents.sort_by_key(|incident| incident.id);
        Ok(incidents)
    }

    /// Next free id: one past the largest stored id, 0 for an empty table
    async fn next_id(&self) -> Result<i64, DataError> {
        let mut stream = self
            .client
            .scan()
            .table_name(&self.table)
            .projection_expression("#id")
            .expression_attribute_names("#id", ATTR_ID)
            .into_paginator()
            .items()
            .send();

        let mut max_id: Option<i64> = None;
        while let Some(item) = stream.next().await {
            let id = items::id_value(&item.map_err(DataError::dynamodb)?)?;
            max_id = Some(max_id.map_or(id, |max| max.max(id)));
        }
        Ok(max_id.map_or(0, |max| max + 1))
    }

    async fn put_incident(&self, incident: &Incident) -> Result<(), DataError> {
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(items::incident_to_item(incident)))
            .condition_expression("attribute_not_exists(#id)")
            .expression_attribute_names("#id", ATTR_ID)
            .send()
            .await
            .map_err(DataError::dynamodb)?;
        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Incident>, DataError> {
        let mut stream = self
            .client
            .scan()
            .table_name(&self.table)
            .filter_expression("#id = :id")
            .expression_attribute_names("#id", ATTR_ID)
            .expression_attribute_values(":id", AttributeValue::N(id.to_string()))
            .into_paginator()
            .items()
            .send();

        match stream.next().await {
            Some(item) => items::item_to_incident(&item.map_err(DataError::dynamodb)?).map(Some),
            None => Ok(None),
        }
    }
}
