//! Conversion between incidents and DynamoDB items
//!
//! Items are `{type: S, id: N, description: S, reporter: S, state: S,
//! attributes: M<S>}`. Older writers stored empty strings as `NULL`, so `NULL`
//! and missing string attributes read back as "".

use std::collections::{BTreeMap, HashMap};

use aws_sdk_dynamodb::types::AttributeValue;

use crate::data::error::DataError;
use crate::data::filters::dynamodb::DynamoValue;
use crate::data::types::{Incident, NewIncident};

pub const ATTR_TYPE: &str = "type";
pub const ATTR_ID: &str = "id";
pub const ATTR_DESCRIPTION: &str = "description";
pub const ATTR_REPORTER: &str = "reporter";
pub const ATTR_STATE: &str = "state";
pub const ATTR_ATTRIBUTES: &str = "attributes";

pub type Item = HashMap<String, AttributeValue>;

/// `type` is the table's hash key, and DynamoDB rejects empty key strings
pub fn check_hash_key(incident: &NewIncident) -> Result<(), DataError> {
    if incident.kind.is_empty() {
        return Err(DataError::invalid_item(
            "incident type must not be empty for the dynamodb backend",
        ));
    }
    Ok(())
}

pub fn incident_to_item(incident: &Incident) -> Item {
    let attributes = incident
        .attributes
        .iter()
        .map(|(name, value)| (name.clone(), AttributeValue::S(value.clone())))
        .collect();

    HashMap::from([
        (ATTR_TYPE.to_string(), AttributeValue::S(incident.kind.clone())),
        (ATTR_ID.to_string(), AttributeValue::N(incident.id.to_string())),
        (
            ATTR_DESCRIPTION.to_string(),
            AttributeValue::S(incident.description.clone()),
        ),
        (
            ATTR_REPORTER.to_string(),
            AttributeValue::S(incident.reporter.clone()),
        ),
        (ATTR_STATE.to_string(), AttributeValue::S(incident.state.clone())),
        (ATTR_ATTRIBUTES.to_string(), AttributeValue::M(attributes)),
    ])
}

pub fn item_to_incident(item: &Item) -> Result<Incident, DataError> {
    let attributes = match item.get(ATTR_ATTRIBUTES) {
        None | Some(AttributeValue::Null(_)) => BTreeMap::new(),
        Some(AttributeValue::M(map)) => map
            .iter()
            .map(|(name, value)| Ok((name.clone(), string_value(name, Some(value))?)))
            .collect::<Result<_, DataError>>()?,
        Some(_) => {
            return Err(DataError::invalid_item("attributes is not a map"));
        }
    };

    Ok(Incident {
        kind: string_value(ATTR_TYPE, item.get(ATTR_TYPE))?,
        id: id_value(item)?,
        description: string_value(ATTR_DESCRIPTION, item.get(ATTR_DESCRIPTION))?,
        reporter: string_value(ATTR_REPORTER, item.get(ATTR_REPORTER))?,
        state: string_value(ATTR_STATE, item.get(ATTR_STATE))?,
        attributes,
    })
}

/// Read the numeric `id` of an item
pub fn id_value(item: &Item) -> Result<i64, DataError> {
    match item.get(ATTR_ID) {
        Some(AttributeValue::N(n)) => n
            .parse()
            .map_err(|_| DataError::invalid_item(format!("id is not an integer: {}", n))),
        Some(_) => Err(DataError::invalid_item("id is not a number")),
        None => Err(DataError::invalid_item("missing id")),
    }
}

fn string_value(name: &str, value: Option<&AttributeValue>) -> Result<String, DataError> {
    match value {
        None | Some(AttributeValue::Null(_)) => Ok(String::new()),
        Some(AttributeValue::S(s)) => Ok(s.clone()),
        Some(AttributeValue::N(n)) => Ok(n.clone()),
        Some(_) => Err(DataError::invalid_item(format!("{} is not a string", name))),
    }
}

/// Expression values as SDK attribute values
pub fn expression_values(values: BTreeMap<String, DynamoValue>) -> HashMap<String, AttributeValue> {
    values
        .into_iter()
        .map(|(placeholder, value)| {
            let value = match value {
                DynamoValue::S(s) => AttributeValue::S(s),
                DynamoValue::N(n) => AttributeValue::N(n),
            };
            (placeholder, value)
        })
        .collect()
}
