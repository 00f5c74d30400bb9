//! Incident types shared by every incident store

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ============================================================================
// Incident types
// ============================================================================

/// A tracked incident
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub id: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub reporter: String,
    #[serde(default)]
    pub state: String,
    /// Free-form attributes, keyed by attribute name
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

/// Creation payload for an incident (the store assigns the id)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIncident {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub reporter: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl NewIncident {
    pub fn new(reporter: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            reporter: reporter.into(),
            state: state.into(),
            ..Default::default()
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Materialize the incident under the id assigned by a store
    pub fn into_incident(self, id: i64) -> Incident {
        Incident {
            kind: self.kind,
            id,
            description: self.description,
            reporter: self.reporter,
            state: self.state,
            attributes: self.attributes,
        }
    }
}
