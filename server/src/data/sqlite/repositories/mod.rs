//! SQLite repositories
//!
//! Types (Incident, NewIncident) should be imported from `crate::data::types`.

pub mod incident;

pub use incident::{create_incident, get_incident, list_incidents};
