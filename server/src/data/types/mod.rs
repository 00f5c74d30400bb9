//! Shared data types for all storage backends
//!
//! Entity types listed by the incident stores (memory, SQLite, DynamoDB) and
//! filtered through the property accessor contract.

mod incident;
mod user;

pub use incident::{Incident, NewIncident};
pub use user::User;
