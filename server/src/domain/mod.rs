//! Domain logic for incident tracking
//!
//! - `incidents` - Query façade over the configured incident store

pub mod incidents;

pub use incidents::IncidentService;
