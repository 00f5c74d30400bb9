//! Incident tracking with a backend-independent predicate filter engine
//!
//! - `data` - Incident stores and the filter engine
//! - `domain` - Query façade over the configured store
//! - `core` - Configuration, CLI and constants
//! - `utils` - String and SQL helpers

pub mod app;
pub mod core;
pub mod data;
pub mod domain;
pub mod utils;
