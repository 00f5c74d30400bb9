//! Predicate filter engine
//!
//! A filter request is a tree of AND/OR groups over property/comparison/value
//! leaves. The same tree is evaluated in memory, compiled to a SQL WHERE
//! clause or compiled to a DynamoDB filter expression.
//!
//! ## Usage
//!
//! ```no_run
//! use incidents_server::data::filters::{self, FilterSemantics, parse_filter_request};
//!
//! let json_str = r#"{"complexfilters": [{"filters": [
//!     {"property": "state", "comparison": "equals", "value": "Open"}]}]}"#;
//! let request = parse_filter_request(json_str).unwrap();
//! let clause = filters::sql::compile(Some(&request), FilterSemantics::Consistent);
//! println!("{} {:?}", clause.sql, clause.params.values);
//! ```

mod accessor;
pub mod dynamodb;
mod eval;
mod parser;
pub mod sql;
mod types;

pub use accessor::{Field, PropertyAccessor};
pub use eval::matches;
pub use parser::{FilterError, parse_filter_param, parse_filter_request};
pub use types::{Comparison, ComplexFilter, Filter, FilterRequest, FilterSemantics, Junction};
