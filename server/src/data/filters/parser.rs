//! Filter parsing
//!
//! Parses the JSON filter parameter of a list request into a
//! [`FilterRequest`], rejecting oversized or malformed input before any
//! backend sees it.

use thiserror::Error;

use super::types::FilterRequest;

/// Maximum size of filter JSON in bytes (64KB)
const MAX_FILTER_JSON_SIZE: usize = 64 * 1024;

/// Maximum number of leaf filters allowed across the whole tree
const MAX_FILTERS: usize = 100;

/// Maximum nesting depth of complex filters
const MAX_FILTER_DEPTH: usize = 16;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid filter JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Filter JSON exceeds maximum size of {max} bytes")]
    TooLarge { max: usize },

    #[error("Filter nesting exceeds maximum depth of {max}")]
    TooDeep { max: usize },

    #[error("Maximum {max} filters allowed")]
    TooManyFilters { max: usize },
}

impl FilterError {
    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidJson(_) => "INVALID_FILTER_JSON",
            Self::TooLarge { .. } => "FILTER_JSON_TOO_LARGE",
            Self::TooDeep { .. } => "FILTER_TOO_DEEP",
            Self::TooManyFilters { .. } => "TOO_MANY_FILTERS",
        }
    }
}

/// Parse filter JSON, validating size, nesting depth and leaf count
pub fn parse_filter_request(json_str: &str) -> Result<FilterRequest, FilterError> {
    if json_str.len() > MAX_FILTER_JSON_SIZE {
        return Err(FilterError::TooLarge {
            max: MAX_FILTER_JSON_SIZE,
        });
    }

    let request: FilterRequest = serde_json::from_str(json_str)?;

    if request.depth() > MAX_FILTER_DEPTH {
        return Err(FilterError::TooDeep {
            max: MAX_FILTER_DEPTH,
        });
    }

    if request.leaf_count() > MAX_FILTERS {
        return Err(FilterError::TooManyFilters { max: MAX_FILTERS });
    }

    Ok(request)
}

/// Parse an optional filter parameter. A missing parameter means no filter.
pub fn parse_filter_param(param: Option<&str>) -> Result<Option<FilterRequest>, FilterError> {
    param.map(parse_filter_request).transpose()
}
